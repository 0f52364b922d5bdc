//! Finite-field matrices and elimination
//!
//! Dense matrices of machine-word residues modulo a single prime, with
//! in-place reduced row-echelon form, pivot bookkeeping, and Gauss-Jordan
//! inversion. Primes are limited to 31 bits so that entry products fit in
//! `u64`; dot products accumulate in `u128`.

use crate::matrix::Matrix;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;

/// Pivot structure of a matrix in reduced row-echelon form: ordered pivot
/// column indices (length = rank) and non-pivot column indices
/// (length = nullity)
#[derive(Debug, Clone)]
pub struct PivotPartition {
    pub pivots: Vec<usize>,
    pub nonpivots: Vec<usize>,
}

/// Dense matrix of residues modulo a prime, row-major
#[derive(Debug, Clone)]
pub struct ModMatrix {
    data: Vec<u64>,
    rows: usize,
    cols: usize,
    p: u64,
}

/// Reduce a big integer into the range [0, p)
pub fn residue(x: &BigInt, p: u64) -> u64 {
    x.mod_floor(&BigInt::from(p)).to_u64().unwrap_or(0)
}

/// Modular exponentiation
fn mod_pow(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1u64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result * base) % modulus;
        }
        base = (base * base) % modulus;
        exp >>= 1;
    }
    result
}

/// Modular inverse by Fermat's little theorem; `p` must be prime and
/// `a` nonzero mod p
fn mod_inverse(a: u64, p: u64) -> u64 {
    mod_pow(a, p - 2, p)
}

#[inline]
fn sub_mod(a: u64, b: u64, p: u64) -> u64 {
    (a + p - b) % p
}

impl ModMatrix {
    /// Create a zero matrix mod p
    pub fn zeros(rows: usize, cols: usize, p: u64) -> Self {
        assert!(p >= 2 && p < (1 << 31));
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
            p,
        }
    }

    /// Reduce an integer matrix entrywise mod p
    pub fn reduce(mat: &Matrix<BigInt>, p: u64) -> Self {
        let (m, n) = mat.dims();
        let mut out = Self::zeros(m, n, p);
        for i in 0..m {
            for j in 0..n {
                out.set(i, j, residue(mat.get(i, j), p));
            }
        }
        out
    }

    /// Reduce an m×n integer matrix mod p with an m×m identity block on the
    /// right, giving the m×(n+m) working matrix for augmented elimination
    pub fn reduce_augmented(mat: &Matrix<BigInt>, p: u64) -> Self {
        let (m, n) = mat.dims();
        let mut out = Self::zeros(m, n + m, p);
        for i in 0..m {
            for j in 0..n {
                out.set(i, j, residue(mat.get(i, j), p));
            }
            out.set(i, n + i, 1);
        }
        out
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn modulus(&self) -> u64 {
        self.p
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: u64) {
        self.data[i * self.cols + j] = value;
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Compute the reduced row-echelon form in place, over the full width.
    /// Returns the number of pivot rows.
    pub fn rref(&mut self) -> usize {
        let p = self.p;
        let mut r = 0;
        for c in 0..self.cols {
            if r == self.rows {
                break;
            }
            let pivot = match (r..self.rows).find(|&i| self.get(i, c) != 0) {
                Some(i) => i,
                None => continue,
            };
            self.swap_rows(r, pivot);

            let inv = mod_inverse(self.get(r, c), p);
            for j in c..self.cols {
                let v = (self.get(r, j) * inv) % p;
                self.set(r, j, v);
            }

            for i in 0..self.rows {
                if i == r {
                    continue;
                }
                let factor = self.get(i, c);
                if factor == 0 {
                    continue;
                }
                for j in c..self.cols {
                    let sub = (factor * self.get(r, j)) % p;
                    let v = sub_mod(self.get(i, j), sub, p);
                    self.set(i, j, v);
                }
            }
            r += 1;
        }
        r
    }

    /// Rank counted over the first `n` columns only. On an RREF'd augmented
    /// matrix `[A | I]` this is the rank of `A` mod p: rows whose leading
    /// entry falls inside the identity block do not count.
    pub fn left_rank(&self, n: usize) -> usize {
        let mut rank = 0;
        let mut j = 0;
        for i in 0..self.rows {
            while j < n && self.get(i, j) == 0 {
                j += 1;
            }
            if j == n {
                break;
            }
            rank = i + 1;
            j += 1;
        }
        rank
    }

    /// Pivot / non-pivot column partition of the first `n` columns of an
    /// RREF'd matrix with the given left rank
    pub fn pivot_partition(&self, n: usize, rank: usize) -> PivotPartition {
        let mut pivots = Vec::with_capacity(rank);
        let mut nonpivots = Vec::with_capacity(n - rank);
        let mut j = 0;
        for i in 0..rank {
            while self.get(i, j) == 0 {
                nonpivots.push(j);
                j += 1;
            }
            pivots.push(j);
            j += 1;
        }
        while j < n {
            nonpivots.push(j);
            j += 1;
        }
        PivotPartition { pivots, nonpivots }
    }

    /// Matrix-vector product mod p
    pub fn mul_vec(&self, v: &[u64]) -> Vec<u64> {
        assert_eq!(v.len(), self.cols);
        let p = self.p as u128;
        let mut out = vec![0u64; self.rows];
        for i in 0..self.rows {
            let mut sum = 0u128;
            for j in 0..self.cols {
                sum += self.get(i, j) as u128 * v[j] as u128;
            }
            out[i] = (sum % p) as u64;
        }
        out
    }

    /// Multiply the right block (columns `n..n+rows`, the transformed
    /// identity window of an augmented RREF) by a vector mod p
    pub fn mul_right_block(&self, n: usize, v: &[u64]) -> Vec<u64> {
        assert_eq!(v.len(), self.rows);
        assert_eq!(self.cols, n + self.rows);
        let p = self.p as u128;
        let mut out = vec![0u64; self.rows];
        for i in 0..self.rows {
            let mut sum = 0u128;
            for j in 0..self.rows {
                sum += self.get(i, n + j) as u128 * v[j] as u128;
            }
            out[i] = (sum % p) as u64;
        }
        out
    }

    /// Gauss-Jordan inverse mod p, or None if singular
    pub fn inverse(&self) -> Option<ModMatrix> {
        assert_eq!(self.rows, self.cols);
        let n = self.rows;
        let p = self.p;

        // Work on [A | I]
        let mut aug = ModMatrix::zeros(n, 2 * n, p);
        for i in 0..n {
            for j in 0..n {
                aug.set(i, j, self.get(i, j));
            }
            aug.set(i, n + i, 1);
        }

        for col in 0..n {
            let pivot = (col..n).find(|&row| aug.get(row, col) != 0)?;
            aug.swap_rows(col, pivot);

            let inv = mod_inverse(aug.get(col, col), p);
            for j in 0..2 * n {
                let v = (aug.get(col, j) * inv) % p;
                aug.set(col, j, v);
            }

            for row in 0..n {
                if row == col || aug.get(row, col) == 0 {
                    continue;
                }
                let factor = aug.get(row, col);
                for j in 0..2 * n {
                    let sub = (factor * aug.get(col, j)) % p;
                    let v = sub_mod(aug.get(row, j), sub, p);
                    aug.set(row, j, v);
                }
            }
        }

        let mut out = ModMatrix::zeros(n, n, p);
        for i in 0..n {
            for j in 0..n {
                out.set(i, j, aug.get(i, n + j));
            }
        }
        Some(out)
    }
}
