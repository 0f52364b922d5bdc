//! Dixon p-adic lifting for exact nullspace computation
//!
//! Finds an integer basis of the kernel of an integer matrix by working
//! modulo a random prime: the reduced system is solved once by RREF with a
//! free variable pinned to 1, the mod-p solution is lifted digit by digit
//! into an integer approximation, and the exact rational kernel vector is
//! recovered by balanced rational reconstruction. Each accepted vector is
//! re-verified against the original matrix, so the precision estimate and
//! the prime choice are performance hints, never correctness gates.
//!
//! Failure handling is layered:
//! 1. A failed reconstruction or residue check extends the lifting precision
//!    (up to four extensions of roughly a quarter of the initial estimate).
//! 2. Exhausted precision resamples the prime, growing its bit length toward
//!    [`OPTIMAL_MODULUS_BITS`].
//! 3. A hard resample ceiling turns the remaining pathological cases into
//!    [`SolveError::PrecisionExhausted`] instead of looping forever.

use crate::matrix::Matrix;
use crate::modular::{residue, ModMatrix};
use crate::primes::{random_prime, OPTIMAL_MODULUS_BITS};
use crate::reconstruct::{clear_denominators, rationalize_mod};
use crate::SolveError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Configuration for the Dixon lifting loops
#[derive(Debug, Clone)]
pub struct DixonConfig {
    /// Starting bit length for candidate primes
    pub prime_bits: u32,
    /// Initial number of lifting rounds; None picks the heuristic estimate
    /// from [`starting_precision`]
    pub start_precision: Option<usize>,
    /// Maximum precision extensions before resampling the prime
    pub max_extensions: usize,
    /// Maximum prime resamples before giving up with
    /// [`SolveError::PrecisionExhausted`]
    pub max_resamples: usize,
    /// Seed for the prime-selection RNG; None seeds from the OS
    pub seed: Option<u64>,
}

impl Default for DixonConfig {
    fn default() -> Self {
        Self {
            prime_bits: OPTIMAL_MODULUS_BITS,
            start_precision: None,
            max_extensions: 4,
            max_resamples: 40,
            seed: None,
        }
    }
}

impl DixonConfig {
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }
}

/// Counters from a nullspace computation
#[derive(Debug, Clone, Default)]
pub struct NullspaceStats {
    /// Primes sampled across all kernel-vector searches
    pub primes_sampled: usize,
    /// Total p-adic lifting rounds performed
    pub lifting_rounds: usize,
    /// Precision extensions triggered by failed reconstructions
    pub precision_extensions: usize,
}

/// Result of a nullspace computation
#[derive(Debug, Clone)]
pub struct Nullspace {
    /// n×nullity integer matrix whose columns span the kernel exactly
    pub basis: Matrix<BigInt>,
    /// Dimension of the kernel
    pub nullity: usize,
    /// Work counters
    pub stats: NullspaceStats,
}

/// Heuristic initial lifting precision from the matrix dimension and entry
/// bit size (empirically fitted constants), floored at 4 rounds.
///
/// This only tunes how much work happens before the first reconstruction
/// attempt; a poor estimate costs extra rounds or extensions, never
/// correctness.
pub fn starting_precision(n: usize, bits: u64) -> usize {
    let n = n as f64;
    let b = bits as f64;
    let prec =
        -n * n * 0.0001462 + b * n * 0.03176 + b * b * 0.001583 + n * 0.008566 - b * 0.2457
            + 18.66;
    (prec as i64).max(4) as usize
}

/// Search for one exact kernel vector of `mat`.
///
/// Returns the nullity of `mat` modulo the chosen prime together with a
/// verified integer kernel vector (all zeros when the nullity is 0). A
/// nullity of 1 tells the accumulator the vector just found was the last
/// remaining direction.
fn kernel_vector(
    mat: &Matrix<BigInt>,
    start_prec: usize,
    cfg: &DixonConfig,
    rng: &mut StdRng,
    stats: &mut NullspaceStats,
) -> Result<(usize, Vec<BigInt>), SolveError> {
    let (m, n) = mat.dims();
    let mut prime_bits = cfg.prime_bits;
    let mut prec = start_prec;
    let mut resamples = 0;

    loop {
        resamples += 1;
        if resamples > cfg.max_resamples {
            return Err(SolveError::PrecisionExhausted {
                attempts: resamples - 1,
            });
        }
        stats.primes_sampled += 1;

        let p = random_prime(rng, prime_bits);
        let p_big = BigInt::from(p);

        // RREF of [mat | I] mod p; the transformed identity window then maps
        // residuals to pivot-row corrections.
        let mut matmod = ModMatrix::reduce_augmented(mat, p);
        matmod.rref();
        let rank = matmod.left_rank(n);
        let nullity = n - rank;
        if nullity == 0 {
            return Ok((0, vec![BigInt::zero(); n]));
        }
        let part = matmod.pivot_partition(n, rank);
        // Pinning the first free variable to 1 (and the rest to 0) selects
        // the kernel direction being extracted.
        let free = part.nonpivots[0];

        let mut x = vec![BigInt::zero(); n];
        let mut b = vec![BigInt::zero(); m];
        let mut modulus = BigInt::one();
        let mut extensions = 0;
        let mut k = 0;

        'lift: while k < prec {
            stats.lifting_rounds += 1;

            // Solve mat * y = b (mod p) with the free variables pinned
            let bmod: Vec<u64> = b.iter().map(|v| residue(v, p)).collect();
            let tb = matmod.mul_right_block(n, &bmod);
            let mut y = vec![0u64; n];
            for (row, &pc) in part.pivots.iter().enumerate() {
                let c = matmod.get(row, free);
                y[pc] = (tb[row] + p - c) % p;
            }
            y[free] = 1;

            // Advance the residual: b = (b - mat*y) / p. The division is
            // exact for well-chosen primes; an inexact division means the
            // reduced system was inconsistent, so resample instead of
            // propagating a truncated value.
            let y_int: Vec<BigInt> = y.iter().map(|&v| BigInt::from(v)).collect();
            let maty = mat.mul_vec(&y_int);
            for i in 0..m {
                let diff = &b[i] - &maty[i];
                let (q, r) = diff.div_rem(&p_big);
                if !r.is_zero() {
                    break 'lift;
                }
                b[i] = q;
            }

            // Fold the new digit into the running solution
            for i in 0..n {
                if y[i] != 0 {
                    x[i] += &modulus * &y_int[i];
                }
            }
            modulus *= &p_big;

            if k == prec - 1 {
                for xi in x.iter_mut() {
                    *xi = xi.mod_floor(&modulus);
                }
                if let Some(xq) = rationalize_mod(&x, &modulus) {
                    let candidate = clear_denominators(&xq);
                    if mat.mul_vec(&candidate).iter().all(Zero::is_zero) {
                        return Ok((nullity, candidate));
                    }
                }
                if extensions < cfg.max_extensions {
                    extensions += 1;
                    stats.precision_extensions += 1;
                    prec += (start_prec / 4).max(1);
                }
            }
            k += 1;
        }

        // Ran out of precision with this prime; try a larger one unless
        // already at the optimal size.
        if prime_bits < OPTIMAL_MODULUS_BITS {
            prime_bits += 1;
        }
    }
}

/// Compute an exact integer basis of the kernel of `mat` with the default
/// configuration
pub fn nullspace(mat: &Matrix<BigInt>) -> Result<Nullspace, SolveError> {
    nullspace_with_config(mat, &DixonConfig::default())
}

/// Compute an exact integer basis of the kernel of `mat`.
///
/// Kernel vectors are found one at a time; each discovered vector is
/// appended as an extra constraint row of the working matrix so later
/// searches cannot rediscover the same direction.
///
/// # Returns
/// The basis as an n×nullity matrix whose columns all satisfy
/// `mat * v = 0` exactly and are linearly independent over the rationals.
pub fn nullspace_with_config(
    mat: &Matrix<BigInt>,
    cfg: &DixonConfig,
) -> Result<Nullspace, SolveError> {
    let (m, n) = mat.dims();
    if m == 0 || n == 0 {
        return Err(SolveError::ShapeMismatch(format!(
            "nullspace of an empty {}x{} matrix",
            m, n
        )));
    }

    let start_prec = cfg
        .start_precision
        .unwrap_or_else(|| starting_precision(m.max(n), mat.max_bits()));
    let mut rng = cfg.rng();
    let mut stats = NullspaceStats::default();

    // Working matrix: the original on top, room below for one constraint row
    // per possible kernel vector.
    let mut work = Matrix::zeros(m + n, n);
    for i in 0..m {
        for j in 0..n {
            work.set(i, j, mat.get(i, j).clone());
        }
    }

    let mut columns: Vec<Vec<BigInt>> = Vec::new();
    loop {
        let (out, x) = kernel_vector(&work, start_prec, cfg, &mut rng, &mut stats)?;
        if out == 0 {
            break;
        }
        for j in 0..n {
            work.set(m + columns.len(), j, x[j].clone());
        }
        columns.push(x);
        // out == 1 means the remaining kernel was one-dimensional, so the
        // vector just found completes the basis.
        if out == 1 || columns.len() == n {
            break;
        }
    }

    let nullity = columns.len();
    let mut basis = Matrix::zeros(n, nullity);
    for (c, v) in columns.iter().enumerate() {
        for (i, entry) in v.iter().enumerate() {
            basis.set(i, c, entry.clone());
        }
    }
    Ok(Nullspace {
        basis,
        nullity,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;

    /// Rank over the rationals by plain Gaussian elimination; independent of
    /// the lifting machinery.
    fn rational_rank(mat: &Matrix<BigInt>) -> usize {
        let (m, n) = mat.dims();
        let mut a: Vec<Vec<BigRational>> = (0..m)
            .map(|i| {
                (0..n)
                    .map(|j| BigRational::from_integer(mat.get(i, j).clone()))
                    .collect()
            })
            .collect();
        let mut rank = 0;
        for c in 0..n {
            let pivot = (rank..m).find(|&i| !a[i][c].is_zero());
            let Some(pivot) = pivot else { continue };
            a.swap(rank, pivot);
            let inv = a[rank][c].recip();
            for j in c..n {
                a[rank][j] = &a[rank][j] * &inv;
            }
            for i in 0..m {
                if i == rank || a[i][c].is_zero() {
                    continue;
                }
                let f = a[i][c].clone();
                for j in c..n {
                    a[i][j] = &a[i][j] - &f * &a[rank][j];
                }
            }
            rank += 1;
        }
        rank
    }

    fn assert_in_kernel(mat: &Matrix<BigInt>, basis: &Matrix<BigInt>) {
        let (n, nullity) = basis.dims();
        assert_eq!(n, mat.cols());
        for c in 0..nullity {
            let v: Vec<BigInt> = (0..n).map(|i| basis.get(i, c).clone()).collect();
            assert!(v.iter().any(|e| !e.is_zero()), "zero basis column");
            assert!(
                mat.mul_vec(&v).iter().all(num_traits::Zero::is_zero),
                "column {} is not in the kernel",
                c
            );
        }
    }

    fn seeded() -> DixonConfig {
        DixonConfig {
            seed: Some(7),
            ..DixonConfig::default()
        }
    }

    #[test]
    fn test_rank_one_matrix() {
        // [[1, 2, 3], [2, 4, 6]] has rank 1, so a 2-dimensional kernel
        // spanning {(2, -1, 0), (3, 0, -1)} up to basis choice
        let a = Matrix::from_i64(&[1, 2, 3, 2, 4, 6], 2, 3);
        let ns = nullspace_with_config(&a, &seeded()).unwrap();

        assert_eq!(ns.nullity, 2);
        assert_in_kernel(&a, &ns.basis);
        assert_eq!(rational_rank(&ns.basis), 2);
    }

    #[test]
    fn test_identity_has_trivial_kernel() {
        let a = Matrix::identity(4);
        let ns = nullspace_with_config(&a, &seeded()).unwrap();
        assert_eq!(ns.nullity, 0);
        assert_eq!(ns.basis.dims(), (4, 0));
    }

    #[test]
    fn test_full_rank_square() {
        let a = Matrix::from_i64(&[2, 1, 1, 3], 2, 2);
        let ns = nullspace_with_config(&a, &seeded()).unwrap();
        assert_eq!(ns.nullity, 0);
    }

    #[test]
    fn test_one_by_one_zero() {
        let a = Matrix::zeros(1, 1);
        let ns = nullspace_with_config(&a, &seeded()).unwrap();
        assert_eq!(ns.nullity, 1);
        assert!(!ns.basis.get(0, 0).is_zero());
    }

    #[test]
    fn test_zero_matrix_full_kernel() {
        let a = Matrix::zeros(3, 3);
        let ns = nullspace_with_config(&a, &seeded()).unwrap();
        assert_eq!(ns.nullity, 3);
        assert_in_kernel(&a, &ns.basis);
        assert_eq!(rational_rank(&ns.basis), 3);
    }

    #[test]
    fn test_wide_matrix() {
        // Third row is the sum of the first two: rank 2, nullity 3
        let a = Matrix::from_i64(
            &[
                1, 0, 1, 0, 1, //
                0, 1, 0, 1, 0, //
                1, 1, 1, 1, 1,
            ],
            3,
            5,
        );
        let ns = nullspace_with_config(&a, &seeded()).unwrap();
        assert_eq!(ns.nullity, 3);
        assert_in_kernel(&a, &ns.basis);
        assert_eq!(rational_rank(&ns.basis), 3);
        assert_eq!(rational_rank(&a), 5 - ns.nullity);
    }

    #[test]
    fn test_tall_matrix() {
        // 4x2 of rank 1
        let a = Matrix::from_i64(&[1, 2, 2, 4, 3, 6, 4, 8], 4, 2);
        let ns = nullspace_with_config(&a, &seeded()).unwrap();
        assert_eq!(ns.nullity, 1);
        assert_in_kernel(&a, &ns.basis);
    }

    #[test]
    fn test_same_subspace_across_seeds() {
        let a = Matrix::from_i64(&[1, 2, 3, 2, 4, 6], 2, 3);
        let cfg_a = DixonConfig {
            seed: Some(1),
            ..DixonConfig::default()
        };
        let cfg_b = DixonConfig {
            seed: Some(2),
            ..DixonConfig::default()
        };
        let ns_a = nullspace_with_config(&a, &cfg_a).unwrap();
        let ns_b = nullspace_with_config(&a, &cfg_b).unwrap();
        assert_eq!(ns_a.nullity, ns_b.nullity);
        assert_in_kernel(&a, &ns_a.basis);
        assert_in_kernel(&a, &ns_b.basis);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let a = Matrix::zeros(0, 3);
        assert!(matches!(
            nullspace(&a),
            Err(crate::SolveError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_huge_entries() {
        // Rank-1 matrix with ~300-digit entries: kernel is spanned by
        // (b, -a) / gcd(a, b), forcing genuinely multi-round lifting
        let a_entry: BigInt = BigInt::from(10).pow(300u32) + 7;
        let b_entry: BigInt = BigInt::from(10).pow(299u32) + 39;
        let mat = Matrix::from_flat(
            vec![
                a_entry.clone(),
                b_entry.clone(),
                &a_entry * 2,
                &b_entry * 2,
            ],
            2,
            2,
        );
        let ns = nullspace_with_config(&mat, &seeded()).unwrap();
        assert_eq!(ns.nullity, 1);
        assert_in_kernel(&mat, &ns.basis);
    }

    #[test]
    fn test_starting_precision_floor() {
        // Large dimension with tiny entries drives the fit negative
        assert_eq!(starting_precision(1000, 1), 4);
        assert!(starting_precision(2, 1) >= 4);
        assert!(starting_precision(10, 5000) > 100);
    }
}
