//! Dense matrix storage
//!
//! Row-major dense matrices with fixed dimensions, plus the integer-matrix
//! operations used by the lifting core: matrix-vector products, matrix
//! products, and entry bit-size measurement.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

/// Dense matrix of arbitrary-precision integers
pub type IntegerMatrix = Matrix<BigInt>;

/// Dense matrix of arbitrary-precision rationals, always in lowest terms
pub type RationalMatrix = Matrix<BigRational>;

impl<T> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order)
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Get matrix dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Access element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Mutable access to element at (i, j)
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    /// Overwrite element at (i, j)
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    /// Get a row as a slice
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Swap two rows in place
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Get underlying data as slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<BigInt> {
    /// Create a zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![BigInt::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = BigInt::from(1);
        }
        m
    }

    /// Create a matrix from machine integers (row-major)
    pub fn from_i64(entries: &[i64], rows: usize, cols: usize) -> Self {
        Self::from_flat(
            entries.iter().map(|&x| BigInt::from(x)).collect(),
            rows,
            cols,
        )
    }

    /// Matrix-vector product over the integers
    pub fn mul_vec(&self, v: &[BigInt]) -> Vec<BigInt> {
        assert_eq!(v.len(), self.cols);
        let mut out = vec![BigInt::zero(); self.rows];
        for i in 0..self.rows {
            let mut sum = BigInt::zero();
            for (a, x) in self.row(i).iter().zip(v) {
                if !a.is_zero() && !x.is_zero() {
                    sum += a * x;
                }
            }
            out[i] = sum;
        }
        out
    }

    /// Matrix product over the integers
    pub fn mul(&self, other: &Self) -> Self {
        assert_eq!(self.cols, other.rows);
        let mut out = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    *out.get_mut(i, j) += a * other.get(k, j);
                }
            }
        }
        out
    }

    /// Largest entry magnitude in bits (0 for a zero matrix)
    pub fn max_bits(&self) -> u64 {
        self.data.iter().map(|x| x.bits()).max().unwrap_or(0)
    }

    /// Check whether every entry is zero
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(Zero::is_zero)
    }
}

impl Matrix<BigRational> {
    /// Create a zero rational matrix
    pub fn zeros_rational(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![BigRational::zero(); rows * cols],
            rows,
            cols,
        }
    }
}
