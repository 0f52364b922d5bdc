//! Exact rational linear algebra via Dixon p-adic lifting
//!
//! Solves integer linear systems and computes integer nullspace bases with
//! exact rational results: no floating point anywhere, entries of any size.
//!
//! # Overview
//!
//! Problems are reduced modulo a random machine-word prime, solved cheaply
//! over the finite field by Gaussian elimination, then lifted digit by digit
//! into a high-precision integer approximation from which the exact rational
//! answer is recovered by balanced rational reconstruction. Every candidate
//! answer is re-verified against the original integer matrix before it is
//! returned, so prime choice and precision estimates only affect speed.
//!
//! # Key Components
//!
//! - [`matrix`] - Dense integer and rational matrices
//! - [`modular`] - Finite-field matrices, RREF, and inversion
//! - [`primes`] - Random prime generation
//! - [`reconstruct`] - Balanced rational reconstruction
//! - [`nullspace`] - Kernel basis computation by p-adic lifting
//! - [`solve`] - Exact A·X = B solving (direct or Dixon, by size)

use std::fmt;

pub mod matrix;
pub mod modular;
pub mod nullspace;
pub mod primes;
pub mod reconstruct;
pub mod solve;

pub use matrix::{IntegerMatrix, Matrix, RationalMatrix};
pub use modular::{ModMatrix, PivotPartition};
pub use nullspace::{
    nullspace, nullspace_with_config, starting_precision, DixonConfig, Nullspace, NullspaceStats,
};
pub use primes::{random_prime, OPTIMAL_MODULUS_BITS};
pub use reconstruct::rational_reconstruct;
pub use solve::{solve, solve_dixon, solve_with_config};

/// Errors from the exact solvers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The coefficient matrix is singular over the rationals
    NoSolution,
    /// Empty or incompatible matrix dimensions
    ShapeMismatch(String),
    /// The retry ceiling was hit without a verified answer
    PrecisionExhausted { attempts: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::NoSolution => write!(f, "matrix is singular over the rationals"),
            SolveError::ShapeMismatch(detail) => write!(f, "shape mismatch: {}", detail),
            SolveError::PrecisionExhausted { attempts } => {
                write!(f, "no verified answer after {} retries", attempts)
            }
        }
    }
}

impl std::error::Error for SolveError {}
