//! Exact linear system solving
//!
//! Solves A·X = B over the rationals for integer A and B. Small systems go
//! through fraction-free Gaussian elimination, which produces an integer
//! solution matrix and a shared denominator directly. Larger systems use
//! Dixon's method: invert A modulo one random prime, lift the solution
//! p-adic digit by digit until the modulus passes the Hadamard/Cramer bound,
//! and recover the exact rational entries by balanced reconstruction.
//!
//! Either way the returned solution satisfies A·X = B exactly; the Dixon
//! path re-verifies the product over the rationals before returning and
//! extends precision on the (theoretically impossible, practically cheap to
//! guard) chance that reconstruction produced a wrong candidate.

use crate::matrix::Matrix;
use crate::modular::{residue, ModMatrix};
use crate::nullspace::DixonConfig;
use crate::primes::random_prime;
use crate::reconstruct::{rationalize_div, rationalize_mod_matrix};
use crate::SolveError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use rand::rngs::StdRng;

/// Below this many solution rows the fraction-free direct solver wins over
/// lifting. A tuning constant, not a correctness boundary.
const DIRECT_SOLVE_CUTOFF: usize = 25;

/// Solve A·X = B exactly over the rationals with the default configuration.
///
/// # Arguments
/// * `a` - n×n integer coefficient matrix
/// * `b` - n×k integer right-hand-side matrix
///
/// # Returns
/// The unique rational X with A·X = B, or [`SolveError::NoSolution`] when A
/// is singular over the rationals.
pub fn solve(a: &Matrix<BigInt>, b: &Matrix<BigInt>) -> Result<Matrix<BigRational>, SolveError> {
    solve_with_config(a, b, &DixonConfig::default())
}

/// Solve A·X = B exactly over the rationals
pub fn solve_with_config(
    a: &Matrix<BigInt>,
    b: &Matrix<BigInt>,
    cfg: &DixonConfig,
) -> Result<Matrix<BigRational>, SolveError> {
    check_shapes(a, b)?;

    if a.rows() < DIRECT_SOLVE_CUTOFF {
        let (xz, den) = solve_direct(a, b)?;
        return Ok(rationalize_div(&xz, &den));
    }

    let mut rng = cfg.rng();
    let base = dixon_bound_bits(a, b);
    let mut target = base;
    for _ in 0..=cfg.max_extensions {
        let (xz, modulus) = lift_columns(a, b, target, cfg, &mut rng)?;
        if let Some(xq) = rationalize_mod_matrix(&xz, &modulus) {
            if verify_product(a, &xq, b) {
                return Ok(xq);
            }
        }
        target += (base / 4).max(1);
    }
    Err(SolveError::PrecisionExhausted {
        attempts: cfg.max_extensions + 1,
    })
}

/// Dixon lifting solve: returns an integer matrix X_Z and a modulus M with
/// X_Z ≡ X (mod M) entrywise, where M exceeds the bound needed for the
/// exact rational X to be recovered by balanced reconstruction
pub fn solve_dixon(
    a: &Matrix<BigInt>,
    b: &Matrix<BigInt>,
    cfg: &DixonConfig,
) -> Result<(Matrix<BigInt>, BigInt), SolveError> {
    check_shapes(a, b)?;
    let mut rng = cfg.rng();
    lift_columns(a, b, dixon_bound_bits(a, b), cfg, &mut rng)
}

fn check_shapes(a: &Matrix<BigInt>, b: &Matrix<BigInt>) -> Result<(), SolveError> {
    let (ar, ac) = a.dims();
    let (br, bc) = b.dims();
    if ar == 0 || ac == 0 {
        return Err(SolveError::ShapeMismatch(format!(
            "empty coefficient matrix ({}x{})",
            ar, ac
        )));
    }
    if ar != ac {
        return Err(SolveError::ShapeMismatch(format!(
            "coefficient matrix must be square, got {}x{}",
            ar, ac
        )));
    }
    if br != ar {
        return Err(SolveError::ShapeMismatch(format!(
            "right-hand side has {} rows, expected {} ({} columns)",
            br, ar, bc
        )));
    }
    Ok(())
}

/// Fraction-free (Bareiss) elimination on [A | B], then fraction-free back
/// substitution. Returns den·X as an integer matrix together with the
/// shared denominator den = ±det(A). All intermediate divisions are exact.
fn solve_direct(
    a: &Matrix<BigInt>,
    b: &Matrix<BigInt>,
) -> Result<(Matrix<BigInt>, BigInt), SolveError> {
    let n = a.rows();
    let w = b.cols();

    let mut m = Matrix::zeros(n, n + w);
    for i in 0..n {
        for j in 0..n {
            m.set(i, j, a.get(i, j).clone());
        }
        for j in 0..w {
            m.set(i, n + j, b.get(i, j).clone());
        }
    }

    let mut prev = BigInt::one();
    for k in 0..n {
        let pivot = (k..n)
            .find(|&i| !m.get(i, k).is_zero())
            .ok_or(SolveError::NoSolution)?;
        m.swap_rows(k, pivot);

        for i in k + 1..n {
            for j in k + 1..n + w {
                let t = m.get(k, k) * m.get(i, j) - m.get(i, k) * m.get(k, j);
                m.set(i, j, &t / &prev);
            }
            m.set(i, k, BigInt::zero());
        }
        prev = m.get(k, k).clone();
    }

    // Last pivot of the fraction-free elimination is ±det(A)
    let den = m.get(n - 1, n - 1).clone();

    let mut x = Matrix::zeros(n, w);
    for c in 0..w {
        for i in (0..n).rev() {
            let mut t = &den * m.get(i, n + c);
            for j in i + 1..n {
                t -= m.get(i, j) * x.get(j, c);
            }
            x.set(i, c, &t / m.get(i, i));
        }
    }
    Ok((x, den))
}

/// Bits of lifting modulus needed before balanced reconstruction is
/// guaranteed. Reconstruction bounds numerator and denominator symmetrically
/// by ⌊√(M/2)⌋, so M must exceed 2·max(N, D)² with N, D the Cramer/Hadamard
/// bounds on solution numerators and the common denominator; the numerator
/// bound carries the right-hand-side magnitude, hence `bbits` twice.
fn dixon_bound_bits(a: &Matrix<BigInt>, b: &Matrix<BigInt>) -> u64 {
    let n = a.rows() as f64;
    let abits = a.max_bits().max(1) as f64;
    let bbits = b.max_bits().max(1) as f64;
    (n * n.log2() + (2.0 * n - 1.0) * abits + 2.0 * bbits + 4.0).ceil() as u64
}

/// Lift all right-hand-side columns against A⁻¹ mod p until the modulus
/// passes `bound_bits`
fn lift_columns(
    a: &Matrix<BigInt>,
    b: &Matrix<BigInt>,
    bound_bits: u64,
    cfg: &DixonConfig,
    rng: &mut StdRng,
) -> Result<(Matrix<BigInt>, BigInt), SolveError> {
    let n = a.rows();
    let k = b.cols();

    // Find a prime where A is invertible. A matrix that stays singular for
    // every sampled prime is singular over the rationals: only the finitely
    // many primes dividing det(A) can reduce a nonsingular A to a singular
    // residue matrix.
    let mut resamples = 0;
    let (p, inv) = loop {
        resamples += 1;
        if resamples > cfg.max_resamples {
            return Err(SolveError::NoSolution);
        }
        let p = random_prime(rng, cfg.prime_bits);
        if let Some(inv) = ModMatrix::reduce(a, p).inverse() {
            break (p, inv);
        }
    };
    let p_big = BigInt::from(p);

    let mut x = Matrix::zeros(n, k);
    let mut r: Vec<Vec<BigInt>> = (0..k)
        .map(|c| (0..n).map(|i| b.get(i, c).clone()).collect())
        .collect();
    let mut modulus = BigInt::one();

    while modulus.bits() <= bound_bits {
        for c in 0..k {
            // Next digit: y = A⁻¹ · (r mod p)
            let rmod: Vec<u64> = r[c].iter().map(|v| residue(v, p)).collect();
            let y = inv.mul_vec(&rmod);
            let y_int: Vec<BigInt> = y.iter().map(|&v| BigInt::from(v)).collect();

            // r = (r - A·y) / p, exact since A·y ≡ r (mod p)
            let ay = a.mul_vec(&y_int);
            for i in 0..n {
                let diff = &r[c][i] - &ay[i];
                let (q, rem) = diff.div_rem(&p_big);
                debug_assert!(rem.is_zero());
                r[c][i] = q;

                if y[i] != 0 {
                    *x.get_mut(i, c) += &modulus * &y_int[i];
                }
            }
        }
        modulus *= &p_big;
    }
    Ok((x, modulus))
}

/// Exact check that A·X = B over the rationals
pub(crate) fn verify_product(
    a: &Matrix<BigInt>,
    x: &Matrix<BigRational>,
    b: &Matrix<BigInt>,
) -> bool {
    let n = a.rows();
    let k = x.cols();
    for i in 0..n {
        for c in 0..k {
            let mut sum = BigRational::zero();
            for j in 0..n {
                let aij = a.get(i, j);
                if aij.is_zero() {
                    continue;
                }
                sum += BigRational::from_integer(aij.clone()) * x.get(j, c);
            }
            if sum != BigRational::from_integer(b.get(i, c).clone()) {
                return false;
            }
        }
    }
    true
}
