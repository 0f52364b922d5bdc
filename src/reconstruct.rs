//! Rational reconstruction
//!
//! Recovers the unique bounded rational congruent to a residue modulo a
//! lifting modulus M, plus the entrywise helpers that turn an integer
//! matrix/modulus pair (or integer matrix/shared denominator pair) into an
//! exact rational matrix.
//!
//! With both numerator and denominator bounded by ⌊√(M/2)⌋, any residue has
//! at most one admissible rational preimage, so a successful reconstruction
//! at sufficient precision is the exact answer. A failed reconstruction
//! means the lifting modulus is still too small.

use crate::matrix::Matrix;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Reconstruct the unique rational num/den with |num|, den ≤ ⌊√(m/2)⌋,
/// gcd(num, den) = 1 and num ≡ a·den (mod m), or None if no such rational
/// exists
pub fn rational_reconstruct(a: &BigInt, m: &BigInt) -> Option<BigRational> {
    assert!(m.is_positive());
    let bound = (m >> 1u32).sqrt();

    // Half-extended Euclid on (m, a mod m); the invariant r ≡ s·a (mod m)
    // holds throughout, so the first remainder within the numerator bound
    // yields the candidate pair.
    let mut r0 = m.clone();
    let mut r1 = a.mod_floor(m);
    let mut s0 = BigInt::zero();
    let mut s1 = BigInt::one();

    while r1 > bound {
        let q = &r0 / &r1;
        let r2 = &r0 - &q * &r1;
        r0 = r1;
        r1 = r2;
        let s2 = &s0 - &q * &s1;
        s0 = s1;
        s1 = s2;
    }

    let (mut num, mut den) = (r1, s1);
    if den.is_negative() {
        num = -num;
        den = -den;
    }
    if den.is_zero() || den > bound {
        return None;
    }
    if num.gcd(&den) != BigInt::one() {
        return None;
    }
    Some(BigRational::new(num, den))
}

/// Reconstruct a whole vector of residues against a shared modulus;
/// all-or-nothing
pub fn rationalize_mod(entries: &[BigInt], m: &BigInt) -> Option<Vec<BigRational>> {
    entries.iter().map(|e| rational_reconstruct(e, m)).collect()
}

/// Entrywise rational reconstruction of an integer matrix against a lifting
/// modulus, or None if any entry fails
pub fn rationalize_mod_matrix(mat: &Matrix<BigInt>, m: &BigInt) -> Option<Matrix<BigRational>> {
    let (rows, cols) = mat.dims();
    let data: Option<Vec<BigRational>> = mat
        .as_slice()
        .iter()
        .map(|e| rational_reconstruct(e, m))
        .collect();
    Some(Matrix::from_flat(data?, rows, cols))
}

/// Entrywise exact division of an integer matrix by a shared denominator
pub fn rationalize_div(mat: &Matrix<BigInt>, den: &BigInt) -> Matrix<BigRational> {
    let (rows, cols) = mat.dims();
    let data: Vec<BigRational> = mat
        .as_slice()
        .iter()
        .map(|e| BigRational::new(e.clone(), den.clone()))
        .collect();
    Matrix::from_flat(data, rows, cols)
}

/// Scale a rational vector by the least common denominator, giving a
/// primitive integer vector with the same direction
pub fn clear_denominators(entries: &[BigRational]) -> Vec<BigInt> {
    let mut den = BigInt::one();
    for e in entries {
        den = den.lcm(e.denom());
    }
    entries
        .iter()
        .map(|e| e.numer() * (&den / e.denom()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_integer() {
        let m = BigInt::from(1_000_003);
        let r = rational_reconstruct(&BigInt::from(7), &m).unwrap();
        assert_eq!(r, BigRational::from_integer(BigInt::from(7)));
    }

    #[test]
    fn test_reconstruct_half() {
        // inverse of 2 mod 101 is 51, so 51 should come back as 1/2
        let r = rational_reconstruct(&BigInt::from(51), &BigInt::from(101)).unwrap();
        assert_eq!(r, BigRational::new(BigInt::from(1), BigInt::from(2)));
    }

    #[test]
    fn test_reconstruct_negative_fraction() {
        let m = BigInt::from(1_000_003);
        // a = -3/7 mod m
        let inv7 = BigInt::from(7).modpow(&(&m - 2), &m);
        let a = ((&m - BigInt::from(3)) * inv7).mod_floor(&m);
        let r = rational_reconstruct(&a, &m).unwrap();
        assert_eq!(r, BigRational::new(BigInt::from(-3), BigInt::from(7)));
    }

    #[test]
    fn test_reconstruct_bound() {
        // For m = 101 the shared bound is ⌊√(101/2)⌋ = 7: integers up to 7
        // in magnitude come back, 8 has no admissible preimage
        let m = BigInt::from(101);
        assert_eq!(
            rational_reconstruct(&BigInt::from(7), &m).unwrap(),
            BigRational::from_integer(BigInt::from(7))
        );
        assert_eq!(
            rational_reconstruct(&BigInt::from(94), &m).unwrap(),
            BigRational::from_integer(BigInt::from(-7))
        );
        assert!(rational_reconstruct(&BigInt::from(8), &m).is_none());
    }

    #[test]
    fn test_reconstruct_failure() {
        // 2 mod 4 has no bounded representative with coprime parts
        assert!(rational_reconstruct(&BigInt::from(2), &BigInt::from(4)).is_none());
    }

    #[test]
    fn test_reconstruct_large_modulus() {
        // 10^60 + 7 worth of precision easily recovers 355/113
        let m = BigInt::from(10u8).pow(60) + 7;
        let inv = BigInt::from(113).modpow(&(&m - 2), &m);
        let a = (BigInt::from(355) * inv).mod_floor(&m);
        let r = rational_reconstruct(&a, &m).unwrap();
        assert_eq!(r, BigRational::new(BigInt::from(355), BigInt::from(113)));
    }

    #[test]
    fn test_clear_denominators() {
        let v = vec![
            BigRational::new(BigInt::from(1), BigInt::from(2)),
            BigRational::new(BigInt::from(-1), BigInt::from(3)),
            BigRational::from_integer(BigInt::from(2)),
        ];
        let cleared = clear_denominators(&v);
        assert_eq!(
            cleared,
            vec![BigInt::from(3), BigInt::from(-2), BigInt::from(12)]
        );
    }

    #[test]
    fn test_rationalize_div() {
        let m = Matrix::from_i64(&[2, -4, 6, 0], 2, 2);
        let q = rationalize_div(&m, &BigInt::from(4));
        assert_eq!(
            q.get(0, 0),
            &BigRational::new(BigInt::from(1), BigInt::from(2))
        );
        assert_eq!(q.get(0, 1), &BigRational::from_integer(BigInt::from(-1)));
    }
}
