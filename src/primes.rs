//! Random prime generation
//!
//! Uniform random primes of a requested bit length for the lifting loops.
//! The generator is caller-owned so that a whole top-level solve can be made
//! reproducible from a single seed.

use rand::rngs::StdRng;
use rand::Rng;

/// Largest useful modulus size for the mod-p elimination kernels. Retry
/// logic grows the candidate bit length toward this value and then keeps
/// resampling at the same size.
pub const OPTIMAL_MODULUS_BITS: u32 = 30;

/// Trial-division primality test
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3u64;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Pick a uniform random prime with exactly `bits` bits (2 ≤ bits ≤ 31)
pub fn random_prime(rng: &mut StdRng, bits: u32) -> u64 {
    assert!((2..=31).contains(&bits));
    let lo = 1u64 << (bits - 1);
    let hi = 1u64 << bits;
    loop {
        let candidate = rng.gen_range(lo..hi) | 1;
        if is_prime_u64(candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_is_prime() {
        assert!(is_prime_u64(2));
        assert!(is_prime_u64(101));
        assert!(is_prime_u64(2147483629));
        assert!(!is_prime_u64(0));
        assert!(!is_prime_u64(1));
        assert!(!is_prime_u64(91)); // 7 * 13
    }

    #[test]
    fn test_random_prime_bit_length() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let p = random_prime(&mut rng, 30);
            assert!(p >= 1 << 29 && p < 1 << 30);
            assert!(is_prime_u64(p));
        }
    }

    #[test]
    fn test_random_prime_deterministic() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(random_prime(&mut a, 20), random_prime(&mut b, 20));
    }
}
