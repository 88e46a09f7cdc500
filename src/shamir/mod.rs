//! Shamir's Secret Sharing over a large prime field.
//!
//! Grounded on `examples/original_source/shamir.py::make_shares` /
//! `interpolate` / `_divmod`, itself adapted (per that file's header
//! comment) from the public-domain `streety/partial-passwords` reference.
//! Unlike byte-wise GF(256) schemes, the secret here is encoded as one
//! big little-endian integer (spec.md §9, "why a big-integer field").

pub mod combos;

use num_bigint::{BigInt, BigUint, ToBigInt};
use num_integer::Integer;
use num_traits::Zero;

use crate::collab::random::RandomSource;
use crate::vault::error::VaultError;

/// Computes `r` such that `den * r ≡ num (mod modulus)`, via the
/// extended Euclidean algorithm, exactly mirroring `shamir.py::_divmod`'s
/// loop (including its use of floor division/modulo on signed values).
fn divmod_mod(num: &BigInt, den: &BigInt, modulus: &BigInt) -> BigInt {
    let mut den = den.clone();
    let mut modulus = modulus.clone();
    let mut x = BigInt::zero();
    let mut last_x = BigInt::from(1);
    let mut y = BigInt::from(1);
    let mut last_y = BigInt::zero();

    while !modulus.is_zero() {
        let (quotient, remainder) = den.div_mod_floor(&modulus);
        den = modulus;
        modulus = remainder;

        let new_x = &last_x - &quotient * &x;
        last_x = x;
        x = new_x;

        let new_y = &last_y - &quotient * &y;
        last_y = y;
        y = new_y;
    }
    num * &last_x
}

/// Lagrange interpolation at `x = 0`, recovering the secret from a set of
/// `(index, value)` shares (1-based indexes, matching the share
/// generation order in [`make_shares`]).
pub fn interpolate(prime: &BigUint, indexes: &[i64], values: &[BigUint]) -> BigUint {
    assert_eq!(indexes.len(), values.len(), "index/value count mismatch");
    let prime_i = prime.to_bigint().expect("prime fits in BigInt");

    let mut nums = Vec::with_capacity(indexes.len());
    let mut dens = Vec::with_capacity(indexes.len());
    for (i, &cur) in indexes.iter().enumerate() {
        let others: Vec<i64> = indexes.iter().enumerate().filter(|&(j, _)| j != i).map(|(_, &v)| v).collect();
        let num_prod = others.iter().fold(BigInt::from(1), |acc, &o| acc * BigInt::from(-o));
        let den_prod = others.iter().fold(BigInt::from(1), |acc, &o| acc * BigInt::from(cur - o));
        nums.push(num_prod);
        dens.push(den_prod);
    }
    let den: BigInt = dens.iter().fold(BigInt::from(1), |acc, d| acc * d);

    let mut total = BigInt::zero();
    for i in 0..indexes.len() {
        let value = values[i].to_bigint().expect("share value fits in BigInt");
        let term = (&nums[i] * &den * &value).mod_floor(&prime_i);
        total += divmod_mod(&term, &dens[i], &prime_i);
    }
    let result = (divmod_mod(&total, &den, &prime_i) + &prime_i).mod_floor(&prime_i);
    result.to_biguint().expect("result is non-negative after mod_floor")
}

/// Samples a uniform value in `[0, bound]` inclusive, matching
/// `shamir.py::randint`'s `secrets.randbelow(num + 1)`.
fn random_below_inclusive(bound: &BigUint, random: &dyn RandomSource) -> BigUint {
    let bytes = bound.to_bytes_le().len().max(1);
    loop {
        let mut sample = random.bytes(bytes);
        // Keep the top byte within range to reduce rejection-loop spins.
        if let Some(last) = sample.last_mut() {
            *last &= 0x7f;
        }
        let candidate = BigUint::from_bytes_le(&sample);
        if candidate <= *bound {
            return candidate;
        }
    }
}

/// Splits `secret` (already little-endian byte encoded) into `shares`
/// shares of `data_len` bytes each, any `minimum` of which reconstruct
/// it, evaluating a degree-`minimum - 1` polynomial at `x = 1..=shares`.
pub fn make_shares(
    minimum: usize,
    shares: usize,
    prime: &BigUint,
    secret: &[u8],
    data_len: usize,
    random: &dyn RandomSource,
) -> Result<Vec<Vec<u8>>, VaultError> {
    if minimum == 0 || minimum > shares {
        return Err(VaultError::Configuration(format!("threshold {minimum} invalid for {shares} shares")));
    }
    let secret_int = BigUint::from_bytes_le(secret);
    if &secret_int >= prime {
        return Err(VaultError::Configuration("secret is not smaller than the Shamir prime".to_owned()));
    }

    let mut poly = vec![secret_int];
    for _ in 0..minimum - 1 {
        poly.push(random_below_inclusive(prime, random));
    }
    poly.reverse();

    let mut out = Vec::with_capacity(shares);
    for index in 0..shares {
        let x = BigUint::from((index + 1) as u64);
        let mut total = BigUint::zero();
        for coeff in &poly {
            total = (&total * &x + coeff) % prime;
        }
        let mut bytes = total.to_bytes_le();
        if bytes.len() > data_len {
            return Err(VaultError::Configuration("share value overflows data_len".to_owned()));
        }
        bytes.resize(data_len, 0);
        out.push(bytes);
    }
    Ok(out)
}

/// Attempts to reconstruct the secret from a subset of shares, given
/// their original 1-based positions.
pub fn reconstruct(prime: &BigUint, positions: &[usize], shares: &[&[u8]], data_len: usize) -> Vec<u8> {
    let indexes: Vec<i64> = positions.iter().map(|&p| p as i64).collect();
    let values: Vec<BigUint> = shares.iter().map(|s| BigUint::from_bytes_le(s)).collect();
    let recovered = interpolate(prime, &indexes, &values);
    let mut bytes = recovered.to_bytes_le();
    bytes.resize(data_len, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::random::OsRandomSource;

    fn small_prime() -> BigUint {
        // 2^127 - 1, a Mersenne prime, plenty bigger than our test secrets.
        BigUint::from(2u32).pow(127) - BigUint::from(1u32)
    }

    #[test]
    fn threshold_shares_reconstruct_the_secret() {
        let prime = small_prime();
        let secret = b"top secret message!";
        let data_len = secret.len() + 8;
        let shares = make_shares(3, 5, &prime, secret, data_len, &OsRandomSource).unwrap();

        let positions = [2usize, 4, 5];
        let picked: Vec<&[u8]> = positions.iter().map(|&p| shares[p - 1].as_slice()).collect();
        let recovered = reconstruct(&prime, &positions, &picked, data_len);
        assert_eq!(&recovered[..secret.len()], secret);
    }

    #[test]
    fn below_threshold_does_not_reconstruct() {
        let prime = small_prime();
        let secret = b"another secret";
        let data_len = secret.len() + 8;
        let shares = make_shares(3, 5, &prime, secret, data_len, &OsRandomSource).unwrap();

        let positions = [1usize, 2];
        let picked: Vec<&[u8]> = positions.iter().map(|&p| shares[p - 1].as_slice()).collect();
        let recovered = reconstruct(&prime, &positions, &picked, data_len);
        assert_ne!(&recovered[..secret.len()], secret.as_slice());
    }

    #[test]
    fn any_three_of_five_shares_agree() {
        let prime = small_prime();
        let secret = b"consistent across subsets";
        let data_len = secret.len() + 8;
        let shares = make_shares(3, 5, &prime, secret, data_len, &OsRandomSource).unwrap();

        let subset_a = [1usize, 2, 3];
        let subset_b = [3usize, 4, 5];
        let picked_a: Vec<&[u8]> = subset_a.iter().map(|&p| shares[p - 1].as_slice()).collect();
        let picked_b: Vec<&[u8]> = subset_b.iter().map(|&p| shares[p - 1].as_slice()).collect();
        let recovered_a = reconstruct(&prime, &subset_a, &picked_a, data_len);
        let recovered_b = reconstruct(&prime, &subset_b, &picked_b, data_len);
        assert_eq!(recovered_a, recovered_b);
    }

    #[test]
    fn rejects_secret_not_smaller_than_prime() {
        let prime = BigUint::from(17u32);
        let secret = 255u8.to_le_bytes();
        assert!(make_shares(2, 3, &prime, &secret, 4, &OsRandomSource).is_err());
    }
}
