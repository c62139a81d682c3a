// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use num_bigint::BigUint;
use num_integer::Integer;
use sha3::{Digest, Keccak256};

use crate::error::VdfResult;
use crate::math::word::{from_word, to_word};
use crate::rsa_group::modulus::RSAModulus;

/// Compute the challenge used in proving and verification. This is a Fiat-Shamir construction
/// making the Wesolowski VDF non-interactive, so it must only be called once the output `y` is
/// known.
///
/// The challenge is `keccak256(x ‖ y ‖ N ‖ T)` with every operand packed as a 32-byte big-endian
/// word, read as a big-endian integer and incremented by one if it is even. Oddness is needed by
/// the proof recurrence. The challenge is not required to be prime as it is in chiavdf, since the
/// on-chain verifier does not check primality.
pub fn generate_challenge(
    x: &BigUint,
    y: &BigUint,
    modulus: &RSAModulus,
    iterations: u64,
) -> VdfResult<BigUint> {
    let mut hasher = Keccak256::new();
    hasher.update(to_word(x)?);
    hasher.update(to_word(y)?);
    hasher.update(to_word(modulus.value())?);
    hasher.update(to_word(&BigUint::from(iterations))?);

    let mut challenge = from_word(&hasher.finalize());
    if challenge.is_even() {
        challenge += 1u8;
    }
    Ok(challenge)
}
