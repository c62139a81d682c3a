// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Packing of unsigned integers into 32-byte big-endian words, the operand width used by every
//! hash preimage and by the proof payload.

use num_bigint::BigUint;

use crate::error::{VdfError, VdfResult};

/// Size in bytes of a packed word.
pub const WORD_SIZE: usize = 32;

/// Maximum bit length of a value that fits in one word.
pub const WORD_BITS: u64 = 8 * WORD_SIZE as u64;

pub type Word = [u8; WORD_SIZE];

/// Left-pad `value` to a 32-byte big-endian word. Fails if `value >= 2^256`.
pub fn to_word(value: &BigUint) -> VdfResult<Word> {
    if value.bits() > WORD_BITS {
        return Err(VdfError::input(format!(
            "value has {} bits, at most {} fit in a word",
            value.bits(),
            WORD_BITS
        )));
    }
    let mut word = [0u8; WORD_SIZE];
    let bytes = value.to_bytes_be();
    word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Read a big-endian word. Leading zero bytes are allowed.
pub fn from_word(word: &[u8]) -> BigUint {
    BigUint::from_bytes_be(word)
}

/// Parse hex with an optional `0x` prefix.
pub(crate) fn decode_hex(value: &str) -> VdfResult<Vec<u8>> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(digits).map_err(|e| VdfError::input(format!("invalid hex string: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_to_word() {
        let word = to_word(&BigUint::from(1000u32)).unwrap();
        assert_eq!(
            hex::encode(word),
            "00000000000000000000000000000000000000000000000000000000000003e8"
        );
        assert_eq!(to_word(&BigUint::default()).unwrap(), [0u8; WORD_SIZE]);

        let max: BigUint = (BigUint::one() << 256u32) - 1u8;
        assert_eq!(to_word(&max).unwrap(), [0xffu8; WORD_SIZE]);
        assert!(to_word(&(max + 1u8)).is_err());
    }

    #[test]
    fn test_from_word() {
        let value = BigUint::from(0xdeadbeefu32);
        assert_eq!(from_word(&to_word(&value).unwrap()), value);
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0xabcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode_hex("ABCD").unwrap(), vec![0xab, 0xcd]);
        assert!(decode_hex("0xabc").is_err());
        assert!(decode_hex("zz").is_err());
    }
}
