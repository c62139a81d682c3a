// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The proof payload handed to the on-chain verifier: `π ‖ y ‖ blockNumber`, each a 32-byte
//! big-endian word.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::error::{VdfError, VdfResult};
use crate::math::word::{decode_hex, from_word, to_word, WORD_SIZE};

/// Length in bytes of an encoded [VdfProof].
pub const PROOF_LENGTH: usize = 3 * WORD_SIZE;

/// The only artifact a run emits: the Wesolowski proof π, the VDF output y and the number of the
/// block the run was bound to. All three are below 2^256.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfProof {
    proof: BigUint,
    output: BigUint,
    block_number: BigUint,
    encoded: [u8; PROOF_LENGTH],
}

impl VdfProof {
    pub fn new(
        proof: BigUint,
        output: BigUint,
        block_number: impl Into<BigUint>,
    ) -> VdfResult<Self> {
        let block_number = block_number.into();
        let mut encoded = [0u8; PROOF_LENGTH];
        encoded[..WORD_SIZE].copy_from_slice(&to_word(&proof)?);
        encoded[WORD_SIZE..2 * WORD_SIZE].copy_from_slice(&to_word(&output)?);
        encoded[2 * WORD_SIZE..].copy_from_slice(&to_word(&block_number)?);
        Ok(Self {
            proof,
            output,
            block_number,
            encoded,
        })
    }

    pub fn proof(&self) -> &BigUint {
        &self.proof
    }

    pub fn output(&self) -> &BigUint {
        &self.output
    }

    pub fn block_number(&self) -> &BigUint {
        &self.block_number
    }

    /// Serialize as `π ‖ y ‖ blockNumber`, each left-padded to 32 bytes.
    pub fn to_bytes(&self) -> [u8; PROOF_LENGTH] {
        self.encoded
    }

    /// Deserialize a 96-byte payload.
    pub fn from_bytes(bytes: &[u8]) -> VdfResult<Self> {
        if bytes.len() != PROOF_LENGTH {
            return Err(VdfError::input(format!(
                "proof must be {} bytes, got {}",
                PROOF_LENGTH,
                bytes.len()
            )));
        }
        let mut words = bytes.chunks_exact(WORD_SIZE).map(from_word);
        match (words.next(), words.next(), words.next()) {
            (Some(proof), Some(output), Some(block_number)) => {
                Self::new(proof, output, block_number)
            }
            _ => Err(VdfError::input("proof payload is truncated")),
        }
    }

    /// Hex encoding of [VdfProof::to_bytes] with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for VdfProof {
    type Err = VdfError;

    /// Parse a hex encoded payload with an optional `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(&decode_hex(s.trim())?)
    }
}

impl fmt::Display for VdfProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;
    use proptest::prelude::*;

    #[test]
    fn test_encoding_regression() {
        let proof = VdfProof::new(
            BigUint::from_str(
                "40481469454714287785128351332277549711919304452025739939040790070240945719195",
            )
            .unwrap(),
            BigUint::from_str(
                "4181672797817194150923030839299400088055665688197915228688461474477470096091",
            )
            .unwrap(),
            17u64,
        )
        .unwrap();
        let expected = "0x597fb322e7253f6d562bce78b0386372390a82d6b3412b753f466edfe2ad479b093ebe309e462a6e3dc347e1452952748c415f5463bfc15ba00052cebcc39adb0000000000000000000000000000000000000000000000000000000000000011";
        assert_eq!(proof.to_hex(), expected);
        assert_eq!(VdfProof::from_str(expected).unwrap(), proof);
    }

    #[test]
    fn test_invalid_payloads() {
        assert!(VdfProof::from_bytes(&[0u8; PROOF_LENGTH - 1]).is_err());
        assert!(VdfProof::from_bytes(&[0u8; PROOF_LENGTH + 1]).is_err());
        assert!(VdfProof::from_str("0x1234").is_err());
        assert!(VdfProof::from_str("not hex").is_err());

        let too_big: BigUint = BigUint::one() << 256u32;
        assert!(VdfProof::new(too_big, BigUint::one(), 0u64).is_err());
    }

    #[test]
    fn test_max_values() {
        let bytes = [0xffu8; PROOF_LENGTH];
        let proof = VdfProof::from_bytes(&bytes).unwrap();
        assert_eq!(proof.block_number(), &((BigUint::one() << 256u32) - 1u8));
        assert_eq!(proof.to_bytes(), bytes);
    }

    proptest! {
        #[test]
        fn decode_recovers_fields(
            proof in any::<[u8; WORD_SIZE]>(),
            output in any::<[u8; WORD_SIZE]>(),
            block_number in any::<[u8; WORD_SIZE]>(),
        ) {
            let original = VdfProof::new(
                from_word(&proof),
                from_word(&output),
                from_word(&block_number),
            ).unwrap();
            let decoded = VdfProof::from_bytes(&original.to_bytes()).unwrap();
            prop_assert_eq!(decoded.proof(), &from_word(&proof));
            prop_assert_eq!(decoded.output(), &from_word(&output));
            prop_assert_eq!(decoded.block_number(), &from_word(&block_number));
        }
    }
}
