// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Derivation of the VDF input from a pending trade and the block it is bound to.
//!
//! The trade parameters are hashed into a 32-byte seed, and the seed is combined with the hash of
//! the sampled block to get the start value `x` in `[0, N)`. Both hashes are Keccak-256 over
//! 32-byte big-endian words, matching what an EVM verifier recomputes with
//! `keccak256(abi.encodePacked(...))`.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use sha3::{Digest, Keccak256};

use crate::error::{VdfError, VdfResult};
use crate::math::word::{decode_hex, from_word, to_word, WORD_BITS};
use crate::rsa_group::modulus::RSAModulus;

/// Length in bytes of an account or token address.
pub const ADDRESS_LENGTH: usize = 20;

/// Length in bytes of a block hash.
pub const BLOCK_HASH_LENGTH: usize = 32;

/// Length in bytes of a seed.
pub const SEED_LENGTH: usize = 32;

pub type Seed = [u8; SEED_LENGTH];

/// A 20-byte account or token address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = VdfError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        bytes.try_into().map(Self).map_err(|_| {
            VdfError::input(format!(
                "address must be {} bytes, got {}",
                ADDRESS_LENGTH,
                bytes.len()
            ))
        })
    }
}

impl FromStr for Address {
    type Err = VdfError;

    /// Parse a hex encoded address with an optional `0x` prefix. Checksum casing is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(decode_hex(s.trim())?.as_slice())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A token amount in base units. Always below 2^256.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Quantity(BigUint);

impl Quantity {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(value: BigUint) -> VdfResult<Self> {
        if value.bits() > WORD_BITS {
            return Err(VdfError::input(format!(
                "quantity {value} does not fit in 256 bits"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Quantity {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl TryFrom<BigInt> for Quantity {
    type Error = VdfError;

    fn try_from(value: BigInt) -> Result<Self, Self::Error> {
        match value.into_parts() {
            (Sign::Minus, magnitude) => Err(VdfError::input(format!(
                "quantity -{magnitude} is negative"
            ))),
            (_, magnitude) => Self::new(magnitude),
        }
    }
}

impl FromStr for Quantity {
    type Err = VdfError;

    /// Parse a decimal quantity. Negative values and values of 2^256 or more are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigInt::from_str(s.trim())
            .map_err(|_| VdfError::input(format!("cannot parse quantity '{s}'")))?;
        Self::try_from(value)
    }
}

/// Direction of a trade together with the amount the trader fixed. The other side of the trade is
/// determined by the pool and enters the seed as zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TradeDirection {
    /// The input amount is exact, the output amount floats.
    ExactInput(Quantity),
    /// The output amount is exact, the input amount floats.
    ExactOutput(Quantity),
}

impl TradeDirection {
    /// Returns `(known_qty_in, known_qty_out)`.
    pub fn known_quantities(&self) -> (Quantity, Quantity) {
        match self {
            TradeDirection::ExactInput(amount) => (amount.clone(), Quantity::zero()),
            TradeDirection::ExactOutput(amount) => (Quantity::zero(), amount.clone()),
        }
    }
}

/// The trade parameters a seed commits to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeDigestInputs {
    pub origin: Address,
    pub path: Vec<Address>,
    pub known_qty_in: Quantity,
    pub known_qty_out: Quantity,
}

impl TradeDigestInputs {
    pub fn new(origin: Address, path: Vec<Address>, direction: &TradeDirection) -> Self {
        let (known_qty_in, known_qty_out) = direction.known_quantities();
        Self {
            origin,
            path,
            known_qty_in,
            known_qty_out,
        }
    }

    /// Build the inputs from unchecked parts, failing if an address is not exactly 20 bytes or a
    /// quantity is negative or does not fit in 256 bits.
    pub fn from_raw<P: AsRef<[u8]>>(
        origin: &[u8],
        path: &[P],
        known_qty_in: BigInt,
        known_qty_out: BigInt,
    ) -> VdfResult<Self> {
        Ok(Self {
            origin: Address::try_from(origin)?,
            path: path
                .iter()
                .map(|hop| Address::try_from(hop.as_ref()))
                .collect::<VdfResult<_>>()?,
            known_qty_in: Quantity::try_from(known_qty_in)?,
            known_qty_out: Quantity::try_from(known_qty_out)?,
        })
    }
}

/// The block a run is bound to, sampled once when the run starts. Whether this is the latest or the
/// previous block is up to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockContext {
    pub hash: [u8; BLOCK_HASH_LENGTH],
    pub number: u64,
}

impl BlockContext {
    pub fn new(hash: [u8; BLOCK_HASH_LENGTH], number: u64) -> Self {
        Self { hash, number }
    }

    /// Build a block context from a hash of unchecked length.
    pub fn from_slice(hash: &[u8], number: u64) -> VdfResult<Self> {
        let hash = hash.try_into().map_err(|_| {
            VdfError::input(format!(
                "block hash must be {} bytes, got {}",
                BLOCK_HASH_LENGTH,
                hash.len()
            ))
        })?;
        Ok(Self { hash, number })
    }

    /// Build a block context from a hex encoded hash with an optional `0x` prefix.
    pub fn from_hex(hash: &str, number: u64) -> VdfResult<Self> {
        Self::from_slice(&decode_hex(hash.trim())?, number)
    }
}

/// Hash the trade parameters into a seed:
/// `keccak256(origin ‖ len(path) ‖ path[0] ‖ … ‖ path[n-1] ‖ known_qty_in ‖ known_qty_out)`, where
/// the path length and the quantities are 32-byte big-endian words and addresses are 20 bytes.
pub fn derive_seed(inputs: &TradeDigestInputs) -> VdfResult<Seed> {
    let mut hasher = Keccak256::new();
    hasher.update(inputs.origin);
    hasher.update(to_word(&BigUint::from(inputs.path.len()))?);
    for hop in &inputs.path {
        hasher.update(hop);
    }
    hasher.update(to_word(inputs.known_qty_in.value())?);
    hasher.update(to_word(inputs.known_qty_out.value())?);
    Ok(hasher.finalize().into())
}

/// Compute the start value `x = keccak256(seed ‖ block_hash) mod N`. The result is in `[0, N)`.
pub fn generate_x(
    modulus: &RSAModulus,
    seed: &Seed,
    block_hash: &[u8; BLOCK_HASH_LENGTH],
) -> BigUint {
    let mut hasher = Keccak256::new();
    hasher.update(seed);
    hasher.update(block_hash);
    modulus.reduce(from_word(&hasher.finalize()))
}
