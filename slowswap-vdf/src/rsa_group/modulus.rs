// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Num;
use serde::{Deserialize, Serialize};

use crate::error::{VdfError, VdfResult};
use crate::math::word::WORD_BITS;

/// The public modulus N of the group Z/NZ. Its factorization is assumed to be unknown.
///
/// Group elements, the modulus itself and the challenge are all packed into 32-byte words when
/// hashed and when encoded for the on-chain verifier, so N is limited to 256 bits.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RSAModulus {
    pub(super) value: BigUint,
}

impl RSAModulus {
    /// Create a modulus, rejecting values below 2 or above 256 bits. The modulus is otherwise not
    /// validated, so it is the caller's responsibility to ensure that its factorization is unknown.
    pub fn new(value: BigUint) -> VdfResult<Self> {
        if value < BigUint::from(2u8) {
            return Err(VdfError::input("modulus must be at least 2"));
        }
        if value.bits() > WORD_BITS {
            return Err(VdfError::input(format!(
                "modulus has {} bits, at most {} are supported",
                value.bits(),
                WORD_BITS
            )));
        }
        Ok(Self { value })
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn bits(&self) -> u64 {
        self.value.bits()
    }

    /// Reduce the given value modulo this modulus.
    pub fn reduce(&self, value: BigUint) -> BigUint {
        value.mod_floor(&self.value)
    }
}

impl FromStr for RSAModulus {
    type Err = VdfError;

    /// Parse a modulus from a decimal string, or from a hex string if prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = match s.strip_prefix("0x") {
            Some(digits) => BigUint::from_str_radix(digits, 16),
            None => BigUint::from_str(s),
        }
        .map_err(|_| VdfError::input(format!("cannot parse modulus '{s}'")))?;
        Self::new(value)
    }
}

impl TryFrom<BigUint> for RSAModulus {
    type Error = VdfError;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for RSAModulus {
    type Error = VdfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl From<RSAModulus> for String {
    fn from(modulus: RSAModulus) -> Self {
        modulus.value.to_str_radix(10)
    }
}

impl fmt::Display for RSAModulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

lazy_static! {
    /// 256-bit modulus used by the slowswap router deployments.
    pub static ref DEFAULT_MODULUS: RSAModulus = RSAModulus {
        value: BigUint::from_str(
            "44771746775035800231893057667067514385523709770528832291415080542575843241867"
        )
        .unwrap(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_parse() {
        let decimal = RSAModulus::from_str(
            "44771746775035800231893057667067514385523709770528832291415080542575843241867",
        )
        .unwrap();
        assert_eq!(decimal, *DEFAULT_MODULUS);
        assert_eq!(decimal.bits(), 255);

        let hex = RSAModulus::from_str(&format!("0x{}", DEFAULT_MODULUS.value.to_str_radix(16)))
            .unwrap();
        assert_eq!(hex, decimal);

        assert!(RSAModulus::from_str("not a number").is_err());
        assert!(RSAModulus::from_str("-15").is_err());
    }

    #[test]
    fn test_bounds() {
        assert!(RSAModulus::new(BigUint::default()).is_err());
        assert!(RSAModulus::new(BigUint::one()).is_err());
        assert!(RSAModulus::new(BigUint::from(2u8)).is_ok());

        let max: BigUint = (BigUint::one() << 256u32) - 1u8;
        assert!(RSAModulus::new(max.clone()).is_ok());
        assert!(matches!(
            RSAModulus::new(max + 1u8),
            Err(VdfError::InputEncoding(_))
        ));
    }

    #[test]
    fn test_reduce() {
        let modulus = RSAModulus::new(BigUint::from(15u8)).unwrap();
        assert_eq!(modulus.reduce(BigUint::from(47u8)), BigUint::from(2u8));
        assert_eq!(modulus.reduce(BigUint::from(14u8)), BigUint::from(14u8));
    }

    #[test]
    fn test_string_conversion() {
        let as_string: String = DEFAULT_MODULUS.clone().into();
        assert_eq!(RSAModulus::try_from(as_string).unwrap(), *DEFAULT_MODULUS);
        assert_eq!(DEFAULT_MODULUS.to_string(), DEFAULT_MODULUS.value.to_string());
    }
}
