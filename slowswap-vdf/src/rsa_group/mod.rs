// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::ops::Add;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

use crate::math::parameterized_group::{Doubling, ParameterizedGroupElement};
use modulus::RSAModulus;

pub mod modulus;

/// An element of the multiplicative group Z/NZ, written additively: adding two elements
/// multiplies them and doubling squares.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RSAGroupElement {
    value: BigUint,
    modulus: RSAModulus,
}

impl RSAGroupElement {
    /// Create a new group element. The value is reduced modulo `modulus`, so the canonical
    /// representative always lies in `[0, N)`.
    pub fn new(value: BigUint, modulus: RSAModulus) -> Self {
        Self {
            value: modulus.reduce(value),
            modulus,
        }
    }

    /// Return the modulus of this group element.
    pub fn modulus(&self) -> &RSAModulus {
        &self.modulus
    }

    /// Return the canonical representation of this group element.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn into_value(self) -> BigUint {
        self.value
    }
}

impl Add<&Self> for RSAGroupElement {
    type Output = Self;

    fn add(self, rhs: &Self) -> Self::Output {
        assert_eq!(self.modulus, rhs.modulus);
        Self {
            value: (self.value * &rhs.value).mod_floor(self.modulus.value()),
            modulus: self.modulus,
        }
    }
}

impl Doubling for RSAGroupElement {
    fn double(self) -> Self {
        Self {
            value: (&self.value * &self.value).mod_floor(self.modulus.value()),
            modulus: self.modulus,
        }
    }
}

impl ParameterizedGroupElement for RSAGroupElement {
    type ParameterType = RSAModulus;

    fn zero(parameter: &Self::ParameterType) -> Self {
        Self::new(BigUint::one(), parameter.clone())
    }

    fn is_in_group(&self, parameter: &Self::ParameterType) -> bool {
        self.modulus == *parameter
    }
}
