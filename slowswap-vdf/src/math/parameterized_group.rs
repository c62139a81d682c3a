// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::ops::Add;

/// Trait for group elements that can be doubled, i.e. `2 * self` in additive notation. For a
/// multiplicative group such as Z/NZ this is squaring.
pub trait Doubling: Sized {
    /// Compute 2 * self.
    fn double(self) -> Self;

    /// Compute 2^repetitions * self by doubling `repetitions` times in sequence.
    fn repeated_doubling(self, repetitions: u64) -> Self {
        let mut result = self;
        for _ in 0..repetitions {
            result = result.double();
        }
        result
    }
}

/// Trait implemented by elements of an additive group where the group is parameterized, for example
/// by the modulus in case of the group being Z mod N.
pub trait ParameterizedGroupElement:
    Sized + Clone + for<'a> Add<&'a Self, Output = Self> + Eq + Doubling
{
    /// The type of the parameter which uniquely defines this group.
    type ParameterType;

    /// Return an instance of the identity element in this group.
    fn zero(parameter: &Self::ParameterType) -> Self;

    /// Returns true if this is an element of the group defined by `parameter`.
    fn is_in_group(&self, parameter: &Self::ParameterType) -> bool;
}
