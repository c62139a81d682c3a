// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::ops::ShlAssign;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{VdfError, VdfResult};
use crate::math::parameterized_group::{Doubling, ParameterizedGroupElement};
use crate::rsa_group::modulus::RSAModulus;
use crate::rsa_group::RSAGroupElement;
use crate::vdf::{Checkpoint, LoopStage, NoCheckpoint, VDF};
use fiat_shamir::generate_challenge;

pub mod fiat_shamir;

/// An implementation of Wesolowski's VDF construction (https://eprint.iacr.org/2018/623) over the
/// group Z/NZ where the factorization of N is unknown.
///
/// Evaluation and proving are both sequences of `iterations` group operations where each step
/// depends on the previous one, so neither can be parallelized or batched.
#[derive(Clone, Debug)]
pub struct WesolowskisVDF {
    modulus: RSAModulus,
    iterations: u64,
}

impl WesolowskisVDF {
    /// Create a new VDF using the group defined by the given modulus. Evaluating this VDF will
    /// require computing `2^iterations * input` which requires `iterations` group operations.
    pub fn new(modulus: RSAModulus, iterations: u64) -> VdfResult<Self> {
        if iterations == 0 {
            return Err(VdfError::input("the number of iterations must be positive"));
        }
        Ok(Self {
            modulus,
            iterations,
        })
    }

    pub fn modulus(&self) -> &RSAModulus {
        &self.modulus
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Compute `y = x^(2^T) mod N` by `T` sequential squarings, calling `checkpoint` every
    /// `checkpoint.interval()` squarings and after the last one.
    pub fn evaluate_vdf(
        &self,
        input: &RSAGroupElement,
        checkpoint: &mut impl Checkpoint,
    ) -> VdfResult<RSAGroupElement> {
        self.check_in_group(input)?;

        let interval = checkpoint.interval().max(1);
        let mut output = input.clone();
        let mut completed = 0;
        while completed < self.iterations {
            let steps = interval.min(self.iterations - completed);
            output = output.repeated_doubling(steps);
            completed += steps;
            checkpoint.reached(LoopStage::Evaluation, completed, self.iterations)?;
        }
        Ok(output)
    }

    /// Compute the proof `π = x^⌊2^T / c⌋ mod N` for the challenge `c`.
    ///
    /// The quotient is computed one bit at a time by long division of 2^T by c: a remainder `r`
    /// starts at 1, and in each of the `T` steps `2r` is divided by `c`, giving the next quotient
    /// bit and the next remainder. The proof is squared in every step and multiplied by `x`
    /// whenever the quotient bit is set.
    pub fn generate_proof(
        &self,
        input: &RSAGroupElement,
        challenge: &BigUint,
        checkpoint: &mut impl Checkpoint,
    ) -> VdfResult<RSAGroupElement> {
        self.check_in_group(input)?;
        if challenge.is_even() || challenge.is_one() {
            return Err(VdfError::computation(format!(
                "challenge {challenge} is not an odd integer greater than one"
            )));
        }

        let interval = checkpoint.interval().max(1);
        let mut remainder = BigUint::one();
        let mut proof = RSAGroupElement::zero(&self.modulus);
        for i in 1..=self.iterations {
            remainder.shl_assign(1);
            let (bit, next_remainder) = remainder.div_mod_floor(challenge);
            remainder = next_remainder;

            proof = proof.double();
            if bit.is_one() {
                proof = proof + input;
            } else if !bit.is_zero() {
                return Err(VdfError::computation(format!(
                    "quotient digit {bit} at step {i} is not a bit"
                )));
            }

            if i % interval == 0 || i == self.iterations {
                checkpoint.reached(LoopStage::Proving, i, self.iterations)?;
            }
        }

        // After T steps the remainder must be 2^T mod c.
        let expected_remainder =
            BigUint::from(2u8).modpow(&BigUint::from(self.iterations), challenge);
        if remainder != expected_remainder {
            return Err(VdfError::computation(
                "proof remainder does not match 2^T mod c",
            ));
        }
        Ok(proof)
    }

    fn check_in_group(&self, element: &RSAGroupElement) -> VdfResult<()> {
        if element.is_in_group(&self.modulus) {
            Ok(())
        } else {
            Err(VdfError::input(format!(
                "element is not in the group defined by the modulus {}",
                self.modulus
            )))
        }
    }
}

impl VDF for WesolowskisVDF {
    type InputType = RSAGroupElement;
    type OutputType = RSAGroupElement;
    type ProofType = RSAGroupElement;

    fn evaluate(&self, input: &RSAGroupElement) -> VdfResult<(RSAGroupElement, RSAGroupElement)> {
        let output = self.evaluate_vdf(input, &mut NoCheckpoint)?;
        let challenge =
            generate_challenge(input.value(), output.value(), &self.modulus, self.iterations)?;
        let proof = self.generate_proof(input, &challenge, &mut NoCheckpoint)?;
        Ok((output, proof))
    }
}
