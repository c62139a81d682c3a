// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module contains an implementation of a verifiable delay function (VDF), using Wesolowski's
//! construction over the group Z/NZ for an RSA modulus N.

use crate::error::VdfResult;

pub mod wesolowski;

/// This represents a Verifiable Delay Function (VDF) construction.
pub trait VDF {
    /// The type of the input to the VDF.
    type InputType;

    /// The type of the output from the VDF.
    type OutputType;

    /// The type of the proof of correctness for this VDF.
    type ProofType;

    /// Evaluate this VDF and return the output and a proof of correctness.
    fn evaluate(&self, input: &Self::InputType) -> VdfResult<(Self::OutputType, Self::ProofType)>;
}

/// The two sequential loops of a VDF run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStage {
    /// Repeated squaring of the input.
    Evaluation,
    /// Construction of the proof.
    Proving,
}

/// Hook invoked at bounded intervals from inside the sequential loops. Returning an error aborts
/// the loop, which is how cancellation reaches a running computation.
pub trait Checkpoint {
    /// The number of iterations between two calls to [Checkpoint::reached]. Must be positive.
    fn interval(&self) -> u64;

    /// Called after `completed` out of `total` iterations of `stage`, and once more when the loop
    /// finishes.
    fn reached(&mut self, stage: LoopStage, completed: u64, total: u64) -> VdfResult<()>;
}

/// A checkpoint which never interrupts and is only reached at the end of each loop.
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn interval(&self) -> u64 {
        u64::MAX
    }

    fn reached(&mut self, _stage: LoopStage, _completed: u64, _total: u64) -> VdfResult<()> {
        Ok(())
    }
}
