// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Errors returned by the VDF pipeline.
//!
//! Inputs are validated before any of the sequential loops start, so malformed trade data or
//! protocol parameters surface as [VdfError::InputEncoding] synchronously. Faults raised while a
//! run is in progress are reported as [VdfError::Computation] and no partial proof is ever
//! returned alongside them.

use thiserror::Error;

pub type VdfResult<T> = Result<T, VdfError>;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VdfError {
    /// An address, quantity, block hash or protocol parameter could not be encoded.
    #[error("Invalid input encoding: {0}")]
    InputEncoding(String),

    /// Unexpected arithmetic fault during evaluation or proof generation.
    #[error("VDF computation failed: {0}")]
    Computation(String),

    /// The run was cancelled by the caller.
    #[error("VDF run was cancelled")]
    Cancelled,

    /// The configuration could not be loaded or is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl VdfError {
    /// Cancellation is requested by the caller and is not a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, VdfError::Cancelled)
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        VdfError::InputEncoding(message.into())
    }

    pub(crate) fn computation(message: impl Into<String>) -> Self {
        VdfError::Computation(message.into())
    }
}
