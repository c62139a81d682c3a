// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Time-lock proofs for delayed swap confirmation.
//!
//! A swap which is not executed immediately has to present a proof that a fixed amount of
//! sequential work was done after the trade was fixed. This crate computes such a proof using
//! Wesolowski's verifiable delay function over Z/NZ:
//!
//! 1. A 32-byte seed is derived from the trade parameters ([seed::derive_seed]).
//! 2. The seed is bound to a recent block to get the start value `x` ([seed::generate_x]).
//! 3. `y = x^(2^T) mod N` is computed by `T` sequential squarings.
//! 4. A challenge `c` is derived from `(x, y, N, T)` by Fiat-Shamir.
//! 5. The proof `π = x^⌊2^T / c⌋ mod N` is computed with another `T` sequential steps.
//! 6. `(π, y, block number)` is encoded as a 96-byte payload ([proof::VdfProof]).
//!
//! [pipeline::Pipeline] runs these steps in order on the current thread and reports progress,
//! while [worker::VdfWorker] runs them in the background and can be cancelled at any time.

pub mod config;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod proof;
pub mod rsa_group;
pub mod seed;
pub mod vdf;
pub mod worker;
