// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sequencing of a single VDF run: seed, start value, evaluation, challenge and proof.
//!
//! A run moves through the states `Idle → SeedDerived → StartValueDerived → Evaluating →
//! ChallengeDerived → Proving → Ready` without skipping any of them, or ends in `Failed` from any
//! non-terminal state. A cancelled run simply stops; it is never resumed.
//!
//! Progress is reported as a non-decreasing fraction in `[0, 1]`. The two sequential loops take
//! almost all of the time and each covers roughly half of the range; `1.0` is only reported when
//! the proof is ready.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::config::VdfConfig;
use crate::error::{VdfError, VdfResult};
use crate::proof::VdfProof;
use crate::rsa_group::RSAGroupElement;
use crate::seed::{derive_seed, generate_x, BlockContext, TradeDigestInputs};
use crate::vdf::wesolowski::fiat_shamir::generate_challenge;
use crate::vdf::wesolowski::WesolowskisVDF;
use crate::vdf::{Checkpoint, LoopStage};

/// Progress once the start value is known.
pub const START_VALUE_PROGRESS: f64 = 0.01;

/// Progress at the end of the evaluation loop.
pub const EVALUATION_PROGRESS: f64 = 0.49;

/// Progress once the challenge is known.
pub const CHALLENGE_PROGRESS: f64 = 0.5;

/// Progress at the end of the proving loop.
pub const PROVING_PROGRESS: f64 = 0.99;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    SeedDerived,
    StartValueDerived,
    Evaluating,
    ChallengeDerived,
    Proving,
    Ready(VdfProof),
    Failed(VdfError),
}

impl PipelineState {
    /// Position in the success path, or `None` for `Failed`.
    fn position(&self) -> Option<usize> {
        match self {
            PipelineState::Idle => Some(0),
            PipelineState::SeedDerived => Some(1),
            PipelineState::StartValueDerived => Some(2),
            PipelineState::Evaluating => Some(3),
            PipelineState::ChallengeDerived => Some(4),
            PipelineState::Proving => Some(5),
            PipelineState::Ready(_) => Some(6),
            PipelineState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Ready(_) | PipelineState::Failed(_))
    }

    /// Returns true if a run in this state may move to `next`.
    pub fn can_advance_to(&self, next: &PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.position(), next.position()) {
            (_, None) => true,
            (Some(current), Some(next)) => next == current + 1,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::SeedDerived => write!(f, "seed derived"),
            PipelineState::StartValueDerived => write!(f, "start value derived"),
            PipelineState::Evaluating => write!(f, "evaluating"),
            PipelineState::ChallengeDerived => write!(f, "challenge derived"),
            PipelineState::Proving => write!(f, "proving"),
            PipelineState::Ready(_) => write!(f, "ready"),
            PipelineState::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Shared flag used to cancel a run from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns [VdfError::Cancelled] once [CancellationToken::cancel] has been called.
    pub fn check(&self) -> VdfResult<()> {
        if self.is_cancelled() {
            Err(VdfError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Receives the state transitions and progress updates of a run.
pub trait PipelineObserver {
    fn on_state(&mut self, _state: &PipelineState) {}

    fn on_progress(&mut self, _progress: f64) {}
}

impl PipelineObserver for () {}

/// The inputs of one run which change from one swap confirmation attempt to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VdfRequest {
    pub trade: TradeDigestInputs,
    pub block: BlockContext,
}

/// Runs the full proof generation for requests against fixed protocol constants.
#[derive(Clone, Debug)]
pub struct Pipeline {
    vdf: WesolowskisVDF,
    checkpoint_interval: u64,
}

impl Pipeline {
    pub fn new(config: &VdfConfig) -> VdfResult<Self> {
        config.validate()?;
        Ok(Self {
            vdf: WesolowskisVDF::new(config.modulus.clone(), config.iterations)?,
            checkpoint_interval: config.checkpoint_interval,
        })
    }

    pub fn vdf(&self) -> &WesolowskisVDF {
        &self.vdf
    }

    /// Run the pipeline to completion on the current thread. The cancellation token is checked
    /// between stages and at every checkpoint of the two sequential loops.
    pub fn run(
        &self,
        request: &VdfRequest,
        cancel: &CancellationToken,
        observer: &mut impl PipelineObserver,
    ) -> VdfResult<VdfProof> {
        let mut run = Run {
            state: PipelineState::Idle,
            progress: 0.0,
            interval: self.checkpoint_interval,
            cancel,
            observer,
        };
        match self.execute(request, &mut run) {
            Ok(proof) => Ok(proof),
            Err(VdfError::Cancelled) => {
                info!("VDF run cancelled while {}", run.state);
                Err(VdfError::Cancelled)
            }
            Err(error) => {
                warn!("VDF run failed while {}: {}", run.state, error);
                run.fail(error.clone());
                Err(error)
            }
        }
    }

    fn execute<O: PipelineObserver>(
        &self,
        request: &VdfRequest,
        run: &mut Run<'_, O>,
    ) -> VdfResult<VdfProof> {
        let modulus = self.vdf.modulus();
        let iterations = self.vdf.iterations();

        run.cancel.check()?;
        let seed = derive_seed(&request.trade)?;
        run.advance(PipelineState::SeedDerived)?;

        let x = generate_x(modulus, &seed, &request.block.hash);
        debug!(
            "VDF start value {} for block {}, seed {}",
            x,
            request.block.number,
            hex::encode(seed)
        );
        let input = RSAGroupElement::new(x, modulus.clone());
        run.advance(PipelineState::StartValueDerived)?;
        run.report(START_VALUE_PROGRESS);

        run.cancel.check()?;
        run.advance(PipelineState::Evaluating)?;
        debug!("Evaluating VDF with {} iterations", iterations);
        let output = self.vdf.evaluate_vdf(&input, &mut *run)?;

        run.cancel.check()?;
        let challenge = generate_challenge(input.value(), output.value(), modulus, iterations)?;
        debug!("VDF challenge {:x}", challenge);
        run.advance(PipelineState::ChallengeDerived)?;
        run.report(CHALLENGE_PROGRESS);

        run.advance(PipelineState::Proving)?;
        let proof = self.vdf.generate_proof(&input, &challenge, &mut *run)?;
        let proof = VdfProof::new(
            proof.into_value(),
            output.into_value(),
            request.block.number,
        )?;

        run.cancel.check()?;
        run.advance(PipelineState::Ready(proof.clone()))?;
        run.report(1.0);
        info!("VDF proof ready for block {}", request.block.number);
        Ok(proof)
    }
}

/// State of a run in progress.
struct Run<'a, O> {
    state: PipelineState,
    progress: f64,
    interval: u64,
    cancel: &'a CancellationToken,
    observer: &'a mut O,
}

impl<O: PipelineObserver> Run<'_, O> {
    fn advance(&mut self, next: PipelineState) -> VdfResult<()> {
        if !self.state.can_advance_to(&next) {
            return Err(VdfError::computation(format!(
                "invalid transition from {} to {}",
                self.state, next
            )));
        }
        self.state = next;
        self.observer.on_state(&self.state);
        Ok(())
    }

    fn report(&mut self, progress: f64) {
        self.progress = progress.clamp(self.progress, 1.0);
        self.observer.on_progress(self.progress);
    }

    fn fail(&mut self, error: VdfError) {
        if !self.state.is_terminal() {
            self.state = PipelineState::Failed(error);
            self.observer.on_state(&self.state);
        }
    }
}

impl<O: PipelineObserver> Checkpoint for Run<'_, O> {
    fn interval(&self) -> u64 {
        self.interval
    }

    fn reached(&mut self, stage: LoopStage, completed: u64, total: u64) -> VdfResult<()> {
        self.cancel.check()?;
        let fraction = completed as f64 / total as f64;
        let (start, end) = match stage {
            LoopStage::Evaluation => (START_VALUE_PROGRESS, EVALUATION_PROGRESS),
            LoopStage::Proving => (CHALLENGE_PROGRESS, PROVING_PROGRESS),
        };
        trace!("{:?} checkpoint {}/{}", stage, completed, total);
        self.report(start + (end - start) * fraction);
        Ok(())
    }
}
