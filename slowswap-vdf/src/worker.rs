// Copyright (c) 2022, Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Background execution of VDF runs.
//!
//! A [VdfWorker] owns at most one active run. Starting a new run cancels the previous one, and a
//! run's events are only ever delivered to the [RunHandle] returned when it was started, so a
//! handle never observes progress or results from another run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{error, info};

use crate::config::VdfConfig;
use crate::error::{VdfError, VdfResult};
use crate::pipeline::{CancellationToken, Pipeline, PipelineObserver, VdfRequest};
use crate::proof::VdfProof;

const COMPLETE: f64 = 1.0;

/// Identifies a run started by a [VdfWorker]. Ids are assigned in increasing order.
pub type RunId = u64;

/// Notification sent from a running computation to its [RunHandle].
#[derive(Clone, Debug, PartialEq)]
pub enum VdfEvent {
    Progress { run_id: RunId, progress: f64 },
    Ready { run_id: RunId, proof: VdfProof },
    Failed { run_id: RunId, error: VdfError },
    Cancelled { run_id: RunId },
}

impl VdfEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            VdfEvent::Progress { run_id, .. }
            | VdfEvent::Ready { run_id, .. }
            | VdfEvent::Failed { run_id, .. }
            | VdfEvent::Cancelled { run_id } => *run_id,
        }
    }

    /// Returns true for the last event of a run.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VdfEvent::Progress { .. })
    }
}

struct ActiveRun {
    id: RunId,
    cancel: CancellationToken,
    thread: JoinHandle<()>,
}

/// Runs VDF computations on a dedicated thread so the caller is never blocked.
pub struct VdfWorker {
    pipeline: Arc<Pipeline>,
    active: Option<ActiveRun>,
    next_run_id: RunId,
}

impl VdfWorker {
    pub fn new(config: &VdfConfig) -> VdfResult<Self> {
        Ok(Self {
            pipeline: Arc::new(Pipeline::new(config)?),
            active: None,
            next_run_id: 1,
        })
    }

    /// Start computing a proof for the given request, cancelling the active run if there is one.
    pub fn start(&mut self, request: VdfRequest) -> VdfResult<RunHandle> {
        self.cancel();

        let run_id = self.next_run_id;
        self.next_run_id += 1;

        let cancel = CancellationToken::new();
        let (sender, receiver) = crossbeam_channel::unbounded();
        let pipeline = Arc::clone(&self.pipeline);
        let run_cancel = cancel.clone();
        let thread = thread::Builder::new()
            .name(format!("vdf-run-{run_id}"))
            .spawn(move || execute_run(run_id, &pipeline, &request, run_cancel, sender))
            .map_err(|e| VdfError::computation(format!("failed to spawn VDF thread: {e}")))?;

        info!("Started VDF run {}", run_id);
        self.active = Some(ActiveRun {
            id: run_id,
            cancel: cancel.clone(),
            thread,
        });
        Ok(RunHandle::new(run_id, receiver, cancel))
    }

    /// Cancel the active run. The run's thread stops at its next checkpoint and reports
    /// [VdfEvent::Cancelled]. Returns the id of the cancelled run, if any.
    pub fn cancel(&mut self) -> Option<RunId> {
        let run = self.active.take()?;
        if run.thread.is_finished() {
            return None;
        }
        run.cancel.cancel();
        info!("Cancelled VDF run {}", run.id);
        Some(run.id)
    }

    /// The id of the run which is still computing, if any.
    pub fn active_run(&self) -> Option<RunId> {
        self.active
            .as_ref()
            .filter(|run| !run.thread.is_finished())
            .map(|run| run.id)
    }
}

impl Drop for VdfWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Forwards progress to the run's handle. Completion is held back until the run's outcome is
/// known, so it is only delivered together with [VdfEvent::Ready].
struct ChannelObserver {
    run_id: RunId,
    sender: Sender<VdfEvent>,
    cancel: CancellationToken,
}

impl PipelineObserver for ChannelObserver {
    fn on_progress(&mut self, progress: f64) {
        if progress >= COMPLETE {
            return;
        }
        let event = VdfEvent::Progress {
            run_id: self.run_id,
            progress,
        };
        if self.sender.send(event).is_err() {
            // The handle was dropped so nobody can use the result.
            self.cancel.cancel();
        }
    }
}

fn execute_run(
    run_id: RunId,
    pipeline: &Pipeline,
    request: &VdfRequest,
    cancel: CancellationToken,
    sender: Sender<VdfEvent>,
) {
    let mut observer = ChannelObserver {
        run_id,
        sender: sender.clone(),
        cancel: cancel.clone(),
    };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pipeline.run(request, &cancel, &mut observer)
    }));
    deliver(run_id, outcome, &cancel, &sender);
}

/// Send the terminal event of a run, preceded by full progress if the proof is delivered.
fn deliver(
    run_id: RunId,
    outcome: thread::Result<VdfResult<VdfProof>>,
    cancel: &CancellationToken,
    sender: &Sender<VdfEvent>,
) {
    let event = outcome_event(run_id, outcome, cancel);
    match &event {
        VdfEvent::Ready { .. } => {
            let _ = sender.send(VdfEvent::Progress {
                run_id,
                progress: COMPLETE,
            });
        }
        VdfEvent::Failed { error, .. } => error!("VDF run {} failed: {}", run_id, error),
        VdfEvent::Progress { .. } | VdfEvent::Cancelled { .. } => {}
    }
    // Ignored if the handle is gone.
    let _ = sender.send(event);
}

/// The terminal event for a finished run. A proof is never delivered once the run was cancelled.
fn outcome_event(
    run_id: RunId,
    outcome: thread::Result<VdfResult<VdfProof>>,
    cancel: &CancellationToken,
) -> VdfEvent {
    match outcome {
        Ok(Ok(_)) | Ok(Err(VdfError::Cancelled)) if cancel.is_cancelled() => {
            VdfEvent::Cancelled { run_id }
        }
        Ok(Ok(proof)) => VdfEvent::Ready { run_id, proof },
        Ok(Err(VdfError::Cancelled)) => VdfEvent::Cancelled { run_id },
        Ok(Err(error)) => VdfEvent::Failed { run_id, error },
        Err(payload) => VdfEvent::Failed {
            run_id,
            error: VdfError::computation(format!("panic: {}", panic_message(payload.as_ref()))),
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// The caller's view of a single run. Iterating over a handle blocks until the next event and
/// ends after the terminal event.
pub struct RunHandle {
    run_id: RunId,
    events: Receiver<VdfEvent>,
    cancel: CancellationToken,
    progress: f64,
    proof: Option<VdfProof>,
    finished: bool,
}

impl RunHandle {
    fn new(run_id: RunId, events: Receiver<VdfEvent>, cancel: CancellationToken) -> Self {
        Self {
            run_id,
            events,
            cancel,
            progress: 0.0,
            proof: None,
            finished: false,
        }
    }

    pub fn id(&self) -> RunId {
        self.run_id
    }

    /// Request cancellation of this run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The last reported progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// The last reported progress as a whole percentage.
    pub fn progress_percent(&self) -> u8 {
        (self.progress * 100.0).round() as u8
    }

    pub fn is_ready(&self) -> bool {
        self.proof.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn proof(&self) -> Option<&VdfProof> {
        self.proof.as_ref()
    }

    /// Return the next event if one is available without blocking.
    pub fn try_next(&mut self) -> Option<VdfEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => Some(self.observe(event)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.disconnected()),
        }
    }

    /// Block until the run ends and return its proof.
    pub fn wait(mut self) -> VdfResult<VdfProof> {
        for event in self.by_ref() {
            match event {
                VdfEvent::Progress { .. } => continue,
                VdfEvent::Ready { proof, .. } => return Ok(proof),
                VdfEvent::Failed { error, .. } => return Err(error),
                VdfEvent::Cancelled { .. } => return Err(VdfError::Cancelled),
            }
        }
        Err(VdfError::computation("VDF run ended without a result"))
    }

    fn observe(&mut self, event: VdfEvent) -> VdfEvent {
        match &event {
            VdfEvent::Progress { progress, .. } => self.progress = self.progress.max(*progress),
            VdfEvent::Ready { proof, .. } => {
                self.progress = COMPLETE;
                self.proof = Some(proof.clone());
            }
            VdfEvent::Failed { .. } | VdfEvent::Cancelled { .. } => {}
        }
        self.finished = event.is_terminal();
        event
    }

    fn disconnected(&mut self) -> VdfEvent {
        self.finished = true;
        VdfEvent::Failed {
            run_id: self.run_id,
            error: VdfError::computation("VDF thread exited without a result"),
        }
    }
}

impl Iterator for RunHandle {
    type Item = VdfEvent;

    fn next(&mut self) -> Option<VdfEvent> {
        if self.finished {
            return None;
        }
        match self.events.recv() {
            Ok(event) => Some(self.observe(event)),
            Err(_) => Some(self.disconnected()),
        }
    }
}
