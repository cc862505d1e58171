//! Async generation coordination.
//!
//! One coordinator per generation family (original edges, feature edges,
//! intersection search). The consumer thread starts a run, a rayon worker
//! computes it, and completion comes back through a single bounded handoff
//! that the consumer polls. Progressive runs additionally stream per-batch
//! increments over an unbounded channel.
//!
//! # Flow
//!
//! ```text
//! Consumer Thread                   Worker (rayon)
//! ┌─────────────────┐
//! │ start(epoch,job)│
//! └────────┬────────┘
//!          │
//!          ▼
//!                                  ┌───────────────┐
//!                                  │ job(ctx)      │
//!                                  │ - set_progress│
//!                                  │ - emit_batch  │
//!                                  │ - cancel poll │
//!                                  └───────┬───────┘
//! ┌─────────────────┐                      │
//! │ drain_batches() │◄── unbounded ────────┤
//! │ poll()          │◄── bounded(1) ───────┘
//! │ - epoch check   │
//! │ - commit result │
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut coordinator: GenerationCoordinator<SegmentBuffer> = GenerationCoordinator::new();
//!
//! // Start (non-blocking) - extraction runs on the rayon pool
//! coordinator.start(epoch, move |_ctx| {
//!     let (buffer, _stats) = extract_edges(&shape, &params);
//!     Ok(buffer)
//! });
//!
//! // Poll each frame
//! if let Some(report) = coordinator.poll() {
//!     if !report.is_stale(current_epoch) {
//!         // Commit report.outcome to cache and scene
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use web_time::Instant;

use crate::constants::CANCEL_WAIT_TIMEOUT_MS;
use crate::error::{EdgeError, Result};
use crate::types::Epoch;

/// Cooperative cancellation token shared between consumer and worker.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
  pub fn new() -> Self {
    Self(Arc::new(AtomicBool::new(false)))
  }

  /// Ask the worker to stop at its next check point.
  pub fn request(&self) {
    self.0.store(true, Ordering::Relaxed);
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::Relaxed)
  }
}

/// Lifecycle of one generation family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GenerationState {
  #[default]
  Idle,
  /// A run was started and its completion has not been polled yet.
  Running,
  /// The last run delivered a result (success or failure).
  Completed,
  /// The last run stopped at a cancellation check.
  Cancelled,
}

/// How a run ended.
#[derive(Debug)]
pub enum GenerationOutcome<R> {
  /// Worker ran to completion and produced a result.
  Completed(R),
  /// Worker observed the cancel flag and stopped early.
  Cancelled,
  /// Worker hit a run-level error.
  Failed(EdgeError),
}

/// Completion package delivered once per run.
#[derive(Debug)]
pub struct GenerationReport<R> {
  /// Epoch captured when the run started.
  pub epoch: Epoch,
  pub outcome: GenerationOutcome<R>,
  /// Worker wall time in microseconds.
  pub elapsed_us: u64,
}

impl<R> GenerationReport<R> {
  /// Whether parameters changed after this run started.
  ///
  /// Stale reports must be discarded on arrival instead of overwriting
  /// results generated under the newer parameters.
  pub fn is_stale(&self, current: Epoch) -> bool {
    self.epoch < current
  }
}

/// Handle the worker job uses to report back while running.
pub struct WorkerContext<B> {
  cancel: CancelFlag,
  progress: Arc<AtomicU32>,
  batches: Sender<B>,
}

impl<B> WorkerContext<B> {
  /// Whether the consumer requested cancellation.
  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// Publish progress, clamped to 0..=100.
  pub fn set_progress(&self, percent: u32) {
    self.progress.store(percent.min(100), Ordering::Relaxed);
  }

  /// Stream one increment to the consumer.
  pub fn emit_batch(&self, batch: B) {
    // Ignore send error (receiver dropped = run abandoned)
    let _ = self.batches.send(batch);
  }
}

/// Non-blocking single-run generation coordinator.
///
/// `R` is the result a run produces; `B` is the per-batch increment type for
/// progressive runs (unit for families that deliver only on completion).
/// At most one run is in flight: `start` while `Running` is refused.
pub struct GenerationCoordinator<R, B = ()> {
  state: GenerationState,
  run_epoch: Epoch,
  progress: Arc<AtomicU32>,
  worker_active: Arc<AtomicBool>,
  cancel: CancelFlag,
  receiver: Option<Receiver<GenerationReport<R>>>,
  batch_rx: Option<Receiver<B>>,
}

impl<R, B> GenerationCoordinator<R, B> {
  pub fn new() -> Self {
    Self {
      state: GenerationState::Idle,
      run_epoch: Epoch::new(),
      progress: Arc::new(AtomicU32::new(0)),
      worker_active: Arc::new(AtomicBool::new(false)),
      cancel: CancelFlag::new(),
      receiver: None,
      batch_rx: None,
    }
  }

  /// State machine value; advances on `start` and on polling a completion.
  pub fn state(&self) -> GenerationState {
    self.state
  }

  /// Whether a run has been started and not yet polled to completion.
  pub fn is_running(&self) -> bool {
    self.state == GenerationState::Running
  }

  /// Worker-side running flag. Clears as soon as the worker finishes, which
  /// can be before the completion report is polled.
  pub fn worker_active(&self) -> bool {
    self.worker_active.load(Ordering::Relaxed)
  }

  /// Worker-side progress percentage, 0 to 100.
  pub fn progress_percent(&self) -> u32 {
    self.progress.load(Ordering::Relaxed)
  }

  /// Epoch the in-flight (or last) run was started under.
  pub fn run_epoch(&self) -> Epoch {
    self.run_epoch
  }

  /// Start a run on the rayon pool.
  ///
  /// Returns `true` if started, `false` if a run is already in flight. The
  /// job's `Ok` return becomes `Completed` unless cancellation was requested
  /// meanwhile, in which case the result is dropped and the run reports
  /// `Cancelled`.
  pub fn start<F>(&mut self, epoch: Epoch, job: F) -> bool
  where
    R: Send + 'static,
    B: Send + 'static,
    F: FnOnce(&WorkerContext<B>) -> Result<R> + Send + 'static,
  {
    if self.is_running() {
      return false;
    }

    let (sender, receiver) = channel::bounded(1);
    let (batch_tx, batch_rx) = channel::unbounded();
    self.receiver = Some(receiver);
    self.batch_rx = Some(batch_rx);
    self.run_epoch = epoch;
    self.state = GenerationState::Running;
    self.cancel = CancelFlag::new();
    self.progress.store(0, Ordering::Relaxed);
    self.worker_active.store(true, Ordering::Relaxed);

    let ctx = WorkerContext {
      cancel: self.cancel.clone(),
      progress: Arc::clone(&self.progress),
      batches: batch_tx,
    };
    let worker_active = Arc::clone(&self.worker_active);

    // Spawn on rayon thread pool
    rayon::spawn(move || {
      let start = Instant::now();
      let result = job(&ctx);
      let outcome = match result {
        Ok(_) if ctx.is_cancelled() => GenerationOutcome::Cancelled,
        Ok(value) => GenerationOutcome::Completed(value),
        Err(EdgeError::Cancelled) => GenerationOutcome::Cancelled,
        Err(err) => GenerationOutcome::Failed(err),
      };
      worker_active.store(false, Ordering::Relaxed);
      // Ignore send error (receiver dropped = run abandoned)
      let _ = sender.send(GenerationReport {
        epoch,
        outcome,
        elapsed_us: start.elapsed().as_micros() as u64,
      });
    });

    true
  }

  /// Poll for the completion report (non-blocking).
  ///
  /// Returns `Some(report)` exactly once per run, `None` while still running.
  pub fn poll(&mut self) -> Option<GenerationReport<R>> {
    let receiver = self.receiver.as_ref()?;

    match receiver.try_recv() {
      Ok(report) => {
        self.receiver = None;
        self.settle(&report.outcome);
        Some(report)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.receiver = None;
        self.state = GenerationState::Idle;
        None
      }
    }
  }

  /// Drain streamed per-batch increments without blocking.
  ///
  /// Batches sent before the completion report stay readable after `poll`
  /// until the next `start` replaces the channel.
  pub fn drain_batches(&mut self) -> Vec<B> {
    let Some(receiver) = self.batch_rx.as_ref() else {
      return Vec::new();
    };
    let mut batches = Vec::new();
    while let Ok(batch) = receiver.try_recv() {
      batches.push(batch);
    }
    batches
  }

  /// Request cooperative cancellation of the in-flight run.
  ///
  /// The worker keeps running until its next cancellation check; the run then
  /// reports `Cancelled` through `poll`. State already committed before the
  /// run started is untouched.
  pub fn cancel(&self) {
    if self.is_running() {
      self.cancel.request();
    }
  }

  /// Request cancellation and block until the worker delivers.
  ///
  /// Returns the final report, `Ok(None)` when nothing was in flight, or
  /// `EdgeError::CancelTimeout` if the worker does not stop in time.
  pub fn cancel_and_wait(&mut self) -> Result<Option<GenerationReport<R>>> {
    if !self.is_running() {
      return Ok(None);
    }
    self.cancel.request();

    let Some(receiver) = self.receiver.as_ref() else {
      return Ok(None);
    };
    match receiver.recv_timeout(Duration::from_millis(CANCEL_WAIT_TIMEOUT_MS)) {
      Ok(report) => {
        self.receiver = None;
        self.settle(&report.outcome);
        Ok(Some(report))
      }
      Err(RecvTimeoutError::Timeout) => Err(EdgeError::CancelTimeout {
        timeout_ms: CANCEL_WAIT_TIMEOUT_MS,
      }),
      Err(RecvTimeoutError::Disconnected) => {
        self.receiver = None;
        self.state = GenerationState::Idle;
        Ok(None)
      }
    }
  }

  fn settle(&mut self, outcome: &GenerationOutcome<R>) {
    self.state = match outcome {
      GenerationOutcome::Cancelled => GenerationState::Cancelled,
      _ => GenerationState::Completed,
    };
  }
}

impl<R, B> Default for GenerationCoordinator<R, B> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;
