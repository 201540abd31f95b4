//! Completion handles over executor-supplied primitives.
//!
//! The core never runs work itself: an external executor produces a raw
//! [`CompletionPrimitive`], and [`JobFuture`] wraps it with timeout support
//! and failure translation. Handles compare by identity of the wrapped
//! primitive so they can key the registry from either direction.
mod cell;
pub use cell::CompletionCell;

mod run_now;
pub use run_now::{InterruptFlag, RunNowFuture};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BoxError, CoreResult};
use crate::translate::{translate, translate_timeout};

/// Failure vocabulary a completion primitive may report from a wait.
///
/// Closed on purpose: the translator matches it exhaustively, so a new
/// failure kind cannot slip past the taxonomy unmapped.
#[derive(Debug)]
pub enum WaitFailure {
    /// The job body raised an error.
    Failed(BoxError),
    /// The attempt was cancelled before or during execution.
    Cancelled,
    /// The waiting thread was interrupted.
    Interrupted,
    /// The wait deadline elapsed before a terminal state was reached.
    TimedOut,
    /// The primitive forbids blocking waits (synchronous execution).
    Unsupported,
    /// Anything outside the documented vocabulary.
    Unexpected(BoxError),
}

/// Raw completion primitive supplied by an external executor.
///
/// State transitions are owned by the executor; this core only observes
/// `is_done`/`is_cancelled` and forwards cancellation requests. A primitive
/// observed as done or cancelled is terminal and must never report pending
/// again.
pub trait CompletionPrimitive<R>: Send + Sync {
    /// Request cancellation of the attempt.
    ///
    /// Returns `false` if the attempt already completed. Idempotent: a second
    /// call after a successful one returns `false`, never errors.
    fn cancel(&self, interrupt_if_running: bool) -> bool;

    /// Whether the attempt was cancelled.
    fn is_cancelled(&self) -> bool;

    /// Whether the attempt reached a terminal state.
    fn is_done(&self) -> bool;

    /// Block on the primitive's native completion signal.
    fn wait(&self) -> Result<R, WaitFailure>;

    /// As [`CompletionPrimitive::wait`], reporting [`WaitFailure::TimedOut`]
    /// once `timeout` elapses. A timeout is observation only and must leave
    /// the attempt's state untouched.
    fn wait_timeout(&self, timeout: Duration) -> Result<R, WaitFailure>;
}

/// Completion handle for one execution attempt.
///
/// Wraps the executor's primitive together with the job name, routing every
/// wait failure through the translator so callers only ever see
/// [`CoreError`](crate::error::CoreError) kinds.
pub struct JobFuture<R> {
    raw: Arc<dyn CompletionPrimitive<R>>,
    job: Arc<str>,
}

impl<R> JobFuture<R> {
    /// Wrap a raw primitive, attaching the job name used for diagnostics.
    pub fn new(raw: Arc<dyn CompletionPrimitive<R>>, job: &str) -> Self {
        Self {
            raw,
            job: Arc::from(job),
        }
    }

    /// Name of the job this handle belongs to.
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Forward a cancellation request to the primitive.
    ///
    /// Returns `false` if the attempt already completed; calling twice after a
    /// success returns `false` the second time.
    pub fn cancel(&self, interrupt_if_running: bool) -> bool {
        self.raw.cancel(interrupt_if_running)
    }

    /// Whether the attempt was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.raw.is_cancelled()
    }

    /// Whether the attempt reached a terminal state.
    pub fn is_done(&self) -> bool {
        self.raw.is_done()
    }

    /// Block until the attempt reaches a terminal state, then return the
    /// result or the translated error.
    pub fn wait(&self) -> CoreResult<R> {
        self.raw.wait().map_err(|failure| translate(&self.job, failure))
    }

    /// As [`JobFuture::wait`], failing with the timed-out kind once `timeout`
    /// elapses. The timeout does not cancel the job; callers wanting
    /// "timeout implies cancel" compose an explicit [`JobFuture::cancel`]
    /// afterwards.
    pub fn wait_for(&self, timeout: Duration) -> CoreResult<R> {
        self.raw.wait_timeout(timeout).map_err(|failure| match failure {
            WaitFailure::TimedOut => translate_timeout(&self.job, timeout),
            other => translate(&self.job, other),
        })
    }

    fn raw_addr(&self) -> usize {
        Arc::as_ptr(&self.raw) as *const () as usize
    }
}

impl<R> Clone for JobFuture<R> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            job: Arc::clone(&self.job),
        }
    }
}

// Identity is the wrapped primitive, not the wrapper: two handles over the
// same primitive compare equal and hash equal, so either can drive removal.
impl<R> PartialEq for JobFuture<R> {
    fn eq(&self, other: &Self) -> bool {
        self.raw_addr() == other.raw_addr()
    }
}

impl<R> Eq for JobFuture<R> {}

impl<R> Hash for JobFuture<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw_addr().hash(state);
    }
}

impl<R> fmt::Debug for JobFuture<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobFuture")
            .field("job", &self.job)
            .field("done", &self.is_done())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
