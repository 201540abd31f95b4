//! Completion handle for work executed inline on the calling thread.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Thread};
use std::time::Duration;

use super::{CompletionPrimitive, WaitFailure};

/// Cooperative cancellation flag shared between a synchronous job body and its
/// handle.
///
/// The body polls [`InterruptFlag::is_raised`] at its own suspension points;
/// there is no preemptive thread interruption.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether an interrupt was requested for the owning thread.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle for a job that runs inline, on the thread that asked for it.
///
/// Exists so inline work stays cancellable and trackable through the same
/// registry abstraction as pooled work. Cancellation transitions to cancelled
/// exactly once; with `interrupt_if_running` it also raises the shared
/// [`InterruptFlag`] and unparks the owning thread so a parked body observes
/// the flag promptly.
///
/// There is no independent "done" state; the owning thread returns
/// naturally, so `is_done` stays `false`. Blocking waits are rejected up
/// front: the calling thread is the execution thread, and waiting on itself
/// is a guaranteed deadlock.
pub struct RunNowFuture {
    owner: Thread,
    cancelled: AtomicBool,
    interrupt: InterruptFlag,
}

impl RunNowFuture {
    /// Create a handle owned by the current thread.
    pub fn new() -> Self {
        Self {
            owner: thread::current(),
            cancelled: AtomicBool::new(false),
            interrupt: InterruptFlag::new(),
        }
    }

    /// Flag the job body polls to honor cancellation.
    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }
}

impl Default for RunNowFuture {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> CompletionPrimitive<R> for RunNowFuture {
    fn cancel(&self, interrupt_if_running: bool) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        if interrupt_if_running {
            self.interrupt.raise();
            self.owner.unpark();
        }
        true
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn is_done(&self) -> bool {
        false
    }

    fn wait(&self) -> Result<R, WaitFailure> {
        Err(WaitFailure::Unsupported)
    }

    fn wait_timeout(&self, _timeout: Duration) -> Result<R, WaitFailure> {
        Err(WaitFailure::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::future::JobFuture;

    fn primitive(future: &Arc<RunNowFuture>) -> Arc<dyn CompletionPrimitive<()>> {
        Arc::clone(future) as Arc<dyn CompletionPrimitive<()>>
    }

    #[test]
    fn cancel_transitions_exactly_once() {
        let future = RunNowFuture::new();

        assert!(CompletionPrimitive::<()>::cancel(&future, false));
        assert!(!CompletionPrimitive::<()>::cancel(&future, true));
        assert!(CompletionPrimitive::<()>::is_cancelled(&future));
    }

    #[test]
    fn interrupt_flag_raised_only_when_requested() {
        let soft = RunNowFuture::new();
        assert!(CompletionPrimitive::<()>::cancel(&soft, false));
        assert!(!soft.interrupt_flag().is_raised());

        let hard = RunNowFuture::new();
        assert!(CompletionPrimitive::<()>::cancel(&hard, true));
        assert!(hard.interrupt_flag().is_raised());
    }

    #[test]
    fn never_reports_done() {
        let future = RunNowFuture::new();
        assert!(!CompletionPrimitive::<()>::is_done(&future));

        CompletionPrimitive::<()>::cancel(&future, true);
        assert!(!CompletionPrimitive::<()>::is_done(&future));
    }

    #[test]
    fn blocking_waits_fail_loudly() {
        let raw = Arc::new(RunNowFuture::new());
        let future = JobFuture::new(primitive(&raw), "inline");

        match future.wait() {
            Err(CoreError::WaitUnsupported { job }) => assert_eq!(job, "inline"),
            other => panic!("expected WaitUnsupported, got {other:?}"),
        }
        match future.wait_for(Duration::from_secs(1)) {
            Err(CoreError::WaitUnsupported { job }) => assert_eq!(job, "inline"),
            other => panic!("expected WaitUnsupported, got {other:?}"),
        }

        // contract holds regardless of cancellation state
        future.cancel(true);
        assert!(matches!(
            future.wait(),
            Err(CoreError::WaitUnsupported { .. })
        ));
    }
}
