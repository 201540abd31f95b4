//! One-shot, multi-waiter completion primitive for executor adapters.
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{CompletionPrimitive, WaitFailure};

enum CellState<R> {
    Pending,
    Complete(R),
    Failed(String),
    Cancelled,
}

/// In-process completion primitive backed by `Mutex` + `Condvar`.
///
/// Executor adapters hand one of these back from a submit callback and settle
/// it from the worker thread: [`CompletionCell::complete`] or
/// [`CompletionCell::fail`] once the body finishes, first writer wins.
/// Cancellation before completion is terminal and wakes all waiters. Waits
/// block on the condvar, never busy-poll, and a timed wait that expires
/// leaves the cell untouched.
///
/// Pool semantics apply: `is_done` reports any terminal state, including
/// cancellation.
pub struct CompletionCell<R> {
    state: Mutex<CellState<R>>,
    done: Condvar,
}

impl<R: Clone + Send + Sync> CompletionCell<R> {
    /// Create a pending cell.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CellState::Pending),
            done: Condvar::new(),
        }
    }

    /// Settle the cell with a value. Returns `false` if already terminal.
    pub fn complete(&self, value: R) -> bool {
        let mut state = self.lock();
        match *state {
            CellState::Pending => {
                *state = CellState::Complete(value);
                self.done.notify_all();
                true
            }
            _ => false,
        }
    }

    /// Settle the cell with a failure message. Returns `false` if already terminal.
    pub fn fail<M: Into<String>>(&self, message: M) -> bool {
        let mut state = self.lock();
        match *state {
            CellState::Pending => {
                *state = CellState::Failed(message.into());
                self.done.notify_all();
                true
            }
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outcome(state: &CellState<R>) -> Result<R, WaitFailure> {
        match state {
            CellState::Complete(value) => Ok(value.clone()),
            CellState::Failed(message) => Err(WaitFailure::Failed(message.clone().into())),
            CellState::Cancelled => Err(WaitFailure::Cancelled),
            CellState::Pending => Err(WaitFailure::Unexpected(
                "wait returned while still pending".into(),
            )),
        }
    }
}

impl<R: Clone + Send + Sync> Default for CompletionCell<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Clone + Send + Sync> CompletionPrimitive<R> for CompletionCell<R> {
    fn cancel(&self, _interrupt_if_running: bool) -> bool {
        let mut state = self.lock();
        match *state {
            CellState::Pending => {
                *state = CellState::Cancelled;
                self.done.notify_all();
                true
            }
            _ => false,
        }
    }

    fn is_cancelled(&self) -> bool {
        matches!(*self.lock(), CellState::Cancelled)
    }

    fn is_done(&self) -> bool {
        !matches!(*self.lock(), CellState::Pending)
    }

    fn wait(&self) -> Result<R, WaitFailure> {
        let mut state = self.lock();
        while matches!(*state, CellState::Pending) {
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Self::outcome(&state)
    }

    fn wait_timeout(&self, timeout: Duration) -> Result<R, WaitFailure> {
        let state = self.lock();
        let (state, result) = self
            .done
            .wait_timeout_while(state, timeout, |s| matches!(*s, CellState::Pending))
            .unwrap_or_else(PoisonError::into_inner);

        if result.timed_out() && matches!(*state, CellState::Pending) {
            return Err(WaitFailure::TimedOut);
        }
        Self::outcome(&state)
    }
}
