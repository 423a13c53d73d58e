//! Cancellation and deadlines for script runs.
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, select};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::{
    error::Error,
    runtime::{
        error::{ExecutionError, RuntimeError},
        vm::VM,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug)]
struct CancelState {
    canceled: AtomicBool,
    /// Dropped on cancel; waiters see the disconnect.
    signal: Mutex<Option<Sender<()>>>,
}

/// Cancels the [`Context`] it was created with. Clones cancel the same
/// context; cancelling twice is harmless.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<CancelState>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.canceled.store(true, Ordering::SeqCst);
        self.0.signal.lock().take();
    }
}

/// Stop conditions for a run: an explicit cancellation, a deadline, both or
/// neither.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<(Arc<CancelState>, Receiver<()>)>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = crossbeam_channel::bounded(0);
        let state = Arc::new(CancelState {
            canceled: AtomicBool::new(false),
            signal: Mutex::new(Some(sender)),
        });
        let context = Self {
            cancel: Some((state.clone(), receiver)),
            deadline: None,
        };
        (context, CancelHandle(state))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancel: None,
            deadline: Some(deadline),
        }
    }

    /// Adds (or tightens) a deadline on this context.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if let Some((state, _)) = &self.cancel
            && state.canceled.load(Ordering::SeqCst)
        {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}

/// Runs `vm` to completion, or until `ctx` is done.
///
/// The VM runs on a scoped worker thread while this thread waits for the
/// first of completion, cancellation and deadline. When the context wins,
/// the VM is aborted and the worker is joined before returning, so no run
/// outlives the call.
pub(crate) fn run_vm(vm: &mut VM<'_>, ctx: Option<&Context>) -> Result<(), Error> {
    let Some(ctx) = ctx else {
        return Ok(vm.run()?);
    };
    if let Some(err) = ctx.err() {
        return Err(err.into());
    }

    let abort = vm.abort_handle();
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    let canceled = ctx
        .cancel
        .as_ref()
        .map(|(_, receiver)| receiver.clone())
        .unwrap_or_else(crossbeam_channel::never);
    let expired = ctx
        .deadline
        .map(crossbeam_channel::at)
        .unwrap_or_else(crossbeam_channel::never);

    std::thread::scope(|scope| {
        scope.spawn(move || {
            // The receiver outlives the worker, so the send cannot fail.
            let _ = done_tx.send(vm.run());
        });

        let stopped = select! {
            recv(done_rx) -> result => return finish(result.ok()),
            recv(canceled) -> _ => ContextError::Canceled,
            recv(expired) -> _ => ContextError::DeadlineExceeded,
        };

        debug!(reason = %stopped, "aborting script run");
        abort.abort();
        let _ = done_rx.recv();
        Err(stopped.into())
    })
}

fn finish(result: Option<Result<(), ExecutionError>>) -> Result<(), Error> {
    match result {
        Some(result) => Ok(result?),
        None => Err(ExecutionError::new(RuntimeError::custom("script worker stopped")).into()),
    }
}
