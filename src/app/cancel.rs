// src/app/cancel.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::app::api::FetchError;

/// Shared abort flag handed to a single request.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Bail out of a request body early.
    pub fn check(&self) -> Result<(), FetchError> {
        if self.is_cancelled() {
            Err(FetchError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub enum TaskState<T> {
    Running,
    Finished(Result<T, FetchError>),
}

/// One background request. Dropping the task cancels it, and a cancelled
/// worker never publishes its result.
pub struct Task<T> {
    token: CancelToken,
    rx: Receiver<Result<T, FetchError>>,
}

impl<T: Send + 'static> Task<T> {
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce(&CancelToken) -> Result<T, FetchError> + Send + 'static,
    {
        let token = CancelToken::new();
        let (tx, rx) = mpsc::channel();
        let worker_token = token.clone();

        std::thread::spawn(move || {
            let out = job(&worker_token);
            if worker_token.is_cancelled() {
                return;
            }
            let _ = tx.send(out);
        });

        Self { token, rx }
    }
}

impl<T> Task<T> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking; call once per frame.
    pub fn state(&self) -> TaskState<T> {
        match self.rx.try_recv() {
            Ok(res) => TaskState::Finished(res),
            Err(TryRecvError::Empty) => TaskState::Running,
            Err(TryRecvError::Disconnected) if self.token.is_cancelled() => {
                TaskState::Finished(Err(FetchError::Cancelled))
            }
            // not cancelled, yet nothing was sent: the worker panicked
            Err(TryRecvError::Disconnected) => {
                TaskState::Finished(Err(FetchError::Transport("worker exited".into())))
            }
        }
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
