//! Owner-thread message queue and one-shot background jobs.
//!
//! # Invariants
//! - Only the thread holding the [`Dispatcher`] drains messages, so state
//!   touched by message handlers has a single writer.
//! - Background jobs see only what they were moved; results come back as
//!   messages.

use log::{debug, warn};
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Receiving end, owned by the thread that owns manager state.
///
/// Uses `std::sync::mpsc` instead of tokio channels since the core runs no
/// async runtime. Jobs are plain threads and the owner drains synchronously.
pub struct Dispatcher<M> {
    tx: Sender<M>,
    rx: Receiver<M>,
}

/// Cloneable posting end handed to background work.
pub struct DispatchHandle<M> {
    tx: Sender<M>,
}

impl<M> Clone for DispatchHandle<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> DispatchHandle<M> {
    /// Queues `message` for the owner. Returns `false` once the owner is gone.
    pub fn post(&self, message: M) -> bool {
        self.tx.send(message).is_ok()
    }
}

impl<M> Default for Dispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Dispatcher<M> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> DispatchHandle<M> {
        DispatchHandle {
            tx: self.tx.clone(),
        }
    }

    /// Runs `handler` for every queued message without blocking.
    pub fn drain(&self, mut handler: impl FnMut(M)) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            handler(message);
            handled += 1;
        }
        handled
    }

    /// Waits up to `timeout` for the next message.
    pub fn next_timeout(&self, timeout: Duration) -> Option<M> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Runs `job` on a new named thread and posts `into_message(result)` back.
pub fn spawn_background<M, R, F, C>(
    name: &str,
    handle: DispatchHandle<M>,
    job: F,
    into_message: C,
) -> io::Result<JoinHandle<()>>
where
    M: Send + 'static,
    R: 'static,
    F: FnOnce() -> R + Send + 'static,
    C: FnOnce(R) -> M + Send + 'static,
{
    spawn_delayed(name, handle, Duration::ZERO, job, into_message)
}

/// Like [`spawn_background`], sleeping `delay` before running `job`.
pub fn spawn_delayed<M, R, F, C>(
    name: &str,
    handle: DispatchHandle<M>,
    delay: Duration,
    job: F,
    into_message: C,
) -> io::Result<JoinHandle<()>>
where
    M: Send + 'static,
    R: 'static,
    F: FnOnce() -> R + Send + 'static,
    C: FnOnce(R) -> M + Send + 'static,
{
    let thread_name = format!("mapton-{name}");
    let job_name = name.to_string();
    thread::Builder::new().name(thread_name).spawn(move || {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let result = job();
        if handle.post(into_message(result)) {
            debug!("event=background_job module=dispatch status=ok job={job_name}");
        } else {
            warn!("event=background_job module=dispatch status=dropped job={job_name}");
        }
    })
}
