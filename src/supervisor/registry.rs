// src/supervisor/registry.rs

//! The process-wide record of live children.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Termination signals the parent understands and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermSignal {
    Interrupt,
    Quit,
    Terminate,
}

impl TermSignal {
    #[cfg(unix)]
    fn as_nix(self) -> nix::sys::signal::Signal {
        use nix::sys::signal::Signal;
        match self {
            TermSignal::Interrupt => Signal::SIGINT,
            TermSignal::Quit => Signal::SIGQUIT,
            TermSignal::Terminate => Signal::SIGTERM,
        }
    }
}

impl fmt::Display for TermSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TermSignal::Interrupt => "SIGINT",
            TermSignal::Quit => "SIGQUIT",
            TermSignal::Terminate => "SIGTERM",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// pid → display command line, for shutdown logging.
    children: HashMap<u32, String>,
    /// The termination signal the parent received, if any.
    received: Option<TermSignal>,
}

/// Single source of truth for which children must be killed on
/// shutdown. Children are only ever added through the supervisor's
/// spawn path and removed on their exit event; `kill_all` drains
/// whatever is left.
///
/// The tokio runtime is multi-threaded, so access is serialized with a
/// mutex; every operation is a short synchronous critical section.
#[derive(Debug, Default)]
pub struct ChildRegistry {
    inner: Mutex<RegistryInner>,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, pid: u32, command: &str) {
        let mut inner = self.lock();
        inner.children.insert(pid, command.to_string());
    }

    pub fn deregister(&self, pid: u32) {
        let mut inner = self.lock();
        inner.children.remove(&pid);
    }

    pub fn record_signal(&self, signal: TermSignal) {
        let mut inner = self.lock();
        inner.received = Some(signal);
    }

    pub fn received_signal(&self) -> Option<TermSignal> {
        self.lock().received
    }

    pub fn len(&self) -> usize {
        self.lock().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send the recorded termination signal (SIGTERM when the parent is
    /// exiting without one) to every registered child and clear the
    /// registry. Returns how many children were signalled.
    pub fn kill_all(&self) -> usize {
        let (children, signal) = {
            let mut inner = self.lock();
            let signal = inner.received.unwrap_or(TermSignal::Terminate);
            (std::mem::take(&mut inner.children), signal)
        };
        for (pid, command) in &children {
            debug!(pid, command = %command, signal = %signal, "killing child on shutdown");
            send_signal(*pid, signal);
        }
        children.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: TermSignal) {
    use nix::sys::signal;
    use nix::unistd::Pid;
    // The child may already be gone; a delivery failure is fine.
    let _ = signal::kill(Pid::from_raw(pid as i32), signal.as_nix());
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _signal: TermSignal) {
    // No portable way to forward a specific signal; children spawned
    // with kill_on_drop are reaped when their handles drop.
}
