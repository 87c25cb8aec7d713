// src/engine/debounce.rs
//! Trailing-edge debounce: any burst of notifications collapses into one action,
//! run `delay` after the *last* notification. A notification arriving while an
//! action is pending cancels and reschedules it.
//!
//! Two flavours share the same rule:
//! - `Debounce`: a clock-driven state machine, for hosts with their own loop (the GUI).
//! - `Debouncer`: owns a worker thread and runs a closure, for the file watcher.

use std::{
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    pub fn delay(&self) -> Duration { self.delay }

    /// Record a notification at `now`; pushes the deadline out.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool { self.deadline.is_some() }

    /// Time until the pending action is due (zero if overdue), `None` if idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// True exactly once per burst: when the deadline has passed. Clears the pending state.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending action.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

enum Msg {
    Notify,
    Flush,
    Stop,
}

/// Thread-backed debouncer. Dropping it stops the worker; a pending action is discarded.
pub struct Debouncer {
    tx: Sender<Msg>,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new<F>(delay: Duration, mut action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Msg>();
        let handle = thread::spawn(move || {
            let mut state = Debounce::new(delay);
            loop {
                // Idle: block until something happens.
                let msg = match state.remaining(Instant::now()) {
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                    Some(left) => rx.recv_timeout(left),
                };
                match msg {
                    Ok(Msg::Notify) => state.notify(Instant::now()),
                    Ok(Msg::Flush) => {
                        if state.is_pending() {
                            state.cancel();
                            action();
                        }
                    }
                    Ok(Msg::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        if state.poll(Instant::now()) {
                            action();
                        }
                    }
                }
            }
        });
        Self { tx, handle: Some(handle) }
    }

    /// Report one change notification.
    pub fn notify(&self) {
        let _ = self.tx.send(Msg::Notify);
    }

    /// Run a pending action now instead of waiting out the window.
    pub fn flush(&self) {
        let _ = self.tx.send(Msg::Flush);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Stop);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}
