//! Cancellation for the refresh loop, similar to Golang's Context.
//!
//! The loop sleeps between station fetches by waiting on the context,
//! so a Ctrl-C wakes it immediately rather than after a whole refresh interval.

use std::{
    sync::{Arc, Condvar, Mutex},
    time::Duration,
};

#[derive(Clone, Debug, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    cv: Condvar,
}

impl Context {
    /// Create a new, live Context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the context, waking every waiter.
    pub fn cancel(&self) {
        let mut g = self.inner.cancelled.lock().unwrap();
        *g = true;
        self.inner.cv.notify_all();
    }

    /// Returns true iff the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock().unwrap()
    }

    /// Wait until the duration expires, or the context is cancelled.
    /// Returns true if the context has been cancelled.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let g = self.inner.cancelled.lock().unwrap();
        let (v, _) = self
            .inner
            .cv
            .wait_timeout_while(g, duration, |cancelled| !*cancelled)
            .unwrap();
        *v
    }
}
