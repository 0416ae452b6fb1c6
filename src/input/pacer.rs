//! Pacing for timed input
//!
//! Every delay in the command path goes through a [`Pacer`], so the scheduler
//! can run against the wall clock in production and a virtual clock in tests.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Outcome of a pacer wait
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Cancelled,
}

/// Source of time and delays for the command executor
pub trait Pacer: Send + Sync {
    /// Monotonic time since the pacer was created
    fn now(&self) -> Duration;

    /// Block for `duration`, or until the pacer is cancelled
    fn wait(&self, duration: Duration) -> Wait;
}

/// Shutdown signal shared between the host loop and in-flight waits
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake every waiter. Sticky: later waits return immediately.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(|e| e.into_inner()) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleep for `duration` unless cancelled first
    pub fn wait_timeout(&self, duration: Duration) -> Wait {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        if *guard {
            return Wait::Cancelled;
        }
        if duration.is_zero() {
            return Wait::Elapsed;
        }

        let (guard, _) = cvar
            .wait_timeout_while(guard, duration, |cancelled| !*cancelled)
            .unwrap_or_else(|e| e.into_inner());

        if *guard { Wait::Cancelled } else { Wait::Elapsed }
    }
}

/// Wall-clock pacer
#[derive(Debug)]
pub struct ClockPacer {
    origin: Instant,
    token: CancelToken,
}

impl ClockPacer {
    pub fn new(token: CancelToken) -> Self {
        Self {
            origin: Instant::now(),
            token,
        }
    }
}

impl Pacer for ClockPacer {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait(&self, duration: Duration) -> Wait {
        self.token.wait_timeout(duration)
    }
}

/// Virtual clock that advances instantly on every wait
///
/// Used by tests and by `exec --dry-run` to produce an exact timeline.
#[derive(Debug, Default)]
pub struct VirtualPacer {
    clock: Mutex<Duration>,
    token: CancelToken,
}

impl VirtualPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancelToken) -> Self {
        Self {
            clock: Mutex::new(Duration::ZERO),
            token,
        }
    }
}

impl Pacer for VirtualPacer {
    fn now(&self) -> Duration {
        *self.clock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait(&self, duration: Duration) -> Wait {
        if self.token.is_cancelled() {
            return Wait::Cancelled;
        }
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        *clock = clock.saturating_add(duration);
        Wait::Elapsed
    }
}
