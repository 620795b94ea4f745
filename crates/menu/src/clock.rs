//! Injectable time source for expiry decisions.
//!
//! Every TTL check in the crate (token validity, category and product
//! caches) goes through [`Clock`] instead of calling `Instant::now()`
//! directly, so tests can move time forward without real delays.

use std::sync::Arc;
use std::time::Instant;

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// A manually advanced clock for tests.
#[cfg(any(test, feature = "test-clock"))]
pub mod manual {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use super::Clock;

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        /// Create a clock starting at the current instant.
        #[must_use]
        pub fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        /// Advance the clock by `delta`.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned.
        pub fn advance(&self, delta: Duration) {
            let mut now = self.now.lock().expect("clock lock poisoned");
            *now += delta;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().expect("clock lock poisoned")
        }
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub use manual::ManualClock;
