use std::sync::Arc;

use parking_lot::Mutex;
use web_time::{Duration, Instant};

/// Time source for an engine. Hosts use [`SystemClock`]; tests and scripted
/// demos use [`TestClock`].
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock you drive by hand. Clones share the same instant, so a test can
/// keep one handle while the engine owns another.
#[derive(Clone)]
pub struct TestClock {
    t: Arc<Mutex<Instant>>,
}

impl TestClock {
    pub fn new(start: Instant) -> Self {
        Self {
            t: Arc::new(Mutex::new(start)),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(Instant::now())
    }

    pub fn advance(&self, by: Duration) {
        *self.t.lock() += by;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    pub fn set(&self, t: Instant) {
        *self.t.lock() = t;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.t.lock()
    }
}
