//! Fixed-delay request pacing.
//!
//! The public TON endpoints throttle anonymous clients at roughly one
//! request per second. Each service family gets its own [`RequestPacer`];
//! consecutive calls through the same pacer are spaced at least `delay`
//! apart, measured from the start of the previous call.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Reserve the next slot and sleep until it opens.
    pub async fn pace(&self) {
        let wait = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let start = match *next {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next = Some(start + self.delay);
            start - now
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
