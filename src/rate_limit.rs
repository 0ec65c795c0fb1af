//! Fixed-interval rate limiter for presentation mutation calls.
//!
//! A ceiling of `R` requests per minute becomes a minimum gap of `60 / R`
//! seconds between the start of two gated calls.

use crate::error::ApiError;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

pub struct RateLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Result<Self, ApiError> {
        if requests_per_minute == 0 {
            return Err(ApiError::ConfigError(
                "requests_per_minute must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            interval: Duration::from_secs(60) / requests_per_minute,
            last_request: Mutex::new(None),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next call slot is available and claim it.
    ///
    /// The slot is reserved under the lock before sleeping, so callers sharing
    /// one limiter are spaced out even when they arrive together.
    pub async fn acquire(&self) {
        let slot = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let slot = match *last {
                Some(previous) if previous + self.interval > now => previous + self.interval,
                _ => now,
            };
            *last = Some(slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            debug!(wait_ms = (slot - now).as_millis() as u64, "Rate limiter delaying call");
            sleep_until(slot).await;
        }
    }
}
