//! Token-bucket admission control for outbound API calls.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default bucket capacity.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Default refill rate in tokens per hour.
pub const DEFAULT_REFILL_PER_HOUR: u64 = 1000;

const NANOS_PER_HOUR: u128 = 3_600 * 1_000_000_000;

#[derive(Debug)]
struct Bucket {
    tokens: u64,
    last_refill: Instant,
}

/// A token bucket that refills lazily from elapsed wall-clock time.
///
/// `allow` never blocks. A `false` return is an immediate rejection and the
/// caller is expected to fail rather than wait.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u64,
    refill_per_hour: u64,
    bucket: Mutex<Bucket>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_REFILL_PER_HOUR)
    }
}

impl RateLimiter {
    /// Create a full bucket.
    pub fn new(capacity: u64, refill_per_hour: u64) -> Self {
        Self::new_at(capacity, refill_per_hour, Instant::now())
    }

    fn new_at(capacity: u64, refill_per_hour: u64, now: Instant) -> Self {
        Self {
            capacity,
            refill_per_hour,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: now,
            }),
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Take one token if available.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Current token count after refill, without consuming.
    pub fn tokens_remaining(&self) -> u64 {
        self.tokens_remaining_at(Instant::now())
    }

    pub(crate) fn allow_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket, now);
        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn tokens_remaining_at(&self, now: Instant) -> u64 {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut bucket, now);
        bucket.tokens
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        let to_add = tokens_for(elapsed, self.refill_per_hour);
        if to_add > 0 {
            bucket.tokens = bucket.tokens.saturating_add(to_add).min(self.capacity);
            bucket.last_refill = now;
        }
    }
}

/// Whole tokens earned over `elapsed` at `per_hour`, rounded down.
fn tokens_for(elapsed: Duration, per_hour: u64) -> u64 {
    let earned = elapsed.as_nanos().saturating_mul(per_hour as u128) / NANOS_PER_HOUR;
    u64::try_from(earned).unwrap_or(u64::MAX)
}
