//! Fixed-window request counting keyed by caller.
//!
//! Time is split into aligned, non-overlapping windows of `window_secs`
//! seconds. Each key owns a single atomic word packing the window id (high 32
//! bits) and the number of grants observed in that window (low 32 bits), so a
//! reset and an increment are one compare-and-swap. Unrelated keys only meet
//! on the map's shard locks when a key is first inserted or swept.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use mockable::Clock;

/// Errors raised when building a [`RateLimitPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitPolicyError {
    /// The limit must admit at least one request.
    #[error("rate limit must be greater than zero")]
    ZeroLimit,
    /// Windows must be at least one second long.
    #[error("rate limit window must be at least one second")]
    ZeroWindow,
}

/// Requests admitted per key per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    limit: u32,
    window_secs: u64,
}

impl RateLimitPolicy {
    /// Default window length.
    pub const DEFAULT_WINDOW_SECS: u64 = 60;

    /// Validate and build a policy.
    pub fn new(limit: u32, window_secs: u64) -> Result<Self, RateLimitPolicyError> {
        if limit == 0 {
            return Err(RateLimitPolicyError::ZeroLimit);
        }
        if window_secs == 0 {
            return Err(RateLimitPolicyError::ZeroWindow);
        }
        Ok(Self { limit, window_secs })
    }

    /// Grants admitted per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length in seconds.
    #[must_use]
    pub const fn window_secs(&self) -> u64 {
        self.window_secs
    }
}

#[derive(Debug, Default)]
struct WindowCell(AtomicU64);

fn pack(window: u32, count: u32) -> u64 {
    (u64::from(window) << 32) | u64::from(count)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "each half of the packed word is exactly 32 bits"
)]
const fn unpack(word: u64) -> (u32, u32) {
    ((word >> 32) as u32, word as u32)
}

impl WindowCell {
    /// Count one request in `window` and return the resulting count.
    ///
    /// A cell still holding an older window restarts at one. A cell already
    /// ahead of `window` (a racing caller saw a later clock reading) keeps
    /// its window and absorbs the request.
    fn record(&self, window: u32) -> u32 {
        let mut observed = self.0.load(Ordering::Acquire);
        loop {
            let (stored_window, count) = unpack(observed);
            let next = if stored_window >= window {
                pack(stored_window, count.saturating_add(1))
            } else {
                pack(window, 1)
            };
            match self
                .0
                .compare_exchange_weak(observed, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return unpack(next).1,
                Err(actual) => observed = actual,
            }
        }
    }

    fn window(&self) -> u32 {
        unpack(self.0.load(Ordering::Acquire)).0
    }
}

/// Per-key fixed-window counter.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use medibook::domain::{RateLimitPolicy, WindowRateLimiter};
/// use mockable::DefaultClock;
///
/// let policy = RateLimitPolicy::new(2, 60).expect("valid policy");
/// let limiter = WindowRateLimiter::new(policy, Arc::new(DefaultClock));
/// assert!(limiter.try_acquire("10.0.0.1"));
/// assert!(limiter.try_acquire("10.0.0.1"));
/// // A third call in the same minute is refused unless the window rolled over.
/// let _ = limiter.try_acquire("10.0.0.1");
/// ```
pub struct WindowRateLimiter {
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
    windows: DashMap<String, WindowCell>,
}

impl WindowRateLimiter {
    /// Build a limiter reading time from `clock`.
    pub fn new(policy: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            windows: DashMap::new(),
        }
    }

    /// Configured policy.
    #[must_use]
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Record one request for `key`; `true` when it is within the limit.
    ///
    /// Refused requests still count, so a caller hammering past the limit
    /// stays refused until the window rolls over.
    pub fn try_acquire(&self, key: &str) -> bool {
        let window = self.current_window();
        let count = match self.windows.get(key) {
            Some(cell) => cell.record(window),
            None => self.windows.entry(key.to_owned()).or_default().record(window),
        };
        count <= self.policy.limit
    }

    /// Drop every key whose window has already closed.
    ///
    /// Returns the number of evicted keys. A returning key starts again at a
    /// count of one, the same state a window reset produces.
    pub fn sweep_stale(&self) -> usize {
        let window = self.current_window();
        let mut evicted = 0_usize;
        self.windows.retain(|_, cell| {
            let keep = cell.window() >= window;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn current_window(&self) -> u32 {
        let seconds = u64::try_from(self.clock.utc().timestamp()).unwrap_or(0);
        u32::try_from(seconds / self.policy.window_secs).unwrap_or(u32::MAX)
    }
}

impl std::fmt::Debug for WindowRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRateLimiter")
            .field("policy", &self.policy)
            .field("tracked_keys", &self.windows.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
