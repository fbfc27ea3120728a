//! Fixed-window request counter keyed by `(license key, client address)`.
//!
//! The window is fixed, not sliding: a client can spend its full quota at the
//! end of one window and again at the start of the next.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_LIMIT: u32 = 50;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);
/// One call in this many sweeps expired entries.
pub const CLEANUP_ONE_IN: u32 = 100;

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn at(now_ms: u64) -> Self {
        Self(AtomicU64::new(now_ms))
    }

    pub fn advance(&self, by: Duration) {
        let by = millis(by);
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }

    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Decides whether a call should also sweep expired entries.
pub trait Sampler: Send + Sync {
    fn should_cleanup(&self) -> bool;
}

#[derive(Debug)]
pub struct RandomSampler {
    one_in: u32,
}

impl RandomSampler {
    pub fn new(one_in: u32) -> Self {
        Self {
            one_in: one_in.max(1),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new(CLEANUP_ONE_IN)
    }
}

impl Sampler for RandomSampler {
    fn should_cleanup(&self) -> bool {
        let mut bytes = [0u8; 4];
        if let Err(err) = getrandom::getrandom(&mut bytes) {
            tracing::debug!("cleanup sampler entropy unavailable: {err}");
            return false;
        }
        u32::from_le_bytes(bytes) % self.one_in == 0
    }
}

/// Always or never sweeps.
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler(pub bool);

impl Sampler for FixedSampler {
    fn should_cleanup(&self) -> bool {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RateLimitEntry {
    count: u32,
    reset_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds at which the current window ends.
    pub reset_time_ms: u64,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    clock: Arc<dyn Clock>,
    sampler: Arc<dyn Sampler>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked", &self.tracked())
            .finish()
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(SystemClock),
            Arc::new(RandomSampler::default()),
        )
    }

    pub fn with_parts(
        config: RateLimitConfig,
        clock: Arc<dyn Clock>,
        sampler: Arc<dyn Sampler>,
    ) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            clock,
            sampler,
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Counts one request against `(license, client)` and reports whether it
    /// may proceed. Rejected requests do not extend the window.
    pub fn check(&self, license: &str, client: &str) -> RateLimitDecision {
        let now = self.clock.now_ms();
        let window_ms = millis(self.config.window);
        let limit = self.config.limit;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if self.sampler.should_cleanup() {
            let before = entries.len();
            entries.retain(|_, entry| entry.reset_time_ms > now);
            tracing::debug!(removed = before - entries.len(), "rate limit sweep");
        }

        let fresh = RateLimitEntry {
            count: 0,
            reset_time_ms: now.saturating_add(window_ms),
        };
        let entry = entries
            .entry(format!("{license}:{client}"))
            .or_insert(fresh);
        if now >= entry.reset_time_ms {
            *entry = fresh;
        }

        if entry.count >= limit {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                reset_time_ms: entry.reset_time_ms,
            };
        }
        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: limit - entry.count,
            reset_time_ms: entry.reset_time_ms,
        }
    }

    /// Number of `(license, client)` pairs currently tracked.
    pub fn tracked(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}
