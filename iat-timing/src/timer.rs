use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// `d` in whole nanoseconds, clamped to `u64::MAX`.
pub fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Monotonic clock used to timestamp stimulus onsets and responses.
///
/// Timestamps are nanoseconds since the timer's own origin.
pub trait Timer: Clone + Send + Sync {
    fn now(&self) -> u64;

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    /// Marks a stimulus onset. Only the latest onset is meaningful; callers
    /// drop older ones.
    fn start(&self) -> u64 {
        self.now()
    }

    /// Whole milliseconds since `onset`, never negative.
    fn elapsed_ms_since(&self, onset: u64) -> u64 {
        u64::try_from(self.elapsed(onset).as_millis()).unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        saturating_nanos(self.start.elapsed())
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Wall-clock instant corresponding to a timestamp from this timer, or
    /// `None` when it lies beyond what `Instant` can represent.
    pub fn instant_at(&self, ts: u64) -> Option<Instant> {
        self.start.checked_add(Duration::from_nanos(ts))
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Virtual clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `d`, stopping at `u64::MAX`.
    pub fn advance(&self, d: Duration) {
        let step = saturating_nanos(d);
        let _ = self
            .now_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(step))
            });
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Moves the clock forward to `ts`; never moves it backwards.
    pub fn advance_to(&self, ts: u64) {
        self.now_ns.fetch_max(ts, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}
