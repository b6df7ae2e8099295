use std::time::Duration;

use rand::Rng;

/// Base interval plus a bounded random offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub base: Duration,
    pub jitter: Duration,
}

impl Cadence {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub fn from_secs(tick: u64, tick_rand: u64) -> Self {
        Self::new(Duration::from_secs(tick), Duration::from_secs(tick_rand))
    }

    /// A delay in `[base, base + jitter]`, drawn at millisecond resolution.
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        self.base + Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }
}
