use std::time::Duration;

/// Converts elapsed wall-clock time into whole simulation ticks at a fixed rate.
pub struct FixedTimestep {
    interval: Duration,
    banked: Duration,
}

impl FixedTimestep {
    /// Most time banked by a single call to [`FixedTimestep::accumulate`].
    const MAX_CATCH_UP: Duration = Duration::from_millis(250);

    pub fn new(tick_rate: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / tick_rate.max(1),
            banked: Duration::ZERO,
        }
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        self.banked += elapsed.min(Self::MAX_CATCH_UP);
    }

    /// Spends one tick's worth of banked time, if there is that much.
    pub fn consume_tick(&mut self) -> bool {
        match self.banked.checked_sub(self.interval) {
            Some(rest) => {
                self.banked = rest;
                true
            }
            None => false,
        }
    }

    pub fn time_until_tick(&self) -> Duration {
        self.interval.saturating_sub(self.banked)
    }
}
