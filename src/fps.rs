// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Instantaneous frame-rate measurement.

use std::time::Instant;

/// Frame-rate counter measuring the time between consecutive ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsCounter {
    previous: Option<Instant>,
}

impl FpsCounter {
    /// Create a counter with no previous tick.
    #[must_use]
    pub const fn new() -> Self {
        Self { previous: None }
    }

    /// Record a frame and return `1 / (now - previous)`.
    ///
    /// The first tick has no reference point and returns `0.0`, as does a tick
    /// with no measurable time since the last one.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit timestamp.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let fps = self.previous.map_or(0.0, |prev| {
            let dt = now.saturating_duration_since(prev).as_secs_f64();
            if dt > 0.0 { 1.0 / dt } else { 0.0 }
        });
        self.previous = Some(now);
        fps
    }
}
