/// Frame-cadence emulation and event-rate limiting.
///
/// Timestamps are milliseconds on a host-chosen monotonic clock
/// (`performance.now()` on the web, an `Instant` offset in the terminal).
use std::time::Duration;

/// Frame period used when no native refresh callback exists (~60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Stand-in for a display refresh callback.
///
/// Each request is delayed so that consecutive emulated ticks stay one
/// frame interval apart. The last tick time is the only state.
#[derive(Debug, Clone)]
pub struct FrameEmulator {
    interval_ms: f64,
    last_tick_ms: f64,
}

/// When an emulated frame should run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmulatedFrame {
    /// How long the host should wait before running the callback
    pub delay_ms: f64,
    /// Timestamp to hand to the callback
    pub timestamp_ms: f64,
}

impl FrameEmulator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_micros() as f64 / 1000.0,
            last_tick_ms: 0.0,
        }
    }

    /// Plan the next frame for a request made at `now_ms`.
    pub fn request(&mut self, now_ms: f64) -> EmulatedFrame {
        let delay_ms = (self.interval_ms - (now_ms - self.last_tick_ms)).max(0.0);
        self.last_tick_ms = now_ms + delay_ms;
        EmulatedFrame {
            delay_ms,
            timestamp_ms: self.last_tick_ms,
        }
    }
}

impl Default for FrameEmulator {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

/// Leading-edge rate limiter.
///
/// The first call fires and opens a cooling window; calls inside the window
/// are dropped, never queued or replayed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    reopens_at_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_micros() as f64 / 1000.0,
            reopens_at_ms: None,
        }
    }

    /// Returns `true` if a call at `now_ms` may run.
    pub fn try_acquire(&mut self, now_ms: f64) -> bool {
        match self.reopens_at_ms {
            Some(reopens_at) if now_ms < reopens_at => false,
            _ => {
                self.reopens_at_ms = Some(now_ms + self.interval_ms);
                true
            }
        }
    }
}
