use std::time::{Duration, Instant};

/// Measures frame deltas from a monotonic clock and sleeps off the rest of each interval.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    frame_start: Instant,
}

impl FramePacer {
    /// Default refresh rate of the game loop.
    pub const DEFAULT_HZ: u32 = 60;

    /// Creates a pacer targeting `hz` frames per second; zero disables sleeping.
    #[must_use]
    pub fn new(hz: u32) -> Self {
        let interval = if hz == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / hz
        };
        Self {
            interval,
            frame_start: Instant::now(),
        }
    }

    /// Target duration of one frame.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts a new frame and returns the time elapsed since the previous one.
    ///
    /// A stalled frame yields a correspondingly larger delta.
    pub fn begin_frame(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.frame_start);
        self.frame_start = now;
        dt
    }

    /// Time left in the current frame interval, if any.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.interval
            .checked_sub(self.frame_start.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }

    /// Sleeps until the current frame interval has elapsed.
    pub fn sleep_remainder(&self) {
        if let Some(remaining) = self.remaining() {
            std::thread::sleep(remaining);
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HZ)
    }
}
