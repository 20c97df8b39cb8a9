//! Frame timing for the run loop.
//!
//! The integrator is frame-driven: one step per displayed frame, with no
//! notion of seconds. [`FrameClock`] exists for the host loop only, to report
//! frame rate and to notice frames that blow their budget.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     sim.step(&signal);
//!     if let Some(fps) = clock.tick() {
//!         log::info!("{:.1} fps", fps);
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

/// Frame counter with a periodically refreshed FPS estimate.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Create a clock starting now, refreshing FPS every 500 ms.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(500))
    }

    /// Create a clock that refreshes its FPS estimate every `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
        }
    }

    /// Mark the end of a frame.
    ///
    /// Returns the new FPS estimate when it was refreshed by this tick.
    pub fn tick(&mut self) -> Option<f32> {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;

        let window = now.duration_since(self.fps_update_time);
        if window < self.fps_update_interval {
            return None;
        }

        let frames = self.frame_count - self.fps_frame_count;
        self.fps = frames as f32 / window.as_secs_f32();
        self.fps_frame_count = self.frame_count;
        self.fps_update_time = now;
        Some(self.fps)
    }

    /// Duration of the last completed frame.
    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent FPS estimate (0 until the first refresh).
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether the last frame took longer than `budget`.
    #[inline]
    pub fn over_budget(&self, budget: Duration) -> bool {
        self.delta > budget
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.fps(), 0.0);
        assert_eq!(clock.delta(), Duration::ZERO);
    }

    #[test]
    fn test_tick_counts_frames() {
        let mut clock = FrameClock::with_interval(Duration::from_secs(3600));
        thread::sleep(Duration::from_millis(5));
        assert!(clock.tick().is_none());
        assert!(clock.tick().is_none());
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_fps_refresh() {
        let mut clock = FrameClock::with_interval(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(20));
        let fps = clock.tick().expect("interval elapsed");
        assert!(fps > 0.0);
        assert_eq!(clock.fps(), fps);
    }

    #[test]
    fn test_over_budget() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(20));
        clock.tick();
        assert!(clock.over_budget(Duration::from_millis(5)));
        assert!(!clock.over_budget(Duration::from_secs(10)));
    }
}
