//! Time management for the game loop.

use std::time::Duration;

/// Longest frame step handed to the simulation. Longer stalls (window drags,
/// debugger pauses) are clamped so the drone cannot tunnel through obstacles.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Source of the "world creation" timestamp that seeds terrain elevation.
///
/// The game reads it exactly once per terrain generation.
pub trait Clock {
    /// Seconds elapsed since the clock started.
    fn elapsed_seconds(&self) -> f32;
}

/// A clock frozen at a fixed reading. Useful for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixedClock(pub f32);

impl Clock for FixedClock {
    fn elapsed_seconds(&self) -> f32 {
        self.0
    }
}

/// Frame timing for the game loop, advanced in fixed steps.
#[derive(Debug, Default)]
pub struct Time {
    /// Duration of the last frame (clamped).
    delta: Duration,
    /// Total simulated time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a fixed step without consulting the wall clock.
    ///
    /// Used by the headless driver so runs are reproducible.
    pub fn step(&mut self, delta: Duration) {
        if delta > MAX_FRAME_DELTA {
            log::debug!("Frame took {:?}, clamping to {:?}", delta, MAX_FRAME_DELTA);
        }
        self.delta = delta.min(MAX_FRAME_DELTA);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Clock for Time {
    fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_accumulates_elapsed() {
        let mut time = Time::new();
        for _ in 0..60 {
            time.step(Duration::from_millis(10));
        }
        assert_eq!(time.frame_count(), 60);
        assert!((time.elapsed_seconds() - 0.6).abs() < 1e-4);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut time = Time::new();
        time.step(Duration::from_secs(3));
        assert_eq!(time.delta_seconds(), MAX_FRAME_DELTA.as_secs_f32());
        assert_eq!(time.elapsed(), MAX_FRAME_DELTA);
    }

    #[test]
    fn fixed_clock_reads_back_its_value() {
        assert_eq!(FixedClock(12.5).elapsed_seconds(), 12.5);
    }
}
