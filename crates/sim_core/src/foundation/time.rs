//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Accumulator that converts variable frame time into whole fixed steps.
///
/// Real elapsed time is banked with [`FixedTimestep::accumulate`] and then
/// drained one `step` at a time. The backlog is capped at `max_steps` per
/// frame; anything beyond that is dropped so a long stall cannot snowball
/// into ever longer frames.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
    total_steps: u64,
}

impl FixedTimestep {
    /// Create an accumulator for the given step length (seconds)
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    /// Fixed step length in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of steps consumed since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Bank frame time and return how many fixed steps should run now.
    ///
    /// Negative and non-finite frame times are ignored.
    pub fn accumulate(&mut self, frame_time: f32) -> u32 {
        if !frame_time.is_finite() {
            log::warn!("Ignoring non-finite frame time {frame_time}");
        } else if frame_time > 0.0 {
            self.accumulator += frame_time;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            log::warn!(
                "Physics fell behind: dropping {:.4}s of simulation time after {} steps",
                self.accumulator,
                steps
            );
            self.accumulator %= self.step;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accumulates_partial_frames() {
        let mut timestep = FixedTimestep::new(0.1, 8);

        assert_eq!(timestep.accumulate(0.05), 0);
        assert_eq!(timestep.accumulate(0.06), 1);
        assert_relative_eq!(timestep.alpha(), 0.1, epsilon = 1e-4);
    }

    #[test]
    fn test_runs_multiple_steps_for_long_frame() {
        let mut timestep = FixedTimestep::new(0.25, 8);

        assert_eq!(timestep.accumulate(1.0), 4);
        assert_eq!(timestep.total_steps(), 4);
    }

    #[test]
    fn test_clamps_backlog() {
        let mut timestep = FixedTimestep::new(0.1, 3);

        assert_eq!(timestep.accumulate(5.0), 3);
        assert!(timestep.alpha() < 1.0);
        assert_eq!(timestep.accumulate(0.0), 0);
    }

    #[test]
    fn test_ignores_negative_time() {
        let mut timestep = FixedTimestep::new(0.1, 3);

        assert_eq!(timestep.accumulate(-1.0), 0);
        assert_relative_eq!(timestep.alpha(), 0.0);
    }

    #[test]
    fn test_non_finite_time_keeps_stepping() {
        let mut timestep = FixedTimestep::new(0.1, 8);

        assert_eq!(timestep.accumulate(f32::INFINITY), 0);
        assert_eq!(timestep.accumulate(f32::NAN), 0);
        assert_eq!(timestep.accumulate(0.25), 2);
        assert_relative_eq!(timestep.alpha(), 0.5, epsilon = 1e-4);
        assert!(timestep.accumulate(0.25) >= 2);
        assert!(timestep.alpha().is_finite());
    }

    #[test]
    fn test_huge_frame_time_drops_backlog() {
        let mut timestep = FixedTimestep::new(0.1, 8);

        assert_eq!(timestep.accumulate(f32::MAX), 8);
        assert!((0.0..=1.0).contains(&timestep.alpha()));
        assert!((2..=3).contains(&timestep.accumulate(0.25)));
    }
}
