use std::time::Duration;

/// Frame timing, averaged over a fixed interval so the overlay number is
/// readable instead of flickering every frame.
const FPS_INTERVAL: u32 = 8;

pub struct FrameStats {
    last_frame_time: f64,
    accumulated: f64,
    frames_left: u32,
    fps: f64,
    delta: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            last_frame_time: 0.0,
            accumulated: 0.0,
            frames_left: FPS_INTERVAL,
            fps: 0.0,
            delta: 0.0,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// `time` is seconds since startup.
    pub fn update(&mut self, time: f64) {
        self.delta = time - self.last_frame_time;
        self.accumulated += self.delta;
        self.frames_left = self.frames_left.saturating_sub(1);

        if self.frames_left == 0 {
            self.fps = f64::from(FPS_INTERVAL) / self.accumulated;
            self.frames_left = FPS_INTERVAL;
            self.accumulated = 0.0;
        }

        self.last_frame_time = time;
    }
}

/// Paces the interactive loop to the configured target frame rate by
/// sleeping out whatever is left of the per-frame budget. Capture mode
/// skips pacing entirely so exports run as fast as the GPU allows.
pub struct FramePacer {
    frame_budget: f64,
}

impl FramePacer {
    pub fn new(target_framerate: f32) -> Self {
        Self {
            frame_budget: Self::budget(target_framerate),
        }
    }

    pub fn apply_settings(&mut self, target_framerate: f32) {
        self.frame_budget = Self::budget(target_framerate);
    }

    // A non-positive target disables pacing instead of dividing by zero.
    fn budget(target_framerate: f32) -> f64 {
        if target_framerate > 0.0 {
            1.0 / f64::from(target_framerate)
        } else {
            0.0
        }
    }

    /// Time left in the current frame budget, given how long the tick has
    /// already taken. Zero when the tick overran or pacing is disabled.
    pub fn shortfall(&self, elapsed: f64) -> Duration {
        Duration::from_secs_f64((self.frame_budget - elapsed).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fps_settles_on_steady_frame_rate() {
        let mut stats = FrameStats::new();
        for i in 1..=32 {
            stats.update(f64::from(i) * (1.0 / 60.0));
        }
        assert_relative_eq!(stats.fps(), 60.0, epsilon = 1e-6);
        assert_relative_eq!(stats.delta(), 1.0 / 60.0, epsilon = 1e-9);
    }

    #[test]
    fn pacer_fills_the_rest_of_the_frame_budget() {
        let pacer = FramePacer::new(60.0);
        let idle = pacer.shortfall(0.01);
        assert_relative_eq!(idle.as_secs_f64(), 1.0 / 60.0 - 0.01, epsilon = 1e-9);
    }

    #[test]
    fn overrunning_the_budget_never_sleeps() {
        let pacer = FramePacer::new(60.0);
        assert!(pacer.shortfall(0.05).is_zero());
        assert!(pacer.shortfall(1.0 / 60.0).is_zero());
    }

    #[test]
    fn non_positive_target_disables_pacing() {
        assert!(FramePacer::new(0.0).shortfall(0.0).is_zero());
        assert!(FramePacer::new(-30.0).shortfall(0.0).is_zero());
    }

    #[test]
    fn reload_changes_the_budget() {
        let mut pacer = FramePacer::new(30.0);
        pacer.apply_settings(120.0);
        assert_relative_eq!(
            pacer.shortfall(0.0).as_secs_f64(),
            1.0 / 120.0,
            epsilon = 1e-9
        );
    }
}
