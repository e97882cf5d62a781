use std::time::Instant;

/// Run-loop state for the host. The host asks `begin_frame` at the top of every
/// iteration; once stopped it gets `None` and the loop ends after the frame in flight.
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    last: Option<Instant>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the loop was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last = Some(now);
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds since the previous frame, or `None` once stopped.
    pub fn begin_frame(&mut self, now: Instant) -> Option<f32> {
        if !self.running {
            return None;
        }
        let last = self.last.replace(now).unwrap_or(now);
        Some(now.saturating_duration_since(last).as_secs_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stopped_loop_yields_no_frames() {
        let mut frames = FrameLoop::new();
        assert!(!frames.is_running());
        assert_eq!(frames.begin_frame(Instant::now()), None);
    }

    #[test]
    fn measures_time_between_frames() {
        let t0 = Instant::now();
        let mut frames = FrameLoop::new();
        assert!(frames.start(t0));
        assert_eq!(frames.begin_frame(t0), Some(0.0));
        let delta = frames.begin_frame(t0 + Duration::from_millis(40)).unwrap();
        assert!((delta - 0.04).abs() < 1e-6);
        let delta = frames.begin_frame(t0 + Duration::from_millis(50)).unwrap();
        assert!((delta - 0.01).abs() < 1e-6);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let t0 = Instant::now();
        let mut frames = FrameLoop::new();
        assert!(frames.start(t0));
        assert!(!frames.start(t0 + Duration::from_secs(1)));
        let delta = frames.begin_frame(t0 + Duration::from_millis(20)).unwrap();
        assert!((delta - 0.02).abs() < 1e-6);
    }

    #[test]
    fn stop_takes_effect_at_next_frame() {
        let t0 = Instant::now();
        let mut frames = FrameLoop::new();
        frames.start(t0);
        assert!(frames.begin_frame(t0).is_some());
        frames.stop();
        assert_eq!(frames.begin_frame(t0 + Duration::from_millis(16)), None);

        assert!(frames.start(t0 + Duration::from_secs(1)));
        assert_eq!(frames.begin_frame(t0 + Duration::from_secs(1)), Some(0.0));
    }
}
