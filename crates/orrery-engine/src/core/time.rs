/// Fixed timestep accumulator.
/// Ensures motion and camera smoothing run at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Monotonic elapsed-time clock, advanced by the host once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    elapsed: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Negative deltas are ignored so time never runs backwards.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if dt > 0.0 {
            self.elapsed += dt;
        }
        self.elapsed
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// One-shot cancellable deadline on a [`FrameClock`] timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    fires_at: Option<f64>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the countdown to fire `delay` seconds after `now`. Re-arming replaces the old deadline.
    pub fn arm(&mut self, now: f64, delay: f64) {
        self.fires_at = Some(now + delay.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.fires_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.fires_at.is_some()
    }

    /// Returns true exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.fires_at {
            Some(at) if now >= at => {
                self.fires_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0 / 60.0);
        assert_eq!(steps, 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(0.008); // half a frame
        assert_eq!(steps, 0);
        let steps = ts.accumulate(0.010); // over one frame total
        assert_eq!(steps, 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        let steps = ts.accumulate(1.0);
        assert_eq!(steps, 10);
    }

    #[test]
    fn clock_ignores_negative_deltas() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        clock.advance(-1.0);
        assert_eq!(clock.elapsed(), 0.5);
    }

    #[test]
    fn countdown_fires_once() {
        let mut c = Countdown::new();
        c.arm(1.0, 0.25);
        assert!(!c.poll(1.2));
        assert!(c.poll(1.25));
        assert!(!c.poll(2.0));
        assert!(!c.is_armed());
    }

    #[test]
    fn cancelled_countdown_never_fires() {
        let mut c = Countdown::new();
        c.arm(0.0, 0.1);
        c.cancel();
        assert!(!c.poll(10.0));
    }
}
