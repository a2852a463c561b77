//! Decrement-and-clamp countdowns

use serde::{Deserialize, Serialize};

/// Seconds remaining until something may happen again
///
/// Never negative: ticking past zero clamps at zero so an overshoot cannot
/// shorten the next cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown(f32);

impl Countdown {
    pub fn new(seconds: f32) -> Self {
        Self(seconds.max(0.0))
    }

    pub fn tick(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }

    pub fn set(&mut self, seconds: f32) {
        self.0 = seconds.max(0.0);
    }

    pub fn clear(&mut self) {
        self.0 = 0.0;
    }

    pub fn is_done(&self) -> bool {
        self.0 <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_clamps_at_zero() {
        let mut timer = Countdown::new(0.05);
        timer.tick(0.1);
        assert_eq!(timer.remaining(), 0.0);
        assert!(timer.is_done());
        timer.tick(5.0);
        assert_eq!(timer.remaining(), 0.0);
    }

    #[test]
    fn test_negative_set_clamps() {
        let mut timer = Countdown::default();
        timer.set(-3.0);
        assert_eq!(timer.remaining(), 0.0);
        assert_eq!(Countdown::new(-1.0).remaining(), 0.0);
    }

    #[test]
    fn test_zero_tick_is_noop() {
        let mut timer = Countdown::new(1.8);
        timer.tick(0.0);
        assert_eq!(timer.remaining(), 1.8);
        assert!(!timer.is_done());
    }
}
