//! Restartable stopwatch driven by simulation time

use serde::{Deserialize, Serialize};

/// Accumulates simulated seconds; never reads the wall clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    elapsed: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn has_reached(&self, seconds: f32) -> bool {
        self.elapsed >= seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_restart() {
        let mut clock = Clock::new();
        clock.advance(0.25);
        clock.advance(0.25);
        assert!(clock.has_reached(0.5));
        assert!(!clock.has_reached(0.6));
        clock.restart();
        assert_eq!(clock.elapsed(), 0.0);
        assert!(clock.has_reached(0.0));
    }
}
