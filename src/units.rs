//! Simulation units (meters) vs display units (pixels)

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Scale between the physics world and the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Units {
    pub pixels_per_meter: f32,
}

impl Default for Units {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl Units {
    pub const fn new(pixels_per_meter: f32) -> Self {
        Self { pixels_per_meter }
    }

    #[inline]
    pub fn to_meters(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_meter
    }

    #[inline]
    pub fn to_pixels(&self, meters: f32) -> f32 {
        meters * self.pixels_per_meter
    }

    #[inline]
    pub fn vec_to_meters(&self, pixels: Vec2) -> Vec2 {
        pixels / self.pixels_per_meter
    }

    #[inline]
    pub fn vec_to_pixels(&self, meters: Vec2) -> Vec2 {
        meters * self.pixels_per_meter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifty_pixels_per_meter() {
        let units = Units::default();
        assert_eq!(units.to_meters(200.0), 4.0);
        assert_eq!(units.to_pixels(0.4), 20.0);
        assert_eq!(
            units.vec_to_meters(Vec2::new(600.0, 350.0)),
            Vec2::new(12.0, 7.0)
        );
    }
}
