use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A static repulsion source. The world layer owns the obstacle list and
/// hands it to the simulation as a read-only slice every step; nothing in
/// the simulation moves or removes one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(position: Vec3, radius: f32, height: f32) -> Self {
        Obstacle {
            position,
            radius,
            height,
        }
    }

    /// Vertical span an agent is considered level with, widened by the
    /// configured tolerance on both ends.
    pub fn height_range(&self, tolerance: f32) -> (f32, f32) {
        (
            self.position.y - tolerance,
            self.position.y + self.height + tolerance,
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::Obstacle;

    #[test]
    fn height_range_spans_trunk_and_tolerance() {
        let obstacle = Obstacle::new(Vec3::new(0., -5., 0.), 0.5, 100.);

        let (low, high) = obstacle.height_range(10.);

        assert_eq!(low, -15.);
        assert_eq!(high, 105.);
    }
}
