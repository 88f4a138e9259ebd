use glam::Vec3;

use crate::{flock::Flock, math_helpers::normalize_or_zero};

/// Eye position of the fixed observation tower at the center of the world.
const TOWER_EYE: Vec3 = Vec3::new(0., 60., 0.);

/// Standoff distance for the moving tracking modes.
const FOLLOW_DISTANCE: f32 = 40.0;

/// Below this average flock speed the motion-relative modes hold their pose.
const MIN_TRACK_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    /// Host-driven; tracking leaves the pose alone.
    Free,
    /// High fixed vantage point looking down at the flock center.
    Tower,
    /// Trails the flock against its direction of motion.
    Behind,
    /// Holds position on the flock's flank, parallel to the ground.
    Broadside,
}

/// Camera pose driven by flock state. Only the tracking state machine lives
/// here; input handling and projection belong to the host.
pub struct FlockCamera {
    pub position: Vec3,
    pub orientation: Vec3,
    /// Lerp factor applied per update; 1.0 snaps instantly.
    pub smoothness: f32,
    mode: TrackMode,
    saved_pose: Option<(Vec3, Vec3)>,
}

impl FlockCamera {
    pub fn new(position: Vec3) -> Self {
        FlockCamera {
            position,
            orientation: Vec3::NEG_Z,
            smoothness: 0.05,
            mode: TrackMode::Free,
            saved_pose: None,
        }
    }

    pub fn mode(&self) -> TrackMode {
        self.mode
    }

    /// Enters a tracking mode, remembering the free-flight pose on the way
    /// in so `release` can restore it. Switching between tracking modes
    /// keeps the originally saved pose.
    pub fn set_mode(&mut self, mode: TrackMode) {
        if mode == TrackMode::Free {
            self.release();
            return;
        }

        if self.mode == TrackMode::Free {
            self.saved_pose = Some((self.position, self.orientation));
        }
        self.mode = mode;
    }

    /// Drops back to free flight, restoring the pose saved when tracking
    /// started.
    pub fn release(&mut self) {
        if let Some((position, orientation)) = self.saved_pose.take() {
            self.position = position;
            self.orientation = orientation;
        }
        self.mode = TrackMode::Free;
    }

    /// Eases the pose towards the current mode's target. Modes that need a
    /// motion direction hold still while the flock is (nearly) at rest.
    pub fn update(&mut self, flock: &Flock) {
        if flock.is_empty() {
            return;
        }

        let center = flock.center();
        let velocity = flock.average_velocity();

        let eye = match self.mode {
            TrackMode::Free => return,
            TrackMode::Tower => TOWER_EYE,
            TrackMode::Behind => {
                if velocity.length() <= MIN_TRACK_SPEED {
                    return;
                }
                let mut eye = center - velocity.normalize() * FOLLOW_DISTANCE;
                if eye.y < center.y + 5. {
                    eye.y = center.y + 5.;
                }
                eye
            }
            TrackMode::Broadside => {
                let ground_velocity = Vec3::new(velocity.x, 0., velocity.z);
                if ground_velocity.length() <= MIN_TRACK_SPEED {
                    return;
                }
                let heading = ground_velocity.normalize();
                let flank = Vec3::new(-heading.z, 0., heading.x);
                let mut eye = center + flank * FOLLOW_DISTANCE;
                eye.y = center.y;
                eye
            }
        };

        let look = normalize_or_zero(center - eye);

        self.position = self.position.lerp(eye, self.smoothness);
        if look != Vec3::ZERO {
            let blended = normalize_or_zero(self.orientation.lerp(look, self.smoothness));
            if blended != Vec3::ZERO {
                self.orientation = blended;
            }
        }
    }
}
