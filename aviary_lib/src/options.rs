use serde::{Deserialize, Serialize};

/// Behavioral parameters for the whole simulation, passed into every flock
/// and boid operation rather than stored per agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimOptions {
    pub init_boids: usize,
    /// Fixed frame time used by headless drivers, seconds.
    pub frame_dt: f32,

    pub max_speed: f32,
    pub max_force: f32,

    pub perception_radius: f32,
    pub desired_separation: f32,

    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub leader_weight: f32,
    pub obstacle_weight: f32,

    /// Distance beyond which a follower loses sight of the leader, unless its
    /// `always_perceive_leader` flag is set.
    pub leader_sight_range: f32,
    /// Followers aim at a fraction of `max_speed` when chasing the leader.
    pub leader_speed_factor: f32,
    /// The leader-follow steering force is capped at this fraction of `max_force`.
    pub leader_force_factor: f32,
    /// Cap on the leader's speed when the host adjusts it directly.
    pub leader_max_speed: f32,

    /// Ground-plane radius within which an obstacle repels.
    pub obstacle_detection_radius: f32,
    /// Tolerance band around an obstacle's height span. The reference
    /// behavior uses a band wide enough to accept any flight altitude;
    /// tighten it here rather than in code.
    pub obstacle_vertical_tolerance: f32,

    pub bounds: Bounds,
    pub ground_level: f32,
    pub bound_margin: f32,
    pub turn_factor: f32,

    pub spawn_position_extent: f32,
    pub spawn_velocity_extent: f32,

    /// Wing beats per second, cosmetic only.
    pub wing_frequency: f32,

    pub sample_rate: u64,
    pub save_options: SaveOptions,
}

impl Default for SimOptions {
    fn default() -> Self {
        SimOptions {
            init_boids: 50,
            frame_dt: 1. / 60.,

            max_speed: 75.0,
            max_force: 0.5,

            perception_radius: 50.0,
            desired_separation: 25.0,

            separation_weight: 2.0,
            alignment_weight: 0.4,
            cohesion_weight: 0.4,
            leader_weight: 1.5,
            obstacle_weight: 30.0,

            leader_sight_range: 100.0,
            leader_speed_factor: 0.5,
            leader_force_factor: 0.8,
            leader_max_speed: 100.0,

            obstacle_detection_radius: 15.0,
            obstacle_vertical_tolerance: 1000.0,

            bounds: Bounds {
                x: 600.0,
                y: 200.0,
                z: 600.0,
            },
            ground_level: 10.0,
            bound_margin: 30.0,
            turn_factor: 10.0,

            spawn_position_extent: 5.0,
            spawn_velocity_extent: 1.0,

            wing_frequency: 5.0,

            sample_rate: 1,
            save_options: SaveOptions {
                save_locations: false,
                save_locations_path: Some("./".to_owned()),
                save_locations_timestamp: true,
            },
        }
    }
}

/// Axis-aligned half-extents of the flight volume. X and Z are symmetric
/// around the origin; Y spans from the ground offset up to `y`.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOptions {
    pub save_locations: bool,
    pub save_locations_path: Option<String>,
    pub save_locations_timestamp: bool,
}

#[cfg(test)]
mod tests {
    use super::SimOptions;

    #[test]
    fn separation_is_tighter_than_perception() {
        let options = SimOptions::default();

        assert!(options.desired_separation < options.perception_radius);
    }

    #[test]
    fn margin_fits_inside_bounds() {
        let options = SimOptions::default();

        assert!(options.bound_margin < options.bounds.x);
        assert!(options.bound_margin < options.bounds.y - options.ground_level);
        assert!(options.bound_margin < options.bounds.z);
    }
}
