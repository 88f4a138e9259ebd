use std::f32::consts::TAU;

use glam::{Mat4, Vec3, Vec4};

use crate::{
    math_helpers::{distance, horizontal_distance, normalize_or_zero, redirect, wrap_phase},
    obstacle::Obstacle,
    options::SimOptions,
};

/// Uniform scale applied to the render transform of every boid.
const BOID_SCALE: f32 = 0.5;

/// Below this speed a boid has no meaningful heading and renders unrotated.
const MIN_HEADING_SPEED: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
pub struct Boid {
    pub id: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    acceleration: Vec3,
    /// Exactly one boid per flock carries this; it sits at index 0 and is
    /// never subject to leader-following itself.
    pub is_leader: bool,
    /// Mirrors the flock-wide toggle; lifts the leader's sight-range cutoff.
    pub always_perceive_leader: bool,
    /// Wing-beat animation state, cosmetic only.
    pub wing_phase: f32,
    pub wing_frequency: f32,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3, id: usize, is_leader: bool) -> Self {
        Boid {
            id,
            position,
            velocity,
            acceleration: Vec3::ZERO,
            is_leader,
            always_perceive_leader: false,
            wing_phase: 0.,
            wing_frequency: 5.,
        }
    }

    /// One step's worth of steering, computed against a consistent snapshot
    /// of the flock. `others` is the full pre-step collection including this
    /// boid; every rule filters self out by requiring a nonzero distance.
    pub fn run_rules(
        &self,
        others: &[Boid],
        obstacles: &[Obstacle],
        options: &SimOptions,
    ) -> Vec3 {
        let mut sum = self.separation(others, options) * options.separation_weight
            + self.alignment(others, options) * options.alignment_weight
            + self.cohesion(others, options) * options.cohesion_weight;

        if !self.is_leader {
            sum += self.leader_follow(others, options) * options.leader_weight;
        }

        sum += self.avoid_obstacles(obstacles, options) * options.obstacle_weight;

        sum
    }

    /// Steer away from anything closer than the separation distance, with
    /// closer neighbours repelling harder.
    pub fn separation(&self, others: &[Boid], options: &SimOptions) -> Vec3 {
        let mut steer = Vec3::ZERO;
        let mut count = 0;

        for other in others {
            let d = distance(self.position, other.position);
            if d > 0. && d < options.desired_separation {
                steer += normalize_or_zero(self.position - other.position) / d;
                count += 1;
            }
        }

        if count > 0 {
            steer /= count as f32;
        }

        self.steer_towards(steer, options.max_speed, options.max_force)
    }

    /// Match the average heading of everything within perception range.
    pub fn alignment(&self, others: &[Boid], options: &SimOptions) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut count = 0;

        for other in others {
            let d = distance(self.position, other.position);
            if d > 0. && d < options.perception_radius {
                sum += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            self.steer_towards(sum / count as f32, options.max_speed, options.max_force)
        } else {
            Vec3::ZERO
        }
    }

    /// Steer towards the average position of everything within perception range.
    pub fn cohesion(&self, others: &[Boid], options: &SimOptions) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut count = 0;

        for other in others {
            let d = distance(self.position, other.position);
            if d > 0. && d < options.perception_radius {
                sum += other.position;
                count += 1;
            }
        }

        if count > 0 {
            self.seek(sum / count as f32, options)
        } else {
            Vec3::ZERO
        }
    }

    pub fn seek(&self, target: Vec3, options: &SimOptions) -> Vec3 {
        self.steer_towards(target - self.position, options.max_speed, options.max_force)
    }

    /// Chase the boid at index 0 at half speed, under a reduced force cap.
    /// The cutoff at `leader_sight_range` is lifted for boids flagged with
    /// `always_perceive_leader`. The leader itself never follows.
    pub fn leader_follow(&self, others: &[Boid], options: &SimOptions) -> Vec3 {
        if self.is_leader || others.is_empty() {
            return Vec3::ZERO;
        }

        let leader = &others[0];
        let desired = leader.position - self.position;
        let d = desired.length();

        if d > 0. && (d < options.leader_sight_range || self.always_perceive_leader) {
            self.steer_towards(
                desired,
                options.max_speed * options.leader_speed_factor,
                options.max_force * options.leader_force_factor,
            )
        } else {
            Vec3::ZERO
        }
    }

    /// Inverse-square repulsion from every obstacle within the ground-plane
    /// detection radius whose (tolerance-widened) height span the boid flies
    /// through.
    pub fn avoid_obstacles(&self, obstacles: &[Obstacle], options: &SimOptions) -> Vec3 {
        let mut steer = Vec3::ZERO;
        let mut count = 0;

        for obstacle in obstacles {
            let (low, high) = obstacle.height_range(options.obstacle_vertical_tolerance);
            let in_height_range = self.position.y >= low && self.position.y <= high;

            if horizontal_distance(self.position, obstacle.position)
                < options.obstacle_detection_radius
                && in_height_range
            {
                let diff = self.position - obstacle.position;
                let d = diff.length();
                if d > 0. {
                    steer += normalize_or_zero(diff) / (d * d);
                    count += 1;
                }
            }
        }

        if count > 0 {
            steer /= count as f32;
        }

        self.steer_towards(steer, options.max_speed, options.max_force)
    }

    /// Reynolds steering: the desired direction at the target speed minus
    /// the current velocity, capped at `max_force`. Desired directions too
    /// short to normalize produce no force.
    fn steer_towards(&self, desired: Vec3, speed: f32, max_force: f32) -> Vec3 {
        let desired = redirect(desired, speed);
        if desired == Vec3::ZERO {
            return Vec3::ZERO;
        }

        (desired - self.velocity).clamp_length_max(max_force)
    }

    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    /// Integrates one step: the accumulated acceleration is a per-step
    /// impulse (not scaled by dt), the velocity is capped, and the position
    /// advances by `velocity * dt`. Also beats the wings and clears the
    /// acceleration for the next step.
    pub fn update_location(&mut self, options: &SimOptions, dt: f32) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.clamp_length_max(options.max_speed);
        self.position += self.velocity * dt;

        self.wing_phase = wrap_phase(self.wing_phase + self.wing_frequency * TAU * dt);

        self.acceleration = Vec3::ZERO;
    }

    /// Two-stage containment: a soft velocity correction that ramps up
    /// linearly inside the boundary margin, then a hard position clamp as
    /// the backstop for boids too fast for the soft force to turn.
    pub fn contain(&mut self, options: &SimOptions) {
        let bounds = options.bounds;
        let margin = options.bound_margin;
        let turn_factor = options.turn_factor;

        if self.position.x > bounds.x - margin {
            let remaining = bounds.x - self.position.x;
            self.velocity.x -= turn_factor * (1. - remaining / margin);
        }
        if self.position.x < -bounds.x + margin {
            let remaining = self.position.x + bounds.x;
            self.velocity.x += turn_factor * (1. - remaining / margin);
        }

        if self.position.y > bounds.y - margin {
            let remaining = bounds.y - self.position.y;
            self.velocity.y -= turn_factor * (1. - remaining / margin);
        }
        if self.position.y < options.ground_level + margin {
            let remaining = self.position.y - options.ground_level;
            self.velocity.y += turn_factor * (1. - remaining / margin);
        }

        if self.position.z > bounds.z - margin {
            let remaining = bounds.z - self.position.z;
            self.velocity.z -= turn_factor * (1. - remaining / margin);
        }
        if self.position.z < -bounds.z + margin {
            let remaining = self.position.z + bounds.z;
            self.velocity.z += turn_factor * (1. - remaining / margin);
        }

        self.position.x = self.position.x.clamp(-bounds.x, bounds.x);
        self.position.y = self.position.y.clamp(options.ground_level, bounds.y);
        self.position.z = self.position.z.clamp(-bounds.z, bounds.z);
    }

    /// Render transform: translation × velocity-derived orientation × uniform
    /// scale. The up reference flips to world Z when the heading gets close
    /// to world up, keeping the basis well-formed.
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = if self.velocity.length() > MIN_HEADING_SPEED {
            let forward = self.velocity.normalize();
            let mut up = Vec3::Y;
            if forward.dot(up).abs() > 0.99 {
                up = Vec3::Z;
            }
            let right = forward.cross(up).normalize();
            let up = right.cross(forward);

            Mat4::from_cols(
                right.extend(0.),
                up.extend(0.),
                (-forward).extend(0.),
                Vec4::W,
            )
        } else {
            Mat4::IDENTITY
        };

        Mat4::from_translation(self.position) * rotation * Mat4::from_scale(Vec3::splat(BOID_SCALE))
    }
}
