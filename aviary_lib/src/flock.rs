use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use crate::{boid::Boid, obstacle::Obstacle, options::SimOptions};

/// A near-stationary leader cannot be rescaled; below this speed a positive
/// adjustment kicks it off along +Z instead.
const MIN_STEERABLE_SPEED: f32 = 0.1;

/// Owns the boid collection. The boid at index 0 is the leader as soon as
/// the flock is non-empty; it is created first and removal never touches it.
pub struct Flock {
    boids: Vec<Boid>,
    always_perceive_leader: bool,
    rng: Xoshiro256Plus,
    next_id: usize,
}

impl Flock {
    pub fn new(options: &SimOptions) -> Self {
        let mut flock = Flock {
            boids: Vec::with_capacity(options.init_boids),
            always_perceive_leader: false,
            rng: Xoshiro256Plus::from_entropy(),
            next_id: 0,
        };

        for _ in 0..options.init_boids {
            flock.add(options);
        }

        flock
    }

    /// Appends one boid at a random position and velocity within the spawn
    /// ranges. The first boid ever added becomes the leader.
    pub fn add(&mut self, options: &SimOptions) {
        let p = options.spawn_position_extent;
        let v = options.spawn_velocity_extent;
        let position = Vec3::new(
            self.rng.gen_range(-p..p),
            self.rng.gen_range(-p..p),
            self.rng.gen_range(-p..p),
        );
        let velocity = Vec3::new(
            self.rng.gen_range(-v..v),
            self.rng.gen_range(-v..v),
            self.rng.gen_range(-v..v),
        );

        self.hatch(position, velocity, options);
    }

    /// Appends one boid with explicit state, same leader rule as `add`.
    pub fn add_at(&mut self, position: Vec3, velocity: Vec3, options: &SimOptions) {
        self.hatch(position, velocity, options);
    }

    /// Spawns into the middle of the group: flock center, flock average
    /// velocity. Falls back to a random spawn when the flock is empty.
    pub fn add_at_centroid(&mut self, options: &SimOptions) {
        if self.boids.is_empty() {
            self.add(options);
        } else {
            self.hatch(self.center(), self.average_velocity(), options);
        }
    }

    fn hatch(&mut self, position: Vec3, velocity: Vec3, options: &SimOptions) {
        let is_leader = self.boids.is_empty();
        let mut boid = Boid::new(position, velocity, self.next_id, is_leader);
        self.next_id += 1;

        boid.wing_phase = self.rng.gen_range(0.0..TAU);
        boid.wing_frequency = options.wing_frequency;
        if !is_leader {
            boid.always_perceive_leader = self.always_perceive_leader;
        }

        self.boids.push(boid);
    }

    /// Removes one boid chosen uniformly among the non-leaders. A flock of
    /// one (or none) is left untouched; index 0 is never a candidate.
    pub fn remove_random(&mut self) {
        if self.boids.len() > 1 {
            let index = self.rng.gen_range(1..self.boids.len());
            self.boids.remove(index);
        }
    }

    /// Advances every boid one step. Steering for the whole pass is computed
    /// against the pre-step collection, so no boid ever perceives a
    /// neighbour's already-updated state; forces are applied only once every
    /// acceleration is known. Neighbour search is brute force over the
    /// whole collection.
    pub fn update(&mut self, obstacles: &[Obstacle], dt: f32, options: &SimOptions) {
        let mut accelerations: Vec<Vec3> = Vec::with_capacity(self.boids.len());

        for boid in self.boids.iter() {
            accelerations.push(boid.run_rules(&self.boids, obstacles, options));
        }

        for (boid, acceleration) in self.boids.iter_mut().zip(accelerations) {
            boid.apply_force(acceleration);
            boid.update_location(options, dt);
            boid.contain(options);
        }
    }

    /// Flips the flock-wide flag and broadcasts it onto every non-leader
    /// immediately; newly hatched boids inherit the current value.
    pub fn toggle_always_perceive_leader(&mut self) {
        self.always_perceive_leader = !self.always_perceive_leader;

        for boid in self.boids.iter_mut().skip(1) {
            boid.always_perceive_leader = self.always_perceive_leader;
        }
    }

    pub fn always_perceives_leader(&self) -> bool {
        self.always_perceive_leader
    }

    /// Host-facing leader steering: changes the magnitude of the leader's
    /// velocity by `delta`, preserving its direction, clamped to
    /// `[0, leader_max_speed]`. A leader at rest given a positive delta
    /// starts off along +Z.
    pub fn adjust_leader_speed(&mut self, delta: f32, options: &SimOptions) {
        let Some(leader) = self.boids.first_mut() else {
            return;
        };

        let speed = leader.velocity.length();
        if speed > MIN_STEERABLE_SPEED {
            let target = (speed + delta).clamp(0., options.leader_max_speed);
            leader.velocity = leader.velocity / speed * target;
        } else if delta > 0. {
            leader.velocity = Vec3::new(0., 0., delta.min(options.leader_max_speed));
        }
    }

    /// Mean position of the flock; zero when empty. Consumed by camera
    /// tracking and the centroid spawn.
    pub fn center(&self) -> Vec3 {
        if self.boids.is_empty() {
            return Vec3::ZERO;
        }

        self.boids.iter().map(|b| b.position).sum::<Vec3>() / self.boids.len() as f32
    }

    /// Mean velocity of the flock; zero when empty.
    pub fn average_velocity(&self) -> Vec3 {
        if self.boids.is_empty() {
            return Vec3::ZERO;
        }

        self.boids.iter().map(|b| b.velocity).sum::<Vec3>() / self.boids.len() as f32
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use crate::{obstacle::Obstacle, options::SimOptions};

    use super::Flock;

    fn empty_options() -> SimOptions {
        SimOptions {
            init_boids: 0,
            ..Default::default()
        }
    }

    #[test]
    fn first_boid_is_the_leader() {
        let options = empty_options();
        let mut flock = Flock::new(&options);

        flock.add(&options);
        flock.add(&options);

        assert!(flock.boids()[0].is_leader);
        assert!(!flock.boids()[1].is_leader);
    }

    #[test]
    fn explicit_add_places_the_boid() {
        let options = empty_options();
        let mut flock = Flock::new(&options);

        flock.add_at(Vec3::new(1., 2., 3.), Vec3::new(0., 1., 0.), &options);

        assert_eq!(flock.boids()[0].position, Vec3::new(1., 2., 3.));
        assert_eq!(flock.boids()[0].velocity, Vec3::new(0., 1., 0.));
        assert!(flock.boids()[0].is_leader);
    }

    #[test]
    fn centroid_spawn_lands_in_the_middle() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        flock.add_at(Vec3::new(0., 20., 0.), Vec3::new(1., 0., 0.), &options);
        flock.add_at(Vec3::new(10., 40., 0.), Vec3::new(3., 0., 0.), &options);

        flock.add_at_centroid(&options);

        let hatched = flock.boids()[2];
        assert_eq!(hatched.position, Vec3::new(5., 30., 0.));
        assert_eq!(hatched.velocity, Vec3::new(2., 0., 0.));
    }

    #[test]
    fn removal_spares_the_leader() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        for _ in 0..8 {
            flock.add(&options);
        }
        let leader_id = flock.boids()[0].id;

        for _ in 0..20 {
            flock.remove_random();
            assert!(!flock.is_empty());
            assert!(flock.boids()[0].is_leader);
            assert_eq!(flock.boids()[0].id, leader_id);
        }

        assert_eq!(flock.len(), 1);
    }

    #[test]
    fn removal_on_a_lone_leader_is_a_noop() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        flock.add(&options);

        flock.remove_random();

        assert_eq!(flock.len(), 1);
    }

    #[test]
    fn toggle_broadcasts_to_every_follower() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        for _ in 0..5 {
            flock.add(&options);
        }

        flock.toggle_always_perceive_leader();

        assert!(flock
            .boids()
            .iter()
            .skip(1)
            .all(|b| b.always_perceive_leader));

        // a boid hatched after the toggle inherits the flag
        flock.add(&options);
        assert!(flock.boids()[5].always_perceive_leader);
    }

    #[test]
    fn double_toggle_round_trips() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        for _ in 0..5 {
            flock.add(&options);
        }
        let before: Vec<bool> = flock.boids().iter().map(|b| b.always_perceive_leader).collect();

        flock.toggle_always_perceive_leader();
        flock.toggle_always_perceive_leader();

        let after: Vec<bool> = flock.boids().iter().map(|b| b.always_perceive_leader).collect();
        assert_eq!(before, after);
        assert!(!flock.always_perceives_leader());
    }

    #[test]
    fn leader_speed_adjusts_along_its_heading() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        flock.add_at(Vec3::new(0., 100., 0.), Vec3::new(3., 4., 0.), &options);

        flock.adjust_leader_speed(10., &options);

        let velocity = flock.boids()[0].velocity;
        assert!((velocity.length() - 15.).abs() < 1e-3);
        assert!((velocity.x / velocity.y - 3. / 4.).abs() < 1e-4);

        // draining more than the current speed parks the leader
        flock.adjust_leader_speed(-200., &options);
        assert!(flock.boids()[0].velocity.length() < 1e-3);

        // and a push from rest starts it along +Z
        flock.adjust_leader_speed(5., &options);
        assert_eq!(flock.boids()[0].velocity, Vec3::new(0., 0., 5.));
    }

    #[test]
    fn leader_speed_is_clamped() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        flock.add_at(Vec3::new(0., 100., 0.), Vec3::new(0., 0., 90.), &options);

        flock.adjust_leader_speed(50., &options);

        assert!((flock.boids()[0].velocity.length() - options.leader_max_speed).abs() < 1e-3);
    }

    #[test]
    fn update_keeps_every_boid_under_the_speed_cap() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        // a tight mid-air grid, far from the bounds so only steering acts
        for i in 0..30 {
            flock.add_at(
                Vec3::new(
                    (i % 5) as f32 * 3. - 6.,
                    100. + (i / 5) as f32 * 2.,
                    (i % 7) as f32 * 2. - 6.,
                ),
                Vec3::new(1., -0.5, 0.5) * (i % 3) as f32,
                &options,
            );
        }
        let obstacles = [Obstacle::new(Vec3::new(0., -5., 0.), 0.5, 100.)];

        for _ in 0..10 {
            flock.update(&obstacles, options.frame_dt, &options);
            for boid in flock.boids() {
                assert!(boid.velocity.length() <= options.max_speed + 1e-3);
            }
        }
    }

    #[test]
    fn update_stays_inside_the_bounds() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        flock.add_at(Vec3::new(0., 100., 0.), Vec3::ZERO, &options);
        flock.add_at(
            Vec3::new(2000., 300., -2000.),
            Vec3::new(120., 0., 0.),
            &options,
        );

        flock.update(&[], options.frame_dt, &options);

        let bounds = options.bounds;
        for boid in flock.boids() {
            assert!(boid.position.x.abs() <= bounds.x);
            assert!(boid.position.y >= options.ground_level && boid.position.y <= bounds.y);
            assert!(boid.position.z.abs() <= bounds.z);
        }
    }

    /// A mirror-symmetric pair must stay mirror-symmetric: if an update pass
    /// leaked one boid's freshly updated state into the other's neighbour
    /// query, the pair would drift apart asymmetrically.
    #[test]
    fn update_observes_a_consistent_snapshot() {
        let options = empty_options();
        let mut flock = Flock::new(&options);
        // leader parked far outside everyone's perception and sight ranges
        flock.add_at(Vec3::new(-500., 110., 0.), Vec3::ZERO, &options);
        flock.add_at(Vec3::new(200., 100., 10.), Vec3::new(0., 0., -1.), &options);
        flock.add_at(Vec3::new(200., 100., -10.), Vec3::new(0., 0., 1.), &options);

        for _ in 0..5 {
            flock.update(&[], options.frame_dt, &options);

            let a = flock.boids()[1];
            let b = flock.boids()[2];
            assert_eq!(a.position.x, b.position.x);
            assert_eq!(a.position.y, b.position.y);
            assert_eq!(a.position.z, -b.position.z);
            assert_eq!(a.velocity.z, -b.velocity.z);
        }
    }

    #[test]
    fn empty_flock_reports_zero_aggregates() {
        let options = empty_options();
        let flock = Flock::new(&options);

        assert!(flock.is_empty());
        assert_eq!(flock.center(), Vec3::ZERO);
        assert_eq!(flock.average_velocity(), Vec3::ZERO);
    }
}
