use flock::Flock;
use obstacle::Obstacle;
use options::SimOptions;
use watcher::{BoidRecord, FlockWatcher, WatchError};

pub mod boid;
pub mod camera;
pub mod flock;
pub mod math_helpers;
pub mod obstacle;
pub mod options;
pub mod watcher;

/// Headless driver: spawns a flock, steps it `no_iter` times at the
/// configured frame time against the given obstacle list, and returns the
/// sampled data (saving it per the save options).
pub fn flock_base(
    no_iter: u64,
    options: SimOptions,
    obstacles: &[Obstacle],
) -> Result<Vec<BoidRecord>, WatchError> {
    let mut flock = Flock::new(&options);
    let mut watcher = FlockWatcher::new(options.sample_rate);

    (0..no_iter).for_each(|_| {
        flock.update(obstacles, options.frame_dt, &options);
        watcher.watch(&flock);
    });

    watcher.pop_data_save(&options.save_options)
}

#[cfg(test)]
mod tests {
    use crate::options::SimOptions;

    use super::flock_base;

    #[test]
    fn headless_run_samples_every_boid() {
        let options = SimOptions {
            init_boids: 8,
            sample_rate: 5,
            ..Default::default()
        };

        let data = flock_base(10, options, &[]).unwrap();

        assert_eq!(data.len(), 2 * 8);
        assert!(data.iter().filter(|r| r.is_leader).count() == 2);
    }
}
