use std::{fs::OpenOptions, mem};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{flock::Flock, options::SaveOptions};

const PREFIX: &str = "aviary-data";

/// One sampled boid, flattened for CSV.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct BoidRecord {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub speed: f32,
    pub is_leader: bool,
    pub time: u64,
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("could not open data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not write data point: {0}")]
    Csv(#[from] csv::Error),
}

/// Accumulates flock samples over a run and dumps them as CSV at the end.
pub struct FlockWatcher {
    records: Vec<BoidRecord>,
    render_ticker: u64,
    sample_rate: u64,
}

impl FlockWatcher {
    pub fn new(sample_rate: u64) -> Self {
        FlockWatcher {
            records: Vec::new(),
            render_ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Triggers data collection; only every `sample_rate`-th call samples.
    pub fn watch(&mut self, flock: &Flock) {
        if !self.should_sample() {
            return;
        }

        let time = self.render_ticker / self.sample_rate;
        self.records.extend(flock.boids().iter().map(|b| BoidRecord {
            id: b.id,
            x: b.position.x,
            y: b.position.y,
            z: b.position.z,
            speed: b.velocity.length(),
            is_leader: b.is_leader,
            time,
        }));
    }

    pub fn restart(&mut self) {
        self.records.clear();
    }

    pub fn pop_data(&mut self) -> Vec<BoidRecord> {
        mem::take(&mut self.records)
    }

    /// Returns the accumulated data, emptying the watcher, after saving it
    /// as CSV when the save options ask for it. Depending on the options the
    /// file is either timestamped or overwritten in place.
    pub fn pop_data_save(
        &mut self,
        save_options: &SaveOptions,
    ) -> Result<Vec<BoidRecord>, WatchError> {
        let data = self.pop_data();

        if !save_options.save_locations {
            return Ok(data);
        }

        if let Some(path) = &save_options.save_locations_path {
            let file_path = format!(
                "{path}{file_name}",
                file_name = FlockWatcher::dataset_name(save_options, Utc::now())
            );

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(file_path)?;
            let mut wtr = csv::Writer::from_writer(file);

            for record in &data {
                wtr.serialize(record)?;
            }
            wtr.flush()?;
        }

        Ok(data)
    }

    fn dataset_name(save_options: &SaveOptions, now: DateTime<Utc>) -> String {
        match save_options.save_locations_timestamp {
            true => format!("{PREFIX}_{datetime}.csv", datetime = now.timestamp_millis()),
            false => format!("{PREFIX}.csv"),
        }
    }

    fn should_sample(&mut self) -> bool {
        self.render_ticker += 1;

        self.render_ticker % self.sample_rate == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use glam::Vec3;

    use crate::{
        flock::Flock,
        options::{SaveOptions, SimOptions},
    };

    use super::FlockWatcher;

    fn two_boid_flock() -> Flock {
        let options = SimOptions {
            init_boids: 0,
            ..Default::default()
        };
        let mut flock = Flock::new(&options);
        flock.add_at(Vec3::new(0., 50., 0.), Vec3::new(3., 4., 0.), &options);
        flock.add_at(Vec3::new(10., 50., 0.), Vec3::ZERO, &options);
        flock
    }

    #[test]
    fn name_timestamped() {
        let save_options = SaveOptions {
            save_locations: true,
            save_locations_path: Some("".to_owned()),
            save_locations_timestamp: true,
        };
        let dt = Utc.timestamp_millis_opt(1668038059490).unwrap();

        let actual = FlockWatcher::dataset_name(&save_options, dt);

        assert_eq!(actual, "aviary-data_1668038059490.csv");
    }

    #[test]
    fn name_overwrite() {
        let save_options = SaveOptions {
            save_locations: true,
            save_locations_path: Some("".to_owned()),
            save_locations_timestamp: false,
        };
        let dt = Utc.timestamp_millis_opt(1668038059490).unwrap();

        let actual = FlockWatcher::dataset_name(&save_options, dt);

        assert_eq!(actual, "aviary-data.csv");
    }

    #[test]
    fn samples_at_the_configured_rate() {
        let flock = two_boid_flock();
        let mut watcher = FlockWatcher::new(2);

        for _ in 0..4 {
            watcher.watch(&flock);
        }

        let data = watcher.pop_data();
        // 2 samples of 2 boids each
        assert_eq!(data.len(), 4);
        assert!(watcher.pop_data().is_empty());
    }

    #[test]
    fn records_carry_leadership_and_speed() {
        let flock = two_boid_flock();
        let mut watcher = FlockWatcher::new(1);

        watcher.watch(&flock);
        let data = watcher.pop_data();

        assert!(data[0].is_leader);
        assert!(!data[1].is_leader);
        assert!((data[0].speed - 5.).abs() < 1e-4);
        assert_eq!(data[1].x, 10.);
    }
}
