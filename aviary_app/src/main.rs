use std::{fs::File, io::BufReader};

use clap_serde_derive::{clap::Parser, ClapSerde};
use glam::Vec3;
use itertools::{Itertools, MinMaxResult};
use rand::Rng;

use aviary_lib::{
    camera::{FlockCamera, TrackMode},
    flock::Flock,
    obstacle::Obstacle,
    options::{Bounds, SaveOptions, SimOptions},
    watcher::FlockWatcher,
};

mod cliargs;
use cliargs::{Args, Config};

fn main() {
    // Parse whole args with clap
    let mut args = Args::parse();

    // Get config file
    let config = if let Ok(f) = File::open(&args.config_path) {
        // Parse config with serde
        match serde_yaml::from_reader::<_, <Config as ClapSerde>::Opt>(BufReader::new(f)) {
            // merge config already parsed from clap
            Ok(config) => Config::from(config).merge(&mut args.config),
            Err(err) => panic!("Error in configuration file:\n{}", err),
        }
    } else {
        // If there is not config file return only config parsed from clap
        Config::from(&mut args.config)
    };

    let options = sim_options(&config);
    let obstacles = plant_trees(config.no_obstacles);

    let mut flock = Flock::new(&options);
    if config.always_perceive_leader {
        flock.toggle_always_perceive_leader();
    }
    if config.leader_speed > 0. {
        flock.adjust_leader_speed(config.leader_speed, &options);
    }

    let mut watcher = FlockWatcher::new(options.sample_rate);
    let mut camera = FlockCamera::new(Vec3::new(0., 60., 200.));
    if config.camera_track {
        camera.set_mode(TrackMode::Behind);
    }

    for frame in 1..=config.iterations {
        if config.churn_period > 0 && frame % config.churn_period == 0 {
            if (frame / config.churn_period) % 2 == 0 {
                flock.add_at_centroid(&options);
            } else {
                flock.remove_random();
                flock.remove_random();
            }
        }

        flock.update(&obstacles, options.frame_dt, &options);
        camera.update(&flock);
        watcher.watch(&flock);
    }

    let data = match watcher.pop_data_save(&options.save_options) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("could not save flight data: {err}");
            Vec::new()
        }
    };

    report(&flock, &camera, data.len(), &config);
}

fn sim_options(config: &Config) -> SimOptions {
    SimOptions {
        init_boids: config.no_boids,
        frame_dt: config.frame_dt,
        max_speed: config.max_speed,
        max_force: config.max_force,
        bounds: Bounds {
            x: config.bound_x,
            y: config.bound_y,
            z: config.bound_z,
        },
        sample_rate: config.sample_rate,
        save_options: SaveOptions {
            save_locations: config.save,
            save_locations_timestamp: config.save_timestamp,
            save_locations_path: Some("./".to_owned()),
        },
        ..Default::default()
    }
}

/// World setup: obstacles scattered over the ground plane, plus one sentinel
/// tree at the origin.
fn plant_trees(count: usize) -> Vec<Obstacle> {
    let mut rng = rand::thread_rng();

    let mut trees: Vec<Obstacle> = (0..count)
        .map(|_| {
            Obstacle::new(
                Vec3::new(
                    rng.gen_range(-500.0..500.0),
                    -5.0,
                    rng.gen_range(-500.0..500.0),
                ),
                rng.gen_range(0.5..1.0),
                rng.gen_range(20.0..100.0),
            )
        })
        .collect();

    trees.push(Obstacle::new(Vec3::new(0., 0., 0.), 0.5, 100.));

    trees
}

fn report(flock: &Flock, camera: &FlockCamera, no_records: usize, config: &Config) {
    let center = flock.center();
    println!("boids: {}", flock.len());
    println!(
        "flock center: [{:.1}, {:.1}, {:.1}]",
        center.x, center.y, center.z
    );

    match flock.boids().iter().map(|b| b.velocity.length()).minmax() {
        MinMaxResult::NoElements => println!("flock is empty"),
        MinMaxResult::OneElement(speed) => println!("speed: {:.2}", speed),
        MinMaxResult::MinMax(slowest, fastest) => {
            println!("speed: {:.2} to {:.2}", slowest, fastest)
        }
    }

    if config.camera_track {
        println!(
            "camera: [{:.1}, {:.1}, {:.1}] looking [{:.2}, {:.2}, {:.2}]",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.orientation.x,
            camera.orientation.y,
            camera.orientation.z
        );
    }

    println!("records collected: {}", no_records);
}
