use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[derive(ClapSerde)]
#[command(author = "aviary", version, about, long_about = None)]
/// Headless 3D flocking simulation with a leader-led flock, static
/// obstacles and a tracking camera.
pub struct Args {
    /// Config file
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Run configuration
///
/// Every field has a default; a YAML file passed via `-c`/`--config`
/// overrides the defaults, and explicit CLI flags override both.
pub struct Config {
    #[default(50)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub no_boids: usize,

    #[default(2000)]
    #[arg(short = 'i', long)]
    /// number of simulation frames to run
    pub iterations: u64,

    #[default(4)]
    #[arg(short = 'r', long)]
    /// ratio of frames/sample_rate, e.g. 4 = sample every 4th frame
    pub sample_rate: u64,

    #[default(true)]
    #[arg(short = 's', long)]
    pub save: bool,

    #[default(false)]
    #[arg(short = 't', long)]
    pub save_timestamp: bool,

    #[default(0.016)]
    #[arg(long = "dt")]
    /// fixed frame time in seconds
    pub frame_dt: f32,

    #[default(600.)]
    #[arg(short = 'x', long)]
    pub bound_x: f32,

    #[default(200.)]
    #[arg(short = 'y', long)]
    pub bound_y: f32,

    #[default(600.)]
    #[arg(short = 'z', long)]
    pub bound_z: f32,

    #[default(15)]
    #[arg(long = "trees")]
    /// number of randomly planted obstacles
    pub no_obstacles: usize,

    #[default(75.)]
    #[arg(long = "max_speed")]
    pub max_speed: f32,

    #[default(0.5)]
    #[arg(long = "max_force")]
    pub max_force: f32,

    #[default(0)]
    #[arg(long = "churn")]
    /// every n frames alternately hatch one boid into the flock center and
    /// cull two; 0 leaves the population alone
    pub churn_period: u64,

    #[default(0.)]
    #[arg(long = "leader_speed")]
    /// push the leader to this speed at the start of the run, keeping its
    /// heading; 0 leaves it to the flocking rules
    pub leader_speed: f32,

    #[default(false)]
    #[arg(long = "keen_followers")]
    /// followers never lose sight of the leader
    pub always_perceive_leader: bool,

    #[default(false)]
    #[arg(long = "track")]
    /// trail the flock with the camera and report its pose
    pub camera_track: bool,
}
