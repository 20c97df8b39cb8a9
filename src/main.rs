//! Headless driver: runs the simulation against a scripted hand and logs
//! frame statistics.
//!
//! ```text
//! RUST_LOG=info handswarm --frames 600 --gesture cycle --particles 200000
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use handswarm::{
    FrameStats, FrameView, Gesture, Renderer, ScriptedPointer, SimConfig, Simulation,
    SimulationError,
};

#[derive(Debug, Parser)]
#[command(name = "handswarm", version, about = "Run the particle field headless against a scripted hand")]
struct Args {
    /// Frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Override the particle count.
    #[arg(long)]
    particles: Option<usize>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,

    /// Scripted gesture: idle, orbit, pinch or cycle.
    #[arg(long, default_value_t = Gesture::Cycle)]
    gesture: Gesture,

    /// Radius of the scripted fingertip's circle, in normalized image units.
    #[arg(long, default_value_t = 0.3)]
    radius: f64,

    /// Frames per revolution of the scripted fingertip.
    #[arg(long, default_value_t = 600.0)]
    period: f64,

    /// Deliver a detection only every N frames, like a slow tracker.
    #[arg(long, default_value_t = 2)]
    detect_every: u64,

    /// Log frame statistics every N frames.
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

/// Renderer that only reports statistics.
struct StatsLogger {
    every: u64,
}

impl Renderer for StatsLogger {
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), SimulationError> {
        if self.every == 0 || frame.frame % self.every != 0 {
            return Ok(());
        }
        let stats = FrameStats::from_view(frame);
        if !stats.all_finite {
            return Err(SimulationError::Render(format!(
                "non-finite particle position at frame {}",
                frame.frame
            )));
        }
        log::info!(
            "frame {:>6}  centroid ({:>7.2}, {:>7.2}, {:>7.2})  rms {:>6.2}  yaw {:>6.3}  pitch {:>6.3}",
            frame.frame,
            stats.centroid.x,
            stats.centroid.y,
            stats.centroid.z,
            stats.rms_radius,
            frame.rotation.yaw,
            frame.rotation.pitch,
        );
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(count) = args.particles {
        config.particle_count = count;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    log::info!(
        "simulating {} particles for {} frames, gesture {}",
        config.particle_count,
        args.frames,
        args.gesture
    );

    let mut sim = Simulation::new(config).context("building simulation")?;
    let mut hand = ScriptedPointer::new(args.gesture)
        .with_radius(args.radius)
        .with_period(args.period)
        .with_detect_every(args.detect_every);
    let mut logger = StatsLogger {
        every: args.report_every,
    };

    sim.run(&mut hand, &mut logger, Some(args.frames))?;

    let stats = sim.stats();
    log::info!(
        "done: {} frames, rms radius {:.2}, extent {:?} .. {:?}",
        sim.frame(),
        stats.rms_radius,
        stats.min,
        stats.max
    );
    Ok(())
}
