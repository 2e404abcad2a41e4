//! HoloHUD CLI - Main entry point
//!
//! Runs the overlay logic without a browser: replays recorded MediaPipe output
//! through a demo's mapper, previews asset normalization and prints the HUD.

mod replay;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use holohud_core::{Bounds, Config, Demo, Normalization};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "holohud")]
#[command(about = "Holographic HUD overlay tools")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "holohud.toml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON-lines landmark recording through a demo
    Replay {
        /// Demo to drive (defaults to the configured one)
        #[arg(short, long)]
        demo: Option<Demo>,

        /// Recording, one detection per line
        #[arg(short, long)]
        input: PathBuf,

        /// Pace frames by their recorded timestamps and tick the HUD clock
        #[arg(long)]
        realtime: bool,

        /// Model bounds minimum corner, used in place of a loaded asset
        #[arg(long, value_parser = parse_vec3, default_value = "-0.5,-0.5,-0.5", allow_hyphen_values = true)]
        min: Vec3,

        /// Model bounds maximum corner
        #[arg(long, value_parser = parse_vec3, default_value = "0.5,0.5,0.5", allow_hyphen_values = true)]
        max: Vec3,
    },
    /// Show how a model with the given bounds would be scaled and centered
    Normalize {
        #[arg(short, long)]
        demo: Demo,

        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        min: Vec3,

        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        max: Vec3,
    },
    /// Print the HUD clock once
    Hud,
    /// Write a default configuration file
    InitConfig {
        #[arg(short, long, default_value = "holohud.toml")]
        path: PathBuf,
    },
}

/// `x,y,z` to a vector
fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{}': {}", p.trim(), e)))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("HoloHUD v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Replay {
            demo,
            input,
            realtime,
            min,
            max,
        } => {
            let config = load_config(&args.config)?;
            let demo = demo.unwrap_or(config.demo.kind);
            let frames = replay::load(&input)?;
            let bounds = Bounds::new(min, max);
            info!(%demo, frames = frames.len(), realtime, "Replaying recording");

            let report = if realtime {
                let refresh = Duration::from_millis(config.hud.refresh_ms);
                replay::run_realtime(&frames, demo, &bounds, refresh).await?
            } else {
                replay::run(&frames, demo, &bounds)
            };
            report.print();
        }
        Command::Normalize { demo, min, max } => {
            let Some(policy) = demo.normalize_policy() else {
                bail!("The {} demo has no model to normalize", demo);
            };
            let bounds = Bounds::new(min, max);
            let normalization = Normalization::from_bounds(&bounds, policy);
            if !normalization.is_finite() {
                bail!("Bounds {:?}..{:?} have no extent to normalize", min, max);
            }
            let placed = normalization.normalized_bounds(&bounds);

            println!("{} model:", demo);
            println!("  size        {:.4?}", normalization.size.to_array());
            println!("  center      {:.4?}", normalization.center.to_array());
            println!("  scale       {:.6}", normalization.scale);
            println!("  translation {:.4?}", normalization.translation.to_array());
            println!("  bounds      {:.4?} .. {:.4?}", placed.min.to_array(), placed.max.to_array());
        }
        Command::Hud => replay::print_hud(),
        Command::InitConfig { path } => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            Config::save_default(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1, -2.5,3").unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,b,3").is_err());
    }

    #[test]
    fn test_replay_arguments() {
        let args = Args::try_parse_from([
            "holohud",
            "replay",
            "--demo",
            "computer",
            "--input",
            "frames.jsonl",
            "--min",
            "-1,-1,-1",
        ])
        .unwrap();
        match args.command {
            Command::Replay {
                demo, min, max, realtime, ..
            } => {
                assert_eq!(demo, Some(Demo::Computer));
                assert_eq!(min, Vec3::splat(-1.0));
                assert_eq!(max, Vec3::splat(0.5));
                assert!(!realtime);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.config, PathBuf::from("holohud.toml"));
    }

    #[test]
    fn test_unknown_demo_is_rejected() {
        assert!(Args::try_parse_from(["holohud", "normalize", "--demo", "tower", "--min", "0,0,0", "--max", "1,1,1"]).is_err());
    }
}
