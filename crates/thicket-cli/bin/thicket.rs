//! thicket: generate a forest dungeon level and print it
//!
//! Main entry point for the command-line generator.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::Level as LogLevel;
use tracing::error;

use thicket_cli::{CliError, LevelSummary, load_config, render_ascii};
use thicket_core::{GameRng, GeneratorConfig, LevelPipeline, Variant};

/// Seeded forest dungeon generator
#[derive(Parser, Debug)]
#[command(name = "thicket")]
#[command(author, version, about = "Generate a tile dungeon level from a seed", long_about = None)]
struct Args {
    /// Seed to generate from (random if omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Generator variant (room_tree or lattice)
    #[arg(short = 'g', long = "variant")]
    variant: Option<Variant>,

    /// Number of rooms the room-tree generator aims for
    #[arg(short = 'r', long = "rooms")]
    rooms: Option<usize>,

    /// JSON configuration file; missing fields keep their defaults
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Print a JSON summary instead of the map
    #[arg(long = "json")]
    json: bool,

    /// Draw decoration layers over the map
    #[arg(short = 'l', long = "layers")]
    layers: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LogLevel::WARN,
        1 => LogLevel::INFO,
        _ => LogLevel::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String, CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(rooms) = args.rooms {
        config.room_tree.target_rooms = rooms;
    }

    let seed = args.seed.unwrap_or_else(|| GameRng::from_entropy().seed());
    let level = LevelPipeline::new(config)?.generate(seed)?;

    if args.json {
        let mut text = serde_json::to_string_pretty(&LevelSummary::from(&level))?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(format!("seed {seed}\n{}", render_ascii(&level, args.layers)))
    }
}
