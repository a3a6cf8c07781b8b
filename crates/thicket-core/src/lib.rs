//! thicket-core: seeded level generation for tile-based forest dungeons
//!
//! This crate builds complete levels (a cell grid, the room graph and the
//! decoration layers drawn over it) from a single seed. It has no I/O
//! dependencies; logging goes through `tracing` and is silent unless the
//! caller installs a subscriber.
//!
//! ```no_run
//! let level = thicket_core::generate(42)?;
//! println!("{}", level.grid);
//! # Ok::<(), thicket_core::GenError>(())
//! ```

pub mod config;
pub mod dungeon;
pub mod error;
pub mod pipeline;
pub mod rng;
pub mod source;

pub use config::{GeneratorConfig, Variant};
pub use error::{GenError, Result};
pub use pipeline::{Level, LevelPipeline, generate};
pub use rng::GameRng;
pub use source::{NoiseSource, SeededNoise};
