//! Level generation pipeline
//!
//! One call runs every stage in order against a single noise source:
//! room synthesis and placement, corridors, cleanup, then the derived
//! decoration layers. Nothing is shared between calls.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{GeneratorConfig, Variant};
use crate::dungeon::{
    CorridorBuilder, CorridorSpec, DerivedLayers, Grid, PostProcessor, RoomGraph, RoomPlacer,
    apply_noise_walls, build_lattice, carve_lattice_corridor, plan_lattice_corridors,
};
use crate::error::Result;
use crate::source::{NoiseSource, SeededNoise};

/// A finished level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub seed: u64,
    pub variant: Variant,
    pub grid: Grid,
    pub rooms: RoomGraph,
    /// Planned corridor strips (lattice levels only)
    pub corridors: Vec<CorridorSpec>,
    pub layers: DerivedLayers,
}

impl Level {
    /// Where the player starts: the centre of the first room
    pub fn spawn_point(&self) -> Option<(i32, i32)> {
        self.rooms.spawn_point()
    }
}

/// Validated generator configuration, ready to build levels
#[derive(Debug, Clone)]
pub struct LevelPipeline {
    config: GeneratorConfig,
}

impl LevelPipeline {
    /// Fails with `InvalidConfig` before any generation work is done
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the level for `seed`; the same seed always gives the same level
    pub fn generate(&self, seed: u64) -> Result<Level> {
        let mut source = SeededNoise::new(seed);
        self.generate_with(seed, &mut source)
    }

    /// Build a level drawing from an explicit source. `seed` is only recorded.
    pub fn generate_with<R: NoiseSource>(&self, seed: u64, source: &mut R) -> Result<Level> {
        let level = match self.config.variant {
            Variant::RoomTree => self.room_tree(seed, source)?,
            Variant::Lattice => self.lattice(seed, source)?,
        };
        info!(
            seed,
            variant = %level.variant,
            width = level.grid.width(),
            height = level.grid.height(),
            rooms = level.rooms.len(),
            "level generated"
        );
        Ok(level)
    }

    fn room_tree<R: NoiseSource>(&self, seed: u64, rng: &mut R) -> Result<Level> {
        let config = &self.config.room_tree;
        let width = rng.uniform_int(config.min_width, config.max_width);
        let height = rng.uniform_int(config.min_height, config.max_height);
        info!(width, height, "generating room-tree level");

        let mut grid = Grid::new(width, height);
        let rooms = RoomPlacer::from_config(config).place_rooms(&mut grid, rng)?;
        CorridorBuilder::new(config.room_edge_buffer, config.mark_doorways)
            .build_corridors(&mut grid, &rooms, rng)?;
        PostProcessor::room_tree(config.level_edge_buffer).run(&mut grid)?;

        let layers =
            DerivedLayers::compute(&grid, &rooms, Variant::RoomTree, &self.config.details, &*rng);
        Ok(Level {
            seed,
            variant: Variant::RoomTree,
            grid,
            rooms,
            corridors: Vec::new(),
            layers,
        })
    }

    fn lattice<R: NoiseSource>(&self, seed: u64, rng: &mut R) -> Result<Level> {
        let config = &self.config.lattice;
        let (mut grid, rooms) = build_lattice(config, rng)?;
        apply_noise_walls(&mut grid, &rooms, config, rng)?;

        let corridors = plan_lattice_corridors(&rooms, config, rng);
        for spec in &corridors {
            carve_lattice_corridor(&mut grid, &rooms, spec)?;
        }
        PostProcessor::lattice().run(&mut grid)?;

        let layers =
            DerivedLayers::compute(&grid, &rooms, Variant::Lattice, &self.config.details, &*rng);
        Ok(Level {
            seed,
            variant: Variant::Lattice,
            grid,
            rooms,
            corridors,
            layers,
        })
    }
}

/// Generate a level with the default configuration
pub fn generate(seed: u64) -> Result<Level> {
    LevelPipeline::new(GeneratorConfig::default())?.generate(seed)
}
