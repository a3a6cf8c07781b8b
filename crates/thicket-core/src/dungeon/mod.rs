//! Dungeon system
//!
//! Contains the cell grid, room shapes and placement, corridors, cleanup
//! passes and the decoration layers derived from a finished level.

mod cleanup;
mod corridor;
mod grid;
mod lattice;
mod layers;
mod placement;
mod rect;
mod room;
mod shape;

pub use cleanup::{CANOPY_DEPTH, GAP_LOOKAHEAD, MAX_SWEEPS, Pass, PostProcessor};
pub use corridor::{CorridorBuilder, carve_lattice_corridor, plan_lattice_corridors};
pub use grid::{Cell, Grid, NEIGHBOURS_4};
pub use lattice::{
    LATTICE_MARGIN, apply_noise_walls, build_lattice, has_neighbour, place_lattice_rects,
};
pub use layers::{Decoration, DerivedLayers, LAYER_MARGIN};
pub use placement::RoomPlacer;
pub use rect::Rect;
pub use room::{CorridorSpec, Direction, Room, RoomGraph};
pub use shape::{
    CELLULAR_FLOOR_CHANCE, RoomShape, SMOOTHING_PASSES, WALL_RING, single_rectangle, synthesize,
};
