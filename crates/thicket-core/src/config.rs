//! Generator configuration
//!
//! Every field has a default, so a partial document (for example a JSON
//! file that only sets `variant`) deserializes into a complete config.
//! [`GeneratorConfig::validate`] runs before any random draw is made.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::dungeon::{RoomShape, WALL_RING};
use crate::error::{GenError, Result};

/// Which generator builds the level
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Variant {
    /// Synthesized room shapes grown into a tree of flush neighbours
    #[default]
    RoomTree,
    /// Fixed-size rooms on a lattice with noisy walls
    Lattice,
}

/// Settings for the room-tree generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomTreeConfig {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
    /// Rooms requested; fewer may be placed when slots are abandoned
    pub target_rooms: usize,
    /// Wall margin kept inside each room pattern
    pub room_edge_buffer: i32,
    /// Margin between rooms and the level edge
    pub level_edge_buffer: i32,
    /// Failed slots that may be retried over the whole run
    pub placement_retries: u32,
    /// Shapes picked from uniformly for each room
    pub shapes: Vec<RoomShape>,
    /// Fail the run instead of abandoning a room slot
    pub strict_placement: bool,
    /// Mark corridor boundary crossings as doors
    pub mark_doorways: bool,
}

impl Default for RoomTreeConfig {
    fn default() -> Self {
        // a screen is 27x17 tiles; levels span 4 to 6 screens
        Self {
            min_width: 27 * 4,
            max_width: 27 * 6,
            min_height: 17 * 4,
            max_height: 17 * 6,
            target_rooms: 7,
            room_edge_buffer: 2,
            level_edge_buffer: 4,
            placement_retries: 5,
            shapes: RoomShape::DEFAULT_MIX.to_vec(),
            strict_placement: false,
            mark_doorways: false,
        }
    }
}

/// Settings for the lattice generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub room_width: i32,
    pub room_height: i32,
    /// Deepest noise wall grown in from a room side
    pub max_border_wall_depth: i32,
    /// Noise frequency along a room side
    pub wall_noise_scale: f64,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub min_corridor_width: i32,
    pub max_corridor_width: i32,
    pub max_corridor_offset: i32,
    /// Placement attempts allowed for non-root rooms
    pub max_attempts: usize,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            room_width: 38,
            room_height: 24,
            max_border_wall_depth: 5,
            wall_noise_scale: 0.03,
            min_rooms: 4,
            max_rooms: 10,
            min_corridor_width: 4,
            max_corridor_width: 7,
            max_corridor_offset: 3,
            max_attempts: 100,
        }
    }
}

/// One layer of ground-detail clusters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailLayer {
    /// Added to both sample coordinates to decorrelate layers
    pub offset: f64,
    /// Multiplies the cell coordinate before sampling
    pub scale: f64,
    /// A cell is stamped when the sample exceeds this
    pub threshold: f64,
    /// Compare `(noise + 1) / 2` instead of the raw value
    pub remap: bool,
    pub stamp_width: i32,
    pub stamp_height: i32,
}

impl Default for DetailLayer {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
            threshold: 0.5,
            remap: false,
            stamp_width: 1,
            stamp_height: 1,
        }
    }
}

impl DetailLayer {
    /// The three stock layers: specks, small patches, large patches
    pub fn defaults() -> Vec<DetailLayer> {
        vec![
            DetailLayer::default(),
            DetailLayer {
                offset: 1000.0,
                threshold: 0.8,
                remap: true,
                stamp_width: 3,
                stamp_height: 2,
                ..DetailLayer::default()
            },
            DetailLayer {
                offset: 2000.0,
                threshold: 0.87,
                remap: true,
                stamp_width: 6,
                stamp_height: 4,
                ..DetailLayer::default()
            },
        ]
    }
}

/// Full generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub variant: Variant,
    pub room_tree: RoomTreeConfig,
    pub lattice: LatticeConfig,
    pub details: Vec<DetailLayer>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            room_tree: RoomTreeConfig::default(),
            lattice: LatticeConfig::default(),
            details: DetailLayer::defaults(),
        }
    }
}

fn check_range(field: &'static str, min: i64, max: i64) -> Result<()> {
    if min > max {
        return Err(GenError::config(
            field,
            format!("minimum {min} is greater than maximum {max}"),
        ));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(GenError::config(field, format!("must be positive, got {value}")));
    }
    Ok(())
}

impl GeneratorConfig {
    /// Reject unusable settings for every section, not just the active variant
    pub fn validate(&self) -> Result<()> {
        self.room_tree.validate()?;
        self.lattice.validate()?;
        for layer in &self.details {
            layer.validate()?;
        }
        Ok(())
    }
}

impl RoomTreeConfig {
    /// Largest padded pattern any configured shape can produce
    pub fn max_room_size(&self) -> (i32, i32) {
        let pad = self.room_edge_buffer * 2;
        self.shapes
            .iter()
            .map(RoomShape::max_interior)
            .fold((0, 0), |(w, h), (sw, sh)| (w.max(sw + pad), h.max(sh + pad)))
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("room_tree.min_width", self.min_width.into())?;
        check_positive("room_tree.min_height", self.min_height.into())?;
        check_range("room_tree.width", self.min_width.into(), self.max_width.into())?;
        check_range("room_tree.height", self.min_height.into(), self.max_height.into())?;
        check_positive("room_tree.target_rooms", self.target_rooms as i64)?;
        if self.room_edge_buffer < WALL_RING {
            return Err(GenError::config(
                "room_tree.room_edge_buffer",
                format!("must be at least {WALL_RING}, got {}", self.room_edge_buffer),
            ));
        }
        check_positive("room_tree.level_edge_buffer", self.level_edge_buffer.into())?;
        if self.shapes.is_empty() {
            return Err(GenError::config("room_tree.shapes", "at least one shape is required"));
        }

        // the root room sits at the level centre and must fit on the smallest level
        let (room_w, room_h) = self.max_room_size();
        if self.min_width / 2 + room_w >= self.min_width - self.level_edge_buffer {
            return Err(GenError::config(
                "room_tree.min_width",
                format!("{} cannot hold a {room_w}-wide room at its centre", self.min_width),
            ));
        }
        if self.min_height / 2 + room_h >= self.min_height - self.level_edge_buffer {
            return Err(GenError::config(
                "room_tree.min_height",
                format!("{} cannot hold a {room_h}-tall room at its centre", self.min_height),
            ));
        }
        Ok(())
    }
}

impl LatticeConfig {
    pub fn validate(&self) -> Result<()> {
        let interior = 2 * WALL_RING + 2;
        if self.room_width < interior || self.room_height < interior {
            return Err(GenError::config(
                "lattice.room_width",
                format!(
                    "rooms of {}x{} leave no interior inside the wall ring",
                    self.room_width, self.room_height
                ),
            ));
        }
        // walls grow inward from opposite sides and must stay inside the room
        let max_depth = self.room_width.min(self.room_height) / 2;
        if !(0..=max_depth).contains(&self.max_border_wall_depth) {
            return Err(GenError::config(
                "lattice.max_border_wall_depth",
                format!("must be within 0..={max_depth}, got {}", self.max_border_wall_depth),
            ));
        }
        if !self.wall_noise_scale.is_finite() {
            return Err(GenError::config("lattice.wall_noise_scale", "must be finite"));
        }
        check_positive("lattice.min_rooms", self.min_rooms as i64)?;
        check_range("lattice.rooms", self.min_rooms as i64, self.max_rooms as i64)?;
        check_positive("lattice.min_corridor_width", self.min_corridor_width.into())?;
        check_range(
            "lattice.corridor_width",
            self.min_corridor_width.into(),
            self.max_corridor_width.into(),
        )?;
        if self.max_corridor_offset < 0 {
            return Err(GenError::config("lattice.max_corridor_offset", "must not be negative"));
        }
        let span = self.room_width.min(self.room_height) - 2 * WALL_RING;
        if self.max_corridor_width + 2 * self.max_corridor_offset > span {
            return Err(GenError::config(
                "lattice.max_corridor_width",
                format!("corridor plus offset does not fit in a {span}-cell room interior"),
            ));
        }
        Ok(())
    }
}

impl DetailLayer {
    pub fn validate(&self) -> Result<()> {
        if self.stamp_width <= 0 || self.stamp_height <= 0 {
            return Err(GenError::config(
                "details.stamp",
                format!("stamp {}x{} is empty", self.stamp_width, self.stamp_height),
            ));
        }
        if !(self.threshold.is_finite() && self.scale.is_finite() && self.offset.is_finite()) {
            return Err(GenError::config(
                "details.threshold",
                "threshold, scale and offset must be finite",
            ));
        }
        Ok(())
    }
}
