//! thicket-cli: text output for generated levels
//!
//! Renders a [`Level`] as ASCII, optionally with its decoration layers
//! drawn over the cells, or summarises it as JSON.

use std::path::Path;

use serde::Serialize;
use thicket_core::dungeon::{Decoration, Direction, RoomShape};
use thicket_core::{GenError, GeneratorConfig, Level, Variant};
use thiserror::Error;

/// Errors surfaced by the command-line front end
#[derive(Error, Debug)]
pub enum CliError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad config document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] GenError),
}

/// Load a (possibly partial) JSON configuration file
pub fn load_config(path: &Path) -> Result<GeneratorConfig, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Symbol for a tagged cell; the most specific tag wins
fn overlay_symbol(tags: Decoration) -> Option<char> {
    if tags.contains(Decoration::TREE_BASE) {
        Some('t')
    } else if tags.contains(Decoration::HANG_LEAF) {
        Some(',')
    } else if tags.contains(Decoration::CANOPY_TOP) {
        Some('^')
    } else if tags.contains(Decoration::BORDER) {
        Some('%')
    } else {
        None
    }
}

/// Render the level top row first, with decorations when `layers` is set
pub fn render_ascii(level: &Level, layers: bool) -> String {
    if !layers {
        return level.grid.to_ascii();
    }
    let grid = &level.grid;
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for y in (0..grid.height()).rev() {
        for x in 0..grid.width() {
            let cell = grid.try_get(x, y).unwrap_or_default();
            let symbol = overlay_symbol(level.layers.tags_at(x, y)).unwrap_or(cell.symbol());
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub shape: RoomShape,
    pub parent: Option<usize>,
    pub direction_to_parent: Direction,
}

/// Compact description of a level for `--json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub seed: u64,
    pub variant: Variant,
    pub width: i32,
    pub height: i32,
    pub spawn: Option<(i32, i32)>,
    pub floor_cells: usize,
    pub rooms: Vec<RoomSummary>,
}

impl From<&Level> for LevelSummary {
    fn from(level: &Level) -> Self {
        let floor_cells = level
            .grid
            .iter()
            .filter(|(_, _, cell)| cell.is_walkable())
            .count();
        Self {
            seed: level.seed,
            variant: level.variant,
            width: level.grid.width(),
            height: level.grid.height(),
            spawn: level.spawn_point(),
            floor_cells,
            rooms: level
                .rooms
                .iter()
                .map(|room| RoomSummary {
                    x: room.rect.x,
                    y: room.rect.y,
                    width: room.rect.width,
                    height: room.rect.height,
                    shape: room.shape,
                    parent: room.parent,
                    direction_to_parent: room.direction_to_parent,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::LevelPipeline;

    fn lattice_level(seed: u64) -> Level {
        let config = GeneratorConfig {
            variant: Variant::Lattice,
            ..GeneratorConfig::default()
        };
        LevelPipeline::new(config).unwrap().generate(seed).unwrap()
    }

    #[test]
    fn test_plain_render_matches_grid() {
        let level = lattice_level(1);
        let text = render_ascii(&level, false);
        assert_eq!(text, level.grid.to_string());
        assert_eq!(text.lines().count(), level.grid.height() as usize);
    }

    #[test]
    fn test_layer_render_shows_decorations() {
        let level = lattice_level(1);
        let text = render_ascii(&level, true);
        assert_eq!(text.len(), render_ascii(&level, false).len());
        assert!(text.contains('^'));
        assert!(text.contains(','));
    }

    #[test]
    fn test_overlay_precedence() {
        let all = Decoration::all();
        assert_eq!(overlay_symbol(all), Some('t'));
        assert_eq!(overlay_symbol(Decoration::BORDER | Decoration::CANOPY_TOP), Some('^'));
        assert_eq!(overlay_symbol(Decoration::TRUNK), None);
    }

    #[test]
    fn test_summary() {
        let level = lattice_level(4);
        let summary = LevelSummary::from(&level);
        assert_eq!(summary.rooms.len(), level.rooms.len());
        assert_eq!(summary.rooms[0].parent, None);
        assert!(summary.floor_cells > 0);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"variant\":\"lattice\""));
    }

    #[test]
    fn test_load_partial_config() {
        let path = std::env::temp_dir().join(format!("thicket-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"variant": "lattice", "lattice": {"min_rooms": 2}}"#).unwrap();
        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.variant, Variant::Lattice);
        assert_eq!(config.lattice.min_rooms, 2);
        assert_eq!(config.lattice.max_rooms, 10);
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let err = load_config(Path::new("/nonexistent/thicket.json")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
