//! Decoration layers derived from a finished level
//!
//! Nothing here writes back into the grid: the layers are sparse maps a
//! renderer paints on top of it.

use bitflags::bitflags;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid, NEIGHBOURS_4};
use super::lattice::has_neighbour;
use super::rect::Rect;
use super::room::{Direction, RoomGraph};
use crate::config::{DetailLayer, Variant};
use crate::source::NoiseSource;

/// Cells this close to the grid edge are never tagged by neighbour rules
pub const LAYER_MARGIN: i32 = 2;

bitflags! {
    /// Decoration tags for a single cell
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Decoration: u8 {
        const BORDER = 0x01;
        const CANOPY_TOP = 0x02;
        const HANG_LEAF = 0x04;
        const TRUNK = 0x08;
        const TREE_BASE = 0x10;
    }
}

impl Serialize for Decoration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Decoration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Decoration::from_bits_truncate(bits))
    }
}

/// Per-cell decoration tags plus one detail-cluster set per detail layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedLayers {
    #[serde(with = "tag_list")]
    pub tags: HashMap<(i32, i32), Decoration>,
    #[serde(with = "detail_list")]
    pub details: Vec<HashSet<(i32, i32)>>,
}

impl DerivedLayers {
    /// Derive every layer from the finished grid and room graph
    pub fn compute<R: NoiseSource>(
        grid: &Grid,
        rooms: &RoomGraph,
        variant: Variant,
        details: &[DetailLayer],
        noise: &R,
    ) -> Self {
        let mut layers = Self::default();
        layers.tag_borders(grid);
        if variant == Variant::Lattice {
            layers.tag_room_edges(rooms);
        }
        layers.tag_canopy(grid);
        layers.tag_trunks(grid);
        layers.tag_tree_bases(grid, rooms);
        layers.details = details
            .iter()
            .map(|layer| detail_clusters(rooms, layer, noise))
            .collect();
        layers
    }

    /// Tags at `(x, y)`, empty if untagged
    pub fn tags_at(&self, x: i32, y: i32) -> Decoration {
        self.tags.get(&(x, y)).copied().unwrap_or_default()
    }

    pub fn has(&self, x: i32, y: i32, tag: Decoration) -> bool {
        self.tags_at(x, y).contains(tag)
    }

    /// Number of cells carrying `tag`
    pub fn count(&self, tag: Decoration) -> usize {
        self.tags.values().filter(|t| t.contains(tag)).count()
    }

    pub fn has_detail(&self, layer: usize, x: i32, y: i32) -> bool {
        self.details.get(layer).is_some_and(|set| set.contains(&(x, y)))
    }

    fn tag(&mut self, x: i32, y: i32, tag: Decoration) {
        *self.tags.entry((x, y)).or_default() |= tag;
    }

    /// Walls touching the void, and the void cells just above and below them
    fn tag_borders(&mut self, grid: &Grid) {
        for (x, y) in inner_cells(grid) {
            if !grid.is(x, y, Cell::Wall) {
                continue;
            }
            let touches_void = NEIGHBOURS_4
                .iter()
                .any(|(dx, dy)| grid.is(x + dx, y + dy, Cell::Void));
            if !touches_void {
                continue;
            }
            self.tag(x, y, Decoration::BORDER);
            for dy in [1, -1] {
                if grid.is(x, y + dy, Cell::Void) {
                    self.tag(x, y + dy, Decoration::BORDER);
                }
            }
        }
    }

    /// Lattice rooms get their corners and every open side bordered
    fn tag_room_edges(&mut self, rooms: &RoomGraph) {
        for room in rooms.iter() {
            let r = room.rect;
            let (left, right) = (r.x_min(), r.x_max() - 1);
            let (bottom, top) = (r.y_min(), r.y_max() - 1);

            for (x, y) in [(left, bottom), (right, bottom), (left, top), (right, top)] {
                self.tag(x, y, Decoration::BORDER);
            }
            if !has_neighbour(rooms, &r, Direction::Down) {
                (left..right).for_each(|x| self.tag(x, bottom, Decoration::BORDER));
            }
            if !has_neighbour(rooms, &r, Direction::Up) {
                (left..right).for_each(|x| self.tag(x, top, Decoration::BORDER));
            }
            if !has_neighbour(rooms, &r, Direction::Left) {
                (bottom..top).for_each(|y| self.tag(left, y, Decoration::BORDER));
            }
            if !has_neighbour(rooms, &r, Direction::Right) {
                (bottom..top).for_each(|y| self.tag(right, y, Decoration::BORDER));
            }
        }
    }

    fn tag_canopy(&mut self, grid: &Grid) {
        for (x, y) in inner_cells(grid) {
            let Some(cell) = grid.try_get(x, y) else {
                continue;
            };
            let below = grid.try_get(x, y - 1);

            // the leading edge of a canopy over a wall, or a door in open ground
            let substrate = match below {
                Some(c) if c.is_solid() => true,
                Some(Cell::Door) => cell == Cell::Void,
                _ => false,
            };
            if cell != Cell::Wall && substrate {
                self.tag(x, y, Decoration::CANOPY_TOP);
                self.tag(x, y - 1, Decoration::HANG_LEAF);
            }

            if cell == Cell::Wall
                && grid.try_get(x, y - 2).is_some_and(|c| c != Cell::Floor)
            {
                self.tag(x, y, Decoration::CANOPY_TOP);
                self.tag(x, y - 1, Decoration::HANG_LEAF);
            }
        }
    }

    fn tag_trunks(&mut self, grid: &Grid) {
        for (x, y, cell) in grid.iter() {
            if cell == Cell::Wall {
                self.tag(x, y, Decoration::TRUNK);
            }
        }
    }

    /// The bottom fringe of a canopy, where it meets walkable ground
    fn tag_tree_bases(&mut self, grid: &Grid, rooms: &RoomGraph) {
        let fringe: Vec<(i32, i32)> = self
            .tags
            .iter()
            .filter(|(_, tag)| tag.contains(Decoration::HANG_LEAF))
            .map(|(&pos, _)| pos)
            .filter(|&(x, y)| grid.try_get(x, y - 1).is_some_and(|c| c.is_walkable()))
            .collect();

        let in_room = |x: i32, y: i32| rooms.iter().any(|room| room.rect.contains(x, y));
        for (x, y) in fringe {
            for cell_y in [y, y - 1] {
                if in_room(x, cell_y) {
                    self.tag(x, cell_y, Decoration::TREE_BASE);
                }
            }
        }
    }
}

/// Cells at least [`LAYER_MARGIN`] from every edge, x outer
fn inner_cells(grid: &Grid) -> impl Iterator<Item = (i32, i32)> {
    let (width, height) = (grid.width(), grid.height());
    (LAYER_MARGIN..width - LAYER_MARGIN)
        .flat_map(move |x| (LAYER_MARGIN..height - LAYER_MARGIN).map(move |y| (x, y)))
}

/// Sample the layer's noise over every room and stamp where it peaks
fn detail_clusters<R: NoiseSource>(
    rooms: &RoomGraph,
    layer: &DetailLayer,
    noise: &R,
) -> HashSet<(i32, i32)> {
    let mut cells = HashSet::new();
    for room in rooms.iter() {
        let r = room.rect;
        for x in r.x_min()..r.x_max() - 1 {
            for y in r.y_min()..r.y_max() - 1 {
                let mut value = noise.noise2d(
                    x as f64 * layer.scale + layer.offset,
                    y as f64 * layer.scale + layer.offset,
                );
                if layer.remap {
                    value = (value + 1.0) * 0.5;
                }
                if value > layer.threshold {
                    stamp(&mut cells, &r, x, y, layer);
                }
            }
        }
    }
    cells
}

fn stamp(cells: &mut HashSet<(i32, i32)>, room: &Rect, x: i32, y: i32, layer: &DetailLayer) {
    for sx in x..(x + layer.stamp_width).min(room.x_max()) {
        for sy in y..(y + layer.stamp_height).min(room.y_max()) {
            cells.insert((sx, sy));
        }
    }
}

/// Tags as a coordinate-sorted list, since tuple keys are not valid map keys
/// in most formats
mod tag_list {
    use hashbrown::HashMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Decoration;

    pub fn serialize<S>(
        tags: &HashMap<(i32, i32), Decoration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut list: Vec<((i32, i32), Decoration)> =
            tags.iter().map(|(&k, &v)| (k, v)).collect();
        list.sort_by_key(|(pos, _)| *pos);
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<HashMap<(i32, i32), Decoration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<((i32, i32), Decoration)>::deserialize(deserializer)?;
        Ok(list.into_iter().collect())
    }
}

/// Detail sets as sorted coordinate lists
mod detail_list {
    use hashbrown::HashSet;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(details: &[HashSet<(i32, i32)>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let lists: Vec<Vec<(i32, i32)>> = details
            .iter()
            .map(|set| {
                let mut cells: Vec<(i32, i32)> = set.iter().copied().collect();
                cells.sort_unstable();
                cells
            })
            .collect();
        lists.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<HashSet<(i32, i32)>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let lists = Vec::<Vec<(i32, i32)>>::deserialize(deserializer)?;
        Ok(lists.into_iter().map(|cells| cells.into_iter().collect()).collect())
    }
}
