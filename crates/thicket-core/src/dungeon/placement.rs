//! Room placement for the room-tree generator
//!
//! Room 0 goes at the centre of the level. Every later room picks a random
//! placed room as its parent and is tried at every position flush against
//! one of the parent's sides, in shuffled order. The first position that is
//! inside the level margin and covers only Void cells wins.

use tracing::{debug, warn};

use super::grid::{Cell, Grid};
use super::rect::Rect;
use super::room::{Direction, Room, RoomGraph};
use super::shape::{RoomShape, synthesize};
use crate::config::RoomTreeConfig;
use crate::error::{GenError, Result};
use crate::source::NoiseSource;

/// Places synthesized rooms into a tree of flush neighbours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPlacer {
    pub target_rooms: usize,
    pub room_edge_buffer: i32,
    pub level_edge_buffer: i32,
    /// Failed slots that may be retried over the whole run
    pub retries: u32,
    pub shapes: Vec<RoomShape>,
    /// Return an error instead of abandoning a slot
    pub strict: bool,
}

impl RoomPlacer {
    pub fn from_config(config: &RoomTreeConfig) -> Self {
        Self {
            target_rooms: config.target_rooms,
            room_edge_buffer: config.room_edge_buffer,
            level_edge_buffer: config.level_edge_buffer,
            retries: config.placement_retries,
            shapes: config.shapes.clone(),
            strict: config.strict_placement,
        }
    }

    /// Place up to `target_rooms` rooms onto a Void grid.
    ///
    /// A slot whose room cannot be placed is retried while the shared retry
    /// budget lasts; after that it is abandoned (or, in strict mode, the run
    /// fails). Failing to place the root is always an error.
    pub fn place_rooms<R: NoiseSource>(&self, grid: &mut Grid, rng: &mut R) -> Result<RoomGraph> {
        if self.shapes.is_empty() {
            return Err(GenError::config("room_tree.shapes", "at least one shape is required"));
        }
        let mut graph = RoomGraph::new();
        let mut retries = self.retries;
        let mut slot = 0;

        while slot < self.target_rooms {
            let shape = self.shapes[rng.pick_index(self.shapes.len())];
            let room = Room::new(shape, synthesize(shape, self.room_edge_buffer, rng)?);

            let placed = if graph.is_empty() {
                self.place_root(grid, &mut graph, room)?
            } else {
                let parent = rng.pick_index(graph.len());
                self.place_child(grid, &mut graph, parent, room, rng)?
            };

            if placed {
                slot += 1;
            } else if retries > 0 {
                retries -= 1;
                debug!(slot, retries, "room did not fit, retrying slot");
            } else if graph.is_empty() || self.strict {
                return Err(GenError::PlacementExhausted {
                    placed: graph.len(),
                    requested: self.target_rooms,
                });
            } else {
                warn!(slot, placed = graph.len(), "no position found, abandoning room slot");
                slot += 1;
            }
        }

        Ok(graph)
    }

    /// Place a parentless room with its corner at the centre of the grid
    pub fn place_root(&self, grid: &mut Grid, graph: &mut RoomGraph, room: Room) -> Result<bool> {
        let room = room.at(grid.width() / 2, grid.height() / 2);
        self.try_add_room(grid, graph, room, None)
    }

    /// Try every flush position around `parent` in shuffled order
    pub fn place_child<R: NoiseSource>(
        &self,
        grid: &mut Grid,
        graph: &mut RoomGraph,
        parent: usize,
        mut room: Room,
        rng: &mut R,
    ) -> Result<bool> {
        let Some(parent_rect) = graph.get(parent).map(|p| p.rect) else {
            return Ok(false);
        };
        let mut positions =
            self.candidate_positions(&parent_rect, room.rect.width, room.rect.height);
        rng.shuffle(&mut positions);

        for (x, y) in positions {
            room.rect.x = x;
            room.rect.y = y;
            if self.fits(grid, &room)? {
                self.commit(grid, graph, room, Some(parent))?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Lower-left corners that put a `width` x `height` room flush against
    /// `parent`: along the top and bottom first, then left and right.
    ///
    /// Every position shares at least `2 * room_edge_buffer + 2` cells of
    /// the parent's side so a corridor fits between the two rooms.
    pub fn candidate_positions(&self, parent: &Rect, width: i32, height: i32) -> Vec<(i32, i32)> {
        let overlap = self.room_edge_buffer * 2 + 2;
        let mut positions = Vec::new();

        let top_y = parent.y_max();
        let bottom_y = parent.y_min() - height;
        for x in parent.x_min() - (width - overlap)..=parent.x_max() - overlap {
            positions.push((x, top_y));
            positions.push((x, bottom_y));
        }

        let right_x = parent.x_max();
        let left_x = parent.x_min() - width;
        for y in parent.y_min() - (height - overlap)..=parent.y_max() - overlap {
            positions.push((left_x, y));
            positions.push((right_x, y));
        }

        positions
    }

    /// Add `room` at its current position if it fits
    pub fn try_add_room(
        &self,
        grid: &mut Grid,
        graph: &mut RoomGraph,
        room: Room,
        parent: Option<usize>,
    ) -> Result<bool> {
        if !self.fits(grid, &room)? {
            return Ok(false);
        }
        self.commit(grid, graph, room, parent)?;
        Ok(true)
    }

    /// Inside the level margin, over Void only, and with some floor to offer
    fn fits(&self, grid: &Grid, room: &Room) -> Result<bool> {
        let rect = &room.rect;
        let margin = self.level_edge_buffer;
        if rect.x_min() < margin
            || rect.x_max() >= grid.width() - margin
            || rect.y_min() < margin
            || rect.y_max() >= grid.height() - margin
        {
            return Ok(false);
        }
        if room.pattern.count(Cell::Floor) == 0 {
            return Ok(false);
        }
        for (x, y) in rect.cells() {
            if grid.get(x, y)? != Cell::Void {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn commit(
        &self,
        grid: &mut Grid,
        graph: &mut RoomGraph,
        mut room: Room,
        parent: Option<usize>,
    ) -> Result<()> {
        room.parent = parent;
        room.direction_to_parent = parent
            .and_then(|p| graph.get(p))
            .map_or(Direction::None, |p| Direction::between(&room.rect, &p.rect));

        for (x, y, cell) in room.pattern.iter() {
            if cell != Cell::Void {
                grid.set(room.rect.x + x, room.rect.y + y, cell)?;
            }
        }

        let index = graph.push(room);
        if let Some(room) = graph.get(index) {
            debug!(
                index,
                x = room.rect.x,
                y = room.rect.y,
                width = room.rect.width,
                height = room.rect.height,
                shape = %room.shape,
                direction = %room.direction_to_parent,
                "placed room"
            );
        }
        Ok(())
    }
}
