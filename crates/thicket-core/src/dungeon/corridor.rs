//! Corridor carving
//!
//! Room-tree levels get one short corridor per child room, carved across
//! the boundary it shares with its parent. Lattice levels get straight
//! strips from each parent's centre toward its child's centre.

use tracing::debug;

use super::grid::{Cell, Grid};
use super::rect::Rect;
use super::room::{CorridorSpec, Direction, Room, RoomGraph};
use crate::config::LatticeConfig;
use crate::error::Result;
use crate::source::NoiseSource;

/// Carves 2-wide floor strips between each room and its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorridorBuilder {
    /// Cells kept clear of the ends of the shared boundary
    pub edge_buffer: i32,
    /// Mark where each strip crosses the child's edge with `Door`
    pub mark_doorways: bool,
}

impl CorridorBuilder {
    pub fn new(edge_buffer: i32, mark_doorways: bool) -> Self {
        Self {
            edge_buffer,
            mark_doorways,
        }
    }

    /// Carve a corridor for every non-root room, in placement order
    pub fn build_corridors<R: NoiseSource>(
        &self,
        grid: &mut Grid,
        graph: &RoomGraph,
        rng: &mut R,
    ) -> Result<()> {
        for (index, room) in graph.iter().enumerate() {
            let Some(parent) = graph.parent(index) else {
                continue;
            };
            self.connect(grid, room, parent, rng)?;
        }
        Ok(())
    }

    /// Pick the corridor line for a child/parent pair.
    ///
    /// The line runs inside the overlap of the two rooms' perpendicular
    /// extents, shrunk by the edge buffer; the second lane sits at `line + 1`.
    pub fn pick_line<R: NoiseSource>(
        &self,
        room: &Rect,
        parent: &Rect,
        horizontal: bool,
        rng: &mut R,
    ) -> i32 {
        let (lower, upper) = if horizontal {
            (
                room.y_min().max(parent.y_min()),
                (room.y_max() - 1).min(parent.y_max() - 1),
            )
        } else {
            (
                room.x_min().max(parent.x_min()),
                (room.x_max() - 1).min(parent.x_max() - 1),
            )
        };
        let lower = lower + self.edge_buffer;
        let upper = upper - self.edge_buffer;
        rng.uniform_int(lower, (upper - 2).max(lower))
    }

    fn connect<R: NoiseSource>(
        &self,
        grid: &mut Grid,
        room: &Room,
        parent: &Room,
        rng: &mut R,
    ) -> Result<()> {
        let direction = room.direction_to_parent;
        if direction == Direction::None {
            return Ok(());
        }
        let (r, p) = (&room.rect, &parent.rect);
        let line = self.pick_line(r, p, direction.is_horizontal(), rng);

        // each side is carved from the shared boundary inward
        let (room_side, parent_side): (Vec<i32>, Vec<i32>) = match direction {
            Direction::Left => (
                (r.x_min()..r.x_max()).collect(),
                (p.x_min() + 1..p.x_max()).rev().collect(),
            ),
            Direction::Right => (
                (r.x_min() + 1..r.x_max()).rev().collect(),
                (p.x_min()..p.x_max()).collect(),
            ),
            Direction::Down => (
                (r.y_min()..r.y_max()).collect(),
                (p.y_min() + 1..p.y_max()).rev().collect(),
            ),
            Direction::Up => (
                (r.y_min() + 1..r.y_max()).rev().collect(),
                (p.y_min()..p.y_max()).collect(),
            ),
            Direction::None => return Ok(()),
        };
        let horizontal = direction.is_horizontal();
        carve_strip(grid, &room_side, line, horizontal)?;
        carve_strip(grid, &parent_side, line, horizontal)?;

        if self.mark_doorways {
            let edge = match direction {
                Direction::Left => r.x_min(),
                Direction::Right => r.x_max() - 1,
                Direction::Down => r.y_min(),
                _ => r.y_max() - 1,
            };
            for lane in [line, line + 1] {
                let (x, y) = if horizontal { (edge, lane) } else { (lane, edge) };
                if grid.is(x, y, Cell::Floor) {
                    grid.set(x, y, Cell::Door)?;
                }
            }
        }

        debug!(
            x = r.x,
            y = r.y,
            line,
            direction = %direction,
            "carved corridor"
        );
        Ok(())
    }
}

/// Carve two parallel lanes (`line`, `line + 1`) along `steps`.
///
/// Each lane stops for good at its first walkable cell, so a strip never
/// punches through to the far side of a room that is already open.
fn carve_strip(grid: &mut Grid, steps: &[i32], line: i32, horizontal: bool) -> Result<()> {
    let mut done = [false; 2];
    for &step in steps {
        for (lane, finished) in done.iter_mut().enumerate() {
            let offset = line + lane as i32;
            let (x, y) = if horizontal { (step, offset) } else { (offset, step) };
            if grid.get(x, y)?.is_walkable() {
                *finished = true;
            }
            if !*finished {
                grid.set(x, y, Cell::Floor)?;
            }
        }
    }
    Ok(())
}

/// Draw a width and sideways offset for every parent/child pair
pub fn plan_lattice_corridors<R: NoiseSource>(
    graph: &RoomGraph,
    config: &LatticeConfig,
    rng: &mut R,
) -> Vec<CorridorSpec> {
    graph
        .edges()
        .map(|(child, parent)| {
            let width = rng.uniform_int(config.min_corridor_width, config.max_corridor_width);
            let offset = rng.uniform_int(-config.max_corridor_offset, config.max_corridor_offset);
            CorridorSpec {
                from: parent,
                to: child,
                width,
                offset,
            }
        })
        .collect()
}

/// Carve a straight strip from the centre of `spec.from` toward the centre
/// of `spec.to`, one room length long.
pub fn carve_lattice_corridor(
    grid: &mut Grid,
    graph: &RoomGraph,
    spec: &CorridorSpec,
) -> Result<()> {
    let (Some(from), Some(to)) = (graph.get(spec.from), graph.get(spec.to)) else {
        return Ok(());
    };
    let (from, to) = (&from.rect, &to.rect);
    let start = (from.x_min() + from.width / 2, from.y_min() + from.height / 2);
    let finish = (to.x_min() + to.width / 2, to.y_min() + to.height / 2);
    let half = spec.width / 2;
    let lanes = (-half + spec.offset)..(spec.width - half + spec.offset);

    if finish.0 != start.0 {
        let dir = (finish.0 - start.0).signum();
        for dy in lanes {
            for i in 0..from.width {
                grid.set(start.0 + dir * i, start.1 + dy, Cell::Floor)?;
            }
        }
    } else {
        let dir = if finish.1 > start.1 { 1 } else { -1 };
        for dx in lanes {
            for i in 0..from.height {
                grid.set(start.0 + dx, start.1 + dir * i, Cell::Floor)?;
            }
        }
    }
    Ok(())
}
