//! Room shape synthesis
//!
//! Each strategy builds a standalone pattern: Floor inside, a Wall margin
//! around it, and no Void left once it is finished. Sizes are drawn from a
//! strategy-specific range and then padded by `2 * edge_buffer`.
//!
//! Strategies that can leave several floor pockets keep only the largest
//! 4-connected one, then shrink the pattern to the floor's bounding box
//! plus the edge buffer.

use std::collections::VecDeque;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::grid::{Cell, Grid, NEIGHBOURS_4};
use crate::error::Result;
use crate::source::NoiseSource;

/// Depth of the fixed wall ring used by rectangle and cellular rooms
pub const WALL_RING: i32 = 2;

/// Cellular seeding: a cell starts as Floor when the draw exceeds this
pub const CELLULAR_FLOOR_CHANCE: f32 = 0.42;

/// Cellular smoothing iterations
pub const SMOOTHING_PASSES: usize = 5;

/// Room generation strategy
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoomShape {
    SingleRectangle,
    OverlappingRectangles,
    CellularAutomata,
    SingleEllipse,
    OverlappingEllipses,
}

impl RoomShape {
    /// Shapes the room-tree generator picks from unless configured otherwise
    pub const DEFAULT_MIX: [RoomShape; 3] = [
        RoomShape::OverlappingRectangles,
        RoomShape::CellularAutomata,
        RoomShape::OverlappingEllipses,
    ];

    /// Largest pattern this shape can produce before padding, `(width, height)`
    pub const fn max_interior(&self) -> (i32, i32) {
        match self {
            RoomShape::SingleRectangle => (26, 16),
            RoomShape::OverlappingRectangles => (30, 20),
            RoomShape::CellularAutomata => (35, 24),
            RoomShape::SingleEllipse | RoomShape::OverlappingEllipses => (29, 19),
        }
    }
}

/// Synthesize a room pattern.
///
/// The pattern may come back without any Floor (a cellular room can die
/// out); placement treats that as a failed attempt.
pub fn synthesize<R: NoiseSource>(
    shape: RoomShape,
    edge_buffer: i32,
    rng: &mut R,
) -> Result<Grid> {
    let pad = edge_buffer * 2;
    match shape {
        RoomShape::SingleRectangle => {
            let width = rng.uniform_int(13, 26) + pad;
            let height = rng.uniform_int(8, 16) + pad;
            Ok(single_rectangle(width, height))
        }
        RoomShape::OverlappingRectangles => {
            let width = rng.uniform_int(15, 30) + pad;
            let height = rng.uniform_int(10, 20) + pad;
            overlapping_rectangles(width, height, edge_buffer, rng)
        }
        RoomShape::CellularAutomata => {
            let width = rng.uniform_int(18, 35) + pad;
            let height = rng.uniform_int(12, 24) + pad;
            cellular(width, height, edge_buffer, rng)
        }
        RoomShape::SingleEllipse => {
            let width = rng.uniform_int(15, 29) + pad;
            let height = rng.uniform_int(10, 19) + pad;
            let mut grid = buffered(width, height, edge_buffer);
            let rx = (width - pad - 1) as f32 / 2.0;
            let ry = (height - pad - 1) as f32 / 2.0;
            stamp_ellipse(&mut grid, edge_buffer, width / 2, height / 2, rx, ry)?;
            finish(grid, edge_buffer)
        }
        RoomShape::OverlappingEllipses => {
            let width = rng.uniform_int(15, 29) + pad;
            let height = rng.uniform_int(10, 19) + pad;
            let mut grid = buffered(width, height, edge_buffer);
            let max_rx = (width - pad - 1) as f32 * 0.5;
            let max_ry = (height - pad - 1) as f32 * 0.5;
            let b = edge_buffer as f32;
            for _ in 0..rng.uniform_int(2, 3) {
                let rx = max_rx * rng.uniform_f32(0.5, 1.0);
                let ry = max_ry * rng.uniform_f32(0.5, 1.0);
                let cx = rng.uniform_f32(b + rx, width as f32 - (b + rx)) as i32;
                let cy = rng.uniform_f32(b + ry, height as f32 - (b + ry)) as i32;
                stamp_ellipse(&mut grid, edge_buffer, cx, cy, rx, ry)?;
            }
            finish(grid, edge_buffer)
        }
    }
}

fn in_ring(x: i32, y: i32, width: i32, height: i32, depth: i32) -> bool {
    x < depth || y < depth || x >= width - depth || y >= height - depth
}

/// Wall margin of `edge_buffer` cells around a Void interior
fn buffered(width: i32, height: i32, edge_buffer: i32) -> Grid {
    Grid::from_fn(width, height, |x, y| {
        if in_ring(x, y, width, height, edge_buffer) {
            Cell::Wall
        } else {
            Cell::Void
        }
    })
}

/// Floor rectangle inside a [`WALL_RING`]-deep wall ring
pub fn single_rectangle(width: i32, height: i32) -> Grid {
    Grid::from_fn(width, height, |x, y| {
        if in_ring(x, y, width, height, WALL_RING) {
            Cell::Wall
        } else {
            Cell::Floor
        }
    })
}

fn overlapping_rectangles<R: NoiseSource>(
    width: i32,
    height: i32,
    edge_buffer: i32,
    rng: &mut R,
) -> Result<Grid> {
    let inner_w = width - edge_buffer * 2;
    let inner_h = height - edge_buffer * 2;
    let mut grid = Grid::new(width, height);

    // one wide and short, one narrow and tall
    let sizes = [
        (inner_w / 2 + 1, inner_w - 1, inner_h / 4 + 1, inner_h / 2),
        (inner_w / 4 + 1, inner_w / 2, inner_h / 2 + 1, inner_h - 1),
    ];
    for (min_w, max_w, min_h, max_h) in sizes {
        let rw = rng.uniform_int(min_w, max_w);
        let rh = rng.uniform_int(min_h, max_h);
        let rx = rng.uniform_int(edge_buffer, width - rw - edge_buffer - 1);
        let ry = rng.uniform_int(edge_buffer, height - rh - edge_buffer - 1);
        for x in rx..rx + rw {
            for y in ry..ry + rh {
                grid.set(x, y, Cell::Floor)?;
            }
        }
    }

    finish(grid, edge_buffer)
}

fn cellular<R: NoiseSource>(
    width: i32,
    height: i32,
    edge_buffer: i32,
    rng: &mut R,
) -> Result<Grid> {
    let mut grid = Grid::from_fn(width, height, |x, y| {
        if in_ring(x, y, width, height, WALL_RING) {
            Cell::Wall
        } else if rng.uniform01() > CELLULAR_FLOOR_CHANCE {
            Cell::Floor
        } else {
            Cell::Void
        }
    });

    // smoothing reads cells already updated in the same pass
    for _ in 0..SMOOTHING_PASSES {
        for x in WALL_RING..width - WALL_RING {
            for y in WALL_RING..height - WALL_RING {
                let floors = grid.count_neighbours_8(x, y, Cell::Floor);
                match grid.get(x, y)? {
                    Cell::Floor if floors < 3 => grid.set(x, y, Cell::Void)?,
                    Cell::Void if floors >= 5 => grid.set(x, y, Cell::Floor)?,
                    _ => {}
                }
            }
        }
    }

    finish(grid, edge_buffer)
}

fn stamp_ellipse(
    grid: &mut Grid,
    edge_buffer: i32,
    cx: i32,
    cy: i32,
    rx: f32,
    ry: f32,
) -> Result<()> {
    for x in edge_buffer..grid.width() - edge_buffer {
        for y in edge_buffer..grid.height() - edge_buffer {
            let dx = (x - cx) as f32 / rx;
            let dy = (y - cy) as f32 / ry;
            if dx * dx + dy * dy <= 1.0 {
                grid.set(x, y, Cell::Floor)?;
            }
        }
    }
    Ok(())
}

/// Trim, keep the largest region, re-bound and wall in the voids
fn finish(mut grid: Grid, edge_buffer: i32) -> Result<Grid> {
    trim_isolated_edge_floors(&mut grid)?;
    let grid = keep_largest_floor_region(&grid)?;
    let mut grid = resize_to_floor_bounds(&grid, edge_buffer)?;
    grid.replace_all(Cell::Void, Cell::Wall);
    Ok(grid)
}

/// Drop thin floor spurs: a Floor cell with Void on both opposite sides and
/// at most 3 floor neighbours becomes Void. The wall ring is left alone.
fn trim_isolated_edge_floors(grid: &mut Grid) -> Result<()> {
    for x in WALL_RING..grid.width() - WALL_RING {
        for y in WALL_RING..grid.height() - WALL_RING {
            if !grid.is(x, y, Cell::Floor) {
                continue;
            }
            let pinched_vertical = grid.is(x, y + 1, Cell::Void) && grid.is(x, y - 1, Cell::Void);
            let pinched_horizontal =
                grid.is(x + 1, y, Cell::Void) && grid.is(x - 1, y, Cell::Void);
            if (pinched_vertical || pinched_horizontal)
                && grid.count_neighbours_8(x, y, Cell::Floor) <= 3
            {
                grid.set(x, y, Cell::Void)?;
            }
        }
    }
    Ok(())
}

/// Keep only the largest 4-connected floor region; other floor becomes Void.
///
/// Regions are discovered in column scan order and a later region must be
/// strictly larger to win, so ties go to the first one found.
fn keep_largest_floor_region(grid: &Grid) -> Result<Grid> {
    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let mut largest: Vec<(i32, i32)> = Vec::new();

    for (x, y, cell) in grid.iter() {
        if cell != Cell::Floor || visited.contains(&(x, y)) {
            continue;
        }
        let mut region = Vec::new();
        let mut queue = VecDeque::from([(x, y)]);
        visited.insert((x, y));
        while let Some((cx, cy)) = queue.pop_front() {
            region.push((cx, cy));
            for (dx, dy) in NEIGHBOURS_4 {
                let next = (cx + dx, cy + dy);
                if grid.is(next.0, next.1, Cell::Floor) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        if region.len() > largest.len() {
            largest = region;
        }
    }

    let mut kept = Grid::from_fn(grid.width(), grid.height(), |x, y| {
        if grid.is(x, y, Cell::Wall) {
            Cell::Wall
        } else {
            Cell::Void
        }
    });
    for (x, y) in largest {
        kept.set(x, y, Cell::Floor)?;
    }
    Ok(kept)
}

/// Crop to the floor's bounding box and pad with an `edge_buffer` wall ring.
/// A pattern without floor is returned unchanged.
fn resize_to_floor_bounds(grid: &Grid, edge_buffer: i32) -> Result<Grid> {
    let Some((min_x, min_y, max_x, max_y)) = grid.bounds_of(Cell::Floor) else {
        return Ok(grid.clone());
    };
    let width = max_x - min_x + 1 + edge_buffer * 2;
    let height = max_y - min_y + 1 + edge_buffer * 2;

    let mut resized = buffered(width, height, edge_buffer);
    for (x, y, cell) in grid.iter() {
        if cell == Cell::Floor {
            resized.set(x - min_x + edge_buffer, y - min_y + edge_buffer, Cell::Floor)?;
        }
    }
    Ok(resized)
}
