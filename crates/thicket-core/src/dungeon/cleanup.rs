//! Grid cleanup passes
//!
//! Passes are deterministic rewrites of the finished map. A
//! [`PostProcessor`] runs its pass plan repeatedly until a whole sweep
//! changes nothing, so running it again on its own output is a no-op.
//!
//! Passes only visit cells at least `edge_margin` cells from the grid edge
//! (or their own minimum margin, if larger).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::{debug, warn};

use super::grid::{Cell, Grid, NEIGHBOURS_4};
use crate::error::Result;

/// Look-ahead for gap filling, counted from the wall next to the floor
pub const GAP_LOOKAHEAD: i32 = 4;

/// Solid cells wanted under every canopy edge
pub const CANOPY_DEPTH: i32 = 3;

/// Sweeps allowed before a run is declared unsettled
pub const MAX_SWEEPS: usize = 32;

/// A single cleanup rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Pass {
    /// Walls with 3+ floor neighbours become floor, cascading to adjacent walls
    StrayWalls,
    /// Isolated horizontal or vertical wall pairs become floor
    TwinWalls,
    /// Floors with 3+ wall neighbours become wall, cascading to adjacent floors
    StrayFloors,
    /// Short wall runs between two floors are opened up
    FillGaps,
    /// Wall tops facing the void are raised to a 3-cell margin
    CanopyMargin,
    /// 1-wide floor squeezed between two walls is widened
    PinchedFloors,
}

impl Pass {
    /// Distance from the edge the pass needs to read and write safely
    pub const fn min_margin(&self) -> i32 {
        match self {
            Pass::TwinWalls => 2,
            _ => 1,
        }
    }

    /// Apply the pass once; returns how many cells changed
    pub fn apply(&self, grid: &mut Grid, edge_margin: i32) -> Result<usize> {
        let area = Area::new(grid, edge_margin.max(self.min_margin()));
        match self {
            Pass::StrayWalls => cascade(grid, &area, Cell::Wall, Cell::Floor),
            Pass::TwinWalls => twin_walls(grid, &area),
            Pass::StrayFloors => cascade(grid, &area, Cell::Floor, Cell::Wall),
            Pass::FillGaps => fill_gaps(grid, &area),
            Pass::CanopyMargin => canopy_margin(grid, &area),
            Pass::PinchedFloors => pinched_floors(grid, &area),
        }
    }
}

/// The cells a pass may visit
#[derive(Debug, Clone, Copy)]
struct Area {
    x0: i32,
    x1: i32,
    y0: i32,
    y1: i32,
}

impl Area {
    fn new(grid: &Grid, margin: i32) -> Self {
        Self {
            x0: margin,
            x1: grid.width() - margin,
            y0: margin,
            y1: grid.height() - margin,
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

fn wall(grid: &Grid, x: i32, y: i32) -> bool {
    grid.try_get(x, y).is_some_and(|c| c.is_solid())
}

fn walkable(grid: &Grid, x: i32, y: i32) -> bool {
    grid.try_get(x, y).is_some_and(|c| c.is_walkable())
}

/// Runs a pass plan to a fixpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessor {
    pub passes: Vec<Pass>,
    pub edge_margin: i32,
    pub max_sweeps: usize,
}

impl PostProcessor {
    pub fn new(passes: Vec<Pass>, edge_margin: i32) -> Self {
        Self {
            passes,
            edge_margin,
            max_sweeps: MAX_SWEEPS,
        }
    }

    /// Gap filling, canopy margins and pinched-floor widening
    pub fn room_tree(edge_margin: i32) -> Self {
        Self::new(
            vec![Pass::FillGaps, Pass::CanopyMargin, Pass::PinchedFloors],
            edge_margin,
        )
    }

    /// Stray and twin wall removal followed by stray floor removal
    pub fn lattice() -> Self {
        Self::new(vec![Pass::StrayWalls, Pass::TwinWalls, Pass::StrayFloors], 1)
    }

    /// Apply every pass once, in order
    pub fn sweep(&self, grid: &mut Grid) -> Result<usize> {
        let mut changed = 0;
        for pass in &self.passes {
            changed += pass.apply(grid, self.edge_margin)?;
        }
        Ok(changed)
    }

    /// Sweep until nothing changes; returns the total number of changed cells
    pub fn run(&self, grid: &mut Grid) -> Result<usize> {
        let mut total = 0;
        for sweep in 1..=self.max_sweeps {
            let changed = self.sweep(grid)?;
            debug!(sweep, changed, "cleanup sweep");
            if changed == 0 {
                return Ok(total);
            }
            total += changed;
        }
        warn!(sweeps = self.max_sweeps, total, "cleanup did not settle");
        Ok(total)
    }
}

/// Convert `from` cells with at least 3 orthogonal `to` neighbours into
/// `to`, following on to adjacent `from` cells with an explicit stack.
fn cascade(grid: &mut Grid, area: &Area, from: Cell, to: Cell) -> Result<usize> {
    let mut changed = 0;
    let mut stack = Vec::new();
    for x in area.x0..area.x1 {
        for y in area.y0..area.y1 {
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                if !area.contains(cx, cy)
                    || !grid.is(cx, cy, from)
                    || grid.count_neighbours_4(cx, cy, to) < 3
                {
                    continue;
                }
                grid.set(cx, cy, to)?;
                changed += 1;
                // reversed so the left neighbour is examined first
                for (dx, dy) in NEIGHBOURS_4.iter().rev() {
                    if grid.is(cx + dx, cy + dy, from) {
                        stack.push((cx + dx, cy + dy));
                    }
                }
            }
        }
    }
    Ok(changed)
}

/// A wall pair with non-wall cells at both ends and one long side fully
/// open becomes floor. Horizontal pairs are handled before vertical ones.
fn twin_walls(grid: &mut Grid, area: &Area) -> Result<usize> {
    let mut changed = 0;
    for x in area.x0..area.x1 {
        for y in area.y0..area.y1 {
            if !wall(grid, x - 1, y)
                && wall(grid, x, y)
                && wall(grid, x + 1, y)
                && !wall(grid, x + 2, y)
                && ((!wall(grid, x, y - 1) && !wall(grid, x + 1, y - 1))
                    || (!wall(grid, x, y + 1) && !wall(grid, x + 1, y + 1)))
            {
                grid.set(x, y, Cell::Floor)?;
                grid.set(x + 1, y, Cell::Floor)?;
                changed += 2;
            }
        }
    }
    for x in area.x0..area.x1 {
        for y in area.y0..area.y1 {
            if !wall(grid, x, y - 1)
                && wall(grid, x, y)
                && wall(grid, x, y + 1)
                && !wall(grid, x, y + 2)
                && ((!wall(grid, x - 1, y) && !wall(grid, x - 1, y + 1))
                    || (!wall(grid, x + 1, y) && !wall(grid, x + 1, y + 1)))
            {
                grid.set(x, y, Cell::Floor)?;
                grid.set(x, y + 1, Cell::Floor)?;
                changed += 2;
            }
        }
    }
    Ok(changed)
}

fn fill_gaps(grid: &mut Grid, area: &Area) -> Result<usize> {
    let mut changed = 0;
    for x in area.x0..area.x1 {
        for y in area.y0..area.y1 {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                changed += fill_run(grid, x, y, dx, dy)?;
            }
        }
    }
    Ok(changed)
}

/// From a wall whose neighbour behind is walkable, look ahead for another
/// walkable cell; if only walls lie between, turn them all into floor.
fn fill_run(grid: &mut Grid, x: i32, y: i32, dx: i32, dy: i32) -> Result<usize> {
    if !wall(grid, x, y) || !walkable(grid, x - dx, y - dy) {
        return Ok(0);
    }
    for k in 1..GAP_LOOKAHEAD {
        let (nx, ny) = (x + k * dx, y + k * dy);
        if walkable(grid, nx, ny) {
            for i in 0..k {
                grid.set(x + i * dx, y + i * dy, Cell::Floor)?;
            }
            return Ok(k as usize);
        }
        if !wall(grid, nx, ny) {
            break;
        }
    }
    Ok(0)
}

/// A void sitting on a wall run shallower than [`CANOPY_DEPTH`] is filled
/// with walls, together with the void cells above it, up to the same depth.
fn canopy_margin(grid: &mut Grid, area: &Area) -> Result<usize> {
    let mut changed = 0;
    for x in area.x0..area.x1 {
        for y in (area.y0..area.y1).rev() {
            if !grid.is(x, y, Cell::Void) || !wall(grid, x, y - 1) {
                continue;
            }
            let run = (1..=CANOPY_DEPTH).take_while(|d| wall(grid, x, y - d)).count() as i32;
            if run >= CANOPY_DEPTH {
                continue;
            }
            for i in 0..CANOPY_DEPTH {
                if grid.is(x, y + i, Cell::Void) {
                    grid.set(x, y + i, Cell::Wall)?;
                    changed += 1;
                }
            }
        }
    }
    Ok(changed)
}

fn pinched_floors(grid: &mut Grid, area: &Area) -> Result<usize> {
    let mut changed = 0;
    for x in area.x0..area.x1 {
        for y in (area.y0..area.y1).rev() {
            if walkable(grid, x, y) && wall(grid, x, y - 1) && wall(grid, x, y + 1) {
                grid.set(x, y - 1, Cell::Floor)?;
                grid.set(x, y + 1, Cell::Floor)?;
                changed += 2;
            }
            if walkable(grid, x, y) && wall(grid, x - 1, y) && wall(grid, x + 1, y) {
                grid.set(x - 1, y, Cell::Floor)?;
                grid.set(x + 1, y, Cell::Floor)?;
                changed += 2;
            }
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::shape::single_rectangle;

    fn floor_field(width: i32, height: i32, walls: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::filled(width, height, Cell::Floor);
        for &(x, y) in walls {
            grid.set(x, y, Cell::Wall).unwrap();
        }
        grid
    }

    #[test]
    fn test_lone_wall_becomes_floor() {
        let mut grid = floor_field(5, 5, &[(2, 2)]);
        assert_eq!(Pass::StrayWalls.apply(&mut grid, 1), Ok(1));
        assert_eq!(grid.get(2, 2), Ok(Cell::Floor));
    }

    #[test]
    fn test_stray_walls_cascade() {
        // the middle wall only has two floor sides until an end is removed
        let mut grid = floor_field(7, 5, &[(2, 2), (3, 2), (4, 2)]);
        assert_eq!(Pass::StrayWalls.apply(&mut grid, 1), Ok(3));
        assert_eq!(grid.count(Cell::Wall), 0);
    }

    #[test]
    fn test_stray_walls_respects_margin() {
        let mut grid = floor_field(5, 5, &[(0, 2)]);
        assert_eq!(Pass::StrayWalls.apply(&mut grid, 1), Ok(0));
        assert!(grid.is(0, 2, Cell::Wall));
    }

    #[test]
    fn test_twin_walls() {
        let mut grid = floor_field(8, 7, &[(3, 3), (4, 3)]);
        assert_eq!(Pass::TwinWalls.apply(&mut grid, 1), Ok(2));
        assert_eq!(grid.count(Cell::Wall), 0);

        let mut grid = floor_field(8, 7, &[(3, 2), (3, 3)]);
        assert_eq!(Pass::TwinWalls.apply(&mut grid, 1), Ok(2));
        assert_eq!(grid.count(Cell::Wall), 0);
    }

    #[test]
    fn test_twin_walls_ignores_longer_runs() {
        let mut grid = floor_field(8, 7, &[(3, 3), (4, 3), (5, 3)]);
        assert_eq!(Pass::TwinWalls.apply(&mut grid, 1), Ok(0));
    }

    #[test]
    fn test_stray_floor_becomes_wall() {
        let mut grid = Grid::filled(5, 5, Cell::Wall);
        grid.set(2, 2, Cell::Floor).unwrap();
        grid.set(2, 3, Cell::Floor).unwrap();
        assert_eq!(Pass::StrayFloors.apply(&mut grid, 1), Ok(2));
        assert_eq!(grid.count(Cell::Floor), 0);
    }

    #[test]
    fn test_fill_gaps() {
        let mut grid = Grid::new(10, 3);
        for (x, cell) in [(1, Cell::Floor), (2, Cell::Wall), (3, Cell::Wall), (4, Cell::Floor)] {
            grid.set(x, 1, cell).unwrap();
        }
        assert_eq!(Pass::FillGaps.apply(&mut grid, 1), Ok(2));
        assert_eq!(grid.count(Cell::Floor), 4);
    }

    #[test]
    fn test_fill_gaps_leaves_long_and_mixed_runs() {
        let mut grid = Grid::new(12, 3);
        let row = [
            Cell::Floor,
            Cell::Wall,
            Cell::Wall,
            Cell::Wall,
            Cell::Wall,
            Cell::Floor,
            Cell::Wall,
            Cell::Void,
            Cell::Floor,
        ];
        for (x, cell) in row.into_iter().enumerate() {
            grid.set(x as i32 + 1, 1, cell).unwrap();
        }
        assert_eq!(Pass::FillGaps.apply(&mut grid, 1), Ok(0));
    }

    #[test]
    fn test_canopy_margin_is_stable() {
        let mut grid = Grid::new(5, 12);
        grid.set(2, 2, Cell::Wall).unwrap();
        assert_eq!(Pass::CanopyMargin.apply(&mut grid, 1), Ok(3));
        for y in 2..=5 {
            assert!(grid.is(2, y, Cell::Wall));
        }
        assert_eq!(Pass::CanopyMargin.apply(&mut grid, 1), Ok(0));
    }

    #[test]
    fn test_pinched_floor_is_widened() {
        let mut grid = Grid::filled(5, 5, Cell::Wall);
        grid.set(2, 2, Cell::Floor).unwrap();
        // the widened cell at (2, 1) is itself pinched when the scan reaches it
        assert_eq!(Pass::PinchedFloors.apply(&mut grid, 1), Ok(6));
        for (x, y) in [(2, 1), (2, 3), (1, 2), (3, 2), (1, 1), (3, 1)] {
            assert!(grid.is(x, y, Cell::Floor));
        }
    }

    #[test]
    fn test_run_reaches_fixpoint() {
        let mut grid = Grid::new(30, 20);
        let room = single_rectangle(10, 8);
        for (ox, oy) in [(3, 3), (14, 3), (8, 11)] {
            for (x, y, cell) in room.iter() {
                grid.set(ox + x, oy + y, cell).unwrap();
            }
        }
        let processor = PostProcessor::room_tree(2);
        assert!(processor.run(&mut grid).unwrap() > 0);
        assert_eq!(processor.run(&mut grid), Ok(0));
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            PostProcessor::lattice().passes,
            vec![Pass::StrayWalls, Pass::TwinWalls, Pass::StrayFloors]
        );
        assert_eq!(PostProcessor::room_tree(4).edge_margin, 4);
    }
}
