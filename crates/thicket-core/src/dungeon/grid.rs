//! Map cells and the checked 2D grid
//!
//! The same [`Grid`] type holds the level map and each room's local
//! pattern. Coordinates are `i32` so candidate positions may go negative
//! before they are bounds-checked; y grows upward (row 0 is the bottom).

use core::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::{GenError, Result};

/// Orthogonal neighbour offsets: left, right, up, down
pub const NEIGHBOURS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

/// Cell/terrain type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Cell {
    /// Nothing allocated here; renders as nothing
    #[default]
    Void = 0,
    /// Walkable ground
    Floor = 1,
    /// Solid tree mass
    Wall = 2,
    /// Floor-like connector where a corridor crosses a room boundary
    Door = 3,
}

impl Cell {
    /// Check if this cell can be walked on
    pub const fn is_walkable(&self) -> bool {
        matches!(self, Cell::Floor | Cell::Door)
    }

    /// Check if this cell is tree cover (a wall)
    pub const fn is_solid(&self) -> bool {
        matches!(self, Cell::Wall)
    }

    /// Get the display character for this cell
    pub const fn symbol(&self) -> char {
        match self {
            Cell::Void => ' ',
            Cell::Floor => '.',
            Cell::Wall => '#',
            Cell::Door => '+',
        }
    }
}

/// Fixed-size 2D array of cells with checked access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid filled with `Void`
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, Cell::Void)
    }

    /// Create a grid filled with `cell`
    pub fn filled(width: i32, height: i32, cell: Cell) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![cell; (width * height) as usize],
        }
    }

    /// Build a grid cell by cell; `f` is called column by column (x outer, y inner)
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(i32, i32) -> Cell) -> Self {
        let mut grid = Self::new(width, height);
        for x in 0..grid.width {
            for y in 0..grid.height {
                let i = (y * grid.width + x) as usize;
                grid.cells[i] = f(x, y);
            }
        }
        grid
    }

    /// Width in cells
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Check if a coordinate is inside the grid
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y).then(|| (y * self.width + x) as usize)
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> GenError {
        GenError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// Read a cell; out-of-bounds access is an error
    pub fn get(&self, x: i32, y: i32) -> Result<Cell> {
        self.index(x, y)
            .map(|i| self.cells[i])
            .ok_or_else(|| self.out_of_bounds(x, y))
    }

    /// Read a cell if it exists (for neighbour probes that may look past the edge)
    pub fn try_get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Write a cell; out-of-bounds access is an error
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> Result<()> {
        let i = self.index(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        self.cells[i] = cell;
        Ok(())
    }

    /// Check the cell at (x, y); false when out of bounds
    pub fn is(&self, x: i32, y: i32, cell: Cell) -> bool {
        self.try_get(x, y) == Some(cell)
    }

    /// Iterate over every cell as `(x, y, cell)`, column by column
    /// (x outer, y inner), which is the scan order the generator relies on.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).map(move |y| (x, y, self.cells[(y * self.width + x) as usize]))
        })
    }

    /// Count cells of a given kind
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Count orthogonal neighbours of the given kind
    pub fn count_neighbours_4(&self, x: i32, y: i32, cell: Cell) -> usize {
        NEIGHBOURS_4
            .iter()
            .filter(|(dx, dy)| self.is(x + dx, y + dy, cell))
            .count()
    }

    /// Count all eight surrounding neighbours of the given kind
    pub fn count_neighbours_8(&self, x: i32, y: i32, cell: Cell) -> usize {
        let mut count = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if (dx != 0 || dy != 0) && self.is(x + dx, y + dy, cell) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Replace every `from` cell with `to`
    pub fn replace_all(&mut self, from: Cell, to: Cell) {
        for c in &mut self.cells {
            if *c == from {
                *c = to;
            }
        }
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` (inclusive) of cells of a kind
    pub fn bounds_of(&self, cell: Cell) -> Option<(i32, i32, i32, i32)> {
        self.iter()
            .filter(|&(_, _, c)| c == cell)
            .fold(None, |acc, (x, y, _)| match acc {
                None => Some((x, y, x, y)),
                Some((lx, ly, hx, hy)) => Some((lx.min(x), ly.min(y), hx.max(x), hy.max(y))),
            })
    }

    /// Render as text, top row first
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(self.cells[(y * self.width + x) as usize].symbol());
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_new_grid_is_void() {
        let grid = Grid::new(6, 4);
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.count(Cell::Void), 24);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut grid = Grid::new(5, 5);
        assert_eq!(
            grid.get(-1, 0),
            Err(GenError::OutOfBounds {
                x: -1,
                y: 0,
                width: 5,
                height: 5
            })
        );
        assert!(grid.get(5, 0).is_err());
        assert!(grid.set(0, 5, Cell::Wall).is_err());
        assert_eq!(grid.try_get(5, 5), None);
        assert!(!grid.is(-1, -1, Cell::Void));
        // nothing was written
        assert_eq!(grid.count(Cell::Void), 25);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new(3, 3);
        grid.set(2, 1, Cell::Floor).unwrap();
        assert_eq!(grid.get(2, 1), Ok(Cell::Floor));
        assert!(grid.is(2, 1, Cell::Floor));
    }

    #[test]
    fn test_neighbour_counts() {
        let mut grid = Grid::filled(3, 3, Cell::Floor);
        grid.set(1, 1, Cell::Wall).unwrap();
        grid.set(0, 0, Cell::Wall).unwrap();
        assert_eq!(grid.count_neighbours_4(1, 1, Cell::Floor), 4);
        assert_eq!(grid.count_neighbours_8(1, 1, Cell::Floor), 7);
        // corners only see in-bounds neighbours
        assert_eq!(grid.count_neighbours_8(2, 2, Cell::Floor), 2);
    }

    #[test]
    fn test_iter_scan_order() {
        let grid = Grid::new(2, 2);
        let order: Vec<_> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_from_fn_call_order() {
        let mut calls = Vec::new();
        let grid = Grid::from_fn(2, 3, |x, y| {
            calls.push((x, y));
            if x == 1 { Cell::Wall } else { Cell::Floor }
        });
        assert_eq!(calls[..3], [(0, 0), (0, 1), (0, 2)]);
        assert_eq!(grid.count(Cell::Wall), 3);
        assert!(grid.is(1, 2, Cell::Wall));
    }

    #[test]
    fn test_bounds_of() {
        let mut grid = Grid::new(8, 8);
        assert_eq!(grid.bounds_of(Cell::Floor), None);
        grid.set(2, 5, Cell::Floor).unwrap();
        grid.set(6, 1, Cell::Floor).unwrap();
        assert_eq!(grid.bounds_of(Cell::Floor), Some((2, 1, 6, 5)));
    }

    #[test]
    fn test_ascii_top_row_first() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 1, Cell::Wall).unwrap();
        grid.set(1, 0, Cell::Floor).unwrap();
        assert_eq!(grid.to_ascii(), "# \n .\n");
    }

    #[test]
    fn test_walkable_cells() {
        let walkable: Vec<_> = Cell::iter().filter(Cell::is_walkable).collect();
        assert_eq!(walkable, vec![Cell::Floor, Cell::Door]);
        let solid: Vec<_> = Cell::iter().filter(Cell::is_solid).collect();
        assert_eq!(solid, vec![Cell::Wall]);
    }
}
