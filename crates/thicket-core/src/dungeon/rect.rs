//! Axis-aligned rectangles in level coordinates
//!
//! Rectangles are half-open: a room at `x` with `width` covers columns
//! `x..x + width`, so `x_max()` is the first column past the room. Two rooms
//! are flush neighbours when one's `x_max()` equals the other's `x_min()`.

use serde::{Deserialize, Serialize};

/// A rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left column
    pub x: i32,
    /// Bottom row
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn x_min(&self) -> i32 {
        self.x
    }

    /// First column past the right edge
    pub const fn x_max(&self) -> i32 {
        self.x + self.width
    }

    pub const fn y_min(&self) -> i32 {
        self.y
    }

    /// First row past the top edge
    pub const fn y_max(&self) -> i32 {
        self.y + self.height
    }

    /// Integer centre
    pub const fn center(&self) -> (i32, i32) {
        (
            (self.x_min() + self.x_max()) / 2,
            (self.y_min() + self.y_max()) / 2,
        )
    }

    /// Check if a cell lies inside this rectangle
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_min() && x < self.x_max() && y >= self.y_min() && y < self.y_max()
    }

    /// Check if two rectangles share at least one cell (touching edges do not count)
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.x_min() < other.x_max()
            && other.x_min() < self.x_max()
            && self.y_min() < other.y_max()
            && other.y_min() < self.y_max()
    }

    /// Move by an offset
    pub const fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Iterate over every cell, column by column
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x0, x1, y0, y1) = (self.x_min(), self.x_max(), self.y_min(), self.y_max());
        (x0..x1).flat_map(move |x| (y0..y1).map(move |y| (x, y)))
    }
}
