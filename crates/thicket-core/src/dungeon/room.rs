//! Rooms and the room tree
//!
//! Rooms live in a single arena ([`RoomGraph`]); a room's parent is an index
//! into that arena. Room 0 is the root and the only room without a parent.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::grid::Grid;
use super::rect::Rect;
use super::shape::RoomShape;

/// Side of a room on which its parent lies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Direction {
    #[default]
    None,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Direction from `child` to a flush-adjacent `parent`.
    ///
    /// Shared edges are compared in the order left, right, down, up; the
    /// first match wins. Returns `None` if the rectangles do not touch.
    pub fn between(child: &Rect, parent: &Rect) -> Self {
        if child.x_min() == parent.x_max() {
            Direction::Left
        } else if child.x_max() == parent.x_min() {
            Direction::Right
        } else if child.y_min() == parent.y_max() {
            Direction::Down
        } else if child.y_max() == parent.y_min() {
            Direction::Up
        } else {
            Direction::None
        }
    }

    /// The same side seen from the other room
    pub const fn opposite(&self) -> Self {
        match self {
            Direction::None => Direction::None,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Check if the shared boundary is a vertical line (corridor runs along a row)
    pub const fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// A placed room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Position and size in level coordinates
    pub rect: Rect,
    /// Local cell pattern, `rect.width` by `rect.height`
    pub pattern: Grid,
    /// Strategy that produced the pattern
    pub shape: RoomShape,
    /// Index of the parent room in the owning [`RoomGraph`]
    pub parent: Option<usize>,
    pub direction_to_parent: Direction,
}

impl Room {
    /// Create an unplaced room from a pattern; the rect takes the pattern's size
    pub fn new(shape: RoomShape, pattern: Grid) -> Self {
        Self {
            rect: Rect::new(0, 0, pattern.width(), pattern.height()),
            pattern,
            shape,
            parent: None,
            direction_to_parent: Direction::None,
        }
    }

    /// Move the room so its lower-left corner sits at (x, y)
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.rect.x = x;
        self.rect.y = y;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// All rooms of a level; parent links form a tree rooted at room 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomGraph {
    rooms: Vec<Room>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a room and return its index
    pub fn push(&mut self, room: Room) -> usize {
        self.rooms.push(room);
        self.rooms.len() - 1
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub fn root(&self) -> Option<&Room> {
        self.rooms.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn as_slice(&self) -> &[Room] {
        &self.rooms
    }

    /// Parent of the room at `index`
    pub fn parent(&self, index: usize) -> Option<&Room> {
        self.rooms
            .get(index)
            .and_then(|r| r.parent)
            .and_then(|p| self.rooms.get(p))
    }

    /// Indices of the direct children of `index`
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.rooms
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// `(child, parent)` index pairs in placement order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rooms
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.parent.map(|p| (i, p)))
    }

    /// Indices visited walking parent links from `index` up to the root.
    ///
    /// Returns `None` if a link points outside the arena or the walk
    /// revisits a room.
    pub fn path_to_root(&self, index: usize) -> Option<Vec<usize>> {
        let mut path = vec![index];
        let mut current = self.rooms.get(index)?;
        while let Some(p) = current.parent {
            if path.contains(&p) {
                return None;
            }
            path.push(p);
            current = self.rooms.get(p)?;
        }
        Some(path)
    }

    /// Check the tree shape: only room 0 lacks a parent, every non-root
    /// room has a direction, and every room reaches room 0.
    pub fn is_tree(&self) -> bool {
        self.rooms.iter().enumerate().all(|(i, room)| {
            let linked = if i == 0 {
                room.is_root()
            } else {
                !room.is_root() && room.direction_to_parent != Direction::None
            };
            linked && self.path_to_root(i).and_then(|p| p.last().copied()) == Some(0)
        })
    }

    /// Integer centre of room 0, where the player starts
    pub fn spawn_point(&self) -> Option<(i32, i32)> {
        self.root().map(|r| r.rect.center())
    }
}

/// A planned straight corridor between two rooms of a lattice level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorSpec {
    /// Parent room index
    pub from: usize,
    /// Child room index
    pub to: usize,
    /// Strip width in cells
    pub width: i32,
    /// Sideways shift of the strip from the room centre line
    pub offset: i32,
}
