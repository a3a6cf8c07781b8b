//! Lattice layout
//!
//! Equal-sized rooms are placed flush against each other on a lattice
//! anchored at room 0, then shifted into positive coordinates and stamped
//! with a floor interior and a 2-cell wall ring. Noise walls then eat into
//! every room side so the lattice does not read as a grid of boxes.

use tracing::{debug, warn};

use super::grid::{Cell, Grid};
use super::rect::Rect;
use super::room::{Direction, Room, RoomGraph};
use super::shape::{RoomShape, single_rectangle};
use crate::config::LatticeConfig;
use crate::error::Result;
use crate::source::NoiseSource;

/// Void margin around the outermost rooms
pub const LATTICE_MARGIN: i32 = 2;

/// Place rooms, normalise them into a fresh grid and stamp them
pub fn build_lattice<R: NoiseSource>(
    config: &LatticeConfig,
    rng: &mut R,
) -> Result<(Grid, RoomGraph)> {
    let placed = place_lattice_rects(config, rng);
    realize(&placed)
}

/// Lattice rectangles with their parent links, in placement order.
/// Room 0 sits at the origin, so later rooms may have negative coordinates.
pub fn place_lattice_rects<R: NoiseSource>(
    config: &LatticeConfig,
    rng: &mut R,
) -> Vec<(Rect, Option<usize>)> {
    let (w, h) = (config.room_width, config.room_height);
    let total = rng.uniform_int(config.min_rooms as i32, config.max_rooms as i32) as usize;
    let mut placed = vec![(Rect::new(0, 0, w, h), None)];
    let mut attempts = 0;

    while placed.len() < total {
        if attempts >= config.max_attempts {
            warn!(
                placed = placed.len(),
                requested = total,
                "lattice placement gave up"
            );
            break;
        }
        attempts += 1;

        let parent = rng.pick_index(placed.len());
        let p = placed[parent].0;
        let mut positions = [
            (p.x, p.y + h),
            (p.x, p.y - h),
            (p.x - w, p.y),
            (p.x + w, p.y),
        ];
        rng.shuffle(&mut positions);

        let free = positions
            .iter()
            .map(|&(x, y)| Rect::new(x, y, w, h))
            .find(|rect| !placed.iter().any(|(other, _)| other.overlaps(rect)));
        if let Some(rect) = free {
            placed.push((rect, Some(parent)));
        }
    }

    placed
}

/// Shift into positive coordinates, size the grid to fit and stamp the rooms
fn realize(placed: &[(Rect, Option<usize>)]) -> Result<(Grid, RoomGraph)> {
    let min_x = placed.iter().map(|(r, _)| r.x_min()).min().unwrap_or(0);
    let min_y = placed.iter().map(|(r, _)| r.y_min()).min().unwrap_or(0);
    let (dx, dy) = (LATTICE_MARGIN - min_x, LATTICE_MARGIN - min_y);

    let rects: Vec<Rect> = placed.iter().map(|(r, _)| r.translated(dx, dy)).collect();
    let width = rects.iter().map(Rect::x_max).max().unwrap_or(0) + LATTICE_MARGIN;
    let height = rects.iter().map(Rect::y_max).max().unwrap_or(0) + LATTICE_MARGIN;

    let mut grid = Grid::new(width, height);
    let mut graph = RoomGraph::new();
    for (rect, (_, parent)) in rects.iter().zip(placed) {
        let mut room = Room::new(
            RoomShape::SingleRectangle,
            single_rectangle(rect.width, rect.height),
        )
        .at(rect.x, rect.y);
        room.parent = *parent;
        room.direction_to_parent = parent
            .and_then(|p| rects.get(p))
            .map_or(Direction::None, |p| Direction::between(rect, p));

        for (x, y, cell) in room.pattern.iter() {
            grid.set(rect.x + x, rect.y + y, cell)?;
        }
        graph.push(room);
    }

    debug!(width, height, rooms = graph.len(), "lattice stamped");
    Ok((grid, graph))
}

/// Grow noise-driven walls inward from every side of every room.
///
/// Each side draws its own offset along the side; the wall depth at a cell
/// is the noise remapped to `[0, 1]` times `max_border_wall_depth`.
pub fn apply_noise_walls<R: NoiseSource>(
    grid: &mut Grid,
    graph: &RoomGraph,
    config: &LatticeConfig,
    rng: &mut R,
) -> Result<()> {
    let scale = config.wall_noise_scale;
    let depth_at = |rng: &R, u: f64, v: f64| -> i32 {
        let n = (rng.noise2d(u, v) + 1.0) * 0.5;
        (n * config.max_border_wall_depth as f64) as i32
    };

    for room in graph.iter() {
        let r = room.rect;

        let offset = rng.uniform_int(0, r.width - 1) as f64;
        for x in r.x_min()..r.x_max() {
            let depth = depth_at(rng, x as f64 * scale + offset, r.y_min() as f64 * scale);
            for d in 0..depth {
                grid.set(x, r.y_min() + d, Cell::Wall)?;
            }
        }

        let offset = rng.uniform_int(0, r.width - 1) as f64;
        for x in r.x_min()..r.x_max() {
            let depth = depth_at(rng, x as f64 * scale + offset, r.y_max() as f64 * scale);
            for d in 0..depth {
                grid.set(x, r.y_max() - d - 1, Cell::Wall)?;
            }
        }

        let offset = rng.uniform_int(0, r.height - 1) as f64;
        for y in r.y_min()..r.y_max() {
            let depth = depth_at(rng, r.x_min() as f64 * scale, y as f64 * scale + offset);
            for d in 0..depth {
                grid.set(r.x_min() + d, y, Cell::Wall)?;
            }
        }

        let offset = rng.uniform_int(0, r.height - 1) as f64;
        for y in r.y_min()..r.y_max() {
            let depth = depth_at(rng, r.x_max() as f64 * scale, y as f64 * scale + offset);
            for d in 0..depth {
                grid.set(r.x_max() - d - 1, y, Cell::Wall)?;
            }
        }
    }
    Ok(())
}

/// Check for a lattice neighbour flush against `rect` on side `side`
pub fn has_neighbour(graph: &RoomGraph, rect: &Rect, side: Direction) -> bool {
    graph.iter().any(|other| {
        let o = &other.rect;
        match side {
            Direction::Up => rect.y_max() == o.y_min() && rect.x_min() == o.x_min(),
            Direction::Down => rect.y_min() == o.y_max() && rect.x_min() == o.x_min(),
            Direction::Left => rect.x_min() == o.x_max() && rect.y_min() == o.y_min(),
            Direction::Right => rect.x_max() == o.x_min() && rect.y_min() == o.y_min(),
            Direction::None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SeededNoise;
    use crate::source::scripted::ScriptedSource;

    fn single_room() -> LatticeConfig {
        LatticeConfig {
            min_rooms: 1,
            max_rooms: 1,
            ..LatticeConfig::default()
        }
    }

    #[test]
    fn test_lattice_rooms_are_flush_and_disjoint() {
        let config = LatticeConfig::default();
        for seed in 0..20 {
            let (grid, graph) = build_lattice(&config, &mut SeededNoise::new(seed)).unwrap();
            assert!((1..=10).contains(&graph.len()));
            assert!(graph.is_tree());
            let rooms = graph.as_slice();
            for (i, room) in rooms.iter().enumerate() {
                assert_eq!((room.rect.width, room.rect.height), (38, 24));
                assert_eq!((room.rect.x - LATTICE_MARGIN) % 38, 0);
                assert_eq!((room.rect.y - LATTICE_MARGIN) % 24, 0);
                assert!(room.rect.x_max() + LATTICE_MARGIN <= grid.width());
                assert!(room.rect.y_max() + LATTICE_MARGIN <= grid.height());
                for other in &rooms[i + 1..] {
                    assert!(!room.rect.overlaps(&other.rect));
                }
            }
        }
    }

    #[test]
    fn test_lattice_is_normalised() {
        let config = LatticeConfig::default();
        let (grid, graph) = build_lattice(&config, &mut SeededNoise::new(2)).unwrap();
        let min_x = graph.iter().map(|r| r.rect.x_min()).min();
        let min_y = graph.iter().map(|r| r.rect.y_min()).min();
        let max_x = graph.iter().map(|r| r.rect.x_max()).max();
        assert_eq!(min_x, Some(LATTICE_MARGIN));
        assert_eq!(min_y, Some(LATTICE_MARGIN));
        assert_eq!(max_x, Some(grid.width() - LATTICE_MARGIN));
    }

    #[test]
    fn test_single_room_is_stamped_with_ring() {
        let (grid, graph) = build_lattice(&single_room(), &mut SeededNoise::new(0)).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!((grid.width(), grid.height()), (42, 28));
        assert_eq!(grid.count(Cell::Floor), 34 * 20);
        assert!(grid.is(3, 3, Cell::Wall));
        assert!(grid.is(4, 4, Cell::Floor));
        assert!(grid.is(1, 1, Cell::Void));
    }

    #[test]
    fn test_noise_walls_follow_noise_depth() {
        let config = single_room();
        let (mut grid, graph) = build_lattice(&config, &mut SeededNoise::new(0)).unwrap();

        // noise at -1 maps to depth 0
        let mut flat = ScriptedSource::new(&[], &[]);
        flat.noise = -1.0;
        apply_noise_walls(&mut grid, &graph, &config, &mut flat).unwrap();
        assert_eq!(grid.count(Cell::Floor), 34 * 20);

        // noise at 1 maps to the full depth of 5 on every side
        let mut peak = ScriptedSource::new(&[], &[]);
        peak.noise = 1.0;
        apply_noise_walls(&mut grid, &graph, &config, &mut peak).unwrap();
        assert_eq!(grid.count(Cell::Floor), 28 * 14);
        assert!(grid.is(6, 10, Cell::Wall));
        assert!(grid.is(7, 10, Cell::Floor));
    }

    #[test]
    fn test_attempt_cap_stops_placement() {
        let config = LatticeConfig {
            min_rooms: 5,
            max_rooms: 5,
            max_attempts: 0,
            ..LatticeConfig::default()
        };
        let placed = place_lattice_rects(&config, &mut SeededNoise::new(1));
        assert_eq!(placed.len(), 1);
    }

    #[test]
    fn test_has_neighbour() {
        let mut graph = RoomGraph::new();
        for (x, y) in [(0, 0), (10, 0), (0, 8)] {
            graph.push(Room::new(RoomShape::SingleRectangle, single_rectangle(10, 8)).at(x, y));
        }
        let root = Rect::new(0, 0, 10, 8);
        assert!(has_neighbour(&graph, &root, Direction::Right));
        assert!(has_neighbour(&graph, &root, Direction::Up));
        assert!(!has_neighbour(&graph, &root, Direction::Left));
        assert!(!has_neighbour(&graph, &root, Direction::Down));
    }
}
