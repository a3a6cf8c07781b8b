use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;
use thicket_core::dungeon::{Grid, PostProcessor};
use thicket_core::{GeneratorConfig, Level, LevelPipeline, Variant};

fn pipeline(variant: Variant) -> LevelPipeline {
    LevelPipeline::new(GeneratorConfig {
        variant,
        ..GeneratorConfig::default()
    })
    .unwrap()
}

fn variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::RoomTree), Just(Variant::Lattice)]
}

/// Walkable cells reachable from (x, y) over 4-neighbour steps
fn reachable(grid: &Grid, start: (i32, i32)) -> HashSet<(i32, i32)> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some((x, y)) = queue.pop_front() {
        for (dx, dy) in [(-1, 0), (1, 0), (0, 1), (0, -1)] {
            let next = (x + dx, y + dy);
            if grid.try_get(next.0, next.1).is_some_and(|c| c.is_walkable()) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// A walkable cell of the room: its centre if open, else the first in scan order
fn anchor(level: &Level, index: usize) -> Option<(i32, i32)> {
    let room = level.rooms.get(index)?;
    let walkable = |&(x, y): &(i32, i32)| level.grid.try_get(x, y).is_some_and(|c| c.is_walkable());
    let centre = room.rect.center();
    if walkable(&centre) {
        return Some(centre);
    }
    room.rect.cells().find(walkable)
}

fn cleanup_for(level: &Level) -> PostProcessor {
    match level.variant {
        Variant::RoomTree => {
            PostProcessor::room_tree(GeneratorConfig::default().room_tree.level_edge_buffer)
        }
        Variant::Lattice => PostProcessor::lattice(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn same_seed_same_level(seed in any::<u64>(), variant in variant()) {
        let pipeline = pipeline(variant);
        prop_assert_eq!(pipeline.generate(seed).unwrap(), pipeline.generate(seed).unwrap());
    }

    #[test]
    fn rooms_form_a_tree(seed in any::<u64>(), variant in variant()) {
        let level = pipeline(variant).generate(seed).unwrap();
        prop_assert!(!level.rooms.is_empty());
        prop_assert!(level.rooms.is_tree());
        for index in 0..level.rooms.len() {
            let path = level.rooms.path_to_root(index);
            prop_assert_eq!(path.and_then(|p| p.last().copied()), Some(0));
        }
    }

    #[test]
    fn rooms_do_not_overlap(seed in any::<u64>(), variant in variant()) {
        let level = pipeline(variant).generate(seed).unwrap();
        let rooms = level.rooms.as_slice();
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                prop_assert!(!a.rect.overlaps(&b.rect));
            }
        }
    }

    #[test]
    fn rooms_respect_level_margin(seed in any::<u64>()) {
        let level = pipeline(Variant::RoomTree).generate(seed).unwrap();
        let margin = GeneratorConfig::default().room_tree.level_edge_buffer;
        for room in level.rooms.iter() {
            prop_assert!(room.rect.x_min() >= margin);
            prop_assert!(room.rect.y_min() >= margin);
            prop_assert!(room.rect.x_max() <= level.grid.width() - margin);
            prop_assert!(room.rect.y_max() <= level.grid.height() - margin);
        }
    }

    #[test]
    fn cleanup_is_idempotent(seed in any::<u64>(), variant in variant()) {
        let level = pipeline(variant).generate(seed).unwrap();
        let mut grid = level.grid.clone();
        prop_assert_eq!(cleanup_for(&level).run(&mut grid).unwrap(), 0);
        prop_assert_eq!(grid, level.grid);
    }

    #[test]
    fn every_room_is_reachable(seed in any::<u64>(), variant in variant()) {
        let level = pipeline(variant).generate(seed).unwrap();
        let start = anchor(&level, 0);
        prop_assert!(start.is_some());
        let region = reachable(&level.grid, start.unwrap());
        for index in 1..level.rooms.len() {
            let cell = anchor(&level, index);
            prop_assert!(cell.is_some_and(|c| region.contains(&c)), "room {} is cut off", index);
        }
    }
}

#[test]
fn test_different_seeds_differ() {
    let pipeline = pipeline(Variant::RoomTree);
    let a = pipeline.generate(1).unwrap();
    let b = pipeline.generate(2).unwrap();
    assert_ne!(a.grid, b.grid);
}

#[test]
fn test_room_tree_has_no_void_inside_rooms() {
    let level = pipeline(Variant::RoomTree).generate(9).unwrap();
    for room in level.rooms.iter() {
        for (x, y, cell) in room.pattern.iter() {
            assert_ne!(cell, thicket_core::dungeon::Cell::Void, "void at ({x}, {y})");
        }
    }
}
