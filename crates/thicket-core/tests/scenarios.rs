use thicket_core::SeededNoise;
use thicket_core::dungeon::{
    Cell, CorridorBuilder, Direction, Grid, Pass, Room, RoomGraph, RoomPlacer, RoomShape,
    WALL_RING, single_rectangle,
};
use thicket_core::config::RoomTreeConfig;

fn stamp(grid: &mut Grid, room: &Room) {
    for (x, y, cell) in room.pattern.iter() {
        grid.set(room.rect.x + x, room.rect.y + y, cell).unwrap();
    }
}

#[test]
fn test_single_rectangle_has_two_cell_ring() {
    let pattern = single_rectangle(15, 10);
    assert_eq!((pattern.width(), pattern.height()), (15, 10));
    assert_eq!(pattern.get(0, 0), Ok(Cell::Wall));
    assert_eq!(pattern.get(2, 2), Ok(Cell::Floor));
    for (x, y, cell) in pattern.iter() {
        let depth = x.min(y).min(14 - x).min(9 - y);
        let expected = if depth < WALL_RING { Cell::Wall } else { Cell::Floor };
        assert_eq!(cell, expected, "cell ({x}, {y})");
    }
}

#[test]
fn test_second_room_right_of_first_points_left() {
    let placer = RoomPlacer {
        level_edge_buffer: 1,
        ..RoomPlacer::from_config(&RoomTreeConfig::default())
    };
    // the first room spans the full height against the left edge, so only
    // positions on its right are open
    let mut grid = Grid::new(48, 17);
    let mut graph = RoomGraph::new();
    let first = Room::new(RoomShape::SingleRectangle, single_rectangle(14, 14)).at(1, 1);
    assert!(placer.try_add_room(&mut grid, &mut graph, first, None).unwrap());

    let second = Room::new(RoomShape::SingleRectangle, single_rectangle(14, 14));
    let mut rng = SeededNoise::new(3);
    assert!(placer.place_child(&mut grid, &mut graph, 0, second, &mut rng).unwrap());

    let second = graph.get(1).unwrap();
    assert_eq!(second.rect.x_min(), 15);
    assert_eq!(second.direction_to_parent, Direction::Left);
    assert_eq!(second.direction_to_parent.opposite(), Direction::Right);
}

#[test]
fn test_isolated_wall_becomes_floor() {
    let mut grid = Grid::filled(9, 9, Cell::Floor);
    grid.set(4, 4, Cell::Wall).unwrap();
    assert_eq!(Pass::StrayWalls.apply(&mut grid, 1), Ok(1));
    assert_eq!(grid.count(Cell::Wall), 0);
}

#[test]
fn test_corridor_crosses_shared_vertical_boundary() {
    for seed in 0..10 {
        let mut grid = Grid::new(40, 20);
        let mut graph = RoomGraph::new();

        let parent = Room::new(RoomShape::SingleRectangle, single_rectangle(15, 12)).at(2, 4);
        let mut child = Room::new(RoomShape::SingleRectangle, single_rectangle(15, 12)).at(17, 4);
        child.parent = Some(0);
        child.direction_to_parent = Direction::between(&child.rect, &parent.rect);
        assert_eq!(child.direction_to_parent, Direction::Left);
        stamp(&mut grid, &parent);
        stamp(&mut grid, &child);
        graph.push(parent);
        graph.push(child);

        CorridorBuilder::new(2, false)
            .build_corridors(&mut grid, &graph, &mut SeededNoise::new(seed))
            .unwrap();

        // rows where both rooms' facing wall rings have been opened
        let rows: Vec<i32> = (0..20)
            .filter(|&y| (15..=18).all(|x| grid.is(x, y, Cell::Floor)))
            .collect();
        assert_eq!(rows.len(), 2, "seed {seed}: {rows:?}");
        assert_eq!(rows[1], rows[0] + 1);
        assert!(rows[0] >= 6 && rows[1] <= 12, "seed {seed}: {rows:?}");
    }
}
