use kestrel::nav::fixed_math::{FixedNum, FixedVec2};
use kestrel::nav::{
    find_path, has_line_of_sight, smooth, steer, MovementClass, NavGrid, Path, Point,
    TerrainCell, TerrainKind, TerrainMap,
};

const TICK_RATE: f32 = 30.0;

/// Minimal movement integrator: apply the velocity, advance the waypoint once the
/// agent is close to the target cell's center.
fn walk_path(grid: &NavGrid, path: &Path, max_speed: FixedNum, max_ticks: usize) -> (FixedVec2, usize) {
    let dt = FixedNum::from_num(1.0 / TICK_RATE);
    let arrive_radius = FixedNum::from_num(0.2);
    let mut pos = path.start().expect("non-empty path").center();
    let mut waypoint_index = 1;

    for _ in 0..max_ticks {
        if waypoint_index >= path.len() {
            break;
        }
        let velocity = steer(pos, max_speed, path, waypoint_index, &[]);
        pos = pos + velocity * dt;

        assert!(grid.world_to_cell(pos).is_some(), "agent left the map at {:?}", pos);

        if let Some(target) = path.get(waypoint_index) {
            if pos.distance(target.center()) < arrive_radius {
                waypoint_index += 1;
            }
        }
    }
    (pos, waypoint_index)
}

#[test]
fn test_pathfinding_around_wall() {
    // 50x50 map, wall at x = 25 from y = 0..40.
    let mut terrain = TerrainMap::filled(50, 50, TerrainKind::Grass);
    for y in 0..40 {
        terrain.set(25, y, TerrainCell::new(TerrainKind::Void));
    }
    let grid = NavGrid::build(&terrain);

    let start = Point::new(5, 25);
    let goal = Point::new(45, 25);
    let raw = find_path(&grid, start, goal, MovementClass::Infantry).expect("path around the wall");
    let smoothed = smooth(&grid, &raw, MovementClass::Infantry);

    assert!(raw.iter().any(|p| p.y >= 40), "must route past the end of the wall");
    assert!(smoothed.len() < raw.len());
    for pair in smoothed.points().windows(2) {
        assert!(has_line_of_sight(&grid, pair[0], pair[1], MovementClass::Infantry));
    }

    let (pos, waypoint_index) = walk_path(&grid, &smoothed, FixedNum::from_num(5.0), 2000);
    assert_eq!(waypoint_index, smoothed.len(), "agent should reach every waypoint");
    assert!(pos.distance(goal.center()) < FixedNum::from_num(0.5));
}

#[test]
fn test_road_attracts_vehicles() {
    // Forest everywhere except a road along the bottom and right edge.
    let mut terrain = TerrainMap::filled(20, 20, TerrainKind::Forest);
    for i in 0..20 {
        terrain.set(i, 0, TerrainCell::new(TerrainKind::Road));
        terrain.set(19, i, TerrainCell::new(TerrainKind::Road));
    }
    let grid = NavGrid::build(&terrain);

    let path = find_path(&grid, Point::new(0, 0), Point::new(19, 19), MovementClass::Vehicle)
        .expect("all land");
    let on_road = path
        .iter()
        .filter(|p| p.y == 0 || p.x == 19)
        .count();
    assert!(on_road * 2 > path.len(), "most of the route should use the road: {:?}", path);
}

#[test]
fn test_bridge_is_the_only_crossing() {
    // River at x = 10..12, bridge at y = 15.
    let mut terrain = TerrainMap::filled(25, 25, TerrainKind::Grass);
    for y in 0..25 {
        for x in 10..13 {
            let kind = if y == 15 { TerrainKind::Bridge } else { TerrainKind::DeepWater };
            terrain.set(x, y, TerrainCell::new(kind));
        }
    }
    let grid = NavGrid::build(&terrain);

    let path = find_path(&grid, Point::new(2, 2), Point::new(22, 2), MovementClass::Infantry)
        .expect("cross on the bridge");
    for p in path.iter().filter(|p| (10..13).contains(&p.x)) {
        assert_eq!(p.y, 15, "crossed the river off the bridge at {:?}", p);
    }

    // Blow up the bridge: no crossing left for ground units.
    let mut grid = grid;
    for x in 10..13 {
        grid.set_blocked(x, 15);
    }
    assert!(find_path(&grid, Point::new(2, 2), Point::new(22, 2), MovementClass::Infantry).is_none());
    assert!(find_path(&grid, Point::new(2, 2), Point::new(22, 2), MovementClass::Naval).is_some());
}

#[test]
fn test_building_placement_invalidates_route() {
    let mut grid = NavGrid::new(15, 5);
    let start = Point::new(0, 2);
    let goal = Point::new(14, 2);

    let before = find_path(&grid, start, goal, MovementClass::Infantry).expect("open field");
    assert_eq!(before.len(), 15);
    let before_cost = before.cost(&grid);

    // Building footprint across the straight line.
    for y in 1..4 {
        for x in 6..9 {
            grid.set_blocked(x, y);
        }
    }
    let after = find_path(&grid, start, goal, MovementClass::Infantry).expect("detour");
    assert!(after.cost(&grid) > before_cost);
    assert!(after.iter().all(|p| !(6..9).contains(&p.x) || p.y == 0 || p.y == 4));
}
