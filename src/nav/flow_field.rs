use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use kestrel_macros::profile;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::fixed_math::{FixedNum, FixedVec2, INFINITY};
use super::grid::{NavGrid, NEIGHBOR_OFFSETS};
use super::movement::Passability;
use super::types::Point;

/// Per-cell direction-to-goal field shared by every unit ordered to one target.
///
/// # Algorithm
///
/// 1. **Integration field:** flood outward from the goal with a FIFO queue,
///    re-queuing a cell whenever a cheaper route to it is found. Steps use the
///    same costs and corner rule as A*, so each cell ends up with the cost of its
///    cheapest route to the goal.
/// 2. **Vector field:** each reachable cell points at the legal neighbor with the
///    strictly lowest cost-to-goal (first in [`NEIGHBOR_OFFSETS`] order on ties),
///    normalized to unit length.
///
/// Unreachable cells and the goal itself hold a zero vector. A field is never
/// patched: rebuild it when the goal or the grid changes.
///
/// # Performance
///
/// - **Generation:** O(width × height) cells, with revisits on non-uniform costs
/// - **Query:** O(1) array lookup
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    width: usize,
    height: usize,
    goal: Option<Point>,
    integration_field: Vec<FixedNum>, // Cost to goal, INFINITY if unreachable
    vector_field: Vec<FixedVec2>,     // Unit direction to move
}

impl FlowField {
    /// A field of the given size where nothing reaches any goal.
    pub fn unreachable(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            goal: None,
            integration_field: vec![INFINITY; size],
            vector_field: vec![FixedVec2::ZERO; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `None` when the field was built for an out-of-bounds goal.
    pub fn goal(&self) -> Option<Point> {
        self.goal
    }

    fn get_index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Unit direction toward the goal; zero for the goal, unreachable and
    /// out-of-bounds cells.
    pub fn direction(&self, x: i32, y: i32) -> FixedVec2 {
        self.get_index(x, y).map_or(FixedVec2::ZERO, |idx| self.vector_field[idx])
    }

    /// Integrated cost to the goal; [`INFINITY`] when unreachable or out of bounds.
    pub fn cost_to_goal(&self, x: i32, y: i32) -> FixedNum {
        self.get_index(x, y).map_or(INFINITY, |idx| self.integration_field[idx])
    }

    pub fn is_reachable(&self, x: i32, y: i32) -> bool {
        self.cost_to_goal(x, y) != INFINITY
    }

    /// Direction for the cell containing a world position.
    pub fn sample(&self, world_pos: FixedVec2) -> FixedVec2 {
        let x = world_pos.x.floor().to_num::<i64>();
        let y = world_pos.y.floor().to_num::<i64>();
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => self.direction(x, y),
            _ => FixedVec2::ZERO,
        }
    }

    fn generate_integration_field(&mut self, grid: &NavGrid, goal: Point, mask: Passability) {
        let Some(goal_idx) = self.get_index(goal.x, goal.y) else {
            return;
        };
        self.goal = Some(goal);
        self.integration_field[goal_idx] = FixedNum::ZERO;

        let mut queued = FixedBitSet::with_capacity(self.width * self.height);
        let mut queue = VecDeque::new();
        queue.push_back(goal);
        queued.insert(goal_idx);

        while let Some(current) = queue.pop_front() {
            let Some(c_idx) = self.get_index(current.x, current.y) else {
                continue;
            };
            queued.set(c_idx, false);
            let current_cost = self.integration_field[c_idx];

            for (dx, dy) in NEIGHBOR_OFFSETS {
                let next = current.offset(dx, dy);
                if !grid.passable_at(next, mask) {
                    continue;
                }
                // Moving next -> current brushes the same two orthogonal cells.
                let diagonal = dx != 0 && dy != 0;
                if diagonal
                    && !(grid.passable(current.x + dx, current.y, mask)
                        && grid.passable(current.x, current.y + dy, mask))
                {
                    continue;
                }

                let Some(n_idx) = self.get_index(next.x, next.y) else {
                    continue;
                };
                let new_cost = current_cost + grid.move_cost(current, diagonal);
                if new_cost < self.integration_field[n_idx] {
                    self.integration_field[n_idx] = new_cost;
                    if !queued.contains(n_idx) {
                        queued.insert(n_idx);
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    fn generate_vector_field(&mut self, grid: &NavGrid, mask: Passability) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let Some(idx) = self.get_index(x, y) else {
                    continue;
                };
                let here = Point::new(x, y);

                if self.integration_field[idx] == INFINITY || self.goal == Some(here) {
                    self.vector_field[idx] = FixedVec2::ZERO;
                    continue;
                }

                let mut best_cost = self.integration_field[idx];
                let mut best_dir = FixedVec2::ZERO;

                for (dx, dy) in NEIGHBOR_OFFSETS {
                    let next = here.offset(dx, dy);
                    if !(grid.passable_at(next, mask) || self.goal == Some(next)) {
                        continue;
                    }
                    if dx != 0
                        && dy != 0
                        && !(grid.passable(x + dx, y, mask) && grid.passable(x, y + dy, mask))
                    {
                        continue;
                    }

                    let n_cost = self.cost_to_goal(next.x, next.y);
                    if n_cost < best_cost {
                        best_cost = n_cost;
                        best_dir = FixedVec2::new(FixedNum::from_num(dx), FixedNum::from_num(dy));
                    }
                }

                self.vector_field[idx] = best_dir.normalize();
            }
        }
    }
}

/// Build the flow field toward `goal` for the given movement mask.
///
/// An out-of-bounds goal yields a field where every cell is unreachable. The
/// goal cell itself seeds the flood even when it is blocked (a building being
/// attacked), so units gather on the cells around it.
#[profile(2000)]
pub fn build_flow_field(grid: &NavGrid, goal: Point, mask: impl Into<Passability>) -> FlowField {
    let mask = mask.into();
    let mut field = FlowField::unreachable(grid.width(), grid.height());

    if !grid.in_bounds(goal.x, goal.y) {
        debug!("[FLOW_FIELD] Goal {:?} outside {}x{} grid", goal, grid.width(), grid.height());
        return field;
    }

    field.generate_integration_field(grid, goal, mask);
    field.generate_vector_field(grid, mask);
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::fixed_math::SQRT_2;
    use crate::nav::movement::MovementClass;
    use crate::nav::terrain::{TerrainCell, TerrainKind, TerrainMap};

    fn approx_unit(v: FixedVec2) -> bool {
        (v.length().to_num::<f32>() - 1.0).abs() < 0.001
    }

    #[test]
    fn test_goal_cell_has_zero_cost_and_direction() {
        let grid = NavGrid::new(5, 5);
        let field = build_flow_field(&grid, Point::new(2, 2), MovementClass::Infantry);

        assert_eq!(field.cost_to_goal(2, 2), FixedNum::ZERO);
        assert_eq!(field.direction(2, 2), FixedVec2::ZERO);
        assert_eq!(field.goal(), Some(Point::new(2, 2)));
    }

    #[test]
    fn test_corridor_points_toward_goal() {
        let grid = NavGrid::new(8, 1);
        let field = build_flow_field(&grid, Point::new(0, 0), MovementClass::Vehicle);

        for x in 1..8 {
            let dir = field.direction(x, 0);
            assert_eq!(dir, FixedVec2::new(-FixedNum::ONE, FixedNum::ZERO), "cell {x}");
            assert!(approx_unit(dir));
            assert_eq!(field.cost_to_goal(x, 0), FixedNum::from_num(x));
        }
    }

    #[test]
    fn test_out_of_bounds_goal_is_all_unreachable() {
        let grid = NavGrid::new(4, 4);
        let field = build_flow_field(&grid, Point::new(4, 0), MovementClass::Infantry);

        assert_eq!(field.goal(), None);
        for y in 0..4 {
            for x in 0..4 {
                assert!(!field.is_reachable(x, y));
                assert_eq!(field.direction(x, y), FixedVec2::ZERO);
            }
        }
    }

    #[test]
    fn test_diagonal_costs_and_directions() {
        let grid = NavGrid::new(3, 3);
        let field = build_flow_field(&grid, Point::new(0, 0), MovementClass::Infantry);

        assert_eq!(field.cost_to_goal(1, 1), SQRT_2);
        assert_eq!(field.cost_to_goal(2, 2), SQRT_2 * FixedNum::from_num(2));
        let dir = field.direction(2, 2);
        assert!(approx_unit(dir));
        assert!(dir.x < FixedNum::ZERO && dir.y < FixedNum::ZERO);
    }

    #[test]
    fn test_walled_region_unreachable() {
        let mut grid = NavGrid::new(5, 5);
        for y in 0..5 {
            grid.set_blocked(2, y);
        }
        let field = build_flow_field(&grid, Point::new(0, 0), MovementClass::Infantry);

        assert!(field.is_reachable(1, 4));
        assert!(!field.is_reachable(3, 0));
        assert!(!field.is_reachable(2, 2), "blocked cells are unreachable");
        assert_eq!(field.direction(4, 4), FixedVec2::ZERO);
    }

    #[test]
    fn test_no_direction_across_cut_corner() {
        // Goal at (0,0); (1,0) and (0,1) blocked. (1,1) touches the goal only
        // diagonally between two walls, so it must not be reachable.
        let mut grid = NavGrid::new(3, 3);
        grid.set_blocked(1, 0);
        grid.set_blocked(0, 1);
        let field = build_flow_field(&grid, Point::new(0, 0), MovementClass::Infantry);

        assert!(!field.is_reachable(1, 1));
        assert_eq!(field.direction(1, 1), FixedVec2::ZERO);
    }

    #[test]
    fn test_blocked_goal_still_seeds_field() {
        let mut grid = NavGrid::new(5, 5);
        grid.set_blocked(2, 2);
        let field = build_flow_field(&grid, Point::new(2, 2), MovementClass::Infantry);

        assert_eq!(field.cost_to_goal(2, 2), FixedNum::ZERO);
        assert!(field.is_reachable(0, 0));
        let dir = field.direction(0, 2);
        assert!(dir.x > FixedNum::ZERO, "west cells flow east toward the building");
    }

    #[test]
    fn test_movement_class_restricts_field() {
        // Middle cell is water: naval and air only.
        let mut terrain = TerrainMap::filled(3, 1, TerrainKind::Grass);
        terrain.set(1, 0, TerrainCell::new(TerrainKind::Water));
        let grid = NavGrid::build(&terrain);

        let ground = build_flow_field(&grid, Point::new(0, 0), MovementClass::Infantry);
        let air = build_flow_field(&grid, Point::new(0, 0), MovementClass::Air);

        assert!(!ground.is_reachable(2, 0));
        assert!(air.is_reachable(2, 0));
    }

    #[test]
    fn test_sample_uses_containing_cell() {
        let grid = NavGrid::new(4, 1);
        let field = build_flow_field(&grid, Point::new(3, 0), MovementClass::Infantry);

        assert_eq!(field.sample(FixedVec2::from_f32(0.9, 0.2)), field.direction(0, 0));
        assert_eq!(field.sample(FixedVec2::from_f32(-3.0, 0.2)), FixedVec2::ZERO);
    }
}
