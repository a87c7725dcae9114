use serde::{Deserialize, Serialize};

use super::fixed_math::{FixedNum, FixedVec2};
use super::grid::NavGrid;

/// Integer cell coordinate.
///
/// Signed so that neighbor offsets can step off the grid; bounds are checked by
/// [`NavGrid`] rather than by the coordinate type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// World-space center of the cell (cell coordinate + 0.5).
    pub fn center(self) -> FixedVec2 {
        let half = FixedNum::from_num(0.5);
        FixedVec2::new(
            FixedNum::from_num(self.x) + half,
            FixedNum::from_num(self.y) + half,
        )
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Ordered cell sequence from start to goal, both inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub waypoints: Vec<Point>,
}

impl Path {
    pub fn new(waypoints: Vec<Point>) -> Self {
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.waypoints.first().copied()
    }

    pub fn goal(&self) -> Option<Point> {
        self.waypoints.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.waypoints.get(index).copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.waypoints
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.waypoints.iter()
    }

    /// Re-sum edge costs along the path under the search cost model.
    ///
    /// Each step pays the cost of the cell it enters, times √2 on diagonals.
    /// Only meaningful for unsmoothed paths whose steps are all single-cell moves.
    pub fn cost(&self, grid: &NavGrid) -> FixedNum {
        self.waypoints
            .windows(2)
            .map(|pair| {
                let dx = (pair[1].x - pair[0].x).signum();
                let dy = (pair[1].y - pair[0].y).signum();
                grid.move_cost(pair[1], dx != 0 && dy != 0)
            })
            .fold(FixedNum::ZERO, |acc, c| acc + c)
    }
}

impl From<Vec<Point>> for Path {
    fn from(waypoints: Vec<Point>) -> Self {
        Self { waypoints }
    }
}
