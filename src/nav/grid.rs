use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::fixed_math::{FixedNum, FixedVec2, SQRT_2};
use super::movement::Passability;
use super::terrain::TerrainMap;
use super::types::Point;

/// 8-neighborhood offsets in fixed enumeration order: cardinals (W, E, S, N)
/// first, then diagonals (SW, NW, SE, NE).
///
/// Both A* expansion and flow-field direction selection walk neighbors in this
/// order, so ties resolve the same way everywhere.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1), // Cardinals
    (-1, -1), (-1, 1), (1, -1), (1, 1), // Diagonals
];

/// Navigation grid derived from terrain.
///
/// Each cell stores a traversal cost (0 = blocked) and the set of movement
/// classes allowed on it. A cell is traversable for a class iff its cost is
/// positive and the class bit is set.
///
/// Dimensions are fixed for the lifetime of a build; only [`NavGrid::rebuild`]
/// can change them. Searches borrow the grid immutably, so the borrow checker
/// already keeps mutations from overlapping an in-flight search on one thread.
#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NavGridData")]
pub struct NavGrid {
    width: usize,
    height: usize,
    cost_field: Vec<FixedNum>,
    passability_field: Vec<Passability>,
}

/// Unchecked wire shape of [`NavGrid`].
#[derive(Serialize, Deserialize)]
struct NavGridData {
    width: usize,
    height: usize,
    cost_field: Vec<FixedNum>,
    passability_field: Vec<Passability>,
}

impl TryFrom<NavGridData> for NavGrid {
    type Error = String;

    fn try_from(data: NavGridData) -> Result<Self, Self::Error> {
        let size = data
            .width
            .checked_mul(data.height)
            .ok_or_else(|| format!("nav grid {}x{} overflows", data.width, data.height))?;
        if data.cost_field.len() != size || data.passability_field.len() != size {
            return Err(format!(
                "nav grid is {}x{} but has {} costs and {} passability entries",
                data.width,
                data.height,
                data.cost_field.len(),
                data.passability_field.len()
            ));
        }
        Ok(Self {
            width: data.width,
            height: data.height,
            cost_field: data.cost_field,
            passability_field: data.passability_field,
        })
    }
}

impl NavGrid {
    /// Open ground everywhere: cost 1, passable to every class.
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            cost_field: vec![FixedNum::ONE; size],
            passability_field: vec![Passability::ALL; size],
        }
    }

    pub fn build(terrain: &TerrainMap) -> Self {
        let mut grid = Self::default();
        grid.rebuild(terrain);
        grid
    }

    /// Replace all state, dimensions included, from `terrain`.
    ///
    /// Paths and flow fields computed against the previous state are stale after
    /// this call.
    pub fn rebuild(&mut self, terrain: &TerrainMap) {
        if terrain.width().checked_mul(terrain.height()) != Some(terrain.cells().len()) {
            error!(
                "Refusing to rebuild from a {}x{} terrain map with {} cells",
                terrain.width(),
                terrain.height(),
                terrain.cells().len()
            );
            *self = Self::default();
            return;
        }
        self.width = terrain.width();
        self.height = terrain.height();
        self.cost_field = terrain.cells().iter().map(|cell| cell.cost()).collect();
        self.passability_field = terrain.cells().iter().map(|cell| cell.passability()).collect();

        debug!(
            "NavGrid rebuilt: {}x{}, {} blocked cells",
            self.width,
            self.height,
            self.cost_field.iter().filter(|c| **c == FixedNum::ZERO).count()
        );
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get_index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Traversal cost of a cell; 0 for blocked or out-of-bounds cells.
    #[inline]
    pub fn cost(&self, x: i32, y: i32) -> FixedNum {
        self.get_index(x, y).map_or(FixedNum::ZERO, |idx| self.cost_field[idx])
    }

    #[inline]
    pub fn passability(&self, x: i32, y: i32) -> Passability {
        self.get_index(x, y).map_or(Passability::NONE, |idx| self.passability_field[idx])
    }

    #[inline]
    pub fn passable(&self, x: i32, y: i32, mask: impl Into<Passability>) -> bool {
        let mask = mask.into();
        match self.get_index(x, y) {
            Some(idx) => {
                self.cost_field[idx] > FixedNum::ZERO && self.passability_field[idx].intersects(mask)
            }
            None => false,
        }
    }

    #[inline]
    pub fn passable_at(&self, p: Point, mask: Passability) -> bool {
        self.passable(p.x, p.y, mask)
    }

    /// Mark a cell impassable (e.g. a building was placed on it).
    pub fn set_blocked(&mut self, x: i32, y: i32) {
        match self.get_index(x, y) {
            Some(idx) => self.cost_field[idx] = FixedNum::ZERO,
            None => warn!("set_blocked({}, {}) outside {}x{} grid", x, y, self.width, self.height),
        }
    }

    /// Override a cell's cost. Negative values clamp to 0 (blocked).
    pub fn set_cost(&mut self, x: i32, y: i32, value: FixedNum) {
        match self.get_index(x, y) {
            Some(idx) => self.cost_field[idx] = value.max(FixedNum::ZERO),
            None => warn!("set_cost({}, {}) outside {}x{} grid", x, y, self.width, self.height),
        }
    }

    /// Cost of entering `to`, times √2 for a diagonal step.
    #[inline]
    pub fn move_cost(&self, to: Point, diagonal: bool) -> FixedNum {
        let base = self.cost(to.x, to.y);
        if diagonal {
            base * SQRT_2
        } else {
            base
        }
    }

    /// Cost of one 8-neighborhood step from `from` by `(dx, dy)`, or `None` if
    /// the step is illegal for `mask`.
    ///
    /// A diagonal step additionally requires both orthogonal cells it brushes past
    /// to be passable, so movers cannot slip between two blocked corners.
    #[inline]
    pub fn step_cost(&self, from: Point, dx: i32, dy: i32, mask: Passability) -> Option<FixedNum> {
        let to = from.offset(dx, dy);
        if !self.passable_at(to, mask) {
            return None;
        }
        let diagonal = dx != 0 && dy != 0;
        if diagonal
            && !(self.passable(from.x + dx, from.y, mask) && self.passable(from.x, from.y + dy, mask))
        {
            return None;
        }
        Some(self.move_cost(to, diagonal))
    }

    /// Legal steps out of `from` with their costs, in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, from: Point, mask: Passability) -> SmallVec<[(Point, FixedNum); 8]> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| {
                self.step_cost(from, dx, dy, mask)
                    .map(|cost| (from.offset(dx, dy), cost))
            })
            .collect()
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, x: i32, y: i32) -> FixedVec2 {
        Point::new(x, y).center()
    }

    /// Cell containing a world position, `None` outside the grid.
    pub fn world_to_cell(&self, pos: FixedVec2) -> Option<Point> {
        let x = pos.x.floor().to_num::<i64>();
        let y = pos.y.floor().to_num::<i64>();
        let x = i32::try_from(x).ok()?;
        let y = i32::try_from(y).ok()?;
        self.in_bounds(x, y).then_some(Point::new(x, y))
    }

    pub fn cost_field(&self) -> &[FixedNum] {
        &self.cost_field
    }

    pub fn passability_field(&self) -> &[Passability] {
        &self.passability_field
    }
}
