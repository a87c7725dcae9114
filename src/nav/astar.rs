use bevy::prelude::*;
use kestrel_macros::profile;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::config::SearchConfig;
use super::fixed_math::{FixedNum, SQRT_2};
use super::grid::NavGrid;
use super::movement::Passability;
use super::types::{Path, Point};

/// Octile distance: `dx + dy + (√2 − 2)·min(dx, dy)`.
///
/// Exact cost of the cheapest unobstructed route on a cost-1 grid, so it is
/// admissible and consistent whenever no cell is cheaper than open ground.
pub(super) fn heuristic(a: Point, b: Point) -> FixedNum {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    FixedNum::from_num(dx + dy) + (SQRT_2 - FixedNum::from_num(2)) * FixedNum::from_num(dx.min(dy))
}

/// Open-set entry. Ordered so that `BinaryHeap` pops the lowest `f`, and among
/// equal `f` the entry pushed first.
#[derive(Clone, Copy)]
struct State {
    f: FixedNum,
    g: FixedNum,
    seq: u64,
    point: Point,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A successful search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathSearch {
    pub path: Path,
    /// Accumulated `g` at the goal.
    pub cost: FixedNum,
    /// Number of nodes popped and expanded.
    pub expanded: usize,
}

fn reconstruct_path(came_from: &FxHashMap<Point, Point>, mut current: Point) -> Path {
    let mut waypoints = vec![current];
    while let Some(prev) = came_from.get(&current) {
        current = *prev;
        waypoints.push(current);
    }
    waypoints.reverse();
    Path::new(waypoints)
}

/// Shortest 8-directional path from `start` to `goal` for the given movement mask.
///
/// Returns `None` when the goal cell is not passable, the start is outside the
/// grid, or no legal chain of moves connects the two. `start == goal` yields a
/// single-point path.
pub fn find_path(
    grid: &NavGrid,
    start: Point,
    goal: Point,
    mask: impl Into<Passability>,
) -> Option<Path> {
    find_path_with_stats(grid, start, goal, mask.into(), &SearchConfig::default())
        .map(|search| search.path)
}

/// [`find_path`] that also reports the goal cost and expansion count.
///
/// All scratch state (open heap, g-scores, predecessor links) lives on this call's
/// stack, so concurrent searches over the same unmodified grid never interact.
#[profile(500)]
pub fn find_path_with_stats(
    grid: &NavGrid,
    start: Point,
    goal: Point,
    mask: Passability,
    config: &SearchConfig,
) -> Option<PathSearch> {
    if !grid.passable_at(goal, mask) {
        debug!("[PATHFINDING] Goal {:?} not passable for {:?}, skipping search", goal, mask);
        return None;
    }
    if !grid.in_bounds(start.x, start.y) {
        debug!("[PATHFINDING] Start {:?} outside grid", start);
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: FxHashMap<Point, Point> = FxHashMap::default();
    let mut g_score: FxHashMap<Point, FixedNum> = FxHashMap::default();
    let mut seq: u64 = 0;
    let mut expanded = 0usize;

    g_score.insert(start, FixedNum::ZERO);
    open_set.push(State { f: heuristic(start, goal), g: FixedNum::ZERO, seq, point: start });

    while let Some(State { g, point: current, .. }) = open_set.pop() {
        // Superseded by a cheaper entry pushed later.
        if g > g_score.get(&current).copied().unwrap_or(FixedNum::MAX) {
            continue;
        }

        if current == goal {
            if expanded > config.slow_search_expansions {
                warn!(
                    "[PATHFINDING] A* expanded {} nodes from {:?} to {:?} (high!)",
                    expanded, start, goal
                );
            }
            return Some(PathSearch {
                path: reconstruct_path(&came_from, current),
                cost: g,
                expanded,
            });
        }
        expanded += 1;

        for (neighbor, step) in grid.neighbors(current, mask) {
            let tentative_g = g + step;
            if tentative_g < g_score.get(&neighbor).copied().unwrap_or(FixedNum::MAX) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                seq += 1;
                open_set.push(State {
                    f: tentative_g + heuristic(neighbor, goal),
                    g: tentative_g,
                    seq,
                    point: neighbor,
                });
            }
        }
    }

    debug!(
        "[PATHFINDING] No path from {:?} to {:?} after {} expansions",
        start, goal, expanded
    );
    None
}

#[cfg(test)]
#[path = "astar_tests.rs"]
mod tests;
