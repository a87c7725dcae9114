use super::grid::NavGrid;
use super::movement::Passability;
use super::types::{Path, Point};

/// Straight-line visibility between two cells for a movement mask.
///
/// Walks the Bresenham line from `start` to `goal` and requires every visited
/// cell, endpoints included, to be passable. When the line steps diagonally the
/// two cells it brushes past must be passable too, matching the pathfinder's
/// corner rule.
pub fn has_line_of_sight(grid: &NavGrid, start: Point, goal: Point, mask: impl Into<Passability>) -> bool {
    let mask = mask.into();
    let mut x0 = start.x;
    let mut y0 = start.y;
    let x1 = goal.x;
    let y1 = goal.y;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if !grid.passable(x0, y0, mask) {
            return false;
        }

        if x0 == x1 && y0 == y1 {
            return true;
        }

        let e2 = 2 * err;
        let mut nx = x0;
        let mut ny = y0;
        if e2 >= dy {
            err += dy;
            nx += sx;
        }
        if e2 <= dx {
            err += dx;
            ny += sy;
        }

        if nx != x0 && ny != y0 && !(grid.passable(nx, y0, mask) && grid.passable(x0, ny, mask)) {
            return false;
        }

        x0 = nx;
        y0 = ny;
    }
}

/// Greedy line-of-sight reduction of a raw path.
///
/// From the current waypoint, candidates are scanned from the goal backward and
/// the first visible one becomes the next waypoint. If nothing past the immediate
/// successor is visible the walk advances by one, so the loop always terminates.
/// Paths of two points or fewer are returned unchanged.
pub fn smooth(grid: &NavGrid, path: &Path, mask: impl Into<Passability>) -> Path {
    let mask = mask.into();
    let points = path.points();
    if points.len() <= 2 {
        return path.clone();
    }

    let last = points.len() - 1;
    let mut smoothed = vec![points[0]];
    let mut current = 0;

    while current < last {
        let next = (current + 2..=last)
            .rev()
            .find(|&candidate| has_line_of_sight(grid, points[current], points[candidate], mask))
            .unwrap_or(current + 1);

        smoothed.push(points[next]);
        current = next;
    }

    Path::new(smoothed)
}
