//! Component B: the single grid-walking primitive every other raster
//! algorithm in this crate specializes.
//!
//! Stream tracing, link labeling, segment routing, catchment flooding, and
//! the upstream-length raster are all "follow D8 directions from a cell
//! until some stop condition" with a different stop predicate and a
//! different side effect on the cells visited. Factoring that walk through
//! one function keeps the bookkeeping (bounds checks, loop guard, sink
//! detection) in a single place.

use crate::dirmap::DirMap;
use crate::raster::Raster;
use std::collections::HashSet;

pub type Cell = (isize, isize);

/// Follows D8 directions from `start` over `flow_dir`, returning the ordered
/// list of cells visited.
///
/// Termination, checked in order at each step: the *current* cell holds a
/// sink code; the *next* cell (by the current cell's direction) is
/// out-of-bounds; `stop_predicate(next)` is true; or `next` has already been
/// visited (loop guard against direction cycles). `start` is always included
/// in the result, even when it is itself a sink.
pub fn walk<F>(start: Cell, flow_dir: &Raster<i16>, mut stop_predicate: F) -> Vec<Cell>
where
    F: FnMut(Cell) -> bool,
{
    let nrows = flow_dir.nrows();
    let ncols = flow_dir.ncols();
    let mut visited: HashSet<Cell> = HashSet::new();
    let mut path = Vec::new();

    let mut cur = start;
    visited.insert(cur);
    path.push(cur);

    loop {
        let code = flow_dir.get(cur.0, cur.1) as i16;
        if DirMap::is_sink(code) {
            break;
        }
        let (dr, dc) = DirMap::step(code);
        let next = (cur.0 + dr, cur.1 + dc);
        if next.0 < 0 || next.1 < 0 || next.0 >= nrows || next.1 >= ncols {
            break;
        }
        if stop_predicate(next) {
            break;
        }
        if !visited.insert(next) {
            break;
        }
        path.push(next);
        cur = next;
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterMeta, Transform};

    fn meta(n: usize) -> RasterMeta {
        RasterMeta {
            nrows: n,
            ncols: n,
            transform: Transform::north_up(1.0, 0.0, 0.0),
            crs: "EPSG:3857".to_string(),
        }
    }

    #[test]
    fn stops_at_sink() {
        let mut f: Raster<i16> = Raster::new(meta(3), -2, -2);
        f.set(0, 0, 2); // SE
        f.set(1, 1, -1); // outlet
        let path = walk((0, 0), &f, |_| false);
        assert_eq!(path, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn stops_out_of_bounds() {
        let mut f: Raster<i16> = Raster::new(meta(2), -2, -2);
        f.set(1, 1, 2); // SE, falls off the 2x2 grid
        let path = walk((1, 1), &f, |_| false);
        assert_eq!(path, vec![(1, 1)]);
    }

    #[test]
    fn stops_on_predicate() {
        let mut f: Raster<i16> = Raster::new(meta(3), -2, -2);
        f.set(0, 0, 2);
        f.set(1, 1, 2);
        let path = walk((0, 0), &f, |c| c == (2, 2));
        assert_eq!(path, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn loop_guard_terminates() {
        let mut f: Raster<i16> = Raster::new(meta(2), -2, -2);
        f.set(0, 0, 1); // E -> (0,1)
        f.set(0, 1, 4); // S -> (1,1)
        f.set(1, 1, 16); // W -> (1,0)
        f.set(1, 0, 64); // N -> (0,0), cycle
        let path = walk((0, 0), &f, |_| false);
        assert_eq!(path, vec![(0, 0), (0, 1), (1, 1), (1, 0)]);
    }
}
