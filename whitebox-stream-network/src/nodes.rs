//! Component D: classify stream cells into sources, confluences, and
//! outlets by counting D8 inflows.

use crate::dirmap::DirMap;
use crate::raster::Raster;
use crate::walker::Cell;

/// The three node classes a stream cell can belong to. An isolated stream
/// cell (no inflow, and its own direction is a sink) is both a source and
/// an outlet.
pub struct Nodes {
    pub sources: Vec<Cell>,
    pub confluences: Vec<Cell>,
    pub outlets: Vec<Cell>,
}

/// Classifies every stream cell in `stream` (non-zero) by counting, for each
/// cell, how many other stream cells flow into it.
pub fn find_nodes(stream: &Raster<i32>, flow_dir: &Raster<i16>) -> Nodes {
    let nrows = stream.nrows();
    let ncols = stream.ncols();
    let mut inflow_count = Raster::<i32>::new(stream.meta.clone(), -1, 0);

    for (r, c) in stream.iter_cells() {
        if stream.get(r, c) == 0 {
            continue;
        }
        let code = flow_dir.get(r, c);
        if DirMap::is_sink(code) {
            continue;
        }
        let (dr, dc) = DirMap::step(code);
        let (nr, nc) = (r + dr, c + dc);
        if nr < 0 || nc < 0 || nr >= nrows || nc >= ncols {
            continue;
        }
        if stream.get(nr, nc) != 0 {
            inflow_count.set(nr, nc, inflow_count.get(nr, nc) + 1);
        }
    }

    let mut sources = Vec::new();
    let mut confluences = Vec::new();
    let mut outlets = Vec::new();
    for (r, c) in stream.iter_cells() {
        if stream.get(r, c) == 0 {
            continue;
        }
        let inflow = inflow_count.get(r, c);
        if inflow == 0 {
            sources.push((r, c));
        }
        if inflow >= 2 {
            confluences.push((r, c));
        }
        if DirMap::is_sink(flow_dir.get(r, c)) {
            outlets.push((r, c));
        }
    }

    Nodes {
        sources,
        confluences,
        outlets,
    }
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

    /// Scenario S2: two arms of length 3 meeting at (2,2), flowing east two
    /// cells to an outlet at (2,4).
    #[test]
    fn s2_y_confluence() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, -2);
        let mut s: Raster<i32> = Raster::new(meta(n), -1, 0);

        // Northern arm: (0,0) -> (1,1) -> (2,2), SE steps.
        f.set(0, 0, 2);
        f.set(1, 1, 2);
        // Southern arm: (4,0) -> (3,1) -> (2,2), NE steps.
        f.set(4, 0, 128);
        f.set(3, 1, 128);
        // Trunk: (2,2) -> (2,3) -> (2,4) outlet.
        f.set(2, 2, 1);
        f.set(2, 3, 1);
        f.set(2, 4, -1);

        for &(r, c) in &[(0, 0), (1, 1), (4, 0), (3, 1), (2, 2), (2, 3), (2, 4)] {
            s.set(r, c, 1);
        }

        let nodes = find_nodes(&s, &f);
        assert_eq!(nodes.sources.len(), 2);
        assert!(nodes.sources.contains(&(0, 0)));
        assert!(nodes.sources.contains(&(4, 0)));
        assert_eq!(nodes.confluences, vec![(2, 2)]);
        assert_eq!(nodes.outlets, vec![(2, 4)]);
    }

    #[test]
    fn isolated_cell_is_source_and_outlet() {
        let mut f: Raster<i16> = Raster::new(meta(3), -2, -2);
        let mut s: Raster<i32> = Raster::new(meta(3), -1, 0);
        f.set(1, 1, -1);
        s.set(1, 1, 1);
        let nodes = find_nodes(&s, &f);
        assert_eq!(nodes.sources, vec![(1, 1)]);
        assert_eq!(nodes.outlets, vec![(1, 1)]);
        assert!(nodes.confluences.is_empty());
    }
}
