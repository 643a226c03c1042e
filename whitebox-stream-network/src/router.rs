//! Component F: produce an ordered (upstream -> downstream) path of cells
//! for one labeled stream segment.

use crate::dirmap::DirMap;
use crate::error::{CoreError, CoreResult};
use crate::raster::Raster;
use crate::report::CancellationToken;
use crate::walker::{walk, Cell};
use std::collections::HashSet;

/// Routes the single segment labeled `segment_id` in `labels`, using
/// `flow_accum` to locate its upstream (min accumulation) and downstream
/// (max accumulation) ends, walking from the former to the latter along
/// `flow_dir`.
///
/// Ties in flow accumulation are broken by row-major order (the first cell
/// encountered wins), matching the deterministic tie-break convention used
/// throughout this crate.
///
/// Applies the tail-extension rule: if the end cell's own direction steps to
/// an in-bounds cell (even one outside this segment), that cell is appended
/// so adjacent segments share their junction endpoint for vector stitching.
///
/// `cancel` is checked once at entry (the "per segment" granularity): a
/// caller routing many segments in a loop polls cancellation on every call
/// rather than this function looping internally.
pub fn route_segment(
    labels: &Raster<u32>,
    segment_id: u32,
    flow_dir: &Raster<i16>,
    flow_accum: &Raster<f64>,
    cancel: Option<&CancellationToken>,
) -> CoreResult<Vec<Cell>> {
    if cancel.map_or(false, |c| c.is_cancelled()) {
        return Err(CoreError::Cancelled);
    }
    let cells: Vec<Cell> = labels
        .iter_cells()
        .filter(|&(r, c)| labels.get(r, c) == segment_id)
        .collect();

    if cells.len() < 2 {
        return Err(CoreError::DegenerateSegment { segment_id });
    }

    let mask: HashSet<Cell> = cells.iter().copied().collect();

    let mut start = cells[0];
    let mut min_acc = flow_accum.get(start.0, start.1);
    let mut end = cells[0];
    let mut max_acc = flow_accum.get(end.0, end.1);
    for &(r, c) in &cells {
        let acc = flow_accum.get(r, c);
        if acc < min_acc {
            min_acc = acc;
            start = (r, c);
        }
        if acc > max_acc {
            max_acc = acc;
            end = (r, c);
        }
    }

    let path = walk(start, flow_dir, |next| !mask.contains(&next));

    let path_set: HashSet<Cell> = path.iter().copied().collect();
    if path_set != mask {
        return Err(CoreError::InvalidSegmentGeometry {
            segment_id,
            reason: format!(
                "routed path covers {} cells, segment mask has {}",
                path_set.len(),
                mask.len()
            ),
        });
    }
    let last = *path.last().expect("path is non-empty: start was pushed");
    if last != end {
        return Err(CoreError::InvalidSegmentGeometry {
            segment_id,
            reason: "routed path does not terminate at the maximum-accumulation cell".to_string(),
        });
    }

    let mut full_path = path;
    let end_code = flow_dir.get(end.0, end.1);
    if !DirMap::is_sink(end_code) {
        let (dr, dc) = DirMap::step(end_code);
        let tail = (end.0 + dr, end.1 + dc);
        if tail.0 >= 0 && tail.1 >= 0 && tail.0 < flow_dir.nrows() && tail.1 < flow_dir.ncols() {
            full_path.push(tail);
        }
    }

    Ok(full_path)
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
    fn s1_diagonal_routes_upstream_to_downstream() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 2);
        f.set(4, 4, -1);
        let mut labels: Raster<u32> = Raster::new(meta(n), 0, 0);
        let mut acc: Raster<f64> = Raster::new(meta(n), -1.0, 0.0);
        for i in 0..n as isize {
            labels.set(i, i, 1);
            acc.set(i, i, (i + 1) as f64);
        }

        let path = route_segment(&labels, 1, &f, &acc, None).unwrap();
        assert_eq!(path[0], (0, 0));
        assert_eq!(path[4], (4, 4));
        assert_eq!(path.len(), 5, "no tail extension: (4,4) is a sink");
    }

    #[test]
    fn tail_extension_appends_junction_cell() {
        // Segment is (0,0)->(1,1); (1,1) flows on to (2,2) which belongs to
        // a different (unlabeled here) downstream segment.
        let mut f: Raster<i16> = Raster::new(meta(4), -2, 2);
        let mut labels: Raster<u32> = Raster::new(meta(4), 0, 0);
        let mut acc: Raster<f64> = Raster::new(meta(4), -1.0, 0.0);
        labels.set(0, 0, 1);
        labels.set(1, 1, 1);
        acc.set(0, 0, 1.0);
        acc.set(1, 1, 2.0);

        let path = route_segment(&labels, 1, &f, &acc, None).unwrap();
        assert_eq!(path, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn degenerate_segment_errors() {
        let f: Raster<i16> = Raster::new(meta(3), -2, -2);
        let mut labels: Raster<u32> = Raster::new(meta(3), 0, 0);
        let acc: Raster<f64> = Raster::new(meta(3), -1.0, 0.0);
        labels.set(1, 1, 1);
        let err = route_segment(&labels, 1, &f, &acc, None).unwrap_err();
        assert_eq!(err, CoreError::DegenerateSegment { segment_id: 1 });
    }

    #[test]
    fn cancellation_returns_err_before_routing() {
        let n = 3;
        let f: Raster<i16> = Raster::new(meta(n), -2, -2);
        let labels: Raster<u32> = Raster::new(meta(n), 0, 0);
        let acc: Raster<f64> = Raster::new(meta(n), -1.0, 0.0);
        let token = crate::report::CancellationToken::new();
        token.cancel();
        let err = route_segment(&labels, 1, &f, &acc, Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
