//! Component H: flood the upstream contributing area of each stream segment
//! by reversing D8.

use crate::dirmap::{DirMap, ESRI_CODES};
use crate::error::{CoreError, CoreResult};
use crate::raster::Raster;
use crate::report::CancellationToken;
use crate::walker::Cell;
use std::collections::{HashMap, VecDeque};

/// The downstream-most cell of a labeled segment: the cell with the
/// greatest flow accumulation anywhere in that segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PourPoint {
    pub cell: Cell,
    pub segment_id: u32,
    pub flow_accum: f64,
}

/// One pour point per distinct non-zero label in `labels`, sorted by flow
/// accumulation descending (nested basins painted outer-first). Ties are
/// broken by row-major cell order for determinism.
pub fn find_pour_points(labels: &Raster<u32>, flow_accum: &Raster<f64>) -> Vec<PourPoint> {
    let mut best: HashMap<u32, (Cell, f64)> = HashMap::new();
    for (r, c) in labels.iter_cells() {
        let id = labels.get(r, c);
        if id == 0 {
            continue;
        }
        let acc = flow_accum.get(r, c);
        best.entry(id)
            .and_modify(|(cell, best_acc)| {
                if acc > *best_acc {
                    *best_acc = acc;
                    *cell = (r, c);
                }
            })
            .or_insert(((r, c), acc));
    }

    let mut points: Vec<PourPoint> = best
        .into_iter()
        .map(|(segment_id, (cell, flow_accum))| PourPoint {
            cell,
            segment_id,
            flow_accum,
        })
        .collect();
    points.sort_by(|a, b| {
        b.flow_accum
            .partial_cmp(&a.flow_accum)
            .unwrap()
            .then_with(|| a.cell.cmp(&b.cell))
    });
    points
}

/// Paints every cell in `labels` with the ID of the nearest downstream
/// segment whose contributing area contains it.
///
/// Pour points are processed outer-first (largest flow accumulation, i.e.
/// farthest downstream, first); each flood overwrites cells already painted
/// by an earlier (more downstream) flood, so a cell upstream of several
/// nested pour points ends up labeled with the innermost one.
///
/// `cancel` is polled once per pour point (the "per segment" granularity);
/// if it fires, returns `CoreError::Cancelled` without writing partial
/// output.
pub fn pour_point_catchments(
    labels: &Raster<u32>,
    flow_dir: &Raster<i16>,
    flow_accum: &Raster<f64>,
    cancel: Option<&CancellationToken>,
) -> CoreResult<Raster<u32>> {
    let points = find_pour_points(labels, flow_accum);
    let mut out = Raster::<u32>::new(flow_dir.meta.clone(), 0, 0);
    for pp in points {
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(CoreError::Cancelled);
        }
        flood_contributing_area(pp.cell, pp.segment_id, flow_dir, &mut out);
    }
    Ok(out)
}

fn flood_contributing_area(pour: Cell, id: u32, flow_dir: &Raster<i16>, out: &mut Raster<u32>) {
    let nrows = flow_dir.nrows();
    let ncols = flow_dir.ncols();
    let mut queue = VecDeque::new();
    queue.push_back(pour);
    out.set(pour.0, pour.1, id);

    while let Some((r, c)) = queue.pop_front() {
        for &code in &ESRI_CODES {
            let (dr, dc) = DirMap::step(code as i16);
            let neighbor = (r - dr, c - dc);
            if neighbor.0 < 0 || neighbor.1 < 0 || neighbor.0 >= nrows || neighbor.1 >= ncols {
                continue;
            }
            if flow_dir.get(neighbor.0, neighbor.1) == code as i16 {
                out.set(neighbor.0, neighbor.1, id);
                queue.push_back(neighbor);
            }
        }
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

    /// Scenario S3: a small upper segment (accumulation 50) draining into a
    /// lower trunk segment (accumulation 120); cells upstream of the upper
    /// pour point keep the upper ID, cells between the pour points take the
    /// lower (trunk) ID.
    #[test]
    fn s3_nested_subbasins() {
        let n = 5;
        // column of cells flowing south: (0,0)->(1,0)->(2,0)->(3,0)->(4,0) sink.
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 4);
        f.set(4, 0, -1);
        let mut labels: Raster<u32> = Raster::new(meta(n), 0, 0);
        let mut acc: Raster<f64> = Raster::new(meta(n), -1.0, 0.0);

        // Upper segment = rows 0..=1, lower (trunk) segment = rows 2..=4.
        labels.set(0, 0, 1);
        labels.set(1, 0, 1);
        labels.set(2, 0, 2);
        labels.set(3, 0, 2);
        labels.set(4, 0, 2);

        acc.set(0, 0, 10.0);
        acc.set(1, 0, 50.0); // upper pour point
        acc.set(2, 0, 80.0);
        acc.set(3, 0, 100.0);
        acc.set(4, 0, 120.0); // lower pour point

        let basins = pour_point_catchments(&labels, &f, &acc, None).unwrap();
        assert_eq!(basins.get(0, 0), 1);
        assert_eq!(basins.get(1, 0), 1);
        assert_eq!(basins.get(2, 0), 2);
        assert_eq!(basins.get(3, 0), 2);
        assert_eq!(basins.get(4, 0), 2);
    }

    #[test]
    fn pour_points_sorted_descending_by_accumulation() {
        let n = 3;
        let mut labels: Raster<u32> = Raster::new(meta(n), 0, 0);
        let mut acc: Raster<f64> = Raster::new(meta(n), -1.0, 0.0);
        labels.set(0, 0, 1);
        labels.set(2, 2, 2);
        acc.set(0, 0, 5.0);
        acc.set(2, 2, 50.0);

        let points = find_pour_points(&labels, &acc);
        assert_eq!(points[0].segment_id, 2);
        assert_eq!(points[1].segment_id, 1);
    }

    #[test]
    fn cancellation_returns_err() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 4);
        f.set(4, 0, -1);
        let mut labels: Raster<u32> = Raster::new(meta(n), 0, 0);
        let mut acc: Raster<f64> = Raster::new(meta(n), -1.0, 0.0);
        labels.set(0, 0, 1);
        labels.set(1, 0, 1);
        acc.set(0, 0, 10.0);
        acc.set(1, 0, 50.0);

        let token = CancellationToken::new();
        token.cancel();
        let err = pour_point_catchments(&labels, &f, &acc, Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
