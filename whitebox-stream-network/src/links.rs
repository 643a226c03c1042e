//! Component E: assign unique IDs to maximal stream segments between
//! junctions.

use crate::dirmap::{DirMap, ESRI_CODES};
use crate::error::{CoreError, CoreResult};
use crate::nodes::find_nodes;
use crate::raster::Raster;
use crate::report::{CancellationToken, Reporter};
use crate::walker::Cell;
use std::collections::{HashSet, VecDeque};

/// Labels every stream cell in `stream` with the ID of its maximal segment
/// between junctions. Confluence cells are labeled with the *downstream*
/// segment's ID: a link terminates when its next cell is a confluence, and
/// the confluence itself becomes the start of a fresh link once every
/// upstream arm feeding it has been walked.
///
/// Sources are visited in row-major order, and a confluence becomes
/// eligible to start its own link the first time any arm reaches it — both
/// deterministic, so the resulting labeling does not depend on iteration
/// order. IDs are `u32` (the specification flags `uint16` segment IDs as
/// reachable on large basins).
///
/// `cancel` is polled once per source/confluence link start (the "per
/// source" granularity); if it fires, returns `CoreError::Cancelled` without
/// writing partial output.
pub fn label_links(
    stream: &Raster<i32>,
    flow_dir: &Raster<i16>,
    reporter: &mut dyn Reporter,
    cancel: Option<&CancellationToken>,
) -> CoreResult<Raster<u32>> {
    warn_invalid_codes(stream, flow_dir, reporter);

    let nodes = find_nodes(stream, flow_dir);
    let confluence_set: HashSet<Cell> = nodes.confluences.into_iter().collect();

    let mut labels = Raster::<u32>::new(stream.meta.clone(), 0, 0);
    let mut next_id: u32 = 1;

    let mut sources = nodes.sources;
    sources.sort_unstable();
    let mut starts: VecDeque<Cell> = sources.into();
    let mut queued_confluences: HashSet<Cell> = HashSet::new();

    while let Some(start) = starts.pop_front() {
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(CoreError::Cancelled);
        }
        if labels.get(start.0, start.1) != 0 {
            continue;
        }
        let id = next_id;
        next_id += 1;

        let mut cur = start;
        loop {
            labels.set(cur.0, cur.1, id);

            let code = flow_dir.get(cur.0, cur.1);
            if DirMap::is_sink(code) {
                break;
            }
            let (dr, dc) = DirMap::step(code);
            let next = (cur.0 + dr, cur.1 + dc);
            if next.0 < 0
                || next.1 < 0
                || next.0 >= stream.nrows()
                || next.1 >= stream.ncols()
                || stream.get(next.0, next.1) == 0
            {
                break;
            }

            if confluence_set.contains(&next) {
                if labels.get(next.0, next.1) == 0 && queued_confluences.insert(next) {
                    starts.push_back(next);
                }
                break;
            }
            if labels.get(next.0, next.1) != 0 {
                break;
            }
            cur = next;
        }
    }

    Ok(labels)
}

fn warn_invalid_codes(stream: &Raster<i32>, flow_dir: &Raster<i16>, reporter: &mut dyn Reporter) {
    for (r, c) in stream.iter_cells() {
        if stream.get(r, c) == 0 {
            continue;
        }
        let code = flow_dir.get(r, c);
        let known = ESRI_CODES.contains(&(code.max(0) as u8)) || matches!(code, -1 | -2 | 0);
        if !known {
            reporter.warn(&format!(
                "invalid direction code {} at ({}, {}); treated as sink",
                code, r, c
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterMeta, Transform};
    use crate::report::NullReporter;

    fn meta(n: usize) -> RasterMeta {
        RasterMeta {
            nrows: n,
            ncols: n,
            transform: Transform::north_up(1.0, 0.0, 0.0),
            crs: "EPSG:3857".to_string(),
        }
    }

    #[test]
    fn s1_single_link_on_diagonal() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 2);
        f.set(4, 4, -1);
        let mut s: Raster<i32> = Raster::new(meta(n), -1, 0);
        for i in 0..n as isize {
            s.set(i, i, 1);
        }
        let mut reporter = NullReporter;
        let labels = label_links(&s, &f, &mut reporter, None).unwrap();
        let id = labels.get(0, 0);
        assert_ne!(id, 0);
        for i in 0..n as isize {
            assert_eq!(labels.get(i, i), id);
        }
    }

    /// Scenario S2: expects 3 labels; the confluence cell carries the
    /// trunk's ID.
    #[test]
    fn s2_y_confluence_three_links() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, -2);
        let mut s: Raster<i32> = Raster::new(meta(n), -1, 0);

        f.set(0, 0, 2);
        f.set(1, 1, 2);
        f.set(4, 0, 128);
        f.set(3, 1, 128);
        f.set(2, 2, 1);
        f.set(2, 3, 1);
        f.set(2, 4, -1);
        for &(r, c) in &[(0, 0), (1, 1), (4, 0), (3, 1), (2, 2), (2, 3), (2, 4)] {
            s.set(r, c, 1);
        }

        let mut reporter = NullReporter;
        let labels = label_links(&s, &f, &mut reporter, None).unwrap();

        let arm1 = labels.get(0, 0);
        let arm2 = labels.get(4, 0);
        let trunk = labels.get(2, 2);

        assert_eq!(labels.get(1, 1), arm1);
        assert_eq!(labels.get(3, 1), arm2);
        assert_eq!(labels.get(2, 3), trunk);
        assert_eq!(labels.get(2, 4), trunk);

        let mut ids = vec![arm1, arm2, trunk];
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3, "expected three distinct link IDs");
        assert_ne!(trunk, arm1);
        assert_ne!(trunk, arm2);
    }

    #[test]
    fn cancellation_returns_err() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 2);
        f.set(4, 4, -1);
        let mut s: Raster<i32> = Raster::new(meta(n), -1, 0);
        for i in 0..n as isize {
            s.set(i, i, 1);
        }
        let mut reporter = NullReporter;
        let token = CancellationToken::new();
        token.cancel();
        let err = label_links(&s, &f, &mut reporter, Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
