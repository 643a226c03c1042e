//! Component G: per-cell maximum path length from any headwater.

use crate::dirmap::DirMap;
use crate::error::{CoreError, CoreResult};
use crate::nodes::find_nodes;
use crate::raster::Raster;
use crate::report::CancellationToken;

/// For every stream cell, the length (in map units) of the longest path
/// reaching it from any headwater (source cell), walking downstream along
/// `flow_dir`.
///
/// Per-step increment is Euclidean in pixel units: `1` for an axial move,
/// `sqrt(2)` for a diagonal one; the accumulated pixel-unit distance is
/// scaled by the raster's pixel size once a walk finishes.
///
/// Because the stream network is a tree rooted at outlets (out-degree <= 1
/// per cell), a walk that enters a cell whose already-recorded length is
/// `>=` the length it is carrying is guaranteed dominated — the unique
/// downstream path from that cell has already been (or will be) stamped
/// with values at least as large — so the walk stops there rather than
/// redoing work.
///
/// `cancel` is polled once per source (the "per source" granularity); if it
/// fires, returns `CoreError::Cancelled` without writing partial output.
pub fn upstream_length_raster(
    stream: &Raster<i32>,
    flow_dir: &Raster<i16>,
    cancel: Option<&CancellationToken>,
) -> CoreResult<Raster<f64>> {
    let nodes = find_nodes(stream, flow_dir);
    let mut sources = nodes.sources;
    sources.sort_unstable();
    let pixel_size = flow_dir.meta.transform.pixel_size();

    let mut acc_pixels = Raster::<f64>::new(stream.meta.clone(), -1.0, -1.0);

    for seed in sources {
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(CoreError::Cancelled);
        }
        let mut cur = seed;
        let mut acc = 0.0f64;
        loop {
            let existing = acc_pixels.get(cur.0, cur.1);
            if existing >= 0.0 && existing >= acc {
                break;
            }
            acc_pixels.set(cur.0, cur.1, acc);

            let code = flow_dir.get(cur.0, cur.1);
            if DirMap::is_sink(code) {
                break;
            }
            let (dr, dc) = DirMap::step(code);
            let next = (cur.0 + dr, cur.1 + dc);
            if next.0 < 0
                || next.1 < 0
                || next.0 >= flow_dir.nrows()
                || next.1 >= flow_dir.ncols()
                || stream.get(next.0, next.1) == 0
            {
                break;
            }
            acc += if DirMap::is_diagonal(code) {
                std::f64::consts::SQRT_2
            } else {
                1.0
            };
            cur = next;
        }
    }

    let mut result = Raster::<f64>::new(stream.meta.clone(), -1.0, -1.0);
    for (r, c) in stream.iter_cells() {
        let v = acc_pixels.get(r, c);
        if v >= 0.0 {
            result.set(r, c, v * pixel_size);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterMeta, Transform};

    fn meta(n: usize) -> RasterMeta {
        RasterMeta {
            nrows: n,
            ncols: n,
            transform: Transform::north_up(2.0, 0.0, 0.0),
            crs: "EPSG:3857".to_string(),
        }
    }

    /// Scenario S1: upstream length at (4,4) is `4*sqrt(2)*pixel_size`.
    #[test]
    fn s1_straight_diagonal_length() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 2);
        f.set(4, 4, -1);
        let mut s: Raster<i32> = Raster::new(meta(n), -1, 0);
        for i in 0..n as isize {
            s.set(i, i, 1);
        }

        let lengths = upstream_length_raster(&s, &f, None).unwrap();
        let expected = 4.0 * std::f64::consts::SQRT_2 * 2.0;
        assert!((lengths.get(4, 4) - expected).abs() < 1e-9);
        assert_eq!(lengths.get(0, 0), 0.0);
    }

    #[test]
    fn monotone_along_downstream_walk() {
        let n = 5;
        let mut f: Raster<i16> = Raster::new(meta(n), -2, 2);
        f.set(4, 4, -1);
        let mut s: Raster<i32> = Raster::new(meta(n), -1, 0);
        for i in 0..n as isize {
            s.set(i, i, 1);
        }
        let lengths = upstream_length_raster(&s, &f, None).unwrap();
        let mut prev = lengths.get(0, 0);
        for i in 1..n as isize {
            let cur = lengths.get(i, i);
            assert!(cur >= prev);
            prev = cur;
        }
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
        let token = CancellationToken::new();
        token.cancel();
        let err = upstream_length_raster(&s, &f, Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
