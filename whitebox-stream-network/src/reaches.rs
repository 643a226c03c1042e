//! Component M: changepoint segmentation of per-cell slope along a routed
//! stream segment, with a slope-threshold merge pass.

use crate::changepoint::{default_penalty, pelt_rbf, reach_ids_from_changepoints};
use crate::error::{CoreError, CoreResult};
use crate::raster::Raster;
use crate::report::CancellationToken;
use crate::walker::Cell;

/// One row of the reach table: a single cell along a routed segment,
/// enriched with its position along the channel and its local slope.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachPoint {
    pub point_id: usize,
    pub row: isize,
    pub col: isize,
    pub x: f64,
    pub y: f64,
    /// Cumulative Euclidean distance along the routed path, map units.
    pub distance: f64,
    pub elevation: f64,
    pub slope_degrees: f64,
    pub reach_id: usize,
}

/// Builds the ordered `(distance, elevation)` profile for a routed segment
/// path, the raw series the reach segmenter (and, separately, a long
/// profile plot) consumes. Distance and elevation only; slope is computed
/// separately once the full series is available (gradients need
/// neighbors).
pub fn build_profile(path: &[Cell], dem: &Raster<f64>) -> Vec<ReachPoint> {
    let mut points = Vec::with_capacity(path.len());
    let mut cumulative = 0.0;
    let mut prev_world: Option<(f64, f64)> = None;

    for (i, &(r, c)) in path.iter().enumerate() {
        let (x, y) = dem.meta.transform.pixel_to_world(r, c);
        if let Some((px, py)) = prev_world {
            cumulative += ((x - px).powi(2) + (y - py).powi(2)).sqrt();
        }
        prev_world = Some((x, y));
        points.push(ReachPoint {
            point_id: i,
            row: r,
            col: c,
            x,
            y,
            distance: cumulative,
            elevation: dem.get(r, c),
            slope_degrees: 0.0,
            reach_id: 0,
        });
    }

    let elevations: Vec<f64> = points.iter().map(|p| p.elevation).collect();
    let distances: Vec<f64> = points.iter().map(|p| p.distance).collect();
    let slopes = gradient_slope_degrees(&elevations, &distances);
    for (p, s) in points.iter_mut().zip(slopes) {
        p.slope_degrees = s;
    }
    points
}

/// `|atan(d(elevation)/d(distance))|` in degrees, via the same central
/// difference `numpy.gradient` uses: forward/backward difference at the
/// ends, central difference in the interior.
fn gradient_slope_degrees(elevation: &[f64], distance: &[f64]) -> Vec<f64> {
    let n = elevation.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0.0];
    }
    let mut grad = vec![0.0; n];
    grad[0] = (elevation[1] - elevation[0]) / (distance[1] - distance[0]).max(f64::EPSILON);
    grad[n - 1] = (elevation[n - 1] - elevation[n - 2])
        / (distance[n - 1] - distance[n - 2]).max(f64::EPSILON);
    for i in 1..n - 1 {
        let dd = (distance[i + 1] - distance[i - 1]).max(f64::EPSILON);
        grad[i] = (elevation[i + 1] - elevation[i - 1]) / dd;
    }
    grad.into_iter()
        .map(|g| g.atan().to_degrees().abs())
        .collect()
}

/// Centered rolling mean with window `window`, partial windows allowed at
/// the ends (matches `pandas.Series.rolling(window, center=True,
/// min_periods=1).mean()`).
pub fn centered_rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let n = values.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(n);
            let slice = &values[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Options controlling the reach segmenter; defaults mirror the
/// specification's own defaults.
pub struct ReachOptions {
    pub penalty: Option<f64>,
    pub min_length: f64,
    pub smooth_window: Option<usize>,
    pub threshold_degrees: f64,
}

impl Default for ReachOptions {
    fn default() -> ReachOptions {
        ReachOptions {
            penalty: None,
            min_length: 500.0,
            smooth_window: None,
            threshold_degrees: 1.0,
        }
    }
}

/// Segments a routed path's slope series into reaches, per Component M:
/// PELT/RBF changepoint detection, then an iterative slope-threshold merge,
/// then a renumber pass so `reach_id` is a consecutive prefix of `0..`.
///
/// If the path has fewer samples than the minimum reach size (`min_length`
/// converted to a cell count via `pixel_size`), every point gets `reach_id
/// = 0` without running PELT at all.
///
/// `cancel` is checked once at entry (the "per segment" granularity): a
/// caller segmenting many routed paths in a loop polls cancellation on every
/// call rather than this function looping internally.
pub fn segment_reaches(
    path: &[Cell],
    dem: &Raster<f64>,
    opts: &ReachOptions,
    cancel: Option<&CancellationToken>,
) -> CoreResult<Vec<ReachPoint>> {
    if cancel.map_or(false, |c| c.is_cancelled()) {
        return Err(CoreError::Cancelled);
    }
    let mut points = build_profile(path, dem);
    if points.is_empty() {
        return Ok(points);
    }

    let pixel_size = dem.meta.transform.pixel_size();
    let min_size = ((opts.min_length / pixel_size).floor() as usize).max(1);

    if points.len() < min_size {
        for p in &mut points {
            p.reach_id = 0;
        }
        return Ok(points);
    }

    let raw_slopes: Vec<f64> = points.iter().map(|p| p.slope_degrees).collect();
    let signal = match opts.smooth_window {
        Some(w) if w > 1 => centered_rolling_mean(&raw_slopes, w),
        _ => raw_slopes.clone(),
    };

    let penalty = opts.penalty.unwrap_or_else(|| default_penalty(&signal));
    let changepoints = pelt_rbf(&signal, min_size, penalty);

    let reach_ids = reach_ids_from_changepoints(points.len(), &changepoints);
    for (p, id) in points.iter_mut().zip(reach_ids) {
        p.reach_id = id;
    }

    merge_reaches_by_threshold(&mut points, opts.threshold_degrees);
    Ok(points)
}

/// Iteratively merges adjacent reaches whose median slope differs by less
/// than `threshold_degrees`, recomputing the merged median each time, until
/// no boundary qualifies; then renumbers reaches to a consecutive prefix of
/// `0..`.
fn merge_reaches_by_threshold(points: &mut [ReachPoint], threshold_degrees: f64) {
    loop {
        let medians = reach_medians(points);
        let mut ids: Vec<usize> = medians.keys().copied().collect();
        ids.sort_unstable();

        let mut merged_any = false;
        for &id in &ids {
            let next_id = id + 1;
            let (Some(&left), Some(&right)) = (medians.get(&id), medians.get(&next_id)) else {
                continue;
            };
            if (left - right).abs() < threshold_degrees {
                for p in points.iter_mut() {
                    if p.reach_id == next_id {
                        p.reach_id = id;
                    }
                }
                merged_any = true;
                break;
            }
        }
        if !merged_any {
            break;
        }
    }
    renumber_reaches(points);
}

fn reach_medians(points: &[ReachPoint]) -> std::collections::BTreeMap<usize, f64> {
    let mut by_reach: std::collections::BTreeMap<usize, Vec<f64>> = std::collections::BTreeMap::new();
    for p in points {
        by_reach.entry(p.reach_id).or_default().push(p.slope_degrees);
    }
    by_reach
        .into_iter()
        .map(|(id, mut slopes)| {
            slopes.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mid = slopes.len() / 2;
            let median = if slopes.len() % 2 == 1 {
                slopes[mid]
            } else {
                (slopes[mid - 1] + slopes[mid]) / 2.0
            };
            (id, median)
        })
        .collect()
}

fn renumber_reaches(points: &mut [ReachPoint]) {
    let mut ids: Vec<usize> = points.iter().map(|p| p.reach_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let remap: std::collections::HashMap<usize, usize> =
        ids.iter().enumerate().map(|(new, &old)| (old, new)).collect();
    for p in points.iter_mut() {
        p.reach_id = remap[&p.reach_id];
    }
}

/// `reach_val = reach_id + stream_id * 1000`, the value painted into the
/// per-cell output raster.
pub fn reach_val(reach_id: usize, stream_id: u32) -> u32 {
    reach_id as u32 + stream_id * 1000
}

/// A simpler companion to full reach segmentation: the segment's overall
/// average slope (mean of the per-cell slope series), grounded in the
/// teacher's `stream_slope_continuous` tool family.
pub fn segment_average_slope(points: &[ReachPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.slope_degrees).sum::<f64>() / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterMeta, Transform};

    fn dem_with_two_slopes(n: usize) -> Raster<f64> {
        let meta = RasterMeta {
            nrows: 1,
            ncols: n,
            transform: Transform::north_up(1.0, 0.0, 0.0),
            crs: "EPSG:3857".to_string(),
        };
        let mut dem = Raster::new(meta, -9999.0, 0.0);
        // gentle 0.5-degree-ish grade for the first half, a steeper grade
        // for the second half.
        let mut elev = 0.0f64;
        for i in 0..n {
            dem.set(0, i as isize, elev);
            elev += if i < n / 2 { 0.01 } else { 0.1 };
        }
        dem
    }

    /// Scenario S6: a 100-cell segment, gentle grade then steep grade,
    /// `min_length=10`, `threshold_degrees=1.0` -> 2 reaches; raising the
    /// threshold to 5.0 merges them into 1.
    #[test]
    fn s6_two_reaches_then_merge_with_high_threshold() {
        let path: Vec<Cell> = (0..100).map(|c| (0, c as isize)).collect();
        let dem = dem_with_two_slopes(100);

        let opts = ReachOptions {
            penalty: None,
            min_length: 10.0,
            smooth_window: None,
            threshold_degrees: 1.0,
        };
        let points = segment_reaches(&path, &dem, &opts, None).unwrap();
        let max_id = points.iter().map(|p| p.reach_id).max().unwrap();
        assert_eq!(max_id, 1, "expected 2 reaches at low threshold");

        let opts_merge = ReachOptions {
            threshold_degrees: 5.0,
            ..opts
        };
        let points_merged = segment_reaches(&path, &dem, &opts_merge, None).unwrap();
        let max_id_merged = points_merged.iter().map(|p| p.reach_id).max().unwrap();
        assert_eq!(max_id_merged, 0, "expected reaches merged at high threshold");
    }

    #[test]
    fn degenerate_segment_is_single_reach() {
        let path: Vec<Cell> = vec![(0, 0), (0, 1), (0, 2)];
        let dem = dem_with_two_slopes(3);
        let opts = ReachOptions {
            min_length: 500.0,
            ..Default::default()
        };
        let points = segment_reaches(&path, &dem, &opts, None).unwrap();
        assert!(points.iter().all(|p| p.reach_id == 0));
    }

    #[test]
    fn reach_coverage_equals_path_length() {
        let path: Vec<Cell> = (0..30).map(|c| (0, c as isize)).collect();
        let dem = dem_with_two_slopes(30);
        let points = segment_reaches(&path, &dem, &ReachOptions::default(), None).unwrap();
        assert_eq!(points.len(), path.len());
        let mut ids: Vec<usize> = points.iter().map(|p| p.reach_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (0..ids.len()).collect::<Vec<_>>());
    }

    #[test]
    fn reach_val_packs_segment_and_reach() {
        assert_eq!(reach_val(3, 7), 7003);
    }

    #[test]
    fn cancellation_returns_err() {
        let path: Vec<Cell> = vec![(0, 0), (0, 1), (0, 2)];
        let dem = dem_with_two_slopes(3);
        let token = CancellationToken::new();
        token.cancel();
        let err = segment_reaches(&path, &dem, &ReachOptions::default(), Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
