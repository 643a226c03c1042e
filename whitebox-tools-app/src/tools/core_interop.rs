//! Boundary conversions between `whitebox_raster::Raster` (the file-backed
//! type every tool reads and writes) and the in-memory raster/graph types
//! `whitebox_stream_network` analyzes, plus the shared CLI bookkeeping
//! (welcome banner, progress printing) every tool in this module prints the
//! same way.
//!
//! Tools that delegate into `whitebox_stream_network` sit entirely on one
//! side of this file or the other: parameter parsing and I/O stay tool-local
//! (the teacher's own convention, never centralized), while grid/graph
//! conversion is centralized here so every delegating tool agrees on cell
//! ordering, world coordinates, and nodata handling.

use whitebox_raster::Raster as WbRaster;
use whitebox_stream_network::dirmap::DirMap;
use whitebox_stream_network::raster::{Raster as CoreRaster, RasterMeta, Transform};

/// Builds the `RasterMeta` a core raster needs from a file-backed raster's
/// configuration.
pub fn core_meta(src: &WbRaster) -> RasterMeta {
    RasterMeta {
        nrows: src.configs.rows,
        ncols: src.configs.columns,
        transform: Transform::north_up(src.configs.resolution_x, src.configs.west, src.configs.north),
        crs: src.configs.projection.clone(),
    }
}

/// Copies a file-backed raster's cell values into a core `Raster<i16>`
/// (the D8 pointer grid's native width).
pub fn to_core_i16(src: &WbRaster) -> CoreRaster<i16> {
    let meta = core_meta(src);
    let nodata = src.configs.nodata as i16;
    let mut out = CoreRaster::new(meta, nodata, nodata);
    for row in 0..src.configs.rows as isize {
        for col in 0..src.configs.columns as isize {
            out.set(row, col, src.get_value(row, col) as i16);
        }
    }
    out
}

/// Copies a file-backed raster's cell values into a core `Raster<i32>`
/// (stream masks and link-label grids).
pub fn to_core_i32(src: &WbRaster) -> CoreRaster<i32> {
    let meta = core_meta(src);
    let nodata = src.configs.nodata as i32;
    let mut out = CoreRaster::new(meta, nodata, 0);
    for row in 0..src.configs.rows as isize {
        for col in 0..src.configs.columns as isize {
            let v = src.get_value(row, col);
            out.set(row, col, if v > 0.0 { v as i32 } else { 0 });
        }
    }
    out
}

/// Copies a file-backed raster's cell values into a core `Raster<f64>`
/// (elevation and flow-accumulation grids).
pub fn to_core_f64(src: &WbRaster) -> CoreRaster<f64> {
    let meta = core_meta(src);
    let nodata = src.configs.nodata;
    let mut out = CoreRaster::new(meta, nodata, nodata);
    for row in 0..src.configs.rows as isize {
        for col in 0..src.configs.columns as isize {
            out.set(row, col, src.get_value(row, col));
        }
    }
    out
}

/// Paints a core `u32`-valued raster (e.g. link labels or Strahler values
/// broadcast back onto cells) into a freshly-initialized file-backed output
/// raster, `background` where the core raster holds its nodata sentinel.
pub fn paint_u32(dst: &mut WbRaster, core: &CoreRaster<u32>, background: f64) {
    for row in 0..core.nrows() {
        for col in 0..core.ncols() {
            let v = core.get(row, col);
            dst.set_value(row, col, if v == core.nodata { background } else { v as f64 });
        }
    }
}

/// Appends the cell one D8 step past a routed path's last cell, matching
/// the segment router's tail-extension rule (spec Component F): the link
/// labeler assigns a confluence cell to the *downstream* trunk link, so an
/// arm's own walk stops one cell short of it. Without this, an arm polyline
/// and the trunk polyline it feeds don't share an endpoint coordinate and
/// `graph::build_from_polylines` never merges them into one node.
///
/// No-op if the last cell's direction is a sink or steps out of bounds.
pub fn append_tail_cell(path: &mut Vec<(isize, isize)>, pntr: &CoreRaster<i16>) {
    if let Some(&(r, c)) = path.last() {
        let code = pntr.get(r, c);
        if !DirMap::is_sink(code) {
            let (dr, dc) = DirMap::step(code);
            let tail = (r + dr, c + dc);
            if tail.0 >= 0 && tail.1 >= 0 && tail.0 < pntr.nrows() && tail.1 < pntr.ncols() {
                path.push(tail);
            }
        }
    }
}

/// Prints the teacher's standard welcome banner for a tool name.
pub fn print_banner(tool_name: &str) {
    let welcome_len = format!("* Welcome to {} *", tool_name).len().max(28);
    println!("{}", "*".repeat(welcome_len));
    println!(
        "* Welcome to {} {}*",
        tool_name,
        " ".repeat(welcome_len - 15 - tool_name.len())
    );
    println!("* Powered by WhiteboxTools {}*", " ".repeat(welcome_len - 28));
    println!("* www.whiteboxgeo.com {}*", " ".repeat(welcome_len - 23));
    println!("{}", "*".repeat(welcome_len));
}
