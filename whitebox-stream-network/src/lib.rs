//! D8 flow-routing, stream-network tracing, and drainage-graph analysis.
//!
//! This crate is the side-effect-free analytical core behind the
//! `hydro_analysis` and `stream_network_analysis` toolboxes: it knows
//! nothing about on-disk raster formats, shapefiles, or the tool/CLI
//! plumbing those toolboxes add, only about D8 grids, routed stream
//! segments, and the drainage graph built from them.
//!
//! Modules are organized in the dependency order a caller works through
//! them:
//! - raw-grid stage: [`dirmap`], [`walker`], [`tracer`], [`nodes`],
//!   [`links`], [`router`], [`upstream_length_raster`], [`catchments`]
//! - graph stage: [`graph`], [`strahler`], [`upstream_length_graph`],
//!   [`mainstem`], [`hack`]
//! - per-segment profile stage: [`changepoint`], [`reaches`]
//!
//! [`raster`], [`error`], and [`report`] are shared infrastructure used
//! throughout.

pub mod catchments;
pub mod changepoint;
pub mod dirmap;
pub mod error;
pub mod graph;
pub mod hack;
pub mod links;
pub mod mainstem;
pub mod nodes;
pub mod raster;
pub mod reaches;
pub mod report;
pub mod router;
pub mod strahler;
pub mod tracer;
pub mod upstream_length_graph;
pub mod upstream_length_raster;
pub mod walker;

pub use error::{CoreError, CoreResult};
pub use graph::StreamGraph;
pub use raster::{Raster, RasterMeta, Transform};
pub use report::{CancellationToken, NullReporter, Reporter};
