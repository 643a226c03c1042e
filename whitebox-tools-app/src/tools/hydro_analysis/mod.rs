// private sub-modules defined in other files
mod average_upslope_flowpath_length;
mod basins;
mod d8_pointer;
mod downslope_distance_to_stream;
mod elevation_above_stream;
mod flow_length_diff;
mod isobasins;
mod subbasins;
mod trace_downslope_flowpaths;

// exports identifiers from private sub-modules in the current module namespace
pub use self::average_upslope_flowpath_length::AverageUpslopeFlowpathLength;
pub use self::basins::Basins;
pub use self::d8_pointer::D8Pointer;
pub use self::downslope_distance_to_stream::DownslopeDistanceToStream;
pub use self::elevation_above_stream::ElevationAboveStream;
pub use self::flow_length_diff::FlowLengthDiff as DownslopeFlowpathLength;
pub use self::isobasins::Isobasins;
pub use self::subbasins::Subbasins;
pub use self::trace_downslope_flowpaths::TraceDownslopeFlowpaths;
