// private sub-modules defined in other files
mod delineate_reaches;
mod extract_streams;
mod extract_valleys;
mod find_main_stem;
mod hack_order;
mod long_profile;
mod raster_streams_to_vector;
mod strahler_order;
mod stream_slope_continuous;
mod vector_stream_network_analysis;

// exports identifiers from private sub-modules in the current module namespace
pub use self::delineate_reaches::DelineateReaches;
pub use self::extract_streams::ExtractStreams;
pub use self::extract_valleys::ExtractValleys;
pub use self::find_main_stem::FindMainStem;
pub use self::hack_order::HackStreamOrder as HackOrder;
pub use self::long_profile::LongProfile;
pub use self::raster_streams_to_vector::RasterStreamsToVector;
pub use self::strahler_order::StrahlerStreamOrder as StrahlerOrder;
pub use self::stream_slope_continuous::StreamSlopeContinuous;
pub use self::vector_stream_network_analysis::VectorStreamNetworkAnalysis;
