//! Error taxonomy for the stream-network core.
//!
//! The core never retries and never swallows a failure: every fallible
//! operation returns a `CoreError` rather than panicking. Conditions that the
//! specification treats as *warnings* (a stray direction code, a tied
//! mainstem choice) are reported through [`crate::report::Reporter`] instead
//! of appearing here.

use std::error::Error;
use std::fmt;

/// The core's error type. Variants mirror the taxonomy in the specification's
/// error-handling section, minus the warning-only conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Two rasters that are required to share a shape/transform do not.
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A graph operation needs an attribute absent from at least one edge.
    MissingAttribute { attribute: &'static str },
    /// The segment router produced a path inconsistent with its mask.
    InvalidSegmentGeometry { segment_id: u32, reason: String },
    /// A segment has fewer than two cells.
    DegenerateSegment { segment_id: u32 },
    /// A cancellation signal fired mid-operation.
    Cancelled,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ShapeMismatch { expected, found } => write!(
                f,
                "raster shape mismatch: expected {:?}, found {:?}",
                expected, found
            ),
            CoreError::MissingAttribute { attribute } => {
                write!(f, "missing required edge attribute: {}", attribute)
            }
            CoreError::InvalidSegmentGeometry { segment_id, reason } => write!(
                f,
                "invalid geometry for segment {}: {}",
                segment_id, reason
            ),
            CoreError::DegenerateSegment { segment_id } => {
                write!(f, "segment {} has fewer than two cells", segment_id)
            }
            CoreError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
