//! Component A: the D8 neighbor-offset table (ESRI encoding) and sink
//! sentinels.
//!
//! Grounded in the `pntr_matches` offset table used throughout the teacher's
//! own hydrological tools (e.g. `Basins`, `Subbasins`): row/col offsets
//! indexed by ESRI pointer code, `esri_style` branch.

/// A decoded flow-direction cell: either a valid D8 step or one of the two
/// sink flavors the specification distinguishes at the wire level (`-1`/`-2`
/// outlet/undefined vs. `0` "no direction assigned"). All three behave
/// identically as walker stop conditions; the variant is kept only so
/// diagnostics can say which kind of sink a cell was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    D8(u8),
    Outlet,
    Undefined,
}

impl Direction {
    /// Decodes a raw ESRI pointer code. Unknown, non-sentinel codes are
    /// treated as `Undefined` (defensive) rather than panicking; callers
    /// that need to warn on this should check `ESRI_CODES.contains(&code)`
    /// themselves and report a warning before calling this.
    pub fn from_code(code: i16) -> Direction {
        match code {
            1 | 2 | 4 | 8 | 16 | 32 | 64 | 128 => Direction::D8(code as u8),
            -1 => Direction::Outlet,
            0 => Direction::Undefined,
            -2 => Direction::Undefined,
            _ => Direction::Undefined,
        }
    }

    pub fn is_sink(&self) -> bool {
        !matches!(self, Direction::D8(_))
    }
}

/// The eight valid ESRI flow-direction codes, in the ordering the
/// specification's table presents them.
pub const ESRI_CODES: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Immutable D8 lookup table, constructed once and shared by every core
/// algorithm that walks a flow-direction raster.
pub struct DirMap;

impl DirMap {
    /// `(drow, dcol)` offset for an ESRI code. Sink codes and any unknown
    /// code resolve to `(0, 0)`, matching "a walker at such a cell stops in
    /// place."
    pub fn step(code: i16) -> (isize, isize) {
        match code {
            64 => (-1, 0),
            128 => (-1, 1),
            1 => (0, 1),
            2 => (1, 1),
            4 => (1, 0),
            8 => (1, -1),
            16 => (0, -1),
            32 => (-1, -1),
            _ => (0, 0),
        }
    }

    /// True for the sink sentinels `{-1, -2, 0}` and for any code outside
    /// the eight valid D8 values (defensive: unknown codes are sinks).
    pub fn is_sink(code: i16) -> bool {
        !matches!(code, 1 | 2 | 4 | 8 | 16 | 32 | 64 | 128)
    }

    /// `true` iff `(drow, dcol)` is a diagonal step (the four odd ESRI
    /// codes), used by length-accumulating algorithms to pick between a unit
    /// step and a `sqrt(2)` step.
    pub fn is_diagonal(code: i16) -> bool {
        matches!(code, 2 | 8 | 32 | 128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_specification() {
        assert_eq!(DirMap::step(64), (-1, 0));
        assert_eq!(DirMap::step(128), (-1, 1));
        assert_eq!(DirMap::step(1), (0, 1));
        assert_eq!(DirMap::step(2), (1, 1));
        assert_eq!(DirMap::step(4), (1, 0));
        assert_eq!(DirMap::step(8), (1, -1));
        assert_eq!(DirMap::step(16), (0, -1));
        assert_eq!(DirMap::step(32), (-1, -1));
    }

    #[test]
    fn sink_sentinels_recognized() {
        assert!(DirMap::is_sink(-1));
        assert!(DirMap::is_sink(-2));
        assert!(DirMap::is_sink(0));
        assert!(!DirMap::is_sink(1));
    }

    #[test]
    fn unknown_code_is_defensive_sink() {
        assert!(DirMap::is_sink(3));
        assert_eq!(DirMap::step(3), (0, 0));
    }

    #[test]
    fn diagonal_classification() {
        for c in [2, 8, 32, 128] {
            assert!(DirMap::is_diagonal(c));
        }
        for c in [1, 4, 16, 64] {
            assert!(!DirMap::is_diagonal(c));
        }
    }
}
