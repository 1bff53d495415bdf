//! Error taxonomy for a generation run.

use std::fmt;

use crate::world::DistrictId;

/// Which placement step ran out of candidate draws.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementStage {
    /// District centre placement.
    Districts {
        /// Required spacing between district centres.
        min_distance: f64,
    },
    /// Sector cell selection inside one district.
    Sectors {
        /// District being subdivided.
        district: DistrictId,
        /// Side length of the sector grid.
        grid_size: u32,
    },
    /// Room cell selection inside one sector.
    Rooms {
        /// District owning the sector.
        district: DistrictId,
        /// Sector index within that district.
        sector_index: u32,
        /// Side length of the room grid.
        grid_size: u32,
    },
}

impl fmt::Display for PlacementStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Districts { min_distance } => {
                write!(f, "districts (min distance {min_distance})")
            }
            Self::Sectors {
                district,
                grid_size,
            } => write!(f, "sectors of district {} ({grid_size}x{grid_size} grid)", district.0),
            Self::Rooms {
                district,
                sector_index,
                grid_size,
            } => write!(
                f,
                "rooms of sector {sector_index} in district {} ({grid_size}x{grid_size} grid)",
                district.0
            ),
        }
    }
}

/// Fatal errors that abort a run. No partial world is returned alongside any
/// of them.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GenerationError {
    /// A configuration field is malformed. Raised before any generation work.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig {
        /// Offending field name.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// Spacing or grid constraints could not be met within the attempt budget.
    #[error(
        "placement exhausted for {stage}: placed {placed} of {requested} after {attempts} attempts per item"
    )]
    PlacementExhausted {
        /// Step that failed, with its constraint parameters.
        stage: PlacementStage,
        /// Items successfully placed before failing.
        placed: u32,
        /// Items requested.
        requested: u32,
        /// Candidate draws allowed per item; `0` when a capacity check
        /// failed before any draw.
        attempts: u32,
    },

    /// The district graph failed its connectivity postcondition.
    #[error("district graph is disconnected: {} district(s) unreachable", unreachable.len())]
    Disconnected {
        /// Districts not mutually reachable with district 0.
        unreachable: Vec<DistrictId>,
    },

    /// The run was cancelled; all partial output was discarded.
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// A room's candidate sets became unsatisfiable at cell `(x, y)`.
///
/// Contained by the synthesizer: it triggers a retry and, once retries run
/// out, an unresolved room. It never aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("contradiction at cell ({x}, {y})")]
pub struct Contradiction {
    /// Cell column.
    pub x: u32,
    /// Cell row.
    pub y: u32,
}
