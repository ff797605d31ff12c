use thiserror::Error;

use crate::region::CellIdx;

/// Errors the core can raise. `RejectedMove`, node/solution limits, and similar
/// expected control flow are *not* in this enum: they are reported as plain
/// booleans (`set_cell`'s return value, `SolverStats`'s interrupt flags).
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("index out of range: {0:?}")]
    IndexOutOfRange(CellIdx),

    #[error("unknown rule tag: {0}")]
    UnknownRuleTag(String),

    #[error("malformed region in rule '{rule}': {reason}")]
    MalformedRegion { rule: String, reason: String },

    #[error("no empty cell found while board is not solved")]
    NoEmptyCell,

    #[error("invalid board size: {0}")]
    InvalidSize(usize),

    #[error("failed to parse puzzle document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
