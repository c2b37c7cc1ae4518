//! Classified rule failures.
//!
//! Every move constructor returns `RuleResult<T>` and stops at the first
//! violated precondition. The validator turns any failure into a plain
//! rejection; direct callers can inspect `kind` to show a specific message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category of a violated precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Tile id outside `[0, 106)`.
    IllegalTileIndex,
    /// Row or column outside the current board geometry.
    OutOfBounds,
    /// `from` does not hold the declared tile, or `to` is not empty.
    OccupiedOrEmptyMismatch,
    /// Tile moved into or out of a hand in violation of ownership rules.
    IllegalOwnership,
    /// A table set is neither a valid run nor a valid group.
    MeldInvalid,
    /// Initial meld scores below the threshold.
    InitialMeldTooLow,
    /// Draw requested with the pool exhausted.
    NoTilesLeft,
    /// A winner or tie is already recorded.
    GameAlreadyOver,
    /// Unrecognised move type.
    UnexpectedMoveKind,
    /// Player index outside the game's player count.
    IllegalPlayer,
    /// Deal requested for an unsupported number of players.
    InvalidPlayerCount,
    /// Deal requested twice, or by someone other than player 0.
    AlreadyDealt,
    /// Meld declared without sending any tile this turn.
    NoTilesSent,
    /// Draw declared while tiles sent this turn are still on the table.
    TilesSentThisTurn,
    /// Undo requested with an empty delta log.
    NothingToUndo,
    /// Batched move with no deltas.
    EmptyBatch,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A classified failure plus a human-readable detail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct RuleError {
    pub kind: FailureKind,
    pub detail: String,
}

impl RuleError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Result type used by every rule function.
pub type RuleResult<T> = Result<T, RuleError>;

/// Fail with `kind` unless `condition` holds.
///
/// The detail is built lazily so passing checks cost nothing.
pub(crate) fn ensure(
    condition: bool,
    kind: FailureKind,
    detail: impl FnOnce() -> String,
) -> RuleResult<()> {
    if condition {
        Ok(())
    } else {
        Err(RuleError::new(kind, detail()))
    }
}
