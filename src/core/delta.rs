//! Single-tile relocation records and the per-turn delta log.
//!
//! The delta log is the only record of what the current player has done
//! this turn. It is replayed to answer ownership questions ("did this
//! player send this tile to the table this turn?") and is cleared when a
//! turn ends.

use serde::{Deserialize, Serialize};

use super::board::Position;
use super::tile::TileId;

/// One tile moved from one cell to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    #[serde(rename = "tileIndex")]
    pub tile: TileId,
    pub from: Position,
    pub to: Position,
}

impl Delta {
    #[must_use]
    pub const fn new(tile: TileId, from: Position, to: Position) -> Self {
        Self { tile, from, to }
    }

    /// The delta that moves the tile back where it came from.
    #[must_use]
    pub const fn inverse(&self) -> Self {
        Self {
            tile: self.tile,
            from: self.to,
            to: self.from,
        }
    }
}

impl std::fmt::Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} -> {}", self.tile, self.from, self.to)
    }
}

/// Check if a tile left the given hand row at any point in the log.
#[must_use]
pub fn was_sent_from_row(tile: TileId, hand_row: usize, deltas: &[Delta]) -> bool {
    deltas
        .iter()
        .any(|d| d.tile == tile && d.from.row == hand_row)
}

/// Tiles that net-moved from a hand row to elsewhere during the turn.
///
/// A later move back into the hand cancels the earlier send. Moves within
/// the hand are ignored. Order follows the first send of each tile.
#[must_use]
pub fn tiles_sent_this_turn(deltas: &[Delta], hand_row: usize) -> Vec<TileId> {
    let mut sent = Vec::new();
    for delta in deltas {
        let leaves = delta.from.row == hand_row && delta.to.row != hand_row;
        let returns = delta.from.row != hand_row && delta.to.row == hand_row;
        if leaves {
            sent.push(delta.tile);
        } else if returns {
            if let Some(pos) = sent.iter().position(|&t| t == delta.tile) {
                sent.remove(pos);
            }
        }
    }
    sent
}
