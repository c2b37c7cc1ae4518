//! Move validation by recompute-and-compare.
//!
//! There is no separate rule-checking path. The validator reads the
//! declared intent off the submitted move, rebuilds the canonical move with
//! the same constructors players use, and accepts only an exact match.
//! Every failure, including a malformed move, is a plain `false`; the
//! reason is logged at `debug` level.

use log::debug;
use serde_json::Value;

use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::moves::{from_wire, Engine, Move};

impl Engine {
    /// Check a submitted move against the state it was made from.
    ///
    /// `turn` is the player whose turn it was before the move.
    pub fn is_move_ok(&self, turn: PlayerId, state: &GameState, submitted: &Move) -> bool {
        let expected = submitted
            .intent()
            .and_then(|intent| self.create_move(state, turn, intent));

        match expected {
            Ok(expected) if expected == *submitted => true,
            Ok(expected) => {
                debug!("{turn}: submitted {:?} move differs from the expected one", submitted.kind());
                if self.config().log_mismatches {
                    log_mismatch(submitted, &expected);
                }
                false
            }
            Err(err) => {
                debug!("{turn}: move rejected: {err}");
                false
            }
        }
    }

    /// [`Engine::is_move_ok`] for a move in the JSON wire format.
    pub fn is_move_ok_wire(&self, turn: PlayerId, state: &GameState, submitted: &Value) -> bool {
        match from_wire(submitted) {
            Ok(mv) => self.is_move_ok(turn, state, &mv),
            Err(err) => {
                debug!("{turn}: undecodable move: {err}");
                false
            }
        }
    }
}

fn log_mismatch(submitted: &Move, expected: &Move) {
    if submitted.len() != expected.len() {
        debug!(
            "submitted move has {} operations, expected {}",
            submitted.len(),
            expected.len()
        );
        return;
    }
    for (index, (got, want)) in submitted
        .operations()
        .iter()
        .zip(expected.operations())
        .enumerate()
    {
        if got != want {
            debug!("operation {index}: submitted {got:?}");
            debug!("operation {index}: expected  {want:?}");
        }
    }
}
