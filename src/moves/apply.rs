//! Folding accepted moves into game state.
//!
//! Operations apply in order to a clone of the prior state; the prior state
//! is never touched. The only non-determinism is the deal's `Shuffle`,
//! which is realised by the caller-supplied [`Shuffler`].
//!
//! Visibility bookkeeping:
//! - defining a tile (`Set(Tile)`) makes it public
//! - shuffling hides every shuffled key from everyone
//! - `SetVisibility` overwrites the entry for one tile

use log::trace;

use crate::core::rng::Shuffler;
use crate::core::state::{GameState, MatchStatus, Visibility};

use super::operation::{Move, Operation, StateField};

impl GameState {
    /// The state after applying `mv`.
    pub fn apply_move(&self, mv: &Move, shuffler: &mut impl Shuffler) -> GameState {
        let mut next = self.clone();
        for operation in mv.operations() {
            next.apply_operation(operation, shuffler);
        }
        next
    }

    fn apply_operation(&mut self, operation: &Operation, shuffler: &mut impl Shuffler) {
        match operation {
            Operation::SetTurn(player) => {
                self.status = MatchStatus::InProgress { turn: *player };
            }
            Operation::EndMatch(scores) => {
                self.status = MatchStatus::Over {
                    scores: scores.clone(),
                };
            }
            Operation::Set(field) => self.apply_field(field),
            Operation::SetVisibility(tile, visibility) => match visibility {
                Visibility::Everyone => {
                    self.visibility.remove(tile);
                }
                restricted => {
                    self.visibility.insert(*tile, restricted.clone());
                }
            },
            Operation::Shuffle(keys) => {
                let slots = self.tiles.slots_mut();
                let mut values: Vec<_> = keys.iter().map(|key| slots[key.index()]).collect();
                shuffler.shuffle(&mut values);
                for (key, value) in keys.iter().zip(values) {
                    slots[key.index()] = value;
                }
                for key in keys {
                    self.visibility.insert(*key, Visibility::hidden());
                }
                trace!("shuffled {} tile keys", keys.len());
            }
        }
    }

    fn apply_field(&mut self, field: &StateField) {
        match field {
            StateField::Type(kind) => self.last_kind = Some(*kind),
            StateField::Board(board) => self.board = board.clone(),
            StateField::Deltas(deltas) => self.deltas = deltas.clone(),
            StateField::Trace(trace) => self.trace = trace.clone(),
            StateField::SortType(kind) => self.sort_kind = Some(*kind),
            StateField::Tile(id, tile) => {
                self.tiles.set(*id, *tile);
                self.visibility.remove(id);
            }
        }
    }
}
