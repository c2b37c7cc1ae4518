//! Move representation: an ordered list of state operations.
//!
//! A move is the artifact exchanged between players and the arbiter. It is
//! produced atomically by a constructor and consumed atomically by
//! `GameState::apply_move`; there is no partial application.
//!
//! Operations form a closed set. Consumers read a move by semantic role
//! (`kind()`, `deltas()`, `trace()`, ...) rather than by position.

use serde::{Deserialize, Serialize};

use crate::core::board::Board;
use crate::core::delta::Delta;
use crate::core::error::{FailureKind, RuleError, RuleResult};
use crate::core::player::{PlayerId, PlayerMap};
use crate::core::state::{Trace, Visibility};
use crate::core::tile::{Tile, TileId};

/// The declared type of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveKind {
    /// Deal the game.
    Init,
    /// Move a single tile.
    Move,
    /// Draw a tile and end the turn.
    Pick,
    /// Commit the table and end the turn.
    Meld,
    /// Revert the last single-tile move.
    Undo,
    /// Reorder the mover's hand.
    Sort,
    /// Apply a batch of deltas at once.
    Comb,
}

impl MoveKind {
    /// Wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MoveKind::Init => "INIT",
            MoveKind::Move => "MOVE",
            MoveKind::Pick => "PICK",
            MoveKind::Meld => "MELD",
            MoveKind::Undo => "UNDO",
            MoveKind::Sort => "SORT",
            MoveKind::Comb => "COMB",
        }
    }

    /// Parse a wire name, failing with `UnexpectedMoveKind`.
    pub fn parse(name: &str) -> RuleResult<Self> {
        match name {
            "INIT" => Ok(MoveKind::Init),
            "MOVE" => Ok(MoveKind::Move),
            "PICK" => Ok(MoveKind::Pick),
            "MELD" => Ok(MoveKind::Meld),
            "UNDO" => Ok(MoveKind::Undo),
            "SORT" => Ok(MoveKind::Sort),
            "COMB" => Ok(MoveKind::Comb),
            other => Err(RuleError::new(
                FailureKind::UnexpectedMoveKind,
                format!("unexpected move type: {other}"),
            )),
        }
    }
}

impl std::fmt::Display for MoveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a SORT move orders the hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Ascending score, stable.
    Score,
    /// By colour name, then score.
    Color,
    /// Maximal groups, then runs, then leftovers.
    Set,
}

impl SortKind {
    /// Wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SortKind::Score => "score",
            SortKind::Color => "color",
            SortKind::Set => "set",
        }
    }

    /// Parse a wire name, failing with `UnexpectedMoveKind`.
    pub fn parse(name: &str) -> RuleResult<Self> {
        match name {
            "score" => Ok(SortKind::Score),
            "color" => Ok(SortKind::Color),
            "set" => Ok(SortKind::Set),
            other => Err(RuleError::new(
                FailureKind::UnexpectedMoveKind,
                format!("unexpected sort type: {other}"),
            )),
        }
    }
}

/// A named state field written by a `set` operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateField {
    Type(MoveKind),
    Board(Board),
    Deltas(Vec<Delta>),
    Trace(Trace),
    SortType(SortKind),
    /// Defines one tile's attributes (`tileN`).
    Tile(TileId, Tile),
}

/// One state mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Hand the turn to a player.
    SetTurn(PlayerId),
    /// End the match with per-player scores.
    EndMatch(PlayerMap<i32>),
    /// Write a state field.
    Set(StateField),
    /// Change who may see a tile.
    SetVisibility(TileId, Visibility),
    /// Permute the attributes stored under these tile keys.
    Shuffle(Vec<TileId>),
}

/// What a player declared they want to do.
///
/// The validator extracts this from a submitted move and feeds it back to
/// the factory to recompute the canonical move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Init { player_count: usize },
    Move(Delta),
    Pick,
    Meld,
    Sort(SortKind),
    Undo,
    Combined(Vec<Delta>),
}

/// A complete move.
///
/// ## Example
///
/// ```
/// use rummy_engine::core::PlayerId;
/// use rummy_engine::moves::{Move, MoveKind, Operation, StateField};
///
/// let mv = Move::from(vec![
///     Operation::SetTurn(PlayerId::new(1)),
///     Operation::Set(StateField::Type(MoveKind::Pick)),
/// ]);
///
/// assert_eq!(mv.kind(), Some(MoveKind::Pick));
/// assert_eq!(mv.next_turn(), Some(PlayerId::new(1)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    operations: Vec<Operation>,
}

impl Move {
    /// Operations in application order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the move has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn field(&self) -> impl Iterator<Item = &StateField> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Set(field) => Some(field),
            _ => None,
        })
    }

    /// Declared move type.
    #[must_use]
    pub fn kind(&self) -> Option<MoveKind> {
        self.field().find_map(|f| match f {
            StateField::Type(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Board written by the move.
    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.field().find_map(|f| match f {
            StateField::Board(board) => Some(board),
            _ => None,
        })
    }

    /// Delta log written by the move.
    #[must_use]
    pub fn deltas(&self) -> Option<&[Delta]> {
        self.field().find_map(|f| match f {
            StateField::Deltas(deltas) => Some(deltas.as_slice()),
            _ => None,
        })
    }

    /// Trace written by the move.
    #[must_use]
    pub fn trace(&self) -> Option<&Trace> {
        self.field().find_map(|f| match f {
            StateField::Trace(trace) => Some(trace),
            _ => None,
        })
    }

    /// Sort order declared by a SORT move.
    #[must_use]
    pub fn sort_kind(&self) -> Option<SortKind> {
        self.field().find_map(|f| match f {
            StateField::SortType(kind) => Some(*kind),
            _ => None,
        })
    }

    /// The turn-deciding operation (`SetTurn` or `EndMatch`).
    #[must_use]
    pub fn turn_operation(&self) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| matches!(op, Operation::SetTurn(_) | Operation::EndMatch(_)))
    }

    /// Player who moves next, if the match continues.
    #[must_use]
    pub fn next_turn(&self) -> Option<PlayerId> {
        match self.turn_operation()? {
            Operation::SetTurn(player) => Some(*player),
            _ => None,
        }
    }

    /// Final scores, if the move ends the match.
    #[must_use]
    pub fn end_scores(&self) -> Option<&PlayerMap<i32>> {
        match self.turn_operation()? {
            Operation::EndMatch(scores) => Some(scores),
            _ => None,
        }
    }

    /// Visibility changes carried by the move.
    pub fn visibility_changes(&self) -> impl Iterator<Item = (TileId, &Visibility)> {
        self.operations.iter().filter_map(|op| match op {
            Operation::SetVisibility(tile, vis) => Some((*tile, vis)),
            _ => None,
        })
    }

    /// Extract the declared intent.
    ///
    /// Fails with `UnexpectedMoveKind` if the move lacks the field its
    /// type needs (no type, an INIT without trace, a MOVE without deltas,
    /// a SORT without sort type).
    pub fn intent(&self) -> RuleResult<Intent> {
        let missing = |what: &str| {
            RuleError::new(FailureKind::UnexpectedMoveKind, format!("move carries no {what}"))
        };

        let kind = self.kind().ok_or_else(|| missing("type"))?;
        let intent = match kind {
            MoveKind::Init => Intent::Init {
                player_count: self.trace().ok_or_else(|| missing("trace"))?.player_count,
            },
            MoveKind::Move => {
                let delta = self
                    .deltas()
                    .and_then(|d| d.last())
                    .ok_or_else(|| missing("delta"))?;
                Intent::Move(*delta)
            }
            MoveKind::Pick => Intent::Pick,
            MoveKind::Meld => Intent::Meld,
            MoveKind::Undo => Intent::Undo,
            MoveKind::Sort => Intent::Sort(self.sort_kind().ok_or_else(|| missing("sort type"))?),
            MoveKind::Comb => Intent::Combined(
                self.deltas().ok_or_else(|| missing("deltas"))?.to_vec(),
            ),
        };
        Ok(intent)
    }
}

impl From<Vec<Operation>> for Move {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

impl IntoIterator for Move {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::Position;

    fn delta(id: i32) -> Delta {
        Delta::new(TileId::new(id).unwrap(), Position::new(6, 0), Position::new(0, 0))
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            MoveKind::Init,
            MoveKind::Move,
            MoveKind::Pick,
            MoveKind::Meld,
            MoveKind::Undo,
            MoveKind::Sort,
            MoveKind::Comb,
        ] {
            assert_eq!(MoveKind::parse(kind.name()).unwrap(), kind);
        }

        let err = MoveKind::parse("SEND").unwrap_err();
        assert_eq!(err.kind, FailureKind::UnexpectedMoveKind);
    }

    #[test]
    fn test_sort_kind_parse() {
        assert_eq!(SortKind::parse("color").unwrap(), SortKind::Color);
        assert_eq!(SortKind::parse("size").unwrap_err().kind, FailureKind::UnexpectedMoveKind);
    }

    #[test]
    fn test_role_accessors() {
        let mv = Move::from(vec![
            Operation::EndMatch(PlayerMap::from(vec![9, -9])),
            Operation::Set(StateField::Type(MoveKind::Meld)),
            Operation::Set(StateField::Deltas(vec![])),
        ]);

        assert_eq!(mv.kind(), Some(MoveKind::Meld));
        assert_eq!(mv.deltas(), Some(&[][..]));
        assert_eq!(mv.next_turn(), None);
        assert_eq!(mv.end_scores().unwrap().as_slice(), &[9, -9]);
        assert!(mv.board().is_none());
        assert_eq!(mv.len(), 3);
    }

    #[test]
    fn test_intent_move_uses_last_delta() {
        let mv = Move::from(vec![
            Operation::SetTurn(PlayerId::new(0)),
            Operation::Set(StateField::Type(MoveKind::Move)),
            Operation::Set(StateField::Deltas(vec![delta(1), delta(2)])),
        ]);
        assert_eq!(mv.intent().unwrap(), Intent::Move(delta(2)));
    }

    #[test]
    fn test_intent_missing_fields() {
        let untyped = Move::from(vec![Operation::SetTurn(PlayerId::new(0))]);
        assert_eq!(untyped.intent().unwrap_err().kind, FailureKind::UnexpectedMoveKind);

        let sort = Move::from(vec![Operation::Set(StateField::Type(MoveKind::Sort))]);
        assert_eq!(sort.intent().unwrap_err().kind, FailureKind::UnexpectedMoveKind);

        let empty_move = Move::from(vec![
            Operation::Set(StateField::Type(MoveKind::Move)),
            Operation::Set(StateField::Deltas(vec![])),
        ]);
        assert!(empty_move.intent().is_err());
    }

    #[test]
    fn test_visibility_changes() {
        let tile = TileId::new(4).unwrap();
        let mv = Move::from(vec![
            Operation::SetVisibility(tile, Visibility::only(PlayerId::new(1))),
            Operation::Shuffle(vec![tile]),
        ]);

        let changes: Vec<_> = mv.visibility_changes().collect();
        assert_eq!(changes, vec![(tile, &Visibility::only(PlayerId::new(1)))]);
    }
}
