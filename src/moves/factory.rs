//! Move construction.
//!
//! [`Engine`] holds nothing but configuration. Each constructor borrows the
//! prior state, checks its preconditions in a fixed order and returns the
//! canonical operation list, or the first precondition that failed. No
//! constructor touches the caller's state: boards are persistent, so edits
//! happen on O(1) clones.
//!
//! The same constructors back validation (see `rules::validator`). A
//! submitted move is accepted only if rebuilding it from its declared
//! intent yields an identical move, so operation order here is part of the
//! protocol.
//!
//! ## Canonical operation order
//!
//! | Kind       | Operations                                                            |
//! |------------|-----------------------------------------------------------------------|
//! | INIT       | turn 0, type, trace, board, deltas, tile × 106, shuffle, grants       |
//! | MOVE, UNDO | turn (mover), type, board, deltas, [visibility]                       |
//! | PICK       | turn (next) or end, type, board, deltas, trace, visibility            |
//! | MELD       | turn (next) or end, type, board, deltas, trace                        |
//! | SORT       | turn (mover), type, sort type, board                                  |
//! | COMB       | turn (mover), type, board, deltas, trace                              |

use im::Vector;

use crate::core::board::{Board, Cell};
use crate::core::config::EngineConfig;
use crate::core::delta::{tiles_sent_this_turn, was_sent_from_row, Delta};
use crate::core::error::{ensure, FailureKind, RuleError, RuleResult};
use crate::core::player::{PlayerId, MAX_PLAYERS, MIN_PLAYERS};
use crate::core::state::{GameState, Trace, Visibility};
use crate::core::tile::{catalog_tile, TileId};
use crate::rules::classifier::check_board_meld;
use crate::rules::organizer::sort_hand;
use crate::rules::resolver::{compute_end_scores, is_game_over, next_player};

use super::operation::{Intent, Move, MoveKind, Operation, SortKind, StateField};

/// Stateless move factory.
///
/// ## Example
///
/// ```
/// use rummy_engine::core::{GameState, PlayerId, Unshuffled};
/// use rummy_engine::moves::{Engine, MoveKind};
///
/// let engine = Engine::default();
/// let deal = engine.initial_move(PlayerId::new(0), 2).unwrap();
/// let state = GameState::default().apply_move(&deal, &mut Unshuffled);
///
/// let pick = engine.pick_move(PlayerId::new(0), &state).unwrap();
/// assert_eq!(pick.kind(), Some(MoveKind::Pick));
/// assert_eq!(pick.next_turn(), Some(PlayerId::new(1)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the move a player declared.
    ///
    /// A deal is only accepted on a state that has not been dealt yet.
    pub fn create_move(&self, state: &GameState, player: PlayerId, intent: Intent) -> RuleResult<Move> {
        match intent {
            Intent::Init { player_count } => {
                ensure(!state.is_dealt(), FailureKind::AlreadyDealt, || {
                    "the game has already been dealt".into()
                })?;
                self.initial_move(player, player_count)
            }
            Intent::Move(delta) => self.single_tile_move(player, state, delta),
            Intent::Pick => self.pick_move(player, state),
            Intent::Meld => self.meld_move(player, state),
            Intent::Sort(kind) => self.sort_move(player, state, kind),
            Intent::Undo => self.undo_move(player, state),
            Intent::Combined(deltas) => self.combined_move(player, state, &deltas),
        }
    }

    /// Deal a game.
    ///
    /// Only player 0 deals, for 2-4 players. Player `p` receives tiles
    /// `[hand_size * p, hand_size * (p + 1))`; the move then asks for every
    /// tile key to be shuffled and shows each player only their own hand.
    pub fn initial_move(&self, player: PlayerId, player_count: usize) -> RuleResult<Move> {
        ensure(player.index() == 0, FailureKind::AlreadyDealt, || {
            format!("only player 0 deals, not {player}")
        })?;
        ensure(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count),
            FailureKind::InvalidPlayerCount,
            || format!("{player_count} players requested, {MIN_PLAYERS}-{MAX_PLAYERS} allowed"),
        )?;

        let board = Board::initial(&self.config, player_count)?;
        let trace = Trace::dealt(player_count, self.config.hand_size);

        let grants: Vec<Operation> = PlayerId::all(player_count)
            .flat_map(|owner| {
                board
                    .tiles_in_row(self.config.player_row(owner))
                    .map(move |tile| Operation::SetVisibility(tile, Visibility::only(owner)))
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut operations = vec![
            Operation::SetTurn(PlayerId::new(0)),
            Operation::Set(StateField::Type(MoveKind::Init)),
            Operation::Set(StateField::Trace(trace)),
            Operation::Set(StateField::Board(board)),
            Operation::Set(StateField::Deltas(Vec::new())),
        ];
        operations.extend(TileId::all().map(|id| Operation::Set(StateField::Tile(id, catalog_tile(id)))));
        operations.push(Operation::Shuffle(TileId::all().collect()));
        operations.extend(grants);

        Ok(Move::from(operations))
    }

    /// Move one tile.
    ///
    /// Checks, in order: `from` is on the board and holds the tile, `to` is
    /// on the board and empty, neither end is another player's hand, the
    /// tile is the mover's own if they have not melded yet, and a tile
    /// entering the mover's hand came from it this turn.
    ///
    /// Sending a tile from the hand reveals it to everyone; retrieving one
    /// shows it to the mover only. Moves within the table or within the
    /// hand leave visibility alone.
    pub fn single_tile_move(&self, player: PlayerId, state: &GameState, delta: Delta) -> RuleResult<Move> {
        self.check_in_play(player, state)?;
        self.relocate_tile(player, state, delta, MoveKind::Move)
    }

    /// Revert the last single-tile move of the turn.
    pub fn undo_move(&self, player: PlayerId, state: &GameState) -> RuleResult<Move> {
        self.check_in_play(player, state)?;
        let last = state.deltas.last().ok_or_else(|| {
            RuleError::new(FailureKind::NothingToUndo, "no move to undo this turn")
        })?;
        self.relocate_tile(player, state, last.inverse(), MoveKind::Undo)
    }

    /// Draw the next tile and end the turn.
    ///
    /// The mover must have no tiles of their own left on the table, and the
    /// table must be valid as it stands. Drawing the last tile ends the
    /// match with all-zero scores.
    pub fn pick_move(&self, player: PlayerId, state: &GameState) -> RuleResult<Move> {
        self.check_player(player, state)?;
        ensure(!state.trace.pool_exhausted(), FailureKind::NoTilesLeft, || {
            "every tile has been drawn".into()
        })?;
        self.check_not_over(state)?;

        let hand_row = self.config.player_row(player);
        let hand = self.hand(state, player)?;
        let sent = tiles_sent_this_turn(&state.deltas, hand_row);
        ensure(sent.is_empty(), FailureKind::TilesSentThisTurn, || {
            format!("{} tile(s) sent to the table must be taken back before drawing", sent.len())
        })?;
        check_board_meld(&self.config, state, &state.board, player, true)?;

        let drawn = TileId::new(state.trace.next_tile as i32)?;
        let mut tiles: Vec<TileId> = hand.iter().flatten().copied().collect();
        tiles.push(drawn);
        let sorted = sort_hand(&tiles, SortKind::Set, &state.tiles)?;

        let mut board = state.board.clone();
        board.set_row(hand_row, sorted.into_iter().map(Some).collect());

        let mut trace = state.trace.clone();
        trace.next_tile += 1;

        let turn = if trace.pool_exhausted() {
            Operation::EndMatch(compute_end_scores(&self.config, None, state)?)
        } else {
            Operation::SetTurn(next_player(player, state.player_count()))
        };

        Ok(Move::from(vec![
            turn,
            Operation::Set(StateField::Type(MoveKind::Pick)),
            Operation::Set(StateField::Board(board)),
            Operation::Set(StateField::Deltas(Vec::new())),
            Operation::Set(StateField::Trace(trace)),
            Operation::SetVisibility(drawn, Visibility::only(player)),
        ]))
    }

    /// Commit the table and end the turn.
    ///
    /// Needs at least one tile sent this turn and a valid table, including
    /// the initial-meld threshold if the mover has not met it yet. Emptying
    /// the hand wins the match.
    pub fn meld_move(&self, player: PlayerId, state: &GameState) -> RuleResult<Move> {
        self.check_in_play(player, state)?;

        let hand_row = self.config.player_row(player);
        let hand = self.hand(state, player)?;
        ensure(
            !tiles_sent_this_turn(&state.deltas, hand_row).is_empty(),
            FailureKind::NoTilesSent,
            || "no tiles sent to the table this turn".into(),
        )?;
        check_board_meld(&self.config, state, &state.board, player, state.trace.has_melded(player))?;

        let won = hand.iter().all(Option::is_none);
        let turn = if won {
            Operation::EndMatch(compute_end_scores(&self.config, Some(player), state)?)
        } else {
            Operation::SetTurn(next_player(player, state.player_count()))
        };

        let mut board = state.board.clone();
        board.compact_row(hand_row);

        Ok(Move::from(vec![
            turn,
            Operation::Set(StateField::Type(MoveKind::Meld)),
            Operation::Set(StateField::Board(board)),
            Operation::Set(StateField::Deltas(Vec::new())),
            Operation::Set(StateField::Trace(melded(&state.trace, player))),
        ]))
    }

    /// Reorder the mover's hand.
    ///
    /// Empty cells left by tiles sent this turn stay at the end of the row.
    pub fn sort_move(&self, player: PlayerId, state: &GameState, kind: SortKind) -> RuleResult<Move> {
        self.check_in_play(player, state)?;

        let hand = self.hand(state, player)?;
        let tiles: Vec<TileId> = hand.iter().flatten().copied().collect();
        let empties = hand.len() - tiles.len();
        let row: Vector<Cell> = sort_hand(&tiles, kind, &state.tiles)?
            .into_iter()
            .map(Some)
            .chain(std::iter::repeat(None).take(empties))
            .collect();

        let mut board = state.board.clone();
        board.set_row(self.config.player_row(player), row);

        Ok(Move::from(vec![
            Operation::SetTurn(player),
            Operation::Set(StateField::Type(MoveKind::Sort)),
            Operation::Set(StateField::SortType(kind)),
            Operation::Set(StateField::Board(board)),
        ]))
    }

    /// Apply a batch of deltas as one move.
    ///
    /// Each delta is checked against the board left by the ones before it:
    /// both ends on the board, the tile at `from`, `to` empty, and the same
    /// ownership rules as a single-tile move, with earlier deltas of the
    /// batch counting as sent this turn. Table validity is not checked here;
    /// the following meld does that. The batch replaces the delta log and
    /// marks the mover's initial meld done.
    pub fn combined_move(&self, player: PlayerId, state: &GameState, deltas: &[Delta]) -> RuleResult<Move> {
        self.check_in_play(player, state)?;
        ensure(!deltas.is_empty(), FailureKind::EmptyBatch, || "no move to make".into())?;

        let has_melded = state.trace.has_melded(player);
        let mut log = state.deltas.clone();
        let mut board = state.board.clone();
        for delta in deltas {
            board.check_in_bounds(delta.from)?;
            board.check_in_bounds(delta.to)?;
            ensure(board.get(delta.from) == Some(Some(delta.tile)), FailureKind::OccupiedOrEmptyMismatch, || {
                format!("{} is not at {}", delta.tile, delta.from)
            })?;
            ensure(board.get(delta.to) == Some(None), FailureKind::OccupiedOrEmptyMismatch, || {
                format!("{} is occupied", delta.to)
            })?;
            self.check_ownership(player, has_melded, &log, delta)?;
            board.relocate(delta.tile, delta.from, delta.to);
            log.push(*delta);
        }

        Ok(Move::from(vec![
            Operation::SetTurn(player),
            Operation::Set(StateField::Type(MoveKind::Comb)),
            Operation::Set(StateField::Board(board)),
            Operation::Set(StateField::Deltas(deltas.to_vec())),
            Operation::Set(StateField::Trace(melded(&state.trace, player))),
        ]))
    }

    fn relocate_tile(
        &self,
        player: PlayerId,
        state: &GameState,
        delta: Delta,
        kind: MoveKind,
    ) -> RuleResult<Move> {
        let Delta { tile, from, to } = delta;
        let board = &state.board;
        let hand_row = self.config.player_row(player);

        board.check_in_bounds(from)?;
        ensure(board.get(from) == Some(Some(tile)), FailureKind::OccupiedOrEmptyMismatch, || {
            format!("{tile} is not at {from}")
        })?;
        board.check_in_bounds(to)?;
        ensure(board.get(to) == Some(None), FailureKind::OccupiedOrEmptyMismatch, || {
            format!("{to} is occupied")
        })?;
        self.check_ownership(player, state.trace.has_melded(player), &state.deltas, &delta)?;

        let visibility = if to.row == hand_row {
            (from.row != hand_row).then(|| Visibility::only(player))
        } else if from.row == hand_row {
            Some(Visibility::Everyone)
        } else {
            None
        };

        let mut board_after = board.clone();
        board_after.relocate(tile, from, to);

        let mut deltas = state.deltas.clone();
        if kind == MoveKind::Undo {
            deltas.pop();
        } else {
            deltas.push(delta);
        }

        let mut operations = vec![
            Operation::SetTurn(player),
            Operation::Set(StateField::Type(kind)),
            Operation::Set(StateField::Board(board_after)),
            Operation::Set(StateField::Deltas(deltas)),
        ];
        if let Some(visibility) = visibility {
            operations.push(Operation::SetVisibility(tile, visibility));
        }
        Ok(Move::from(operations))
    }

    /// Ownership rules for one delta, given the turn's log so far.
    ///
    /// Neither end may be another player's hand. Before the initial meld
    /// only the mover's own tiles move, and a tile may enter the mover's
    /// hand only if it left that hand earlier in `log`.
    fn check_ownership(&self, player: PlayerId, melded: bool, log: &[Delta], delta: &Delta) -> RuleResult<()> {
        let Delta { tile, from, to } = *delta;
        let hand_row = self.config.player_row(player);

        ensure(
            self.config.is_table_row(from.row) || from.row == hand_row,
            FailureKind::IllegalOwnership,
            || "cannot move tiles from another player's hand".into(),
        )?;
        ensure(
            self.config.is_table_row(to.row) || to.row == hand_row,
            FailureKind::IllegalOwnership,
            || "cannot move tiles to another player's hand".into(),
        )?;

        let own_tile = from.row == hand_row || was_sent_from_row(tile, hand_row, log);
        if !melded {
            ensure(own_tile, FailureKind::IllegalOwnership, || {
                format!("{tile} cannot be moved before completing the initial meld")
            })?;
        }
        if to.row == hand_row {
            ensure(own_tile, FailureKind::IllegalOwnership, || {
                format!("{tile} was not sent to the table by {player} this turn")
            })?;
        }
        Ok(())
    }

    fn check_player(&self, player: PlayerId, state: &GameState) -> RuleResult<()> {
        ensure(player.index() < state.player_count(), FailureKind::IllegalPlayer, || {
            format!("{player} is not in a {}-player game", state.player_count())
        })
    }

    fn check_not_over(&self, state: &GameState) -> RuleResult<()> {
        ensure(!is_game_over(&self.config, state), FailureKind::GameAlreadyOver, || {
            "the match is over".into()
        })
    }

    fn check_in_play(&self, player: PlayerId, state: &GameState) -> RuleResult<()> {
        self.check_player(player, state)?;
        self.check_not_over(state)
    }

    fn hand<'a>(&self, state: &'a GameState, player: PlayerId) -> RuleResult<&'a Vector<Cell>> {
        state.hand(&self.config, player).ok_or_else(|| {
            RuleError::new(FailureKind::OutOfBounds, format!("board has no hand row for {player}"))
        })
    }
}

fn melded(trace: &Trace, player: PlayerId) -> Trace {
    let mut trace = trace.clone();
    if let Some(done) = trace.initial_meld_done.get_mut(player) {
        *done = true;
    }
    trace
}
