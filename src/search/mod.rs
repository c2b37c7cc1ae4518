//! Candidate moves for an automated player.
//!
//! The search is shallow: it offers the draw when one is
//! legal, plus at most one batched placement of every set the hand
//! organiser finds. It does not try to extend sets already on the table.
//!
//! ## Placement
//!
//! Sets are placed in order, scanning the table row by row from where the
//! previous set ended. A slot is a stretch of empty cells long enough for
//! the set whose neighbouring cells (where the row has them) are empty too,
//! so a placed set never touches another.

use im::Vector;
use log::trace;

use crate::core::board::{Board, Cell, Position};
use crate::core::config::EngineConfig;
use crate::core::delta::Delta;
use crate::core::error::RuleResult;
use crate::core::player::PlayerId;
use crate::core::rng::Unshuffled;
use crate::core::state::GameState;
use crate::moves::{Engine, Move};
use crate::rules::organizer::find_maximal_sets;

impl Engine {
    /// Legal candidate moves for `player`.
    ///
    /// Contains the PICK move when it can be built, followed by a COMB move
    /// placing every set found in the hand when each set has a slot and,
    /// before the initial meld, the sets reach the threshold.
    #[must_use]
    pub fn possible_moves(&self, player: PlayerId, state: &GameState) -> Vec<Move> {
        let mut moves = Vec::with_capacity(2);

        match self.pick_move(player, state) {
            Ok(pick) => moves.push(pick),
            Err(err) => trace!("{player}: no draw candidate: {err}"),
        }

        match self.placement_move(player, state) {
            Ok(Some(placement)) => moves.push(placement),
            Ok(None) => {}
            Err(err) => trace!("{player}: no placement candidate: {err}"),
        }

        moves
    }

    /// UNDO moves that rewind the whole turn, in application order.
    ///
    /// Each move is built against the state left by the previous one.
    pub fn undo_all_moves(&self, player: PlayerId, state: &GameState) -> RuleResult<Vec<Move>> {
        let mut current = state.clone();
        let mut moves = Vec::with_capacity(state.deltas.len());
        while !current.deltas.is_empty() {
            let undo = self.undo_move(player, &current)?;
            current = current.apply_move(&undo, &mut Unshuffled);
            moves.push(undo);
        }
        Ok(moves)
    }

    fn placement_move(&self, player: PlayerId, state: &GameState) -> RuleResult<Option<Move>> {
        let config = self.config();
        let hand_row = config.player_row(player);
        let Some(hand) = state.hand(config, player) else {
            return Ok(None);
        };

        let tiles: Vec<_> = hand.iter().flatten().copied().collect();
        let found = find_maximal_sets(&tiles, &state.tiles)?;
        if found.sets.is_empty() {
            return Ok(None);
        }

        if !state.trace.has_melded(player) {
            let score = found.score(&state.tiles)?;
            if score < config.initial_meld_threshold {
                trace!("{player}: sets in hand score {score}, too low for an initial meld");
                return Ok(None);
            }
        }

        let mut board = state.board.clone();
        let mut deltas = Vec::new();
        let mut start = Position::new(0, 0);
        for set in &found.sets {
            let Some(slot) = next_empty_slot(&board, config, start, set.len()) else {
                trace!("{player}: no room on the table for a set of {}", set.len());
                return Ok(None);
            };
            for (offset, &tile) in set.iter().enumerate() {
                let Some(col) = hand.iter().position(|cell| *cell == Some(tile)) else {
                    return Ok(None);
                };
                let delta = Delta::new(
                    tile,
                    Position::new(hand_row, col),
                    Position::new(slot.row, slot.col + offset),
                );
                board.relocate(tile, delta.from, delta.to);
                deltas.push(delta);
            }
            start = Position::new(slot.row, slot.col + set.len());
        }

        self.combined_move(player, state, &deltas).map(Some)
    }
}

/// First slot for a set of `size` tiles at or after `start`.
fn next_empty_slot(board: &Board, config: &EngineConfig, start: Position, size: usize) -> Option<Position> {
    let free = |row: &Vector<Cell>, col: usize| row.get(col).map_or(true, Option::is_none);

    for r in start.row..config.table_rows {
        let row = board.row(r)?;
        let first = if r == start.row { start.col } else { 0 };
        for c in first..row.len() {
            if c + size > row.len() {
                break;
            }
            let left_clear = c == 0 || free(row, c - 1);
            if left_clear && free(row, c + size) && (c..c + size).all(|i| row.get(i) == Some(&None)) {
                trace!("slot for {size} tiles at row {r}, col {c}");
                return Some(Position::new(r, c));
            }
        }
    }
    None
}
