//! Turn rotation, end-of-game detection and final scoring.

use crate::core::config::EngineConfig;
use crate::core::error::RuleResult;
use crate::core::player::{PlayerId, PlayerMap};
use crate::core::state::{GameState, MatchStatus, TileTable};
use crate::core::tile::TileId;

/// Penalty for a joker left in hand.
pub const JOKER_PENALTY: i32 = 30;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// A player emptied their hand.
    Winner(PlayerId),
    /// The pool ran out.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

/// The player after `current`.
#[must_use]
pub fn next_player(current: PlayerId, player_count: usize) -> PlayerId {
    current.next(player_count)
}

/// The player whose hand is empty with nothing pending this turn.
///
/// Returns `None` unless at least one other player still holds tiles.
#[must_use]
pub fn winner(config: &EngineConfig, state: &GameState) -> Option<PlayerId> {
    let mut winner = None;
    let mut has_loser = false;
    for player in PlayerId::all(state.player_count()) {
        let hand_len = state.hand(config, player).map_or(0, |hand| hand.len());
        if hand_len == 0 && state.deltas.is_empty() {
            winner = Some(player);
        } else {
            has_loser = true;
        }
    }
    winner.filter(|_| has_loser)
}

/// Check if the draw pool is exhausted.
#[must_use]
pub fn is_tie(state: &GameState) -> bool {
    state.trace.pool_exhausted()
}

/// Check if no further moves may be made.
#[must_use]
pub fn is_game_over(config: &EngineConfig, state: &GameState) -> bool {
    matches!(state.status, MatchStatus::Over { .. }) || is_tie(state) || winner(config, state).is_some()
}

/// How the game ended, if it has.
#[must_use]
pub fn game_result(config: &EngineConfig, state: &GameState) -> Option<GameResult> {
    if let Some(player) = winner(config, state) {
        return Some(GameResult::Winner(player));
    }
    is_game_over(config, state).then_some(GameResult::Draw)
}

/// Negated sum of tile scores, jokers counting 30.
pub fn hand_penalty(table: &TileTable, hand: impl IntoIterator<Item = TileId>) -> RuleResult<i32> {
    let mut penalty = 0;
    for id in hand {
        let tile = table.get(id)?;
        penalty -= if tile.is_joker() {
            JOKER_PENALTY
        } else {
            i32::from(tile.score)
        };
    }
    Ok(penalty)
}

/// Final scores.
///
/// With a winner, every other player scores [`hand_penalty`] of their hand
/// and the winner scores the negated sum of those. Without one (the pool
/// ran out) everybody scores 0.
///
/// ```
/// use rummy_engine::core::{Board, EngineConfig, GameState, PlayerId, TileId, TileTable, Trace};
/// use rummy_engine::rules::compute_end_scores;
///
/// let config = EngineConfig::default().with_table(1, 4);
/// let t = |id| Some(TileId::new(id).unwrap());
/// let state = GameState {
///     // player 1 holds blue 4 and blue 5
///     board: Board::from_rows(vec![vec![None; 4], vec![], vec![t(3), t(4)]]),
///     trace: Trace::dealt(2, 2),
///     tiles: TileTable::catalog(),
///     ..GameState::default()
/// };
///
/// let scores = compute_end_scores(&config, Some(PlayerId::new(0)), &state).unwrap();
/// assert_eq!(scores.as_slice(), &[9, -9]);
/// ```
pub fn compute_end_scores(
    config: &EngineConfig,
    winner: Option<PlayerId>,
    state: &GameState,
) -> RuleResult<PlayerMap<i32>> {
    let player_count = state.player_count();
    let mut scores = PlayerMap::with_value(player_count, 0);
    let Some(winner) = winner else {
        return Ok(scores);
    };

    let mut total = 0;
    for player in PlayerId::all(player_count).filter(|&p| p != winner) {
        let penalty = hand_penalty(&state.tiles, state.board.tiles_in_row(config.player_row(player)))?;
        scores[player] = penalty;
        total += penalty;
    }
    if let Some(score) = scores.get_mut(winner) {
        *score = -total;
    }
    Ok(scores)
}
