//! Set classification.
//!
//! A table row is read left to right as candidate sets: maximal stretches of
//! occupied cells separated by one or more empty cells. Every candidate set
//! on the table must be a valid run or a valid group for the table to be in
//! a meldable state.
//!
//! ## Runs and groups
//!
//! - A run is 3..=13 tiles of one colour with consecutive scores. The first
//!   non-joker anchors the expected score; jokers fill any position and
//!   still advance the expectation.
//! - A group is 3 or 4 tiles of one score with pairwise distinct colours.
//!   Jokers fill any position.
//!
//! A set made only of jokers has no anchor and is not a run.

use crate::core::board::{Board, Cell};
use crate::core::config::EngineConfig;
use crate::core::delta::tiles_sent_this_turn;
use crate::core::error::{ensure, FailureKind, RuleResult};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::core::tile::{Tile, TileId};

/// Candidate sets of a row, produced lazily.
///
/// Created by [`split_row_into_candidate_sets`].
pub struct CandidateSets<I> {
    cells: I,
}

impl<'a, I> Iterator for CandidateSets<I>
where
    I: Iterator<Item = &'a Cell>,
{
    type Item = Vec<TileId>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut set = Vec::new();
        for cell in self.cells.by_ref() {
            match cell {
                Some(tile) => set.push(*tile),
                None if set.is_empty() => {}
                None => return Some(set),
            }
        }
        (!set.is_empty()).then_some(set)
    }
}

/// Split a row into its candidate sets, in order.
///
/// The iterator borrows the row; call again to restart.
///
/// ```
/// use rummy_engine::core::TileId;
/// use rummy_engine::rules::split_row_into_candidate_sets;
///
/// let t = |id| Some(TileId::new(id).unwrap());
/// let row = vec![t(1), t(2), t(3), None, None, t(4), t(8), None];
///
/// let sets: Vec<Vec<u8>> = split_row_into_candidate_sets(&row)
///     .map(|set| set.into_iter().map(TileId::raw).collect())
///     .collect();
/// assert_eq!(sets, vec![vec![1, 2, 3], vec![4, 8]]);
/// ```
pub fn split_row_into_candidate_sets<'a, R>(row: R) -> CandidateSets<R::IntoIter>
where
    R: IntoIterator<Item = &'a Cell>,
{
    CandidateSets {
        cells: row.into_iter(),
    }
}

/// Check if tiles form a valid run.
#[must_use]
pub fn is_valid_run(tiles: &[Tile]) -> bool {
    if !(3..=13).contains(&tiles.len()) {
        return false;
    }

    let mut color = None;
    let mut expected: Option<u8> = None;
    for tile in tiles {
        if !tile.is_joker() {
            if *color.get_or_insert(tile.color) != tile.color {
                return false;
            }
            if *expected.get_or_insert(tile.score) != tile.score {
                return false;
            }
        }
        if let Some(score) = expected.as_mut() {
            *score += 1;
        }
    }

    expected.is_some()
}

/// Check if tiles form a valid group.
#[must_use]
pub fn is_valid_group(tiles: &[Tile]) -> bool {
    if !(3..=4).contains(&tiles.len()) {
        return false;
    }

    let mut score = None;
    let mut colors = Vec::with_capacity(4);
    for tile in tiles.iter().filter(|t| !t.is_joker()) {
        if *score.get_or_insert(tile.score) != tile.score || colors.contains(&tile.color) {
            return false;
        }
        colors.push(tile.color);
    }
    score.is_some()
}

/// Every candidate set on the table rows of `board`.
pub fn table_sets<'a>(
    config: &EngineConfig,
    board: &'a Board,
) -> impl Iterator<Item = Vec<TileId>> + 'a {
    board
        .table_rows(config)
        .flat_map(|row| split_row_into_candidate_sets(row))
}

/// Score of the table sets made entirely of tiles `player` sent this turn.
///
/// Sets containing any tile the player did not send contribute nothing.
/// Jokers score 0.
pub fn initial_meld_score(
    config: &EngineConfig,
    state: &GameState,
    board: &Board,
    player: PlayerId,
) -> RuleResult<u32> {
    let sent = tiles_sent_this_turn(&state.deltas, config.player_row(player));

    let mut score = 0;
    for set in table_sets(config, board) {
        if set.iter().all(|tile| sent.contains(tile)) {
            for tile in state.tiles.lookup(&set)? {
                score += u32::from(tile.score);
            }
        }
    }
    Ok(score)
}

/// Check that the table on `board` can be melded.
///
/// Fails with `MeldInvalid` on the first candidate set that is neither a
/// run nor a group. If the player has not completed their initial meld,
/// also fails with `InitialMeldTooLow` when their own sets score below the
/// configured threshold. Tile attributes come from `state`'s tile table.
pub fn check_board_meld(
    config: &EngineConfig,
    state: &GameState,
    board: &Board,
    player: PlayerId,
    initial_meld_done: bool,
) -> RuleResult<()> {
    for set in table_sets(config, board) {
        let tiles = state.tiles.lookup(&set)?;
        ensure(
            is_valid_run(&tiles) || is_valid_group(&tiles),
            FailureKind::MeldInvalid,
            || format!("{} form neither a run nor a group", describe(&set)),
        )?;
    }

    if !initial_meld_done {
        let score = initial_meld_score(config, state, board, player)?;
        let threshold = config.initial_meld_threshold;
        ensure(score >= threshold, FailureKind::InitialMeldTooLow, || {
            format!("initial meld scores {score}, at least {threshold} needed (jokers count 0)")
        })?;
    }

    Ok(())
}

/// Boolean form of [`check_board_meld`].
#[must_use]
pub fn is_board_meld_valid(
    config: &EngineConfig,
    state: &GameState,
    board: &Board,
    player: PlayerId,
    initial_meld_done: bool,
) -> bool {
    check_board_meld(config, state, board, player, initial_meld_done).is_ok()
}

fn describe(set: &[TileId]) -> String {
    let names: Vec<String> = set.iter().map(ToString::to_string).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::delta::Delta;
    use crate::core::board::Position;
    use crate::core::state::TileTable;
    use crate::core::tile::Color;

    fn blue(score: u8) -> Tile {
        Tile::new(Color::Blue, score)
    }

    fn tile(id: i32) -> Cell {
        Some(TileId::new(id).unwrap())
    }

    #[test]
    fn test_split_row() {
        let row = vec![None, tile(1), tile(2), None, tile(3), None, None];
        let sets: Vec<_> = split_row_into_candidate_sets(&row).collect();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[1], vec![TileId::new(3).unwrap()]);

        let empty = vec![None; 5];
        assert_eq!(split_row_into_candidate_sets(&empty).count(), 0);

        let full = vec![tile(7); 3];
        assert_eq!(split_row_into_candidate_sets(&full).count(), 1);
    }

    #[test]
    fn test_valid_runs() {
        assert!(is_valid_run(&[blue(4), blue(5), blue(6)]));
        assert!(is_valid_run(&(1..=13).map(blue).collect::<Vec<_>>()));
        assert!(is_valid_run(&[blue(4), Tile::JOKER, blue(6)]));
        assert!(is_valid_run(&[Tile::JOKER, blue(2), blue(3)]));
    }

    #[test]
    fn test_invalid_runs() {
        assert!(!is_valid_run(&[blue(4), Tile::new(Color::Red, 5), blue(6)]));
        assert!(!is_valid_run(&[blue(4), blue(5)]));
        assert!(!is_valid_run(&[blue(4), blue(6), blue(7)]));
        assert!(!is_valid_run(&[blue(4), blue(4), blue(5)]));

        let fourteen: Vec<_> = (1..=13).map(blue).chain([Tile::JOKER]).collect();
        assert!(!is_valid_run(&fourteen));
    }

    #[test]
    fn test_all_joker_run_rejected() {
        assert!(!is_valid_run(&[Tile::JOKER, Tile::JOKER, Tile::JOKER]));
    }

    #[test]
    fn test_groups() {
        let red7 = Tile::new(Color::Red, 7);
        let black7 = Tile::new(Color::Black, 7);
        let orange7 = Tile::new(Color::Orange, 7);
        let blue7 = blue(7);

        assert!(is_valid_group(&[red7, black7, orange7]));
        assert!(is_valid_group(&[red7, black7, orange7, blue7]));
        assert!(is_valid_group(&[red7, Tile::JOKER, blue7]));

        assert!(!is_valid_group(&[red7, red7, blue7]));
        assert!(!is_valid_group(&[red7, black7, blue(8)]));
        assert!(!is_valid_group(&[red7, black7]));
        assert!(!is_valid_group(&[red7, black7, orange7, blue7, Tile::JOKER]));
        assert!(!is_valid_group(&[Tile::JOKER, Tile::JOKER, Tile::JOKER]));
    }

    fn state_with_table(cells: Vec<Cell>, deltas: Vec<Delta>) -> (EngineConfig, GameState) {
        let config = EngineConfig::default().with_table(1, cells.len());
        let state = GameState {
            board: Board::from_rows(vec![cells, vec![], vec![]]),
            deltas,
            tiles: TileTable::catalog(),
            ..GameState::default()
        };
        (config, state)
    }

    fn send(id: i32, col: usize) -> Delta {
        Delta::new(TileId::new(id).unwrap(), Position::new(1, col), Position::new(0, col))
    }

    #[test]
    fn test_board_meld_invalid_set() {
        // blue 1, blue 2, red 3
        let (config, state) = state_with_table(vec![tile(0), tile(1), tile(28), None], vec![]);
        let err = check_board_meld(&config, &state, &state.board, PlayerId::new(0), true).unwrap_err();
        assert_eq!(err.kind, FailureKind::MeldInvalid);
    }

    #[test]
    fn test_initial_meld_threshold() {
        // blue 11, 12, 13 sent this turn, blue 1, 2, 3 already on the table
        let cells = vec![tile(10), tile(11), tile(12), None, tile(0), tile(1), tile(2)];
        let deltas = vec![send(10, 0), send(11, 1), send(12, 2)];
        let (config, state) = state_with_table(cells, deltas);
        let player = PlayerId::new(0);

        assert_eq!(initial_meld_score(&config, &state, &state.board, player).unwrap(), 36);
        assert!(check_board_meld(&config, &state, &state.board, player, false).is_ok());

        let strict = config.clone().with_initial_meld_threshold(40);
        let err = check_board_meld(&strict, &state, &state.board, player, false).unwrap_err();
        assert_eq!(err.kind, FailureKind::InitialMeldTooLow);
        assert!(is_board_meld_valid(&strict, &state, &state.board, player, true));
    }

    #[test]
    fn test_mixed_set_scores_nothing() {
        // blue 11 and 12 sent, blue 13 was already there
        let cells = vec![tile(10), tile(11), tile(12)];
        let deltas = vec![send(10, 0), send(11, 1)];
        let (config, state) = state_with_table(cells, deltas);

        assert_eq!(initial_meld_score(&config, &state, &state.board, PlayerId::new(0)).unwrap(), 0);
    }

    #[test]
    fn test_board_group_with_joker() {
        // blue 7, joker, red 7
        let (config, state) = state_with_table(vec![tile(6), tile(104), tile(32)], vec![]);
        assert!(check_board_meld(&config, &state, &state.board, PlayerId::new(0), true).is_ok());
    }

    #[test]
    fn test_board_all_joker_set_rejected() {
        let (config, mut state) = state_with_table(vec![tile(104), tile(105), tile(0)], vec![]);
        state.tiles.set(TileId::new(0).unwrap(), Tile::JOKER);

        let err = check_board_meld(&config, &state, &state.board, PlayerId::new(0), true).unwrap_err();
        assert_eq!(err.kind, FailureKind::MeldInvalid);
    }

    #[test]
    fn test_classification_reads_state_table() {
        let (config, mut state) = state_with_table(vec![tile(0), tile(1), tile(2)], vec![]);
        assert!(is_board_meld_valid(&config, &state, &state.board, PlayerId::new(0), true));

        state.tiles.set(TileId::new(1).unwrap(), Tile::new(Color::Red, 2));
        assert!(!is_board_meld_valid(&config, &state, &state.board, PlayerId::new(0), true));
    }
}
