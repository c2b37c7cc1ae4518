//! Game rules.
//!
//! - `classifier`: candidate sets, runs, groups and meld checks
//! - `organizer`: greedy set extraction and hand ordering
//! - `resolver`: turn rotation, win/tie detection, final scores
//! - `validator`: recompute-and-compare move validation
//!
//! Every function here is pure over borrowed state. Tile attributes are
//! always read from the game's tile table, never from the catalog.

pub mod classifier;
pub mod organizer;
pub mod resolver;
pub mod validator;

pub use classifier::{
    check_board_meld, initial_meld_score, is_board_meld_valid, is_valid_group, is_valid_run,
    split_row_into_candidate_sets, CandidateSets,
};
pub use organizer::{
    find_maximal_sets, sort_hand, sort_hand_by_color, sort_hand_by_score, sort_hand_by_sets,
    FoundSets,
};
pub use resolver::{
    compute_end_scores, game_result, hand_penalty, is_game_over, is_tie, next_player, winner,
    GameResult, JOKER_PENALTY,
};
