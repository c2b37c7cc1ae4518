//! Core engine types: tiles, players, board, deltas, state, configuration.
//!
//! These are the data shapes every rule function works over. None of them
//! knows the game's rules; see `rules` and `moves` for that.

pub mod tile;
pub mod player;
pub mod error;
pub mod config;
pub mod board;
pub mod delta;
pub mod rng;
pub mod state;

pub use tile::{catalog_tile, tile_attributes, Color, Tile, TileId, TILE_COUNT};
pub use player::{PlayerId, PlayerMap, MAX_PLAYERS, MIN_PLAYERS};
pub use error::{FailureKind, RuleError, RuleResult};
pub use config::EngineConfig;
pub use board::{Board, Cell, Position};
pub use delta::{tiles_sent_this_turn, was_sent_from_row, Delta};
pub use rng::{GameRng, Shuffler, Unshuffled};
pub use state::{GameState, MatchStatus, TileTable, Trace, Visibility};
