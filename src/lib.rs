//! # rummy-engine
//!
//! A deterministic rules engine for tile-rummy games: it authors moves and
//! validates moves submitted by others.
//!
//! ## Design Principles
//!
//! 1. **Pure Rules**: Every rule function borrows the prior state and returns
//!    a value or a classified failure. Nothing mutates shared state.
//!
//! 2. **One Path**: Validation rebuilds the move from its declared intent with
//!    the same constructors players use, then compares. There is no second
//!    rule checker to drift out of sync.
//!
//! 3. **Configuration Over Convention**: Table geometry, hand size and the
//!    initial meld threshold live in `EngineConfig`.
//!
//! ## Architecture
//!
//! - **Moves as Data**: A move is an ordered list of state operations
//!   (set turn, set field, set visibility, shuffle, end match). Applying it
//!   to a state is a fold; the shuffle is realised by a caller-supplied
//!   `Shuffler`.
//!
//! - **Persistent Data Structures**: Board rows are `im::Vector`s, so the
//!   many scratch boards built while checking a move clone in O(1).
//!
//! - **Per-Game Tile Attributes**: A tile's colour and score are read from
//!   the state's tile table, which the deal shuffles. Hidden tiles stay
//!   hidden until their visibility is granted.
//!
//! ## Modules
//!
//! - `core`: Tiles, players, board, deltas, state, RNG, configuration
//! - `rules`: Set classification, hand organiser, end-of-game, validation
//! - `moves`: Operations, move factory, application, wire format
//! - `search`: Candidate moves for automated players

pub mod core;
pub mod rules;
pub mod moves;
pub mod search;

// Re-export commonly used types
pub use crate::core::{
    Board, Cell, Color, Delta, EngineConfig, FailureKind, GameRng, GameState, MatchStatus,
    PlayerId, PlayerMap, Position, RuleError, RuleResult, Shuffler, Tile, TileId, TileTable, Trace,
    Unshuffled, Visibility,
};

pub use crate::rules::{FoundSets, GameResult};

pub use crate::moves::{Engine, Intent, Move, MoveKind, Operation, SortKind, StateField, WireError};
