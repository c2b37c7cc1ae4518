//! Moves: representation, construction, application and encoding.
//!
//! - `operation`: the closed `Operation` set and the `Move` container
//! - `factory`: `Engine`, one constructor per move kind
//! - `apply`: folding a move into a new `GameState`
//! - `wire`: JSON wire format and compact binary encoding

pub mod operation;
pub mod factory;
pub mod apply;
pub mod wire;

pub use operation::{Intent, Move, MoveKind, Operation, SortKind, StateField};
pub use factory::Engine;
pub use wire::{from_wire, to_wire, WireError};
