//! Game state: board, per-turn delta log, progress trace and tile table.
//!
//! ## GameState
//!
//! A state is created by folding the deal move over `GameState::default()`
//! and thereafter only changes by folding further accepted moves (see
//! `moves::apply`). Rule functions borrow it immutably and derive new
//! values from clones; the board's persistent rows make that cheap.
//!
//! ## TileTable
//!
//! Per-game tile attributes keyed by integer tile id. The deal writes the
//! catalog into the table and then shuffles it, so `tile7` in a running
//! game is whatever attributes the shuffle assigned to that key.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::board::{Board, Cell};
use super::config::EngineConfig;
use super::delta::Delta;
use super::error::{ensure, FailureKind, RuleError, RuleResult};
use super::player::{PlayerId, PlayerMap};
use super::tile::{catalog_tile, Tile, TileId, TILE_COUNT};

/// Per-game progress record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trace {
    /// Number of players dealt in.
    #[serde(rename = "nplayers")]
    pub player_count: usize,

    /// Whether each player has completed their initial meld. Never resets.
    #[serde(rename = "initial")]
    pub initial_meld_done: PlayerMap<bool>,

    /// Next undealt tile. Tiles are shuffled at deal time, so drawing is
    /// just advancing this pointer.
    #[serde(rename = "nexttile")]
    pub next_tile: usize,
}

impl Trace {
    /// The trace right after dealing `hand_size` tiles to each player.
    #[must_use]
    pub fn dealt(player_count: usize, hand_size: usize) -> Self {
        Self {
            player_count,
            initial_meld_done: PlayerMap::with_value(player_count, false),
            next_tile: player_count * hand_size,
        }
    }

    /// Check if a player has completed their initial meld.
    #[must_use]
    pub fn has_melded(&self, player: PlayerId) -> bool {
        self.initial_meld_done.get(player).copied().unwrap_or(false)
    }

    /// Check if every tile has been drawn.
    #[must_use]
    pub fn pool_exhausted(&self) -> bool {
        self.next_tile >= TILE_COUNT
    }
}

/// Tile attributes indexed by tile id.
///
/// Always holds exactly one slot per tile id; deserialising a table of any
/// other length fails.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<Tile>>", into = "Vec<Option<Tile>>")]
pub struct TileTable {
    tiles: Vec<Option<Tile>>,
}

impl TryFrom<Vec<Option<Tile>>> for TileTable {
    type Error = RuleError;

    fn try_from(tiles: Vec<Option<Tile>>) -> RuleResult<Self> {
        ensure(tiles.len() == TILE_COUNT, FailureKind::IllegalTileIndex, || {
            format!("tile table has {} slots, expected {TILE_COUNT}", tiles.len())
        })?;
        Ok(Self { tiles })
    }
}

impl From<TileTable> for Vec<Option<Tile>> {
    fn from(table: TileTable) -> Self {
        table.tiles
    }
}

impl Default for TileTable {
    fn default() -> Self {
        Self {
            tiles: vec![None; TILE_COUNT],
        }
    }
}

impl TileTable {
    /// A table holding the unshuffled catalog.
    #[must_use]
    pub fn catalog() -> Self {
        Self {
            tiles: TileId::all().map(|id| Some(catalog_tile(id))).collect(),
        }
    }

    /// Attributes of a tile, failing if the deal never defined them.
    pub fn get(&self, id: TileId) -> RuleResult<Tile> {
        self.tiles.get(id.index()).copied().flatten().ok_or_else(|| {
            RuleError::new(FailureKind::IllegalTileIndex, format!("undefined tile: {id}"))
        })
    }

    /// Define a tile's attributes.
    pub fn set(&mut self, id: TileId, tile: Tile) {
        if let Some(slot) = self.tiles.get_mut(id.index()) {
            *slot = Some(tile);
        }
    }

    /// Attributes of several tiles, in order.
    pub fn lookup(&self, ids: &[TileId]) -> RuleResult<Vec<Tile>> {
        ids.iter().map(|&id| self.get(id)).collect()
    }

    /// Mutable access to the raw slots, used by shuffle application.
    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Tile>] {
        &mut self.tiles
    }
}

/// Which players may observe a tile's identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Every player can see it.
    Everyone,
    /// Only the listed players can see it. Empty means hidden from all.
    Players(SmallVec<[PlayerId; 4]>),
}

impl Visibility {
    /// Visible to a single player.
    #[must_use]
    pub fn only(player: PlayerId) -> Self {
        Visibility::Players(SmallVec::from_slice(&[player]))
    }

    /// Hidden from every player.
    #[must_use]
    pub fn hidden() -> Self {
        Visibility::Players(SmallVec::new())
    }

    /// Check if a player may see the tile.
    #[must_use]
    pub fn allows(&self, player: PlayerId) -> bool {
        match self {
            Visibility::Everyone => true,
            Visibility::Players(players) => players.contains(&player),
        }
    }
}

/// Where the match stands, as recorded by `setTurn` / `endMatch`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// No deal yet.
    #[default]
    NotStarted,
    /// It is `turn`'s move.
    InProgress { turn: PlayerId },
    /// The match ended with these scores.
    Over { scores: PlayerMap<i32> },
}

/// Complete game state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Table rows followed by hand rows.
    pub board: Board,

    /// Deltas applied so far in the current turn.
    pub deltas: Vec<Delta>,

    /// Progress record.
    pub trace: Trace,

    /// Per-game tile attributes.
    pub tiles: TileTable,

    /// Tile visibility, written only by applying moves. Tiles with no
    /// entry are visible to everyone.
    pub visibility: FxHashMap<TileId, Visibility>,

    /// Turn owner or final scores.
    pub status: MatchStatus,

    /// Kind of the last applied move.
    pub last_kind: Option<crate::moves::MoveKind>,

    /// Sort order requested by the last SORT move.
    pub sort_kind: Option<crate::moves::SortKind>,
}

impl GameState {
    /// Check if the deal has happened.
    #[must_use]
    pub fn is_dealt(&self) -> bool {
        self.trace.player_count > 0
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.trace.player_count
    }

    /// Attributes of a tile from this game's table.
    pub fn tile(&self, id: TileId) -> RuleResult<Tile> {
        self.tiles.get(id)
    }

    /// A player's hand row.
    #[must_use]
    pub fn hand(&self, config: &EngineConfig, player: PlayerId) -> Option<&im::Vector<Cell>> {
        self.board.hand(config, player)
    }

    /// Visibility of a tile.
    #[must_use]
    pub fn visibility_of(&self, tile: TileId) -> Visibility {
        self.visibility
            .get(&tile)
            .cloned()
            .unwrap_or(Visibility::Everyone)
    }

    /// A tile's attributes as seen by `player`, or `None` if hidden from them.
    #[must_use]
    pub fn visible_tile(&self, player: PlayerId, tile: TileId) -> Option<Tile> {
        if self.visibility_of(tile).allows(player) {
            self.tiles.get(tile).ok()
        } else {
            None
        }
    }

    /// Whose turn it is, if the match is in progress.
    #[must_use]
    pub fn turn(&self) -> Option<PlayerId> {
        match self.status {
            MatchStatus::InProgress { turn } => Some(turn),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tile::Color;

    #[test]
    fn test_dealt_trace() {
        let trace = Trace::dealt(3, 14);

        assert_eq!(trace.player_count, 3);
        assert_eq!(trace.next_tile, 42);
        assert!(!trace.has_melded(PlayerId::new(2)));
        assert!(!trace.has_melded(PlayerId::new(5)));
        assert!(!trace.pool_exhausted());
    }

    #[test]
    fn test_trace_wire_shape() {
        let json = serde_json::to_value(Trace::dealt(2, 14)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nplayers": 2, "initial": [false, false], "nexttile": 28})
        );
    }

    #[test]
    fn test_tile_table() {
        let empty = TileTable::default();
        let id = TileId::new(30).unwrap();
        assert_eq!(empty.get(id).unwrap_err().kind, FailureKind::IllegalTileIndex);

        let table = TileTable::catalog();
        assert_eq!(table.get(id).unwrap(), Tile::new(Color::Red, 5));
    }

    #[test]
    fn test_tile_table_serde_checks_length() {
        let table = TileTable::catalog();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(106));
        assert_eq!(serde_json::from_value::<TileTable>(json).unwrap(), table);

        let short = serde_json::json!([{"color": "blue", "score": 1}]);
        assert!(serde_json::from_value::<TileTable>(short).is_err());

        let mut slots: Vec<Option<Tile>> = table.into();
        slots.truncate(30);
        assert!(TileTable::try_from(slots).is_err());
    }

    #[test]
    fn test_visibility() {
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        assert!(Visibility::Everyone.allows(p1));
        assert!(Visibility::only(p0).allows(p0));
        assert!(!Visibility::only(p0).allows(p1));
        assert!(!Visibility::hidden().allows(p0));
    }

    #[test]
    fn test_visible_tile() {
        let mut state = GameState {
            tiles: TileTable::catalog(),
            ..GameState::default()
        };
        let id = TileId::new(3).unwrap();
        state.visibility.insert(id, Visibility::only(PlayerId::new(1)));

        assert_eq!(state.visible_tile(PlayerId::new(0), id), None);
        assert_eq!(state.visible_tile(PlayerId::new(1), id), Some(Tile::new(Color::Blue, 4)));
    }

    #[test]
    fn test_default_state_is_not_dealt() {
        let state = GameState::default();
        assert!(!state.is_dealt());
        assert_eq!(state.status, MatchStatus::NotStarted);
        assert_eq!(state.turn(), None);
    }
}
