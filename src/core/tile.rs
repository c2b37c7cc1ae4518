//! Tile identifiers and the fixed tile catalog.
//!
//! A game uses 106 tiles: four colours × thirteen numbers × two copies,
//! plus two jokers. A tile has no identity beyond its integer id; its
//! colour and score are a pure function of that id.
//!
//! ## Id Layout
//!
//! | Ids       | Colour | Score          |
//! |-----------|--------|----------------|
//! | `0..26`   | blue   | `id % 13 + 1`  |
//! | `26..52`  | red    | `id % 13 + 1`  |
//! | `52..78`  | black  | `id % 13 + 1`  |
//! | `78..104` | orange | `id % 13 + 1`  |
//! | `104,105` | joker  | 0              |
//!
//! Note that a running game does not read attributes from this catalog:
//! the deal writes the catalog into the state's [`TileTable`] and then
//! shuffles it, so the state's table is the source of truth.
//!
//! [`TileTable`]: crate::core::state::TileTable

use serde::{Deserialize, Serialize};

use super::error::{FailureKind, RuleError, RuleResult};

/// Number of tiles in a game.
pub const TILE_COUNT: usize = 106;

/// First joker id.
pub const FIRST_JOKER: u8 = 104;

/// Tiles per colour band (13 numbers × 2 copies).
const BAND_SIZE: u8 = 26;

/// Identifier of a physical tile, always in `[0, 106)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TileId(u8);

impl TileId {
    /// Create a tile id, rejecting anything outside `[0, 106)`.
    pub fn new(id: i32) -> RuleResult<Self> {
        if (0..TILE_COUNT as i32).contains(&id) {
            Ok(Self(id as u8))
        } else {
            Err(RuleError::new(
                FailureKind::IllegalTileIndex,
                format!("tile index {id} is outside [0, {TILE_COUNT})"),
            ))
        }
    }

    /// Get the raw id.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Index into per-tile arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every tile id in ascending order.
    pub fn all() -> impl Iterator<Item = TileId> {
        (0..TILE_COUNT as u8).map(TileId)
    }
}

impl TryFrom<i32> for TileId {
    type Error = RuleError;

    fn try_from(id: i32) -> RuleResult<Self> {
        Self::new(id)
    }
}

impl From<TileId> for i32 {
    fn from(id: TileId) -> i32 {
        i32::from(id.0)
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tile{}", self.0)
    }
}

/// Tile colour.
///
/// Variants are declared in the order of their names; sorting a hand by
/// colour relies on this ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Blue,
    Joker,
    Orange,
    Red,
}

impl Color {
    /// Lowercase colour name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Blue => "blue",
            Color::Joker => "joker",
            Color::Orange => "orange",
            Color::Red => "red",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Colour and score of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub color: Color,
    pub score: u8,
}

impl Tile {
    /// The joker tile.
    pub const JOKER: Tile = Tile {
        color: Color::Joker,
        score: 0,
    };

    #[must_use]
    pub const fn new(color: Color, score: u8) -> Self {
        Self { color, score }
    }

    /// Check if this tile is a joker.
    #[must_use]
    pub fn is_joker(&self) -> bool {
        self.color == Color::Joker
    }
}

/// Look up the catalog attributes of a raw tile index.
///
/// Fails with `IllegalTileIndex` outside `[0, 106)`.
pub fn tile_attributes(id: i32) -> RuleResult<Tile> {
    TileId::new(id).map(catalog_tile)
}

/// Catalog attributes of a (range-checked) tile id.
#[must_use]
pub fn catalog_tile(id: TileId) -> Tile {
    let raw = id.raw();
    if raw >= FIRST_JOKER {
        return Tile::JOKER;
    }
    let color = match raw / BAND_SIZE {
        0 => Color::Blue,
        1 => Color::Red,
        2 => Color::Black,
        _ => Color::Orange,
    };
    Tile::new(color, raw % 13 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_id_range() {
        assert!(TileId::new(0).is_ok());
        assert!(TileId::new(105).is_ok());

        let err = TileId::new(106).unwrap_err();
        assert_eq!(err.kind, FailureKind::IllegalTileIndex);
        assert_eq!(TileId::new(-1).unwrap_err().kind, FailureKind::IllegalTileIndex);
    }

    #[test]
    fn test_color_bands() {
        assert_eq!(tile_attributes(0).unwrap(), Tile::new(Color::Blue, 1));
        assert_eq!(tile_attributes(12).unwrap(), Tile::new(Color::Blue, 13));
        assert_eq!(tile_attributes(13).unwrap(), Tile::new(Color::Blue, 1));
        assert_eq!(tile_attributes(26).unwrap(), Tile::new(Color::Red, 1));
        assert_eq!(tile_attributes(52).unwrap(), Tile::new(Color::Black, 1));
        assert_eq!(tile_attributes(78).unwrap(), Tile::new(Color::Orange, 1));
        assert_eq!(tile_attributes(103).unwrap(), Tile::new(Color::Orange, 13));
    }

    #[test]
    fn test_jokers() {
        assert_eq!(tile_attributes(104).unwrap(), Tile::JOKER);
        assert_eq!(tile_attributes(105).unwrap(), Tile::JOKER);
        assert!(Tile::JOKER.is_joker());
    }

    #[test]
    fn test_equal_bands() {
        let mut counts = [0usize; 5];
        for id in TileId::all() {
            counts[catalog_tile(id).color as usize] += 1;
        }
        // Black, Blue, Joker, Orange, Red
        assert_eq!(counts, [26, 26, 2, 26, 26]);
    }

    #[test]
    fn test_color_order_follows_names() {
        let mut colors = vec![Color::Red, Color::Orange, Color::Joker, Color::Blue, Color::Black];
        colors.sort();
        let names: Vec<_> = colors.iter().map(|c| c.name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_deserialize_checks_range() {
        let id: TileId = serde_json::from_str("105").unwrap();
        assert_eq!(id.raw(), 105);
        assert!(serde_json::from_str::<TileId>("106").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TileId::new(28).unwrap().to_string(), "tile28");
        assert_eq!(Color::Orange.to_string(), "orange");
    }
}
