//! The board grid: shared table rows followed by one hand row per player.
//!
//! ```text
//! row 0..table_rows   fixed-width table rows, cells are tile or empty
//! row table_rows + p  player p's hand, variable length
//! ```
//!
//! Hands only hold empty cells transiently: sending a tile to the table
//! leaves an empty slot behind, which a retrieve can fill again. A meld
//! compacts the hand.
//!
//! Rows are persistent vectors, so cloning a board to derive the next one
//! is O(1) and never aliases the caller's copy.

use im::Vector;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::config::EngineConfig;
use super::error::{ensure, FailureKind, RuleResult};
use super::player::PlayerId;
use super::tile::TileId;

/// A board cell: a tile, or `None` for the empty marker.
pub type Cell = Option<TileId>;

/// Wire encoding of the empty marker.
const EMPTY_CELL: i16 = -1;

/// A board coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "board[{}][{}]", self.row, self.col)
    }
}

/// Table rows plus hand rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    rows: Vector<Vector<Cell>>,
}

impl Board {
    /// Build a board from explicit rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self {
            rows: rows.into_iter().map(Vector::from).collect(),
        }
    }

    /// The board dealt at the start of a game.
    ///
    /// Table rows are empty; player `p` holds tiles
    /// `[hand_size * p, hand_size * (p + 1))`. Fails with
    /// `IllegalTileIndex` if the hands would need more tiles than exist.
    pub fn initial(config: &EngineConfig, player_count: usize) -> RuleResult<Self> {
        let empty_row: Vector<Cell> = std::iter::repeat(None).take(config.table_cols).collect();
        let mut rows: Vector<Vector<Cell>> = std::iter::repeat(empty_row).take(config.table_rows).collect();

        for player in 0..player_count {
            let first = player * config.hand_size;
            let hand = (first..first + config.hand_size)
                .map(|id| TileId::new(id as i32).map(Some))
                .collect::<RuleResult<Vector<Cell>>>()?;
            rows.push_back(hand);
        }

        Ok(Self { rows })
    }

    /// Number of rows (table rows plus hands).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&Vector<Cell>> {
        self.rows.get(row)
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = &Vector<Cell>> {
        self.rows.iter()
    }

    /// Iterate over the shared table rows.
    pub fn table_rows<'a>(&'a self, config: &EngineConfig) -> impl Iterator<Item = &'a Vector<Cell>> {
        self.rows.iter().take(config.table_rows)
    }

    /// A player's hand row.
    #[must_use]
    pub fn hand(&self, config: &EngineConfig, player: PlayerId) -> Option<&Vector<Cell>> {
        self.rows.get(config.player_row(player))
    }

    /// Tiles in a row, skipping empty cells.
    pub fn tiles_in_row(&self, row: usize) -> impl Iterator<Item = TileId> + '_ {
        self.rows.get(row).into_iter().flat_map(|r| r.iter().flatten().copied())
    }

    /// Get a cell, or `None` if the position is off the board.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    /// Fail with `OutOfBounds` unless the position is on the board.
    pub fn check_in_bounds(&self, pos: Position) -> RuleResult<()> {
        ensure(self.get(pos).is_some(), FailureKind::OutOfBounds, || {
            format!("position out of board, [row: {}, col: {}]", pos.row, pos.col)
        })
    }

    /// Overwrite a cell. The position must be on the board.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.rows[pos.row].set(pos.col, cell);
    }

    /// Move a tile between two cells.
    pub fn relocate(&mut self, tile: TileId, from: Position, to: Position) {
        self.set(from, None);
        self.set(to, Some(tile));
    }

    /// Replace a whole row.
    pub fn set_row(&mut self, row: usize, cells: Vector<Cell>) {
        self.rows.set(row, cells);
    }

    /// Drop empty cells from a row.
    pub fn compact_row(&mut self, row: usize) {
        self.rows[row].retain(Option::is_some);
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: Vec<Vec<i16>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(EMPTY_CELL, |t| i16::from(t.raw())))
                    .collect()
            })
            .collect();
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<Vec<i16>>::deserialize(deserializer)?;
        let mut rows = Vector::new();
        for raw_row in raw {
            let mut row = Vector::new();
            for value in raw_row {
                let cell = if value == EMPTY_CELL {
                    None
                } else {
                    Some(TileId::new(i32::from(value)).map_err(D::Error::custom)?)
                };
                row.push_back(cell);
            }
            rows.push_back(row);
        }
        Ok(Self { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: i32) -> Cell {
        Some(TileId::new(id).unwrap())
    }

    #[test]
    fn test_initial_board() {
        let config = EngineConfig::default();
        let board = Board::initial(&config, 2).unwrap();

        assert_eq!(board.row_count(), 8);
        for row in board.table_rows(&config) {
            assert_eq!(row.len(), 18);
            assert!(row.iter().all(Option::is_none));
        }

        let hand0: Vec<_> = board.tiles_in_row(6).map(TileId::raw).collect();
        let hand1: Vec<_> = board.tiles_in_row(7).map(TileId::raw).collect();
        assert_eq!(hand0, (0..14).collect::<Vec<u8>>());
        assert_eq!(hand1, (14..28).collect::<Vec<u8>>());
    }

    #[test]
    fn test_initial_board_too_many_tiles() {
        let config = EngineConfig::default().with_hand_size(30);
        let err = Board::initial(&config, 4).unwrap_err();
        assert_eq!(err.kind, FailureKind::IllegalTileIndex);
    }

    #[test]
    fn test_bounds() {
        let board = Board::from_rows(vec![vec![None, t(3)], vec![t(4)]]);

        assert_eq!(board.get(Position::new(0, 1)), Some(t(3)));
        assert_eq!(board.get(Position::new(1, 1)), None);
        assert!(board.check_in_bounds(Position::new(1, 0)).is_ok());

        let err = board.check_in_bounds(Position::new(2, 0)).unwrap_err();
        assert_eq!(err.kind, FailureKind::OutOfBounds);
    }

    #[test]
    fn test_relocate_leaves_original_untouched() {
        let board = Board::from_rows(vec![vec![None, None], vec![t(7)]]);
        let mut after = board.clone();
        after.relocate(TileId::new(7).unwrap(), Position::new(1, 0), Position::new(0, 1));

        assert_eq!(after.get(Position::new(0, 1)), Some(t(7)));
        assert_eq!(after.get(Position::new(1, 0)), Some(None));
        assert_eq!(board.get(Position::new(1, 0)), Some(t(7)));
    }

    #[test]
    fn test_compact_row() {
        let mut board = Board::from_rows(vec![vec![t(1), None, t(2), None]]);
        board.compact_row(0);
        assert_eq!(board.row(0).unwrap().len(), 2);
    }

    #[test]
    fn test_wire_encoding() {
        let board = Board::from_rows(vec![vec![None, t(5)], vec![t(0)]]);
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[[-1,5],[0]]");

        let decoded: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, board);

        assert!(serde_json::from_str::<Board>("[[106]]").is_err());
    }
}
