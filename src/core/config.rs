//! Engine configuration.
//!
//! Board geometry is injected rather than hard-coded: classification and
//! placement search both depend on it. The defaults are the canonical
//! 6 × 18 table with 14-tile hands and a 30-point initial meld.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Engine configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of shared table rows at the top of the board.
    pub table_rows: usize,

    /// Cells per table row.
    pub table_cols: usize,

    /// Tiles dealt to each player.
    pub hand_size: usize,

    /// Minimum score of a player's first meld.
    pub initial_meld_threshold: u32,

    /// Log each mismatching operation when the validator rejects a move.
    pub log_mismatches: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_rows: 6,
            table_cols: 18,
            hand_size: 14,
            initial_meld_threshold: 30,
            log_mismatches: false,
        }
    }
}

impl EngineConfig {
    /// Set the table geometry.
    #[must_use]
    pub fn with_table(mut self, rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "Table must have at least one cell");
        self.table_rows = rows;
        self.table_cols = cols;
        self
    }

    /// Set the number of tiles dealt per player.
    #[must_use]
    pub fn with_hand_size(mut self, size: usize) -> Self {
        assert!(size > 0, "Hands must start with at least one tile");
        self.hand_size = size;
        self
    }

    /// Set the initial meld threshold.
    #[must_use]
    pub fn with_initial_meld_threshold(mut self, threshold: u32) -> Self {
        self.initial_meld_threshold = threshold;
        self
    }

    /// Enable or disable per-operation mismatch logging.
    #[must_use]
    pub fn with_mismatch_logging(mut self, enabled: bool) -> Self {
        self.log_mismatches = enabled;
        self
    }

    /// Board row holding a player's hand.
    #[must_use]
    pub fn player_row(&self, player: PlayerId) -> usize {
        self.table_rows + player.index()
    }

    /// Check if a row is part of the shared table.
    #[must_use]
    pub fn is_table_row(&self, row: usize) -> bool {
        row < self.table_rows
    }
}
