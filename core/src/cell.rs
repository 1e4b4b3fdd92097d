use serde::{Deserialize, Serialize};

/// Player-visible state of one cell as tracked by the engine.
///
/// A cell is in exactly one of these states, so it can never be both flagged and revealed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    #[default]
    Hidden,
    Flagged,
    /// Safe cell with its adjacent mine count.
    Revealed(u8),
    /// Mine uncovered when the game was lost.
    Mine,
}

impl EngineCell {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Mine)
    }
}

/// What the UI should draw for a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    /// The mine whose reveal lost the game.
    TriggeredMine,
}
