use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Ready -> Playing (first reveal)
/// - Ready -> Won (first reveal opens every safe cell)
/// - Playing -> Won
/// - Playing -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Playing,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Board state machine for a single game.
///
/// Mines are placed lazily on the first reveal, so that the first opened cell and its neighbors are never mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    config: GameConfig,
    seed: u64,
    mine_layout: Option<MineLayout>,
    board: Array2<EngineCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            mine_layout: None,
            board: Array2::default(config.size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
            state: EngineState::Ready,
            triggered_mine: None,
        }
    }

    /// Engine over a known layout, the first reveal uses it as is.
    pub fn with_layout(mine_layout: MineLayout) -> Self {
        let mut engine = Self::new(mine_layout.game_config(), 0);
        engine.mine_layout = Some(mine_layout);
        engine
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout
            .as_ref()
            .map_or(self.config.mines, MineLayout::mine_count)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    /// Mines minus flags, negative when the player over-flags.
    pub fn mines_left(&self) -> isize {
        (self.total_mines() as isize) - (self.flagged_count as isize)
    }

    /// # Panics
    ///
    /// When `coords` is off the board, callers iterate over `size()` or check `contains` first.
    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    pub fn mine_layout(&self) -> Option<&MineLayout> {
        self.mine_layout.as_ref()
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Whether a chord on `coords` could do anything, used for the pressed-neighbors highlight.
    pub fn can_chord_at(&self, coords: Coord2) -> bool {
        !self.is_finished()
            && self.config.contains(coords)
            && matches!(self.cell_at(coords), EngineCell::Revealed(count) if count > 0)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use EngineCell::*;
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;
        if self.is_finished() {
            return Ok(NoChange);
        }

        Ok(match self.board[coords.to_nd_index()] {
            Hidden => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flagged_count += 1;
                Changed
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flagged_count -= 1;
                Changed
            }
            Revealed(_) | Mine => NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.is_finished() || !self.board[coords.to_nd_index()].is_hidden() {
            return Ok(RevealOutcome::NoChange);
        }

        Ok(self.reveal_single_cell(coords))
    }

    /// Reveals every hidden neighbor of a revealed number when exactly that many neighbors are flagged.
    ///
    /// Flags are trusted, a wrong flag makes this hit a mine.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if !self.can_chord_at(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        let EngineCell::Revealed(count) = self.cell_at(coords) else {
            return Ok(RevealOutcome::NoChange);
        };
        if count != self.count_flagged_neighbors(coords) {
            log::trace!("Chord at {:?} ignored, flags do not match {}", coords, count);
            return Ok(RevealOutcome::NoChange);
        }

        let neighbors: Vec<Coord2> = self.board.iter_neighbors(coords).collect();
        Ok(neighbors
            .into_iter()
            .map(|pos| self.reveal_single_cell(pos))
            .fold(RevealOutcome::NoChange, core::ops::BitOr::bitor))
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.config.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    fn ensure_layout(&mut self, start: Coord2) -> &MineLayout {
        let (config, seed) = (self.config, self.seed);
        self.mine_layout
            .get_or_insert_with(|| RandomLayoutGenerator::new(seed, start).generate(config))
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        if self.is_finished() || !self.board[coords.to_nd_index()].is_hidden() {
            return RevealOutcome::NoChange;
        }

        if self.ensure_layout(coords).contains_mine(coords) {
            self.triggered_mine = Some(coords);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }

        self.flood_reveal(coords);

        let safe_cells = self.ensure_layout(coords).safe_cell_count();
        if self.revealed_count == safe_cells {
            self.end_game(true);
            RevealOutcome::Won
        } else {
            if self.state.is_ready() {
                self.state = EngineState::Playing;
            }
            RevealOutcome::Revealed
        }
    }

    /// Opens `start` and, through zero cells, everything connected to it, using a worklist instead of recursion.
    fn flood_reveal(&mut self, start: Coord2) {
        let Some(layout) = self.mine_layout.as_ref() else {
            return;
        };

        let mut to_visit = Vec::from([start]);
        while let Some(coords) = to_visit.pop() {
            let cell = &mut self.board[coords.to_nd_index()];
            // flags and already open cells stop the fill, mines are never reached through zero cells
            if !cell.is_hidden() || layout.contains_mine(coords) {
                continue;
            }

            let count = layout.adjacent_mine_count(coords);
            *cell = EngineCell::Revealed(count);
            self.revealed_count += 1;
            log::trace!("Opened cell at {:?}, adjacent mines: {}", coords, count);

            if count == 0 {
                to_visit.extend(
                    layout
                        .iter_neighbors(coords)
                        .filter(|&pos| self.board[pos.to_nd_index()].is_hidden()),
                );
            }
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        let Some(layout) = self.mine_layout.as_ref() else {
            return;
        };

        for mine in layout.iter_mines() {
            let cell = &mut self.board[mine.to_nd_index()];
            match (won, *cell) {
                (true, EngineCell::Hidden) => {
                    *cell = EngineCell::Flagged;
                    self.flagged_count += 1;
                }
                (false, EngineCell::Hidden) => *cell = EngineCell::Mine,
                _ => {}
            }
        }

        self.state = if won {
            self.triggered_mine = None;
            EngineState::Won
        } else {
            EngineState::Lost
        };
        log::debug!("Game ended: {:?}", self.state);
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.board
            .iter_neighbors(coords)
            .filter(|&pos| self.board[pos.to_nd_index()].is_flagged())
            .count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;

    fn engine(size: Coord2, mines: &[Coord2]) -> PlayEngine {
        PlayEngine::with_layout(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    fn revealed(engine: &PlayEngine) -> BTreeSet<Coord2> {
        let (x_end, y_end) = engine.size();
        (0..x_end)
            .flat_map(|x| (0..y_end).map(move |y| (x, y)))
            .filter(|&pos| engine.cell_at(pos).is_revealed())
            .collect()
    }

    #[test]
    fn new_engine_is_ready_without_mines() {
        let engine = PlayEngine::new(Tier::Beginner.config(), 1);

        assert_eq!(engine.state(), EngineState::Ready);
        assert!(engine.mine_layout().is_none());
        assert_eq!(engine.mines_left(), 10);
        assert_eq!(engine.cell_at((4, 4)), EngineCell::Hidden);
    }

    #[test]
    fn first_reveal_is_always_safe_and_opens_an_area() {
        for seed in 0..32 {
            let mut engine = PlayEngine::new(Tier::Expert.config(), seed);
            let start = (12, 7);

            let outcome = engine.reveal(start).unwrap();

            assert_eq!(outcome, RevealOutcome::Revealed);
            assert_eq!(engine.state(), EngineState::Playing);
            assert_eq!(engine.cell_at(start), EngineCell::Revealed(0));
            let layout = engine.mine_layout().unwrap();
            assert_eq!(layout.mine_count(), 99);
            assert!(layout.iter_neighbors(start).all(|pos| !layout.contains_mine(pos)));
        }
    }

    #[test]
    fn revealed_numbers_match_neighboring_mines() {
        let mut engine = PlayEngine::new(Tier::Intermediate.config(), 42);
        engine.reveal((8, 8)).unwrap();
        let layout = engine.mine_layout().unwrap().clone();

        for pos in revealed(&engine) {
            let expected = layout
                .iter_neighbors(pos)
                .filter(|&n| layout.contains_mine(n))
                .count() as u8;
            assert_eq!(engine.cell_at(pos), EngineCell::Revealed(expected));
        }
    }

    #[test]
    fn reveal_hits_mine_and_uncovers_other_mines() {
        let mut engine = engine((3, 3), &[(0, 0), (2, 2)]);
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((2, 2)).unwrap();

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Mine);
        // flags survive the loss, they are not auto-placed either
        assert_eq!(engine.cell_at((2, 2)), EngineCell::Flagged);
        assert_eq!(engine.flagged_count(), 1);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_its_border() {
        // mines along the right column, the left part is a zero region
        let mut engine = engine((5, 4), &[(4, 0), (4, 1), (4, 2), (4, 3)]);

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        for y in 0..4 {
            assert_eq!(engine.cell_at((0, y)), EngineCell::Revealed(0));
            assert_eq!(engine.cell_at((2, y)), EngineCell::Revealed(0));
            assert!(matches!(engine.cell_at((3, y)), EngineCell::Revealed(n) if n >= 2));
            assert_eq!(engine.cell_at((4, y)), EngineCell::Flagged);
        }
    }

    #[test]
    fn flood_fill_stops_at_numbers_and_flags() {
        let mut engine = engine((5, 5), &[(4, 4)]);
        engine.toggle_flag((0, 4)).unwrap();

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Revealed);
        assert_eq!(engine.cell_at((0, 4)), EngineCell::Flagged);
        assert_eq!(engine.cell_at((3, 3)), EngineCell::Revealed(1));
        assert_eq!(engine.cell_at((4, 4)), EngineCell::Hidden);
        // 25 cells, one mine, one flagged safe cell
        assert_eq!(engine.revealed_count(), 23);
    }

    #[test]
    fn flood_fill_handles_a_fully_open_expert_board() {
        let mut mask: Array2<bool> = Array2::default(Tier::Expert.config().size.to_nd_index());
        mask[[29, 15]] = true;
        let mut engine = PlayEngine::with_layout(MineLayout::from_mine_mask(mask));

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.revealed_count(), 479);
    }

    #[test]
    fn revealing_a_flagged_cell_is_a_no_op() {
        let mut engine = engine((3, 3), &[(2, 2)]);
        engine.toggle_flag((0, 0)).unwrap();
        let before = engine.clone();

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine, before);
    }

    #[test]
    fn revealing_an_open_cell_is_a_no_op() {
        let mut engine = engine((3, 3), &[(2, 2), (0, 2)]);
        engine.reveal((1, 1)).unwrap();
        let before = engine.clone();

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine, before);
    }

    #[test]
    fn flag_toggles_and_counts() {
        let mut engine = engine((3, 3), &[(2, 2)]);

        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), 0);
        assert_eq!(engine.toggle_flag((0, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), -1);
        assert_eq!(engine.toggle_flag((1, 1)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Hidden);
        assert_eq!(engine.flagged_count(), 1);
    }

    #[test]
    fn flagging_revealed_or_finished_is_a_no_op() {
        let mut engine = engine((2, 1), &[(0, 0)]);
        engine.reveal((1, 0)).unwrap();

        assert!(engine.is_finished());
        assert_eq!(engine.toggle_flag((1, 0)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), MarkOutcome::NoChange);
    }

    #[test]
    fn winning_auto_flags_remaining_mines() {
        let mut engine = engine((3, 1), &[(0, 0), (2, 0)]);

        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Flagged);
        assert_eq!(engine.cell_at((2, 0)), EngineCell::Flagged);
        assert_eq!(engine.mines_left(), 0);
    }

    #[test]
    fn chord_reveal_opens_exactly_unflagged_hidden_neighbors() {
        let mines = &[(0, 1), (2, 1)];
        let mut engine = engine((3, 3), mines);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((1, 2)), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((0, 1)), EngineCell::Flagged);
    }

    #[test]
    fn chord_reveal_requires_matching_flag_count() {
        let mut engine = engine((3, 3), &[(0, 1), (2, 1)]);
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        let before = engine.clone();

        assert_eq!(engine.chord_reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine, before);
    }

    #[test]
    fn chord_reveal_on_hidden_or_zero_cell_is_a_no_op() {
        let mut engine = engine((4, 4), &[(3, 3)]);
        assert_eq!(engine.chord_reveal((0, 0)).unwrap(), RevealOutcome::NoChange);

        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.chord_reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
    }

    #[test]
    fn chord_reveal_with_wrong_flag_loses() {
        let mut engine = engine((3, 3), &[(0, 1), (2, 1)]);
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((1, 0)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.triggered_mine(), Some((2, 1)));
    }

    #[test]
    fn out_of_bounds_coords_are_errors() {
        let mut engine = PlayEngine::new(Tier::Beginner.config(), 0);
        assert_eq!(engine.reveal((9, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 9)), Err(GameError::InvalidCoords));
        assert_eq!(engine.chord_reveal((9, 9)), Err(GameError::InvalidCoords));
        assert!(!engine.can_chord_at((9, 9)));
    }

    #[test]
    #[should_panic]
    fn reading_off_board_cell_panics() {
        let engine = PlayEngine::new(Tier::Beginner.config(), 0);
        engine.cell_at((9, 0));
    }

    #[test]
    fn engine_round_trips_through_json() {
        let mut engine = PlayEngine::new(Tier::Beginner.config(), 5);
        engine.reveal((4, 4)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        let json = serde_json::to_string(&engine).unwrap();
        let restored: PlayEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, engine);
    }
}
