use core::str::FromStr;

use crate::*;

/// Wall-clock source in milliseconds, injectable so that timing can be tested.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        use web_time::SystemTime;

        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |since_epoch| since_epoch.as_millis() as u64)
    }
}

/// One game from new-game request to win or loss, owned by the UI.
///
/// Starting a new game means replacing the session, the engine keeps no global state.
#[derive(Clone, Debug)]
pub struct GameSession<C = SystemClock> {
    tier: Tier,
    engine: PlayEngine,
    clock: C,
    started_at: Option<u64>,
    ended_at: Option<u64>,
}

impl GameSession {
    pub fn new(tier: Tier, seed: u64) -> Self {
        Self::with_clock(tier, seed, SystemClock)
    }

    /// Session from a difficulty key such as `"expert"`.
    pub fn from_key(key: &str, seed: u64) -> Result<Self> {
        Ok(Self::new(Tier::from_str(key)?, seed))
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_clock(tier: Tier, seed: u64, clock: C) -> Self {
        Self::with_engine(tier, PlayEngine::new(tier.config(), seed), clock)
    }

    pub fn with_engine(tier: Tier, engine: PlayEngine, clock: C) -> Self {
        Self {
            tier,
            engine,
            clock,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn engine(&self) -> &PlayEngine {
        &self.engine
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn size(&self) -> Coord2 {
        self.engine.size()
    }

    pub fn mines_left(&self) -> isize {
        self.engine.mines_left()
    }

    pub fn can_chord_at(&self, coords: Coord2) -> bool {
        self.engine.can_chord_at(coords)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let outcome = self.engine.reveal(coords)?;
        self.track_time(outcome);
        Ok(outcome)
    }

    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let outcome = self.engine.chord_reveal(coords)?;
        self.track_time(outcome);
        Ok(outcome)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.engine.toggle_flag(coords)
    }

    /// Whole seconds since the first reveal, frozen once the game ends, 0 before it starts.
    pub fn elapsed_secs(&self) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let until = self.ended_at.unwrap_or_else(|| self.clock.now_ms());
        until.saturating_sub(started_at) / 1000
    }

    /// Final time of a won game, the value submitted to the leaderboard.
    pub fn winning_time(&self) -> Option<u64> {
        matches!(self.state(), EngineState::Won).then(|| self.elapsed_secs())
    }

    /// What the board shows at `coords`.
    ///
    /// # Panics
    ///
    /// When `coords` is off the board, same as [`PlayEngine::cell_at`].
    pub fn cell_view(&self, coords: Coord2) -> CellView {
        match self.engine.cell_at(coords) {
            EngineCell::Hidden => CellView::Hidden,
            EngineCell::Flagged => CellView::Flagged,
            EngineCell::Revealed(count) => CellView::Revealed(count),
            EngineCell::Mine if self.engine.triggered_mine() == Some(coords) => CellView::TriggeredMine,
            EngineCell::Mine => CellView::Mine,
        }
    }

    fn track_time(&mut self, outcome: RevealOutcome) {
        if !outcome.has_update() {
            return;
        }

        let now = self.clock.now_ms();
        if self.started_at.is_none() {
            log::debug!("Started {} game at {}", self.tier, now);
            self.started_at = Some(now);
        }
        if self.engine.is_finished() && self.ended_at.is_none() {
            log::debug!("Ended {} game at {}", self.tier, now);
            self.ended_at = Some(now);
        }
    }
}
