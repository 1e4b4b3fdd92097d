use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::*;

/// Entries kept per tier.
pub const MAX_ENTRIES: usize = 20;
/// Longest accepted username, counted in Unicode scalar values.
pub const MAX_USERNAME_CHARS: usize = 16;
pub const MIN_TIME: u32 = 1;
pub const MAX_TIME: u32 = 9999;

/// Storage key holding the serialized list of one tier.
pub fn storage_key(tier: Tier) -> String {
    format!("leaderboard:{}", tier.key())
}

/// Checks a submission before anything is read from storage.
pub fn validate_submission(username: &str, time: u32) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err(LeaderboardError::InvalidInput("username is required"));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(LeaderboardError::InvalidInput("username is longer than 16 characters"));
    }
    if !(MIN_TIME..=MAX_TIME).contains(&time) {
        return Err(LeaderboardError::InvalidInput("time must be between 1 and 9999 seconds"));
    }
    Ok(())
}

/// Name as stored: surrounding whitespace removed, cut to [`MAX_USERNAME_CHARS`].
pub fn normalize_username(username: &str) -> String {
    username.trim().chars().take(MAX_USERNAME_CHARS).collect()
}

/// How a submission treats a record the same user already holds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitPolicy {
    /// The latest submission always replaces the previous one, even when slower.
    #[default]
    Replace,
    /// A submission that does not beat the stored time leaves the list untouched.
    KeepBest,
}

impl FromStr for SubmitPolicy {
    type Err = LeaderboardError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "replace" => Ok(Self::Replace),
            "keep-best" => Ok(Self::KeepBest),
            _ => Err(LeaderboardError::InvalidInput("unknown submit policy")),
        }
    }
}

impl fmt::Display for SubmitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Replace => "replace",
            Self::KeepBest => "keep-best",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The new record was merged, it may still have fallen outside the top entries.
    Stored,
    /// An equal or better record was kept instead.
    KeptExisting { best: u32 },
}

/// Top scores of one tier: ascending by time, at most one entry per username, at most [`MAX_ENTRIES`] long.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    records: Vec<ScoreRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored blob, a missing blob being an empty list.
    pub fn from_blob(blob: Option<&str>) -> serde_json::Result<Self> {
        match blob {
            Some(blob) => serde_json::from_str(blob),
            None => Ok(Self::new()),
        }
    }

    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ScoreRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_of(&self, username: &str) -> Option<&ScoreRecord> {
        find_record(&self.records, username)
    }

    pub fn rank_of(&self, username: &str) -> usize {
        rank_of(&self.records, username)
    }

    /// Merges a validated submission into the list.
    pub fn submit(
        &mut self,
        username: &str,
        time: u32,
        date: OffsetDateTime,
        policy: SubmitPolicy,
    ) -> Result<SubmitOutcome> {
        validate_submission(username, time)?;
        let username = normalize_username(username);

        if policy == SubmitPolicy::KeepBest
            && let Some(existing) = self.record_of(&username)
            && existing.time <= time
        {
            log::debug!(
                "Keeping {} for {}, submitted {}",
                existing.time,
                username,
                time
            );
            return Ok(SubmitOutcome::KeptExisting {
                best: existing.time,
            });
        }

        self.records.retain(|record| record.username != username);
        self.records.push(ScoreRecord {
            username,
            time,
            date,
        });
        // stable, so earlier submissions stay ahead on ties
        self.records.sort_by_key(|record| record.time);
        self.records.truncate(MAX_ENTRIES);

        Ok(SubmitOutcome::Stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const DATE: OffsetDateTime = datetime!(2024-05-01 10:00:00 UTC);

    fn board_of(times: impl IntoIterator<Item = u32>) -> Leaderboard {
        let mut board = Leaderboard::new();
        for (i, time) in times.into_iter().enumerate() {
            board
                .submit(&format!("player{i}"), time, DATE, SubmitPolicy::Replace)
                .unwrap();
        }
        board
    }

    fn assert_well_formed(board: &Leaderboard) {
        assert!(board.len() <= MAX_ENTRIES);
        assert!(board.records().windows(2).all(|pair| pair[0].time <= pair[1].time));
        for (i, record) in board.records().iter().enumerate() {
            assert!(board.records()[i + 1..].iter().all(|other| other.username != record.username));
        }
    }

    #[test]
    fn first_submission_ranks_first() {
        let mut board = Leaderboard::new();
        let outcome = board.submit("Alice", 45, DATE, SubmitPolicy::Replace).unwrap();

        assert_eq!(outcome, SubmitOutcome::Stored);
        assert_eq!(board.len(), 1);
        assert_eq!(board.records()[0].username, "Alice");
        assert_eq!(board.records()[0].time, 45);
        assert_eq!(board.rank_of("Alice"), 1);
    }

    #[test]
    fn replace_policy_overwrites_with_slower_time() {
        let mut board = Leaderboard::new();
        board.submit("Alice", 45, DATE, SubmitPolicy::Replace).unwrap();
        board.submit("Alice", 50, DATE, SubmitPolicy::Replace).unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board.record_of("Alice").map(|record| record.time), Some(50));
    }

    #[test]
    fn keep_best_policy_refuses_slower_or_equal_time() {
        let mut board = Leaderboard::new();
        board.submit("Alice", 45, DATE, SubmitPolicy::KeepBest).unwrap();

        assert_eq!(
            board.submit("Alice", 50, DATE, SubmitPolicy::KeepBest),
            Ok(SubmitOutcome::KeptExisting { best: 45 })
        );
        assert_eq!(
            board.submit("Alice", 45, DATE, SubmitPolicy::KeepBest),
            Ok(SubmitOutcome::KeptExisting { best: 45 })
        );
        assert_eq!(
            board.submit("Alice", 30, DATE, SubmitPolicy::KeepBest),
            Ok(SubmitOutcome::Stored)
        );
        assert_eq!(board.record_of("Alice").map(|record| record.time), Some(30));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn twenty_first_slower_player_is_dropped() {
        let mut board = board_of(10..30);
        assert_eq!(board.len(), MAX_ENTRIES);

        let outcome = board.submit("latecomer", 100, DATE, SubmitPolicy::Replace).unwrap();

        assert_eq!(outcome, SubmitOutcome::Stored);
        assert_eq!(board.len(), MAX_ENTRIES);
        assert_eq!(board.rank_of("latecomer"), 0);
        assert_eq!(board.records().last().map(|record| record.time), Some(29));
    }

    #[test]
    fn faster_player_pushes_out_the_slowest() {
        let mut board = board_of(10..30);
        board.submit("speedy", 5, DATE, SubmitPolicy::Replace).unwrap();

        assert_eq!(board.rank_of("speedy"), 1);
        assert_eq!(board.len(), MAX_ENTRIES);
        assert!(board.record_of("player19").is_none());
        assert_well_formed(&board);
    }

    #[test]
    fn ties_keep_earlier_entry_first() {
        let mut board = Leaderboard::new();
        board.submit("first", 30, DATE, SubmitPolicy::Replace).unwrap();
        board.submit("second", 30, DATE, SubmitPolicy::Replace).unwrap();

        assert_eq!(board.rank_of("first"), 1);
        assert_eq!(board.rank_of("second"), 2);
    }

    #[test]
    fn username_is_trimmed_before_matching() {
        let mut board = Leaderboard::new();
        board.submit("  Bob ", 60, DATE, SubmitPolicy::Replace).unwrap();
        board.submit("Bob", 40, DATE, SubmitPolicy::Replace).unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board.records()[0].username, "Bob");
        assert_eq!(board.records()[0].time, 40);
    }

    #[test]
    fn list_stays_well_formed_under_churn() {
        let mut board = Leaderboard::new();
        for round in 0u32..200 {
            let name = format!("user{}", round % 37);
            let time = (round * 7919) % 500 + 1;
            let policy = if round % 3 == 0 {
                SubmitPolicy::KeepBest
            } else {
                SubmitPolicy::Replace
            };
            board.submit(&name, time, DATE, policy).unwrap();
            assert_well_formed(&board);
        }
        assert_eq!(board.len(), MAX_ENTRIES);
    }

    #[test]
    fn invalid_submissions_leave_list_untouched() {
        let mut board = board_of([12, 34]);
        let before = board.clone();

        for (username, time) in [("", 10), ("   ", 10), ("Carol", 0), ("Carol", 10_000)] {
            assert!(matches!(
                board.submit(username, time, DATE, SubmitPolicy::Replace),
                Err(LeaderboardError::InvalidInput(_))
            ));
        }
        assert_eq!(board, before);
    }

    #[test]
    fn username_length_counts_code_points() {
        assert_eq!(validate_submission("扫雷高手扫雷高手扫雷高手扫雷高手", 10), Ok(()));
        assert!(validate_submission("扫雷高手扫雷高手扫雷高手扫雷高手扫", 10).is_err());
        assert_eq!(validate_submission(" abcdefghijklmnop ", 10), Ok(()));
        assert!(validate_submission("abcdefghijklmnopq", 10).is_err());
    }

    #[test]
    fn time_bounds_are_inclusive() {
        assert_eq!(validate_submission("dave", MIN_TIME), Ok(()));
        assert_eq!(validate_submission("dave", MAX_TIME), Ok(()));
    }

    #[test]
    fn blob_round_trip_keeps_order() {
        let board = board_of([30, 10, 20]);
        let blob = board.to_blob().unwrap();

        assert!(blob.starts_with('['));
        assert_eq!(Leaderboard::from_blob(Some(&blob)).unwrap(), board);
        assert_eq!(Leaderboard::from_blob(None).unwrap(), Leaderboard::new());
        assert!(Leaderboard::from_blob(Some("{not json")).is_err());
    }

    #[test]
    fn storage_keys_per_tier() {
        assert_eq!(storage_key(Tier::Beginner), "leaderboard:beginner");
        assert_eq!(storage_key(Tier::Expert), "leaderboard:expert");
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!("replace".parse(), Ok(SubmitPolicy::Replace));
        assert_eq!("keep-best".parse(), Ok(SubmitPolicy::KeepBest));
        assert!("best".parse::<SubmitPolicy>().is_err());
        assert_eq!(SubmitPolicy::KeepBest.to_string(), "keep-best");
    }
}
