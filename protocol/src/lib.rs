//! Messages exchanged between the game page and the leaderboard service, and the rules both sides agree on.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use minesweeper_core::Tier;

pub use error::*;
pub use leaderboard::*;
pub use preview::*;

mod error;
mod leaderboard;
mod preview;

/// Path prefix of the leaderboard API, followed by the tier key.
pub const API_PREFIX: &str = "/api/leaderboard/";

pub fn parse_tier(key: &str) -> Result<Tier> {
    Tier::from_str(key).map_err(|_| LeaderboardError::InvalidTier)
}

pub fn api_path(tier: Tier) -> String {
    format!("{}{}", API_PREFIX, tier.key())
}

/// One stored leaderboard entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub username: String,
    /// Winning time in whole seconds.
    pub time: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Body of `POST /api/leaderboard/{tier}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub username: String,
    pub time: u32,
}

/// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Payload of a successful response, or the server supplied message.
    pub fn into_result(self) -> core::result::Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(self.error.unwrap_or_else(|| "Request failed".to_string())),
        }
    }
}

pub type LeaderboardResponse = ApiResponse<Vec<ScoreRecord>>;
