use minesweeper_protocol::*;
use time::OffsetDateTime;

use crate::error::{Result, ServiceError};
use crate::store::ScoreStore;

/// Reads and updates per-tier lists. Holds no state between requests.
///
/// Submissions are read-modify-write without any lock, two concurrent submissions for the same tier may lose one of
/// them.
pub struct LeaderboardService<S> {
    store: S,
    policy: SubmitPolicy,
}

impl<S: ScoreStore> LeaderboardService<S> {
    pub fn new(store: S, policy: SubmitPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn list(&self, tier: Tier) -> Result<Vec<ScoreRecord>> {
        Ok(self.load(tier).await?.into_records())
    }

    pub async fn submit(&self, tier: Tier, request: SubmitRequest, now: OffsetDateTime) -> Result<Vec<ScoreRecord>> {
        validate_submission(&request.username, request.time)?;

        let mut leaderboard = self.load(tier).await?;
        match leaderboard.submit(&request.username, request.time, now, self.policy)? {
            SubmitOutcome::Stored => {
                let blob = leaderboard
                    .to_blob()
                    .map_err(|err| ServiceError::StorageUnavailable(err.to_string()))?;
                self.store.save(&storage_key(tier), blob).await?;
                log::info!(
                    "{} submitted {}s on {}, rank {}",
                    request.username.trim(),
                    request.time,
                    tier,
                    leaderboard.rank_of(&request.username)
                );
            }
            SubmitOutcome::KeptExisting { best } => {
                log::info!(
                    "{} submitted {}s on {}, kept {}s",
                    request.username.trim(),
                    request.time,
                    tier,
                    best
                );
            }
        }

        Ok(leaderboard.into_records())
    }

    async fn load(&self, tier: Tier) -> Result<Leaderboard> {
        let blob = self.store.load(&storage_key(tier)).await?;
        Leaderboard::from_blob(blob.as_deref())
            .map_err(|err| ServiceError::StorageUnavailable(format!("corrupt {tier} list: {err}")))
    }
}

/// Decodes a submit body, anything but `{username, time}` with a non-negative integer time is rejected.
pub fn parse_submit(body: &str) -> Result<SubmitRequest> {
    serde_json::from_str(body).map_err(|err| {
        log::debug!("Rejected submit body: {}", err);
        ServiceError::BadPayload
    })
}

/// A request body that could not be read at all is rejected like a malformed one.
pub fn body_unreadable(err: impl core::fmt::Display) -> ServiceError {
    log::debug!("Unreadable submit body: {}", err);
    ServiceError::BadPayload
}
