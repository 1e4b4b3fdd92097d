use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("Invalid difficulty")]
    InvalidTier,
    #[error("Invalid submission: {0}")]
    InvalidInput(&'static str),
}

pub type Result<T> = core::result::Result<T, LeaderboardError>;
