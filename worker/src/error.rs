use minesweeper_protocol::LeaderboardError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Invalid difficulty")]
    InvalidTier,
    #[error("Invalid submission: {0}")]
    InvalidInput(&'static str),
    #[error("Invalid request body")]
    BadPayload,
    /// The detail is logged, clients only see a generic message.
    #[error("Server error")]
    StorageUnavailable(String),
}

impl ServiceError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::InvalidTier | Self::InvalidInput(_) | Self::BadPayload => 400,
            Self::StorageUnavailable(_) => 500,
        }
    }
}

impl From<LeaderboardError> for ServiceError {
    fn from(err: LeaderboardError) -> Self {
        match err {
            LeaderboardError::InvalidTier => Self::InvalidTier,
            LeaderboardError::InvalidInput(reason) => Self::InvalidInput(reason),
        }
    }
}

pub type Result<T> = core::result::Result<T, ServiceError>;
