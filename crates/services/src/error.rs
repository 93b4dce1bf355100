//! Shared error types for the services crate.

use thiserror::Error;

use leaf_core::model::{AchievementError, QuestionId, RewardId, UserError, UserId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Coarse classification every service error maps onto.
///
/// Outer adapters translate this into their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InsufficientFunds,
    Invalid,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Invalid => "invalid",
            Self::Internal => "internal",
        }
    }
}

pub(crate) fn storage_kind(err: &StorageError) -> ErrorKind {
    match err {
        StorageError::NotFound => ErrorKind::NotFound,
        StorageError::InsufficientPoints { .. } => ErrorKind::InsufficientFunds,
        StorageError::Conflict | StorageError::PointsOverflow => ErrorKind::Invalid,
        _ => ErrorKind::Internal,
    }
}

/// Errors emitted by `ProgressLedger` and `RewardLedger`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("reward {0} not found or unavailable")]
    RewardNotFound(RewardId),
    #[error("insufficient points: balance {balance}, cost {cost}")]
    InsufficientFunds { balance: u32, cost: u32 },
    #[error("points balance would overflow")]
    PointsOverflow,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::QuestionNotFound(_) | Self::RewardNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::PointsOverflow => ErrorKind::Invalid,
            Self::Storage(err) => storage_kind(err),
        }
    }
}

/// Errors emitted by `QueryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QueryError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Storage(err) => storage_kind(err),
        }
    }
}

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("no user named {0:?}")]
    UsernameNotFound(String),
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Achievement(#[from] AchievementError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl UserServiceError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::UsernameNotFound(_) => ErrorKind::NotFound,
            Self::UsernameTaken | Self::User(_) | Self::Achievement(_) => ErrorKind::Invalid,
            Self::Storage(err) => storage_kind(err),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Domain(#[from] leaf_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_faults_are_internal() {
        let err = LedgerError::from(StorageError::Connection("closed".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err = QueryError::from(StorageError::Serialization("bad row".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn ledger_errors_classify() {
        assert_eq!(
            LedgerError::InsufficientFunds {
                balance: 50,
                cost: 100
            }
            .kind(),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            LedgerError::RewardNotFound(RewardId::new(3)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(LedgerError::PointsOverflow.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn taken_username_is_invalid() {
        assert_eq!(UserServiceError::UsernameTaken.kind(), ErrorKind::Invalid);
        assert_eq!(
            UserServiceError::User(UserError::EmptyUsername).kind(),
            ErrorKind::Invalid
        );
        assert_eq!(ErrorKind::InsufficientFunds.as_str(), "insufficient_funds");
    }
}
