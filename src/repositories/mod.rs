pub mod rating_repository;
pub mod settings_repository;
pub mod user_repository;

pub use rating_repository::{RatingRepository, SqliteRatingRepository};
pub use settings_repository::{ReminderCandidate, SettingsRepository, SqliteSettingsRepository};
pub use user_repository::{NewUser, SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Not found")]
    NotFound,
    #[error("Already exists")]
    AlreadyExists,
    #[error("Malformed stored document: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
