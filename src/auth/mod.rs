pub mod middleware;

use tower_sessions::Session;

use crate::error::ApiError;

/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID: &str = "user_id";

/// The logged-in user's id, or `NotLoggedIn`.
pub async fn current_user_id(session: &Session) -> Result<i64, ApiError> {
    session
        .get::<i64>(SESSION_USER_ID)
        .await
        .map_err(|_| ApiError::Internal)?
        .ok_or(ApiError::NotLoggedIn)
}
