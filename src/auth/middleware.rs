use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::error::ApiError;
use crate::AppState;

use super::SESSION_USER_ID;

pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    if let Ok(Some(_user_id)) = session.get::<i64>(SESSION_USER_ID).await {
        next.run(request).await
    } else {
        ApiError::NotLoggedIn.into_response()
    }
}

/// Admin routes re-check the role against the database on every request;
/// the session only carries the user id.
pub async fn require_admin(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let user_id = match session.get::<i64>(SESSION_USER_ID).await {
        Ok(Some(id)) => id,
        _ => return ApiError::NotLoggedIn.into_response(),
    };

    match state.user_service.find_user_by_id(user_id).await {
        Ok(Some(user)) if user.is_admin() => next.run(request).await,
        Ok(_) => ApiError::NotAuthorized.into_response(),
        Err(e) => {
            tracing::error!(user_id, error = %e, "Role lookup failed");
            ApiError::Internal.into_response()
        }
    }
}
