use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::auth::SESSION_USER_ID;
use crate::error::{ApiError, Result};
use crate::services::user_service::{LoginRequest, RegisterRequest};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    state
        .user_service
        .register(RegisterRequest {
            first_name: payload.first_name,
            last_name: payload.last_name,
            dob: payload.dob,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .authenticate(LoginRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    session
        .insert(SESSION_USER_ID, user.id)
        .await
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(json!({
        "message": "Login successful",
        "role": user.user_role,
    })))
}

pub async fn logout_handler(session: Session) -> Result<impl IntoResponse> {
    session.flush().await.map_err(|_| ApiError::Internal)?;

    Ok(Json(json!({ "message": "Logout successful" })))
}
