use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tower_sessions::Session;

use crate::auth::current_user_id;
use crate::error::Result;
use crate::models::settings::SettingsPatch;
use crate::AppState;

pub async fn get_settings_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;

    let settings = state.settings_service.get_settings(user_id).await?;

    Ok(Json(settings))
}

pub async fn save_settings_handler(
    State(state): State<AppState>,
    session: Session,
    Json(patch): Json<SettingsPatch>,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;

    state.settings_service.save_settings(user_id, patch).await?;

    Ok(Json(json!({ "message": "Settings saved successfully" })))
}
