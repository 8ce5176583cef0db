use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::services::admin_service::{BroadcastRequest, RecipientType};
use crate::AppState;

#[derive(Serialize)]
pub struct UserSummary {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailsPayload {
    pub subject: String,
    pub body: String,
    pub recipient_type: RecipientType,
    pub emails: Option<Vec<String>>,
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.admin_service.stats().await?;

    Ok(Json(stats))
}

pub async fn users_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list_users().await?;

    let summaries: Vec<UserSummary> = users
        .into_iter()
        .map(|u| UserSummary {
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
        })
        .collect();

    Ok(Json(summaries))
}

pub async fn send_emails_handler(
    State(state): State<AppState>,
    Json(payload): Json<SendEmailsPayload>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .admin_service
        .broadcast(BroadcastRequest {
            subject: payload.subject,
            body: payload.body,
            recipient_type: payload.recipient_type,
            emails: payload.emails,
        })
        .await?;

    Ok(Json(json!({
        "message": "Emails processed",
        "sent": outcome.sent,
        "failed": outcome.failed,
    })))
}
