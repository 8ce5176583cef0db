use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::auth::current_user_id;
use crate::error::{ApiError, Result};
use crate::services::rating_service::SubmitRatingRequest;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingPayload {
    pub rating_date: String,
    pub rating: i64,
    pub note: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDateQuery {
    pub rating_date: Option<String>,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// Wire shape for a stored rating; `rating_date` stays snake_case for
/// compatibility with the calendar views.
#[derive(Serialize)]
pub struct RatingDay {
    pub rating_date: NaiveDate,
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub async fn submit_rating_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SubmitRatingPayload>,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;

    state
        .rating_service
        .submit_rating(
            user_id,
            SubmitRatingRequest {
                rating_date: payload.rating_date,
                score: payload.rating,
                note: payload.note,
            },
        )
        .await?;

    Ok(Json(json!({ "message": "Rating submitted successfully" })))
}

pub async fn get_rating_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RatingDateQuery>,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;
    let rating_date = query
        .rating_date
        .ok_or_else(|| ApiError::Validation("No date provided".to_string()))?;

    let rating = state
        .rating_service
        .rating_for_date(user_id, &rating_date)
        .await?;

    Ok(match rating {
        Some(r) => Json(json!({ "rating": r.score, "note": r.note })),
        None => Json(json!({})),
    })
}

pub async fn month_data_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;
    let (year, month) = match (query.year, query.month) {
        (Some(year), Some(month)) => (year, month),
        _ => {
            return Err(ApiError::Validation(
                "Year and month are required".to_string(),
            ))
        }
    };

    let ratings = state.rating_service.month_data(user_id, year, month).await?;

    let days: Vec<RatingDay> = ratings
        .into_iter()
        .map(|r| RatingDay {
            rating_date: r.rating_date,
            rating: r.score,
            note: r.note,
        })
        .collect();

    Ok(Json(days))
}

pub async fn year_data_handler(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;
    let year = query
        .year
        .ok_or_else(|| ApiError::Validation("Year is required".to_string()))?;

    let ratings = state.rating_service.year_data(user_id, year).await?;

    let days: Vec<RatingDay> = ratings
        .into_iter()
        .map(|r| RatingDay {
            rating_date: r.rating_date,
            rating: r.score,
            note: None,
        })
        .collect();

    Ok(Json(days))
}

pub async fn available_years_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    let user_id = current_user_id(&session).await?;

    let years = state.rating_service.available_years(user_id).await?;

    Ok(Json(years))
}
