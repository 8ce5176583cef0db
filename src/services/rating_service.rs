use crate::models::rating::{Rating, MAX_SCORE, MIN_SCORE};
use crate::repositories::{RatingRepository, RepositoryError};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RatingServiceError {
    #[error("Invalid rating date: {0}")]
    InvalidDate(String),
    #[error("Rating must be between {MIN_SCORE} and {MAX_SCORE}")]
    InvalidScore,
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct SubmitRatingRequest {
    pub rating_date: String,
    pub score: i64,
    pub note: Option<String>,
}

pub struct RatingService {
    repository: Arc<dyn RatingRepository>,
}

impl RatingService {
    pub fn new(repository: Arc<dyn RatingRepository>) -> Self {
        Self { repository }
    }

    pub async fn submit_rating(
        &self,
        user_id: i64,
        request: SubmitRatingRequest,
    ) -> Result<(), RatingServiceError> {
        let date = parse_date(&request.rating_date)?;

        if !(MIN_SCORE..=MAX_SCORE).contains(&request.score) {
            return Err(RatingServiceError::InvalidScore);
        }

        self.repository
            .upsert_rating(user_id, date, request.score, request.note)
            .await?;

        Ok(())
    }

    pub async fn rating_for_date(
        &self,
        user_id: i64,
        rating_date: &str,
    ) -> Result<Option<Rating>, RatingServiceError> {
        let date = parse_date(rating_date)?;
        Ok(self.repository.find_by_date(user_id, date).await?)
    }

    pub async fn month_data(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<Rating>, RatingServiceError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(RatingServiceError::InvalidMonth(month))?;
        let end = last_day_of_month(year, month).ok_or(RatingServiceError::InvalidMonth(month))?;

        Ok(self.repository.list_between(user_id, start, end).await?)
    }

    pub async fn year_data(
        &self,
        user_id: i64,
        year: i32,
    ) -> Result<Vec<Rating>, RatingServiceError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| RatingServiceError::InvalidDate(format!("{year}-01-01")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| RatingServiceError::InvalidDate(format!("{year}-12-31")))?;

        Ok(self.repository.list_between(user_id, start, end).await?)
    }

    pub async fn available_years(&self, user_id: i64) -> Result<Vec<i32>, RatingServiceError> {
        Ok(self.repository.distinct_years(user_id).await?)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, RatingServiceError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| RatingServiceError::InvalidDate(raw.to_string()))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt()
}
