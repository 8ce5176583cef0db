use crate::models::rating::Rating;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::HashSet;

use super::RepositoryResult;

/// Read/write access to the rating ledger. All dates are local calendar
/// dates as seen by the user; comparisons are exact matches on the stored
/// date, never timestamp arithmetic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn upsert_rating(
        &self,
        user_id: i64,
        date: NaiveDate,
        score: i64,
        note: Option<String>,
    ) -> RepositoryResult<()>;
    async fn find_by_date(&self, user_id: i64, date: NaiveDate)
        -> RepositoryResult<Option<Rating>>;
    async fn list_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Rating>>;
    async fn distinct_years(&self, user_id: i64) -> RepositoryResult<Vec<i32>>;
    async fn count_ratings(&self) -> RepositoryResult<i64>;
    async fn has_rating(&self, user_id: i64, date: NaiveDate) -> RepositoryResult<bool>;
    /// The dates in the inclusive range with no rating, in chronological
    /// order.
    async fn missed_dates(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<NaiveDate>>;
}

pub struct SqliteRatingRepository {
    pool: SqlitePool,
}

impl SqliteRatingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for SqliteRatingRepository {
    async fn upsert_rating(
        &self,
        user_id: i64,
        date: NaiveDate,
        score: i64,
        note: Option<String>,
    ) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ratings (user_id, rating_date, score, note)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, rating_date)
            DO UPDATE SET score = excluded.score, note = excluded.note
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(score)
        .bind(note)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, rating_date, score, note
            FROM ratings
            WHERE user_id = ? AND rating_date = ?
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn list_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, rating_date, score, note
            FROM ratings
            WHERE user_id = ? AND rating_date BETWEEN ? AND ?
            ORDER BY rating_date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn distinct_years(&self, user_id: i64) -> RepositoryResult<Vec<i32>> {
        let years: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT CAST(strftime('%Y', rating_date) AS INTEGER) AS year
            FROM ratings
            WHERE user_id = ?
            ORDER BY year DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(years)
    }

    async fn count_ratings(&self) -> RepositoryResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn has_rating(&self, user_id: i64, date: NaiveDate) -> RepositoryResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE user_id = ? AND rating_date = ?")
                .bind(user_id)
                .bind(date)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    async fn missed_dates(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<NaiveDate>> {
        let rated: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT rating_date FROM ratings WHERE user_id = ? AND rating_date BETWEEN ? AND ?",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let rated: HashSet<NaiveDate> = rated.into_iter().collect();
        let missed = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !rated.contains(d))
            .collect();

        Ok(missed)
    }
}
