use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lowest score a user can submit.
pub const MIN_SCORE: i64 = 1;
/// Highest score a user can submit. The database CHECK constraint
/// enforces the same range.
pub const MAX_SCORE: i64 = 10;

/// One rating per (user, local calendar date). `rating_date` is the date
/// the user saw in their own timezone; it is stored and compared as a
/// calendar date, never as a timestamp.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub rating_date: NaiveDate,
    pub score: i64,
    pub note: Option<String>,
}
