use crate::models::settings::UserSettings;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::RepositoryResult;

/// A user eligible for reminder processing, as returned by the
/// enumeration query: identity, delivery address, and the full settings
/// document in one fetch.
#[derive(Debug, Clone)]
pub struct ReminderCandidate {
    pub user_id: i64,
    pub email: String,
    pub settings: UserSettings,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_settings(&self, user_id: i64) -> RepositoryResult<Option<UserSettings>>;
    /// Write the full document for a user, creating the row if absent.
    async fn upsert_settings(&self, user_id: i64, settings: &UserSettings)
        -> RepositoryResult<()>;
    /// All users whose document has `sendReminders` enabled.
    async fn reminder_recipients(&self) -> RepositoryResult<Vec<ReminderCandidate>>;
    /// Set only `lastReminderSent`, preserving every other field. A user
    /// without a settings row is skipped with a warning.
    async fn update_last_reminder_sent(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<()>;
}

pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn get_settings(&self, user_id: i64) -> RepositoryResult<Option<UserSettings>> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT data FROM settings WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn upsert_settings(
        &self,
        user_id: i64,
        settings: &UserSettings,
    ) -> RepositoryResult<()> {
        let data = serde_json::to_string(settings)?;

        sqlx::query(
            r#"
            INSERT INTO settings (user_id, data)
            VALUES (?, ?)
            ON CONFLICT (user_id) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(user_id)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reminder_recipients(&self) -> RepositoryResult<Vec<ReminderCandidate>> {
        // Older documents may hold "true" as a string; accept both forms,
        // like the settings endpoint's own merge did historically.
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.email, s.data
            FROM users u
            JOIN settings s ON s.user_id = u.id
            WHERE json_extract(s.data, '$.sendReminders') = 1
               OR json_extract(s.data, '$.sendReminders') = 'true'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for (user_id, email, data) in rows {
            match serde_json::from_str::<UserSettings>(&data) {
                Ok(settings) => candidates.push(ReminderCandidate {
                    user_id,
                    email,
                    settings,
                }),
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Skipping user with malformed settings document");
                }
            }
        }

        Ok(candidates)
    }

    async fn update_last_reminder_sent(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepositoryResult<()> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT data FROM settings WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(data) = row else {
            tracing::warn!(user_id, "Watermark write skipped: no settings row");
            return Ok(());
        };

        let mut settings: UserSettings = serde_json::from_str(&data)?;
        settings.last_reminder_sent = Some(date);
        let data = serde_json::to_string(&settings)?;

        sqlx::query("UPDATE settings SET data = ? WHERE user_id = ?")
            .bind(data)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
