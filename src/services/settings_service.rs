use crate::models::settings::{SettingsPatch, UserSettings};
use crate::repositories::{RepositoryError, SettingsRepository};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SettingsServiceError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct SettingsService {
    repository: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repository: Arc<dyn SettingsRepository>) -> Self {
        Self { repository }
    }

    /// The user's settings document, or the documented defaults when the
    /// row does not exist yet (it is created lazily on first save).
    pub async fn get_settings(&self, user_id: i64) -> Result<UserSettings, SettingsServiceError> {
        Ok(self
            .repository
            .get_settings(user_id)
            .await?
            .unwrap_or_default())
    }

    /// Merge a partial update into the stored document and persist the
    /// result. See [`UserSettings::apply`] for the merge rules, including
    /// the watermark reset on reminder re-enable.
    pub async fn save_settings(
        &self,
        user_id: i64,
        patch: SettingsPatch,
    ) -> Result<UserSettings, SettingsServiceError> {
        patch
            .validate()
            .map_err(SettingsServiceError::Validation)?;

        let mut settings = self
            .repository
            .get_settings(user_id)
            .await?
            .unwrap_or_default();
        settings.apply(patch);

        self.repository.upsert_settings(user_id, &settings).await?;

        Ok(settings)
    }
}
