use crate::repositories::{RatingRepository, RepositoryError, UserRepository};
use crate::services::email_service::{EmailService, OutgoingEmail};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum AdminServiceError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub hostname: Option<String>,
    pub version: String,
    pub user_count: i64,
    pub rating_count: i64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    All,
    Subset,
}

pub struct BroadcastRequest {
    pub subject: String,
    pub body: String,
    pub recipient_type: RecipientType,
    pub emails: Option<Vec<String>>,
}

/// Per-recipient outcome of a broadcast. Failures are logged and counted,
/// never propagated; a half-delivered broadcast still reports what
/// happened.
#[derive(Debug, Serialize)]
pub struct BroadcastOutcome {
    pub sent: usize,
    pub failed: usize,
}

pub struct AdminService {
    user_repository: Arc<dyn UserRepository>,
    rating_repository: Arc<dyn RatingRepository>,
    email_service: Arc<dyn EmailService>,
    started_at: Instant,
}

impl AdminService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        rating_repository: Arc<dyn RatingRepository>,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            user_repository,
            rating_repository,
            email_service,
            started_at: Instant::now(),
        }
    }

    pub async fn stats(&self) -> Result<AdminStats, AdminServiceError> {
        let user_count = self.user_repository.count_users().await?;
        let rating_count = self.rating_repository.count_ratings().await?;

        Ok(AdminStats {
            hostname: std::env::var("HOSTNAME").ok(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            user_count,
            rating_count,
            uptime_seconds: self.started_at.elapsed().as_secs(),
        })
    }

    pub async fn broadcast(
        &self,
        request: BroadcastRequest,
    ) -> Result<BroadcastOutcome, AdminServiceError> {
        if request.subject.trim().is_empty() || request.body.trim().is_empty() {
            return Err(AdminServiceError::Validation(
                "Subject and body are required".to_string(),
            ));
        }

        let recipients = match request.recipient_type {
            RecipientType::All => self.user_repository.list_emails().await?,
            RecipientType::Subset => match request.emails {
                Some(emails) if !emails.is_empty() => emails,
                _ => {
                    return Err(AdminServiceError::Validation(
                        "No emails provided".to_string(),
                    ))
                }
            },
        };

        let mut outcome = BroadcastOutcome { sent: 0, failed: 0 };
        for recipient in recipients {
            let email = OutgoingEmail {
                to: recipient.clone(),
                subject: request.subject.clone(),
                text: request.body.clone(),
                html: Some(request.body.clone()),
            };

            match self.email_service.send(email).await {
                Ok(()) => outcome.sent += 1,
                Err(e) => {
                    tracing::error!(recipient = %recipient, error = %e, "Broadcast delivery failed");
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}
