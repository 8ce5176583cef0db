//! The reminder scheduler: a long-lived background task that wakes on a
//! fixed interval, enumerates users with reminders enabled, and runs the
//! per-user pipeline (evaluate, consult the ledger, compose, send, record
//! the watermark). One user's failure never aborts the tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::models::settings::ReminderCadence;
use crate::reminders::composer::compose_reminder;
use crate::reminders::evaluator::{evaluate, Decision, EvaluateError};
use crate::repositories::{
    RatingRepository, ReminderCandidate, RepositoryError, SettingsRepository,
};
use crate::services::email_service::{EmailError, EmailService, OutgoingEmail};

/// The scheduler ticks hourly; reminder times are matched by hour.
pub const TICK_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Delivery failed: {0}")]
    Delivery(#[from] EmailError),
}

pub struct ReminderScheduler {
    settings_repository: Arc<dyn SettingsRepository>,
    rating_repository: Arc<dyn RatingRepository>,
    email_service: Arc<dyn EmailService>,
    tick_running: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(
        settings_repository: Arc<dyn SettingsRepository>,
        rating_repository: Arc<dyn RatingRepository>,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            settings_repository,
            rating_repository,
            email_service,
            tick_running: AtomicBool::new(false),
        }
    }

    /// Run until `cancel` is triggered. Intended to be spawned once at
    /// process boot; cancellation is checked between ticks.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = TICK_INTERVAL.as_secs(),
            "Reminder scheduler started"
        );

        let mut interval = tokio::time::interval(TICK_INTERVAL);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.run_tick(Utc::now()).await;
                }
            }
        }
    }

    /// One pass over all eligible users at instant `now`. Public so tests
    /// can drive the scheduler with an injected clock. The interval loop
    /// never overlaps ticks, but the guard makes that explicit.
    pub async fn run_tick(&self, now: DateTime<Utc>) {
        if self.tick_running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Previous reminder tick still in progress, skipping");
            return;
        }

        tracing::debug!("Checking for reminders");

        match self.settings_repository.reminder_recipients().await {
            Ok(candidates) => {
                for candidate in candidates {
                    // Isolation boundary: log and move on to the next user.
                    if let Err(e) = self.process_candidate(&candidate, now).await {
                        tracing::error!(
                            user_id = candidate.user_id,
                            error = %e,
                            "Reminder pipeline failed for user"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to enumerate reminder recipients");
            }
        }

        self.tick_running.store(false, Ordering::SeqCst);
    }

    async fn process_candidate(
        &self,
        candidate: &ReminderCandidate,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulerError> {
        match evaluate(now, &candidate.settings)? {
            Decision::Skip => Ok(()),
            Decision::Daily { date } => {
                // Already rated today: nothing to nudge about. The
                // watermark stays put so a later re-run in the same hour
                // re-checks instead of assuming a send happened.
                if self
                    .rating_repository
                    .has_rating(candidate.user_id, date)
                    .await?
                {
                    return Ok(());
                }
                self.deliver(candidate, ReminderCadence::Daily, &[], date)
                    .await
            }
            Decision::Weekly {
                week_start,
                week_end,
            } => {
                let missed = self
                    .rating_repository
                    .missed_dates(candidate.user_id, week_start, week_end)
                    .await?;
                if missed.is_empty() {
                    return Ok(());
                }
                self.deliver(candidate, ReminderCadence::Weekly, &missed, week_end)
                    .await
            }
        }
    }

    /// Compose, send, then record the watermark. The order matters: the
    /// watermark is written only after the gateway confirms delivery, so
    /// a failed send stays eligible for the next qualifying period.
    async fn deliver(
        &self,
        candidate: &ReminderCandidate,
        cadence: ReminderCadence,
        missed_dates: &[NaiveDate],
        period_date: NaiveDate,
    ) -> Result<(), SchedulerError> {
        let composed = compose_reminder(cadence, missed_dates);

        self.email_service
            .send(OutgoingEmail {
                to: candidate.email.clone(),
                subject: composed.subject,
                text: composed.text,
                html: Some(composed.html),
            })
            .await?;

        self.settings_repository
            .update_last_reminder_sent(candidate.user_id, period_date)
            .await?;

        tracing::info!(
            user_id = candidate.user_id,
            date = %period_date,
            "Reminder sent"
        );

        Ok(())
    }
}
