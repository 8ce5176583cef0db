use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mockall::predicate::eq;

use crate::models::settings::{ReminderCadence, UserSettings};
use crate::reminders::scheduler::ReminderScheduler;
use crate::repositories::rating_repository::MockRatingRepository;
use crate::repositories::settings_repository::MockSettingsRepository;
use crate::repositories::{ReminderCandidate, RepositoryError};
use crate::services::email_service::{EmailError, EmailService, OutgoingEmail};

/// Records every delivery attempt; optionally fails them all.
struct RecordingEmailService {
    attempts: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl RecordingEmailService {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn attempts(&self) -> Vec<OutgoingEmail> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.attempts.lock().unwrap().push(email);
        if self.fail {
            Err(EmailError::SendFailed("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn instant(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn daily_candidate(user_id: i64, email: &str, last_sent: Option<NaiveDate>) -> ReminderCandidate {
    ReminderCandidate {
        user_id,
        email: email.to_string(),
        settings: UserSettings {
            send_reminders: true,
            reminder_cadence: ReminderCadence::Daily,
            reminder_time: "08:00".to_string(),
            local_timezone: "UTC".to_string(),
            last_reminder_sent: last_sent,
        },
    }
}

fn weekly_candidate(user_id: i64, email: &str, last_sent: Option<NaiveDate>) -> ReminderCandidate {
    ReminderCandidate {
        settings: UserSettings {
            reminder_cadence: ReminderCadence::Weekly,
            ..daily_candidate(user_id, email, last_sent).settings
        },
        ..daily_candidate(user_id, email, last_sent)
    }
}

fn scheduler(
    settings_repo: MockSettingsRepository,
    rating_repo: MockRatingRepository,
    email: Arc<RecordingEmailService>,
) -> ReminderScheduler {
    ReminderScheduler::new(Arc::new(settings_repo), Arc::new(rating_repo), email)
}

#[tokio::test]
async fn daily_send_advances_watermark() {
    let candidate = daily_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));
    settings_repo
        .expect_update_last_reminder_sent()
        .with(eq(1), eq(date(2024, 5, 2)))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut rating_repo = MockRatingRepository::new();
    rating_repo
        .expect_has_rating()
        .with(eq(1), eq(date(2024, 5, 2)))
        .returning(|_, _| Ok(false));

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    let attempts = email.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].to, "ada@example.com");
    assert_eq!(attempts[0].subject, "RateMyDay Reminder");
    assert!(attempts[0].html.is_some());
}

#[tokio::test]
async fn daily_skips_when_watermark_is_current() {
    let candidate = daily_candidate(1, "ada@example.com", Some(date(2024, 5, 1)));

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));

    // Watermark equals today: no ledger query, no send, no watermark write.
    let rating_repo = MockRatingRepository::new();

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 1, 8, 15))
        .await;

    assert!(email.attempts().is_empty());
}

#[tokio::test]
async fn daily_rated_day_suppresses_send_without_watermark() {
    let candidate = daily_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));

    let mut rating_repo = MockRatingRepository::new();
    rating_repo
        .expect_has_rating()
        .with(eq(1), eq(date(2024, 5, 2)))
        .returning(|_, _| Ok(true));

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    assert!(email.attempts().is_empty());
}

#[tokio::test]
async fn off_hour_tick_is_a_no_op() {
    let candidate = daily_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));

    let rating_repo = MockRatingRepository::new();

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 9, 15))
        .await;

    assert!(email.attempts().is_empty());
}

#[tokio::test]
async fn delivery_failure_leaves_watermark_untouched() {
    let candidate = daily_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));
    // No update_last_reminder_sent expectation: a call would fail the test.

    let mut rating_repo = MockRatingRepository::new();
    rating_repo
        .expect_has_rating()
        .returning(|_, _| Ok(false));

    let email = RecordingEmailService::failing();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    assert_eq!(email.attempts().len(), 1);
}

#[tokio::test]
async fn weekly_sends_and_watermarks_the_week_end() {
    let candidate = weekly_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));
    settings_repo
        .expect_update_last_reminder_sent()
        .with(eq(1), eq(date(2024, 5, 5)))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut rating_repo = MockRatingRepository::new();
    rating_repo
        .expect_missed_dates()
        .with(eq(1), eq(date(2024, 4, 29)), eq(date(2024, 5, 5)))
        .returning(|_, _, _| Ok(vec![date(2024, 4, 29), date(2024, 5, 1)]));

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 5, 8, 15))
        .await;

    let attempts = email.attempts();
    assert_eq!(attempts.len(), 1);
    let text = &attempts[0].text;
    assert!(text.contains("2024-04-29"));
    assert!(text.contains("2024-05-01"));
    assert!(
        text.find("2024-04-29").unwrap() < text.find("2024-05-01").unwrap(),
        "missed dates should be listed in ascending order"
    );
}

#[tokio::test]
async fn weekly_with_nothing_missed_stays_silent() {
    let candidate = weekly_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));

    let mut rating_repo = MockRatingRepository::new();
    rating_repo
        .expect_missed_dates()
        .returning(|_, _, _| Ok(vec![]));

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 5, 8, 15))
        .await;

    assert!(email.attempts().is_empty());
}

#[tokio::test]
async fn weekly_only_fires_on_sunday() {
    let candidate = weekly_candidate(1, "ada@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![candidate]));

    let rating_repo = MockRatingRepository::new();

    let email = RecordingEmailService::new();
    // 2024-05-02 is a Thursday.
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    assert!(email.attempts().is_empty());
}

#[tokio::test]
async fn one_user_failure_does_not_block_the_rest() {
    let candidates = vec![
        daily_candidate(1, "first@example.com", None),
        daily_candidate(2, "second@example.com", None),
        daily_candidate(3, "third@example.com", None),
    ];

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(candidates));
    settings_repo
        .expect_update_last_reminder_sent()
        .times(2)
        .returning(|_, _| Ok(()));

    let mut rating_repo = MockRatingRepository::new();
    rating_repo.expect_has_rating().returning(|user_id, _| {
        if user_id == 2 {
            Err(RepositoryError::NotFound)
        } else {
            Ok(false)
        }
    });

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    let recipients: Vec<String> = email.attempts().iter().map(|e| e.to.clone()).collect();
    assert_eq!(recipients, vec!["first@example.com", "third@example.com"]);
}

#[tokio::test]
async fn unknown_timezone_is_isolated_to_that_user() {
    let mut broken = daily_candidate(1, "broken@example.com", None);
    broken.settings.local_timezone = "Nowhere/Plains".to_string();
    let fine = daily_candidate(2, "fine@example.com", None);

    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(move || Ok(vec![broken, fine]));
    settings_repo
        .expect_update_last_reminder_sent()
        .with(eq(2), eq(date(2024, 5, 2)))
        .times(1)
        .returning(|_, _| Ok(()));

    let mut rating_repo = MockRatingRepository::new();
    rating_repo
        .expect_has_rating()
        .with(eq(2), eq(date(2024, 5, 2)))
        .returning(|_, _| Ok(false));

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    let attempts = email.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].to, "fine@example.com");
}

#[tokio::test]
async fn recipient_enumeration_failure_ends_the_tick_quietly() {
    let mut settings_repo = MockSettingsRepository::new();
    settings_repo
        .expect_reminder_recipients()
        .return_once(|| Err(RepositoryError::NotFound));

    let rating_repo = MockRatingRepository::new();

    let email = RecordingEmailService::new();
    scheduler(settings_repo, rating_repo, email.clone())
        .run_tick(instant(2024, 5, 2, 8, 15))
        .await;

    assert!(email.attempts().is_empty());
}
