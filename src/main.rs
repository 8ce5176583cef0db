use ratemyday::{
    app,
    config::session::{validate_production_config, SessionConfig},
    db,
    reminders::ReminderScheduler,
    repositories::{SqliteRatingRepository, SqliteSettingsRepository, SqliteUserRepository},
    services::{
        admin_service::AdminService, create_email_service, rating_service::RatingService,
        settings_service::SettingsService, user_service::UserService,
    },
    AppState,
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratemyday=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Initialize repositories
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let rating_repository = Arc::new(SqliteRatingRepository::new(pool.clone()));
    let settings_repository = Arc::new(SqliteSettingsRepository::new(pool.clone()));

    // Initialize email service
    let email_service = create_email_service();

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repository.clone()));
    let rating_service = Arc::new(RatingService::new(rating_repository.clone()));
    let settings_service = Arc::new(SettingsService::new(settings_repository.clone()));
    let admin_service = Arc::new(AdminService::new(
        user_repository.clone(),
        rating_repository.clone(),
        email_service.clone(),
    ));

    let app_state = AppState {
        user_service,
        rating_service,
        settings_service,
        admin_service,
        pool: pool.clone(),
    };

    // Session store
    validate_production_config();
    let session_store = SqliteStore::new(pool.clone())
        .with_table_name("sessions")
        .expect("Invalid session table name for sessions");
    session_store.migrate().await?;

    let session_layer = SessionConfig::from_env().create_layer(session_store);

    // Reminder scheduler: one long-lived background task, cancelled on
    // shutdown. The kill-switch disables it entirely at startup.
    let shutdown = CancellationToken::new();
    let scheduler_handle = if reminders_disabled() {
        tracing::info!("DISABLE_REMINDERS is true. Skipping reminder scheduling.");
        None
    } else {
        let scheduler = Arc::new(ReminderScheduler::new(
            settings_repository.clone(),
            rating_repository.clone(),
            email_service.clone(),
        ));
        let token = shutdown.clone();
        Some(tokio::spawn(async move { scheduler.run(token).await }))
    };

    // Build application routes and serve
    let router = app::build_router(app_state, session_layer);
    app::serve(router).await?;

    // Teardown: stop the scheduler between ticks
    shutdown.cancel();
    if let Some(handle) = scheduler_handle {
        let _ = handle.await;
    }

    Ok(())
}

fn reminders_disabled() -> bool {
    std::env::var("DISABLE_REMINDERS")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
