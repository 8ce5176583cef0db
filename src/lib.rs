pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod reminders;
pub mod repositories;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<services::user_service::UserService>,
    pub rating_service: Arc<services::rating_service::RatingService>,
    pub settings_service: Arc<services::settings_service::SettingsService>,
    pub admin_service: Arc<services::admin_service::AdminService>,
    pub pool: sqlx::SqlitePool,
}
