pub mod admin_service;
pub mod email_service;
pub mod rating_service;
pub mod settings_service;
pub mod user_service;

pub use admin_service::AdminService;
pub use email_service::{create_email_service, EmailService, MockEmailService, OutgoingEmail};
pub use rating_service::RatingService;
pub use settings_service::SettingsService;
pub use user_service::UserService;
