pub mod admin_handlers;
pub mod rating_handlers;
pub mod settings_handlers;
pub mod user_handlers;

pub use admin_handlers::{send_emails_handler, stats_handler, users_handler};
pub use rating_handlers::{
    available_years_handler, get_rating_handler, month_data_handler, submit_rating_handler,
    year_data_handler,
};
pub use settings_handlers::{get_settings_handler, save_settings_handler};
pub use user_handlers::{login_handler, logout_handler, register_handler};
