use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::SessionLayer;
use crate::{auth, handlers, AppState};

pub fn build_router(state: AppState, session_layer: SessionLayer) -> Router {
    let user_routes = Router::new()
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/logout", post(handlers::logout_handler));

    let rating_routes = Router::new()
        .route(
            "/submit-rating",
            post(handlers::submit_rating_handler).get(handlers::get_rating_handler),
        )
        .route("/month-data", get(handlers::month_data_handler))
        .route("/year-data", get(handlers::year_data_handler))
        .route("/available-years", get(handlers::available_years_handler))
        .layer(middleware::from_fn(auth::middleware::require_auth));

    let settings_routes = Router::new()
        .route(
            "/",
            get(handlers::get_settings_handler).post(handlers::save_settings_handler),
        )
        .layer(middleware::from_fn(auth::middleware::require_auth));

    let admin_routes = Router::new()
        .route("/stats", get(handlers::stats_handler))
        .route("/users", get(handlers::users_handler))
        .route("/send-emails", post(handlers::send_emails_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_admin,
        ));

    Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/ratings", rating_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/admin", admin_routes)
        .layer(session_layer)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Session cookies require a concrete allowed origin; without one
/// configured, cross-origin requests are simply not enabled.
fn cors_layer() -> CorsLayer {
    match env::var("CORS_ORIGIN") {
        Ok(origin) if !origin.is_empty() => {
            tracing::info!("Allowing requests from origin: {}", origin);
            let origin = origin
                .parse::<HeaderValue>()
                .expect("CORS_ORIGIN must be a valid header value");
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true)
        }
        _ => CorsLayer::new(),
    }
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()?;

    let addr = std::net::SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
