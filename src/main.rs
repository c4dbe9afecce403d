use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations (schema + seed catalogs)
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let state = AppState { db };

    let api_routes = Router::new()
        // Entries
        .route("/api/entries", get(handlers::entries::list_entries))
        .route("/api/entries", post(handlers::entries::create_entry))
        .route("/api/entries/filter", post(handlers::search::filter_entries))
        .route("/api/entries/missed-days", get(handlers::search::missed_days))
        .route(
            "/api/entries/by-date/:date",
            get(handlers::entries::get_entry_by_date),
        )
        .route("/api/entries/:id", get(handlers::entries::get_entry))
        .route("/api/entries/:id", put(handlers::entries::update_entry))
        .route("/api/entries/:id", delete(handlers::entries::delete_entry))
        // Search
        .route("/api/search", get(handlers::search::search_entries))
        // Streak
        .route("/api/streak", get(handlers::streaks::get_streak))
        // Analytics
        .route(
            "/api/analytics/mood-distribution",
            get(handlers::analytics::mood_distribution),
        )
        .route(
            "/api/analytics/most-frequent-mood",
            get(handlers::analytics::most_frequent_mood),
        )
        .route("/api/analytics/top-tags", get(handlers::analytics::top_tags))
        .route(
            "/api/analytics/average-word-count",
            get(handlers::analytics::average_word_count),
        )
        .route(
            "/api/analytics/word-count-trend",
            get(handlers::analytics::word_count_trend),
        )
        // Catalogs
        .route("/api/moods", get(handlers::moods::list_moods))
        .route("/api/categories", get(handlers::categories::list_categories))
        .route("/api/tags", get(handlers::tags::list_tags))
        .route("/api/tags", post(handlers::tags::create_tag))
        // Settings
        .route("/api/settings", get(handlers::settings::get_settings))
        .route("/api/settings/theme", put(handlers::settings::update_theme));

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<axum::http::HeaderValue>()
                .expect("FRONTEND_URL must be a valid origin"),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
