//! macrolog HTTP API
//!
//! HTTP layer for macrolog, built with Axum. Serves the rendered diary page,
//! the form actions behind it, and a JSON API over the same store.
//!
//! # Endpoints
//!
//! ## Page
//! - `GET /` - Rendered diary page
//! - `POST /ui/...` - Page actions, answered with `303 See Other` to `/`
//!
//! ## Days
//! - `GET /api/v1/days/:date` - Day, meal totals, day totals and goals
//! - `POST /api/v1/days/:date/meals/:slot/entries` - Add an entry
//! - `PATCH /api/v1/days/:date/meals/:slot/entries/:id` - Update an entry
//! - `DELETE /api/v1/days/:date/meals/:slot/entries/:id` - Remove an entry
//!
//! ## Goals and profile
//! - `GET|PUT /api/v1/goals`
//! - `GET|PUT /api/v1/profile`
//!
//! ## Foods
//! - `GET /api/v1/foods?q=` - Search catalog and custom foods
//! - `POST /api/v1/foods/custom` - Save a custom food
//! - `GET /api/v1/foods/:id/nutrition?qty=&unit=` - Nutrition for a serving
//! - `GET /api/v1/recent?limit=` - Recently logged foods
//! - `GET /api/v1/catalog` - The loaded catalog
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use macrolog::api::{serve, ApiConfig, AppState};
//! use macrolog::catalog::CatalogHandle;
//! use macrolog::storage::{DiaryStore, FileStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(DiaryStore::new(Box::new(FileStore::open("./data")?)));
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, CatalogHandle::new(), config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Day routes
        .route("/days/:date", get(routes::days::get_day))
        .route(
            "/days/:date/meals/:slot/entries",
            post(routes::days::add_entry),
        )
        .route(
            "/days/:date/meals/:slot/entries/:id",
            axum::routing::patch(routes::days::update_entry).delete(routes::days::delete_entry),
        )
        // Settings routes
        .route(
            "/goals",
            get(routes::settings::get_goals).put(routes::settings::put_goals),
        )
        .route(
            "/profile",
            get(routes::settings::get_profile).put(routes::settings::put_profile),
        )
        // Food routes
        .route("/foods", get(routes::foods::list_foods))
        .route("/foods/custom", post(routes::foods::add_custom_food))
        .route("/foods/:id/nutrition", get(routes::foods::food_nutrition))
        .route("/recent", get(routes::foods::recent_foods))
        .route("/catalog", get(routes::foods::get_catalog));

    let ui_routes = Router::new()
        .route("/prev", post(routes::pages::prev_day))
        .route("/next", post(routes::pages::next_day))
        .route("/today", post(routes::pages::go_today))
        .route("/date", post(routes::pages::go_to_date))
        .route("/meals/:slot/add", post(routes::pages::open_picker))
        .route("/picker/search", post(routes::pages::search))
        .route("/picker/select", post(routes::pages::select_food))
        .route("/detail", post(routes::pages::update_detail))
        .route("/detail/confirm", post(routes::pages::confirm_detail))
        .route("/panels/close", post(routes::pages::close_panels))
        .route("/entries/:slot/:id/edit", post(routes::pages::edit_entry))
        .route("/entries/:slot/:id/remove", post(routes::pages::remove_entry));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::pages::index))
        .nest("/ui", ui_routes)
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("macrolog listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("macrolog shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
