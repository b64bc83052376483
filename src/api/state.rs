//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::app::{DiaryApp, DEFAULT_RECENT_LIMIT};
use crate::catalog::CatalogHandle;
use crate::storage::DiaryStore;

/// Shared application state for all handlers
pub struct AppState {
    /// Diary persistence
    pub store: Arc<DiaryStore>,
    /// Food catalog, filled in by the background loader
    pub catalog: CatalogHandle,
    /// Page state behind the `/ui` routes
    pub app: Mutex<DiaryApp>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with the page opened on today's date
    pub fn new(store: Arc<DiaryStore>, catalog: CatalogHandle, config: ApiConfig) -> Self {
        Self::with_date(store, catalog, config, today())
    }

    /// Create state with the page opened on `date`
    pub fn with_date(
        store: Arc<DiaryStore>,
        catalog: CatalogHandle,
        config: ApiConfig,
        date: NaiveDate,
    ) -> Self {
        let app = DiaryApp::new(
            Arc::clone(&store),
            catalog.clone(),
            date,
            config.recent_limit,
        );

        Self {
            store,
            catalog,
            app: Mutex::new(app),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// The local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Default length of recent foods lists
    pub recent_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8085,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
