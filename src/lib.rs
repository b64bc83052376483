//! # macrolog
//!
//! Single-user food diary: log foods per meal for any date, see calorie and
//! macro totals against daily goals.
//!
//! ## Features
//!
//! - **Date-keyed diary**: four meal slots per day, persisted as JSON documents
//! - **Food catalog**: loaded in the background from a file or URL, searchable
//!   by name, with unit conversions for serving sizes
//! - **Goals**: calorie/protein/carbs/fat targets with progress bars
//! - **Server-rendered page**: every action is a form post, no client script
//! - **JSON API and CLI** over the same store
//!
//! ## Modules
//!
//! - [`storage`]: Diary persistence and totals/nutrition math
//! - [`catalog`]: Food catalog and its sources
//! - [`app`]: Page state and actions
//! - [`ui`]: Leptos page components, rendered on the server
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use macrolog::api::{serve, ApiConfig, AppState};
//! use macrolog::catalog::{spawn_load, CatalogHandle, FileSource};
//! use macrolog::storage::{DiaryStore, FileStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(DiaryStore::new(Box::new(FileStore::open("./macrolog_data")?)));
//!
//!     // Page renders immediately; foods appear once the catalog is loaded
//!     let catalog = CatalogHandle::new();
//!     spawn_load(catalog.clone(), Box::new(FileSource::new("data/foods.json")));
//!
//!     let config = ApiConfig::default();
//!     serve(AppState::new(store, catalog, config.clone()), &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod storage;
pub mod ui;

// Re-export top-level types for convenience
pub use storage::{
    compute_day_totals, compute_meal_totals, compute_nutrition, DiaryDay, DiaryStore,
    EntryPatch, FileStore, FoodDefinition, FoodEntry, Goals, KeyValueStore, Macros, MealSlot,
    MemoryStore, NewEntry, Profile, ServingUnit, StorageError, StorageResult, Totals,
};

pub use catalog::{CatalogError, CatalogHandle, CatalogSource, CatalogStatus, FoodCatalog};

pub use app::DiaryApp;

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{
    ApiConfig as ConfigApiConfig, CatalogConfig, Config, ConfigError, DiaryConfig, LoggingConfig,
    StorageConfig,
};
