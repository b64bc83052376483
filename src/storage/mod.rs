//! macrolog Storage
//!
//! This module provides diary persistence and the totals/nutrition math:
//!
//! - **types**: Core data structures (DiaryDay, FoodEntry, Goals, FoodDefinition)
//! - **kv**: Key-value backends (file-backed JSON, in-memory)
//! - **diary**: Date-keyed diary store with default fallbacks
//! - **nutrition**: Day/meal totals and serving scaling
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   NewEntry → DiaryStore (lock, read diary, mutate) → JSON → KeyValueStore
//!
//! Read Path:
//!   date → KeyValueStore → JSON → Diary → DiaryDay (empty day when absent)
//! ```
//!
//! # Example
//!
//! ```rust
//! use macrolog::storage::{compute_day_totals, DiaryStore, Macros, MealSlot, MemoryStore, NewEntry};
//! use chrono::NaiveDate;
//!
//! let store = DiaryStore::new(Box::new(MemoryStore::new()));
//! let date = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
//!
//! store.add_entry(date, MealSlot::Breakfast, NewEntry {
//!     food_id: "banana".to_string(),
//!     name: "Banana".to_string(),
//!     serving_qty: 1.0,
//!     serving_label: "1 medium".to_string(),
//!     macros: Macros::new(105.0, 1.3, 27.0, 0.4),
//! });
//!
//! let totals = compute_day_totals(&store.get_day(date));
//! assert_eq!(totals.calories, 105.0);
//! ```

pub mod diary;
pub mod error;
pub mod kv;
pub mod nutrition;
pub mod types;

// Re-export commonly used types
pub use diary::{date_key, keys, DiaryStore};
pub use error::{StorageError, StorageResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use nutrition::{
    compute_day_totals, compute_meal_totals, compute_nutrition, unit_factor, UnitConversions,
};
pub use types::{
    format_qty, Diary, DiaryDay, EntryPatch, FoodDefinition, FoodEntry, Goals, Macros, Meal,
    MealSlot, Meals, NewEntry, Profile, ServingUnit, Totals, UnknownMealSlot,
};
