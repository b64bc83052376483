//! Food Catalog
//!
//! The static list of loggable foods plus the unit conversion table, as
//! served by the catalog source:
//!
//! ```json
//! { "foods": [ { "id": "banana", "name": "Banana", "units": [...], ... } ],
//!   "unitConversions": { "g": 1, "oz": 28.35 } }
//! ```
//!
//! The catalog loads in the background (see [`source`]). Until it arrives,
//! [`CatalogHandle::current`] yields an empty catalog so catalog-dependent
//! features degrade instead of blocking the first render.

pub mod source;

pub use source::{load_into, spawn_load, CatalogError, CatalogSource, FileSource, HttpSource};

use crate::storage::{FoodDefinition, UnitConversions};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Foods and unit conversions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodCatalog {
    #[serde(default)]
    pub foods: Vec<FoodDefinition>,
    #[serde(default)]
    pub unit_conversions: UnitConversions,
}

impl FoodCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find(&self, food_id: &str) -> Option<&FoodDefinition> {
        self.foods.iter().find(|f| f.id == food_id)
    }

    /// Foods whose name contains `query` (see [`filter_foods`])
    pub fn search(&self, query: &str) -> Vec<&FoodDefinition> {
        filter_foods(&self.foods, query)
    }
}

/// Case-insensitive substring match on food names.
///
/// The query is trimmed; an empty query matches everything.
pub fn filter_foods<'a>(foods: &'a [FoodDefinition], query: &str) -> Vec<&'a FoodDefinition> {
    let query = query.trim().to_lowercase();
    foods
        .iter()
        .filter(|f| query.is_empty() || f.name.to_lowercase().contains(&query))
        .collect()
}

/// Load state of the catalog
#[derive(Debug, Clone)]
pub enum CatalogState {
    Loading,
    Ready(Arc<FoodCatalog>),
    Failed(String),
}

/// Coarse status for rendering and health checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed,
}

/// Shared, late-filled reference to the catalog
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    state: Arc<RwLock<CatalogState>>,
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogHandle {
    /// A handle that is still loading
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState::Loading)),
        }
    }

    /// A handle that already holds `catalog`
    pub fn ready(catalog: FoodCatalog) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState::Ready(Arc::new(catalog)))),
        }
    }

    pub fn set_ready(&self, catalog: FoodCatalog) {
        self.set(CatalogState::Ready(Arc::new(catalog)));
    }

    pub fn set_failed(&self, reason: impl Into<String>) {
        self.set(CatalogState::Failed(reason.into()));
    }

    fn set(&self, state: CatalogState) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = state;
    }

    pub fn status(&self) -> CatalogStatus {
        match &*self.read() {
            CatalogState::Loading => CatalogStatus::Loading,
            CatalogState::Ready(_) => CatalogStatus::Ready,
            CatalogState::Failed(_) => CatalogStatus::Failed,
        }
    }

    /// The loaded catalog, or an empty one while loading or after a failure
    pub fn current(&self) -> Arc<FoodCatalog> {
        match &*self.read() {
            CatalogState::Ready(catalog) => Arc::clone(catalog),
            _ => Arc::new(FoodCatalog::empty()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CatalogState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::{Macros, ServingUnit};

    pub(crate) fn sample_catalog() -> FoodCatalog {
        let food = |id: &str, name: &str, calories: f64| FoodDefinition {
            id: id.to_string(),
            name: name.to_string(),
            units: vec![
                ServingUnit::new("1 serving", 1.0, Some(1.0)),
                ServingUnit::new("g", 100.0, None),
            ],
            default_unit: "1 serving".to_string(),
            reference_grams: 100.0,
            macros: Macros::new(calories, 10.0, 20.0, 5.0),
        };

        let mut catalog = FoodCatalog {
            foods: vec![
                food("banana", "Banana", 105.0),
                food("chicken_breast", "Chicken Breast, grilled", 165.0),
                food("greek_yogurt", "Greek Yogurt, plain, 2%", 100.0),
                food("oats_rolled", "Oats, rolled, dry", 154.0),
            ],
            unit_conversions: UnitConversions::new(),
        };
        catalog.unit_conversions.insert("g".to_string(), 1.0);
        catalog
    }

    #[test]
    fn test_parse_catalog_json() {
        let json = r#"{
            "foods": [{
                "id": "banana", "name": "Banana",
                "units": [{"label": "1 medium", "defaultQty": 1, "factor": 1.18},
                          {"label": "g", "defaultQty": 100}],
                "defaultUnit": "1 medium",
                "calories": 89, "protein": 1.1, "carbs": 22.8, "fat": 0.3
            }],
            "unitConversions": {"g": 1, "oz": 28.35}
        }"#;

        let catalog: FoodCatalog = serde_json::from_str(json).unwrap();
        let banana = catalog.find("banana").unwrap();
        assert_eq!(banana.reference_grams, 100.0);
        assert_eq!(banana.units[0].factor, Some(1.18));
        assert_eq!(banana.units[1].factor, None);
        assert_eq!(banana.macros.calories, 89.0);
        assert_eq!(catalog.unit_conversions.get("oz"), Some(&28.35));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = sample_catalog();

        let names = |q: &str| -> Vec<String> {
            catalog.search(q).iter().map(|f| f.id.clone()).collect()
        };

        assert_eq!(names("CHICKEN"), vec!["chicken_breast"]);
        assert_eq!(names("  rolled "), vec!["oats_rolled"]);
        assert_eq!(names("an"), vec!["banana"]);
        assert_eq!(names("").len(), 4);
        assert!(names("pizza").is_empty());
    }

    #[test]
    fn test_handle_degrades_until_ready() {
        let handle = CatalogHandle::new();
        assert_eq!(handle.status(), CatalogStatus::Loading);
        assert!(handle.current().foods.is_empty());

        let clone = handle.clone();
        clone.set_ready(sample_catalog());
        assert_eq!(handle.status(), CatalogStatus::Ready);
        assert_eq!(handle.current().foods.len(), 4);

        handle.set_failed("timeout");
        assert_eq!(handle.status(), CatalogStatus::Failed);
        assert!(handle.current().foods.is_empty());
    }
}
