//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! JSON bodies use camelCase like the stored documents; UI form bodies are
//! urlencoded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::CatalogStatus;
use crate::storage::{DiaryDay, Goals, Macros, MealSlot, NewEntry, Totals};
use crate::ui::FoodListItem;

// ============================================
// DAY DTOs
// ============================================

/// A day with its totals and the goals they are measured against
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    /// `YYYY-MM-DD`
    pub date: String,
    pub day: DiaryDay,
    pub meal_totals: BTreeMap<MealSlot, Totals>,
    pub totals: Totals,
    pub goals: Goals,
}

/// Body of `POST /days/:date/meals/:slot/entries`
///
/// Either a food from the catalog with a quantity and unit (nutrition is
/// computed server side), or a complete entry with its own macros.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddEntryRequest {
    FromFood {
        #[serde(rename = "foodId")]
        food_id: String,
        qty: f64,
        /// Unit label; the food's default unit when absent
        #[serde(default)]
        unit: Option<String>,
    },
    Raw(NewEntry),
}

// ============================================
// FOOD DTOs
// ============================================

/// `GET /foods?q=`
#[derive(Debug, Deserialize)]
pub struct FoodsQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// A food as shown in lists
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    pub id: String,
    pub name: String,
    pub display_serving: String,
    pub display_calories: i64,
}

impl From<FoodListItem> for FoodSummary {
    fn from(item: FoodListItem) -> Self {
        Self {
            id: item.food_id,
            name: item.name,
            display_serving: item.display_serving,
            display_calories: item.display_calories,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FoodListResponse {
    pub total: usize,
    pub foods: Vec<FoodSummary>,
}

/// `GET /foods/:id/nutrition?qty=&unit=`
#[derive(Debug, Deserialize)]
pub struct NutritionQuery {
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionResponse {
    pub food_id: String,
    pub qty: f64,
    pub unit: String,
    #[serde(flatten)]
    pub macros: Macros,
}

/// `GET /recent?limit=`
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================
// UI FORMS
// ============================================

#[derive(Debug, Deserialize)]
pub struct DateForm {
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    #[serde(default)]
    pub food_id: String,
}

/// Unit select and quantity input of the detail panel. Both arrive as text;
/// unparsable values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DetailForm {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub qty: Option<String>,
}

impl DetailForm {
    pub fn unit_index(&self) -> Option<usize> {
        self.unit.as_deref().and_then(|u| u.trim().parse().ok())
    }

    pub fn qty(&self) -> Option<f64> {
        self.qty.as_deref().and_then(|q| q.trim().parse().ok())
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Storage status: "ok" or "error"
    pub storage: String,
    pub catalog: CatalogStatus,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Version string
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_entry_request_shapes() {
        let req: AddEntryRequest =
            serde_json::from_str(r#"{"foodId": "banana", "qty": 2, "unit": "g"}"#).unwrap();
        assert!(matches!(
            req,
            AddEntryRequest::FromFood { ref food_id, qty, unit: Some(ref u) }
                if food_id == "banana" && qty == 2.0 && u == "g"
        ));

        let req: AddEntryRequest = serde_json::from_str(
            r#"{"foodId": "toast", "name": "Toast", "servingQty": 1, "servingLabel": "1 slice", "calories": 80, "protein": 3, "carbs": 14, "fat": 1}"#,
        )
        .unwrap();
        match req {
            AddEntryRequest::Raw(entry) => {
                assert_eq!(entry.name, "Toast");
                assert_eq!(entry.macros.calories, 80.0);
            }
            other => panic!("expected raw entry, got {:?}", other),
        }
    }

    #[test]
    fn test_detail_form_parsing() {
        let form = DetailForm {
            unit: Some("1".to_string()),
            qty: Some(" 2.5 ".to_string()),
        };
        assert_eq!(form.unit_index(), Some(1));
        assert_eq!(form.qty(), Some(2.5));

        let form = DetailForm {
            unit: None,
            qty: Some("lots".to_string()),
        };
        assert_eq!(form.unit_index(), None);
        assert_eq!(form.qty(), None);
    }
}
