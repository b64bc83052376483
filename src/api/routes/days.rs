//! Day Routes
//!
//! Diary days and their entries.
//!
//! - GET /api/v1/days/:date - Day with meal totals, day totals and goals
//! - POST /api/v1/days/:date/meals/:slot/entries - Add an entry
//! - PATCH /api/v1/days/:date/meals/:slot/entries/:id - Update an entry
//! - DELETE /api/v1/days/:date/meals/:slot/entries/:id - Remove an entry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::dto::{AddEntryRequest, DayResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::app::{find_food, new_entry, resolve_unit};
use crate::storage::{
    compute_day_totals, compute_meal_totals, date_key, EntryPatch, FoodEntry, MealSlot, NewEntry,
};

/// GET /api/v1/days/:date
pub async fn get_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<Json<DayResponse>> {
    let date = parse_date(&date)?;
    let day = state.store.get_day(date);

    let meal_totals: BTreeMap<MealSlot, _> = MealSlot::all()
        .iter()
        .map(|slot| (*slot, compute_meal_totals(day.entries(*slot))))
        .collect();

    Ok(Json(DayResponse {
        date: date_key(date),
        totals: compute_day_totals(&day),
        meal_totals,
        goals: state.store.get_goals(),
        day,
    }))
}

/// POST /api/v1/days/:date/meals/:slot/entries
///
/// Accepts `{foodId, qty, unit}` (nutrition computed from the catalog) or a
/// complete entry.
pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    Path((date, slot)): Path<(String, String)>,
    Json(req): Json<AddEntryRequest>,
) -> ApiResult<(StatusCode, Json<FoodEntry>)> {
    let date = parse_date(&date)?;
    let slot: MealSlot = slot.parse()?;

    let data = match req {
        AddEntryRequest::FromFood { food_id, qty, unit } => {
            entry_from_food(&state, &food_id, qty, unit.as_deref())?
        }
        AddEntryRequest::Raw(data) => {
            validate_raw_entry(&data)?;
            data
        }
    };

    let entry = state.store.add_entry(date, slot, data);
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PATCH /api/v1/days/:date/meals/:slot/entries/:id
pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Path((date, slot, id)): Path<(String, String, String)>,
    Json(patch): Json<EntryPatch>,
) -> ApiResult<Json<FoodEntry>> {
    let date = parse_date(&date)?;
    let slot: MealSlot = slot.parse()?;

    state
        .store
        .update_entry(date, slot, &id, &patch)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Entry '{}' not found in {}", id, slot)))
}

/// DELETE /api/v1/days/:date/meals/:slot/entries/:id
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path((date, slot, id)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let date = parse_date(&date)?;
    let slot: MealSlot = slot.parse()?;

    if state.store.remove_entry(date, slot, &id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Entry '{}' not found in {}", id, slot)))
    }
}

/// Parse a `YYYY-MM-DD` path segment
pub fn parse_date(raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

fn entry_from_food(
    state: &AppState,
    food_id: &str,
    qty: f64,
    unit: Option<&str>,
) -> ApiResult<NewEntry> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(ApiError::Validation("qty must be a positive number".to_string()));
    }

    let catalog = state.catalog.current();
    let food = find_food(&catalog, &state.store.get_custom_foods(), food_id)
        .ok_or_else(|| ApiError::NotFound(format!("Food '{}' not found", food_id)))?;
    let unit = resolve_unit(&food, unit).ok_or_else(|| {
        ApiError::Validation(format!(
            "Unknown unit '{}' for food '{}'",
            unit.unwrap_or_default(),
            food_id
        ))
    })?;

    Ok(new_entry(&food, qty, &unit, &catalog.unit_conversions))
}

fn validate_raw_entry(data: &NewEntry) -> ApiResult<()> {
    if data.name.trim().is_empty() {
        return Err(ApiError::Validation("Entry name cannot be empty".to_string()));
    }
    if !data.serving_qty.is_finite() || data.serving_qty < 0.0 {
        return Err(ApiError::Validation(
            "servingQty must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-02-16").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
        );
        assert!(parse_date("16/02/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }
}
