//! Food Routes
//!
//! - GET /api/v1/foods?q= - Catalog and custom foods matching a query
//! - POST /api/v1/foods/custom - Save a custom food
//! - GET /api/v1/foods/:id/nutrition?qty=&unit= - Nutrition for a serving
//! - GET /api/v1/recent?limit= - Recently logged foods
//! - GET /api/v1/catalog - The loaded catalog as served by its source

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    FoodListResponse, FoodSummary, FoodsQuery, NutritionQuery, NutritionResponse, RecentQuery,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::app::{all_foods, find_food, list_item, resolve_unit, search_items};
use crate::catalog::FoodCatalog;
use crate::storage::{compute_nutrition, FoodDefinition};

/// GET /api/v1/foods?q=
pub async fn list_foods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FoodsQuery>,
) -> Json<FoodListResponse> {
    let catalog = state.catalog.current();
    let foods = all_foods(&catalog, &state.store.get_custom_foods());
    let items = search_items(
        &foods,
        query.q.as_deref().unwrap_or_default(),
        &catalog.unit_conversions,
    );

    let foods: Vec<FoodSummary> = items.into_iter().map(FoodSummary::from).collect();
    Json(FoodListResponse {
        total: foods.len(),
        foods,
    })
}

/// POST /api/v1/foods/custom
pub async fn add_custom_food(
    State(state): State<Arc<AppState>>,
    Json(food): Json<FoodDefinition>,
) -> ApiResult<(StatusCode, Json<FoodDefinition>)> {
    validate_custom_food(&food)?;

    if state.catalog.current().find(&food.id).is_some() {
        return Err(ApiError::Validation(format!(
            "Food id '{}' is already used by the catalog",
            food.id
        )));
    }

    state.store.add_custom_food(food.clone());
    Ok((StatusCode::CREATED, Json(food)))
}

/// GET /api/v1/foods/:id/nutrition?qty=&unit=
///
/// Defaults to the default quantity of the food's default unit.
pub async fn food_nutrition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<NutritionQuery>,
) -> ApiResult<Json<NutritionResponse>> {
    let catalog = state.catalog.current();
    let food = find_food(&catalog, &state.store.get_custom_foods(), &id)
        .ok_or_else(|| ApiError::NotFound(format!("Food '{}' not found", id)))?;

    let unit = resolve_unit(&food, query.unit.as_deref()).ok_or_else(|| {
        ApiError::Validation(format!(
            "Unknown unit '{}' for food '{}'",
            query.unit.as_deref().unwrap_or_default(),
            id
        ))
    })?;

    let qty = query.qty.unwrap_or(unit.default_qty);
    if !qty.is_finite() || qty < 0.0 {
        return Err(ApiError::Validation("qty must be a non-negative number".to_string()));
    }

    Ok(Json(NutritionResponse {
        food_id: food.id.clone(),
        qty,
        macros: compute_nutrition(&food, qty, &unit, &catalog.unit_conversions),
        unit: unit.label,
    }))
}

/// GET /api/v1/recent?limit=
pub async fn recent_foods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Json<FoodListResponse> {
    let limit = query.limit.unwrap_or(state.config.recent_limit);
    let catalog = state.catalog.current();
    let custom = state.store.get_custom_foods();

    let foods: Vec<FoodSummary> = state
        .store
        .recent_food_ids(limit)
        .iter()
        .filter_map(|id| find_food(&catalog, &custom, id))
        .map(|food| FoodSummary::from(list_item(&food, &catalog.unit_conversions)))
        .collect();

    Json(FoodListResponse {
        total: foods.len(),
        foods,
    })
}

/// GET /api/v1/catalog
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<FoodCatalog> {
    Json(FoodCatalog::clone(&state.catalog.current()))
}

fn validate_custom_food(food: &FoodDefinition) -> ApiResult<()> {
    if food.id.is_empty()
        || !food
            .id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::Validation(
            "Food id must be non-empty and contain only letters, digits, '_' or '-'".to_string(),
        ));
    }

    if food.name.trim().is_empty() {
        return Err(ApiError::Validation("Food name cannot be empty".to_string()));
    }

    if let Some(unit) = food.units.iter().find(|u| u.label.trim().is_empty()) {
        return Err(ApiError::Validation(format!(
            "Unit labels cannot be empty (default quantity {})",
            unit.default_qty
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Macros, ServingUnit};

    fn food(id: &str, name: &str) -> FoodDefinition {
        FoodDefinition {
            id: id.to_string(),
            name: name.to_string(),
            units: vec![ServingUnit::new("1 slice", 1.0, Some(1.0))],
            default_unit: "1 slice".to_string(),
            reference_grams: 100.0,
            macros: Macros::new(80.0, 3.0, 14.0, 1.0),
        }
    }

    #[test]
    fn test_validate_custom_food() {
        assert!(validate_custom_food(&food("rye_toast", "Rye toast")).is_ok());
        assert!(validate_custom_food(&food("", "Rye toast")).is_err());
        assert!(validate_custom_food(&food("rye toast", "Rye toast")).is_err());
        assert!(validate_custom_food(&food("rye_toast", "  ")).is_err());
    }
}
