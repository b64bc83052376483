//! Food lookup across the catalog and user-defined foods

use crate::catalog::{filter_foods, FoodCatalog};
use crate::storage::{
    compute_nutrition, format_qty, FoodDefinition, NewEntry, ServingUnit, UnitConversions,
};
use crate::ui::{rounded, FoodListItem};

/// Catalog foods followed by custom foods; a custom food whose id is already
/// in the catalog is ignored
pub fn all_foods(catalog: &FoodCatalog, custom: &[FoodDefinition]) -> Vec<FoodDefinition> {
    let mut foods = catalog.foods.clone();
    foods.extend(
        custom
            .iter()
            .filter(|f| catalog.find(&f.id).is_none())
            .cloned(),
    );
    foods
}

pub fn find_food(
    catalog: &FoodCatalog,
    custom: &[FoodDefinition],
    food_id: &str,
) -> Option<FoodDefinition> {
    catalog
        .find(food_id)
        .or_else(|| custom.iter().find(|f| f.id == food_id))
        .cloned()
}

/// Matching foods as picker rows
pub fn search_items(
    foods: &[FoodDefinition],
    query: &str,
    conversions: &UnitConversions,
) -> Vec<FoodListItem> {
    filter_foods(foods, query)
        .into_iter()
        .map(|food| list_item(food, conversions))
        .collect()
}

/// Picker row for a food, showing its default serving
pub fn list_item(food: &FoodDefinition, conversions: &UnitConversions) -> FoodListItem {
    let unit = food.default_unit().cloned().unwrap_or_else(fallback_unit);
    let nutrition = compute_nutrition(food, unit.default_qty, &unit, conversions);

    FoodListItem {
        food_id: food.id.clone(),
        name: food.name.clone(),
        display_serving: display_serving(&unit),
        display_calories: rounded(nutrition.calories),
    }
}

/// `"1 medium"` for a one-count unit, `"100 g"` otherwise
pub fn display_serving(unit: &ServingUnit) -> String {
    if unit.default_qty == 1.0 {
        unit.label.clone()
    } else {
        format!("{} {}", format_qty(unit.default_qty), unit.label)
    }
}

/// Unit by label, or the food's default unit when no label is given.
/// `None` for an unknown label.
pub fn resolve_unit(food: &FoodDefinition, label: Option<&str>) -> Option<ServingUnit> {
    match label {
        Some(label) => food.unit_by_label(label).cloned(),
        None => Some(food.default_unit().cloned().unwrap_or_else(fallback_unit)),
    }
}

/// Entry data for `qty` of `unit`, with nutrition computed from the food
pub fn new_entry(
    food: &FoodDefinition,
    qty: f64,
    unit: &ServingUnit,
    conversions: &UnitConversions,
) -> NewEntry {
    NewEntry {
        food_id: food.id.clone(),
        name: food.name.clone(),
        serving_qty: qty,
        serving_label: unit.label.clone(),
        macros: compute_nutrition(food, qty, unit, conversions),
    }
}

/// Unit used for foods that define none
fn fallback_unit() -> ServingUnit {
    ServingUnit::new("serving", 1.0, Some(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::storage::Macros;

    fn custom(id: &str, name: &str) -> FoodDefinition {
        FoodDefinition {
            id: id.to_string(),
            name: name.to_string(),
            units: vec![ServingUnit::new("1 slice", 1.0, Some(1.0))],
            default_unit: "1 slice".to_string(),
            reference_grams: 100.0,
            macros: Macros::new(230.0, 9.0, 40.0, 3.0),
        }
    }

    #[test]
    fn test_custom_foods_extend_catalog() {
        let catalog = sample_catalog();
        let custom = vec![custom("rye_bread", "Rye Bread"), custom("banana", "Not a banana")];

        let foods = all_foods(&catalog, &custom);
        assert_eq!(foods.len(), 5);
        assert_eq!(find_food(&catalog, &custom, "banana").unwrap().name, "Banana");
        assert_eq!(find_food(&catalog, &custom, "rye_bread").unwrap().name, "Rye Bread");
        assert!(find_food(&catalog, &custom, "pizza").is_none());
    }

    #[test]
    fn test_list_item_uses_default_unit() {
        let catalog = sample_catalog();
        let item = list_item(catalog.find("oats_rolled").unwrap(), &catalog.unit_conversions);
        assert_eq!(item.display_serving, "1 serving");
        assert_eq!(item.display_calories, 154);

        let mut food = catalog.find("banana").unwrap().clone();
        food.default_unit = "g".to_string();
        let item = list_item(&food, &catalog.unit_conversions);
        assert_eq!(item.display_serving, "100 g");
        assert_eq!(item.display_calories, 105);
    }

    #[test]
    fn test_new_entry_scales_by_quantity() {
        let catalog = sample_catalog();
        let food = catalog.find("greek_yogurt").unwrap();
        let unit = resolve_unit(food, None).unwrap();

        let entry = new_entry(food, 2.0, &unit, &catalog.unit_conversions);
        assert_eq!(entry.serving_label, "1 serving");
        assert_eq!(entry.macros.calories, 200.0);
        assert_eq!(entry.macros.protein, 20.0);

        assert!(resolve_unit(food, Some("cup")).is_none());
    }

    #[test]
    fn test_food_without_units() {
        let mut food = custom("water", "Water");
        food.units.clear();
        food.macros = Macros::default();

        let item = list_item(&food, &UnitConversions::new());
        assert_eq!(item.display_serving, "serving");
        assert_eq!(item.display_calories, 0);
        assert_eq!(resolve_unit(&food, None).unwrap().label, "serving");
    }
}
