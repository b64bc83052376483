//! Totals and nutrition math
//!
//! Pure functions over diary data: summing entries into totals and scaling a
//! food's reference macros to a chosen serving.

use crate::storage::types::{DiaryDay, FoodDefinition, FoodEntry, Macros, MealSlot, ServingUnit, Totals};
use std::collections::HashMap;

/// Grams per generic unit label (`"oz" -> 28.35`), as shipped with the catalog
pub type UnitConversions = HashMap<String, f64>;

/// Sum calories and macros over a meal's entries
pub fn compute_meal_totals(entries: &[FoodEntry]) -> Totals {
    let mut totals = Totals::default();
    for entry in entries {
        totals.accumulate(&entry.macros());
    }
    totals
}

/// Sum calories and macros over all four meal slots of a day
pub fn compute_day_totals(day: &DiaryDay) -> Totals {
    let mut totals = Totals::default();
    for slot in MealSlot::all() {
        totals.accumulate(&compute_meal_totals(day.entries(*slot)));
    }
    totals
}

/// Multiplier from one `unit` to the food's reference amount.
///
/// An explicit factor on the unit wins, then the catalog's grams-per-unit
/// table relative to `reference_grams`, then 1.
pub fn unit_factor(food: &FoodDefinition, unit: &ServingUnit, conversions: &UnitConversions) -> f64 {
    if let Some(factor) = unit.factor.filter(|f| f.is_finite() && *f >= 0.0) {
        return factor;
    }

    match conversions.get(&unit.label) {
        Some(grams) if food.reference_grams > 0.0 => grams / food.reference_grams,
        _ => {
            tracing::debug!(food = %food.id, unit = %unit.label, "No conversion for unit, using 1");
            1.0
        }
    }
}

/// Macros for `qty` of `unit` of `food`, rounded for display.
///
/// Calories round to whole numbers, macros to one decimal. A non-finite or
/// negative quantity counts as zero.
pub fn compute_nutrition(
    food: &FoodDefinition,
    qty: f64,
    unit: &ServingUnit,
    conversions: &UnitConversions,
) -> Macros {
    let qty = if qty.is_finite() { qty.max(0.0) } else { 0.0 };
    let raw = food.macros.scaled(qty * unit_factor(food, unit, conversions));

    Macros {
        calories: raw.calories.round(),
        protein: round1(raw.protein),
        carbs: round1(raw.carbs),
        fat: round1(raw.fat),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::{Meal, Meals};
    use chrono::Utc;

    fn food(calories: f64) -> FoodDefinition {
        FoodDefinition {
            id: "test_food".to_string(),
            name: "Test Food".to_string(),
            units: vec![
                ServingUnit::new("1 serving", 1.0, Some(1.0)),
                ServingUnit::new("g", 100.0, None),
                ServingUnit::new("oz", 1.0, None),
            ],
            default_unit: "1 serving".to_string(),
            reference_grams: 100.0,
            macros: Macros::new(calories, 10.0, 20.0, 5.0),
        }
    }

    fn entry(id: &str, calories: f64, protein: f64) -> FoodEntry {
        FoodEntry {
            id: id.to_string(),
            food_id: "f".to_string(),
            name: "F".to_string(),
            serving_qty: 1.0,
            serving_label: "1 serving".to_string(),
            calories,
            protein,
            carbs: 1.0,
            fat: 0.5,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_double_serving_doubles_calories() {
        let food = food(100.0);
        let n = compute_nutrition(&food, 2.0, &food.units[0], &UnitConversions::new());
        assert_eq!(n.calories, 200.0);
        assert_eq!(n.protein, 20.0);
    }

    #[test]
    fn test_conversion_table_relative_to_reference() {
        let food = food(200.0);
        let mut conversions = UnitConversions::new();
        conversions.insert("g".to_string(), 1.0);
        conversions.insert("oz".to_string(), 28.35);

        let grams = compute_nutrition(&food, 50.0, &food.units[1], &conversions);
        assert_eq!(grams.calories, 100.0);

        let ounce = compute_nutrition(&food, 1.0, &food.units[2], &conversions);
        assert_eq!(ounce.calories, 57.0);
        assert_eq!(ounce.protein, 2.8);
    }

    #[test]
    fn test_unknown_unit_uses_factor_one() {
        let food = food(100.0);
        let unit = ServingUnit::new("handful", 1.0, None);
        assert_eq!(unit_factor(&food, &unit, &UnitConversions::new()), 1.0);
    }

    #[test]
    fn test_invalid_quantity_is_zero() {
        let food = food(100.0);
        let conv = UnitConversions::new();
        assert_eq!(compute_nutrition(&food, -3.0, &food.units[0], &conv), Macros::default());
        assert_eq!(compute_nutrition(&food, f64::NAN, &food.units[0], &conv), Macros::default());
    }

    #[test]
    fn test_rounding_for_display() {
        let mut food = food(0.0);
        food.macros = Macros::new(33.33, 1.234, 5.56, 0.04);
        let n = compute_nutrition(&food, 1.0, &food.units[0], &UnitConversions::new());
        assert_eq!(n.calories, 33.0);
        assert_eq!(n.protein, 1.2);
        assert_eq!(n.carbs, 5.6);
        assert_eq!(n.fat, 0.0);
    }

    #[test]
    fn test_day_totals_equal_sum_of_meal_totals() {
        let day = DiaryDay {
            meals: Meals {
                breakfast: Meal {
                    entries: vec![entry("a", 154.0, 5.3), entry("b", 105.0, 1.3)],
                },
                lunch: Meal {
                    entries: vec![entry("c", 248.0, 46.5)],
                },
                dinner: Meal::default(),
                snacks: Meal {
                    entries: vec![entry("d", 164.0, 6.0)],
                },
            },
        };

        let mut summed = Totals::default();
        for slot in MealSlot::all() {
            summed.accumulate(&compute_meal_totals(day.entries(*slot)));
        }

        let totals = compute_day_totals(&day);
        assert_eq!(totals, summed);
        assert_eq!(totals.calories, 671.0);
        assert_eq!(totals.carbs, 4.0);
    }

    #[test]
    fn test_empty_totals_are_zero() {
        assert_eq!(compute_meal_totals(&[]), Totals::default());
        assert_eq!(compute_day_totals(&DiaryDay::default()), Totals::default());
    }
}
