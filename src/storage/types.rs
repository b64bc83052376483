//! Core data types for the food diary
//!
//! This module defines the documents persisted by the diary store:
//! - `DiaryDay`: the four meal slots of one calendar day
//! - `FoodEntry`: one logged food with its computed macros
//! - `Goals`: daily calorie/macro targets
//! - `FoodDefinition`: a catalog or custom food with serving units
//! - `Profile`: placeholder user profile
//!
//! Field names serialize in camelCase to match the stored JSON layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One of the four fixed meal slots
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    /// All slots in display order
    pub fn all() -> &'static [MealSlot] {
        &[
            MealSlot::Breakfast,
            MealSlot::Lunch,
            MealSlot::Dinner,
            MealSlot::Snacks,
        ]
    }

    /// Stored name, also used in URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snacks => "snacks",
        }
    }

    /// Human-readable title
    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::Snacks => "Snacks",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown meal slot: {0}")]
pub struct UnknownMealSlot(pub String);

impl FromStr for MealSlot {
    type Err = UnknownMealSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snacks" | "snack" => Ok(MealSlot::Snacks),
            _ => Err(UnknownMealSlot(s.to_string())),
        }
    }
}

/// Calories and macronutrients in grams
///
/// Used both for per-entry values and for summed totals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Macros {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

/// Summed calories/macros over a set of entries
pub type Totals = Macros;

impl Macros {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Add another set of values, counting missing/NaN/negative values as 0
    pub fn accumulate(&mut self, other: &Macros) {
        self.calories += non_negative(other.calories);
        self.protein += non_negative(other.protein);
        self.carbs += non_negative(other.carbs);
        self.fat += non_negative(other.fat);
    }

    /// Multiply every value by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

/// `f64::max` returns the other operand for NaN, so NaN maps to 0 too
fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// A single logged food occurrence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: String,
    #[serde(default)]
    pub food_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_qty")]
    pub serving_qty: f64,
    #[serde(default)]
    pub serving_label: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default = "default_added_at")]
    pub added_at: DateTime<Utc>,
}

fn default_qty() -> f64 {
    1.0
}

fn default_added_at() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

impl FoodEntry {
    pub fn macros(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fat)
    }

    /// Portion text: `"2 x 1 cup"` for quantities above one, else the label
    pub fn portion_label(&self) -> String {
        if self.serving_qty > 1.0 {
            format!("{} x {}", format_qty(self.serving_qty), self.serving_label)
        } else {
            self.serving_label.clone()
        }
    }

    fn apply(&mut self, patch: &EntryPatch) {
        if let Some(food_id) = &patch.food_id {
            self.food_id = food_id.clone();
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(qty) = patch.serving_qty {
            self.serving_qty = qty;
        }
        if let Some(label) = &patch.serving_label {
            self.serving_label = label.clone();
        }
        if let Some(calories) = patch.calories {
            self.calories = calories;
        }
        if let Some(protein) = patch.protein {
            self.protein = protein;
        }
        if let Some(carbs) = patch.carbs {
            self.carbs = carbs;
        }
        if let Some(fat) = patch.fat {
            self.fat = fat;
        }
    }
}

/// Format a quantity without a trailing `.0` (`2`, `1.5`)
pub fn format_qty(qty: f64) -> String {
    if qty.fract() == 0.0 {
        format!("{}", qty as i64)
    } else {
        let s = format!("{:.2}", qty);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Data for a new entry; the store assigns `id` and `addedAt`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub food_id: String,
    pub name: String,
    #[serde(default = "default_qty")]
    pub serving_qty: f64,
    #[serde(default)]
    pub serving_label: String,
    #[serde(flatten)]
    pub macros: Macros,
}

/// Partial update of an entry. `id` and `addedAt` are never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

impl EntryPatch {
    /// Patch that replaces the serving and all four macro values
    pub fn serving(qty: f64, label: impl Into<String>, macros: Macros) -> Self {
        Self {
            serving_qty: Some(qty),
            serving_label: Some(label.into()),
            calories: Some(macros.calories),
            protein: Some(macros.protein),
            carbs: Some(macros.carbs),
            fat: Some(macros.fat),
            ..Default::default()
        }
    }
}

/// Entries logged into one meal slot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    #[serde(default)]
    pub entries: Vec<FoodEntry>,
}

/// The four meal slots; each is always present, possibly empty
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: Meal,
    #[serde(default)]
    pub lunch: Meal,
    #[serde(default)]
    pub dinner: Meal,
    #[serde(default)]
    pub snacks: Meal,
}

/// One calendar day in the diary
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiaryDay {
    #[serde(default)]
    pub meals: Meals,
}

impl DiaryDay {
    pub fn meal(&self, slot: MealSlot) -> &Meal {
        match slot {
            MealSlot::Breakfast => &self.meals.breakfast,
            MealSlot::Lunch => &self.meals.lunch,
            MealSlot::Dinner => &self.meals.dinner,
            MealSlot::Snacks => &self.meals.snacks,
        }
    }

    pub fn meal_mut(&mut self, slot: MealSlot) -> &mut Meal {
        match slot {
            MealSlot::Breakfast => &mut self.meals.breakfast,
            MealSlot::Lunch => &mut self.meals.lunch,
            MealSlot::Dinner => &mut self.meals.dinner,
            MealSlot::Snacks => &mut self.meals.snacks,
        }
    }

    pub fn entries(&self, slot: MealSlot) -> &[FoodEntry] {
        &self.meal(slot).entries
    }

    /// Find an entry by id in a slot
    pub fn find_entry(&self, slot: MealSlot, entry_id: &str) -> Option<&FoodEntry> {
        self.entries(slot).iter().find(|e| e.id == entry_id)
    }

    /// Apply a patch in place; returns the updated entry
    pub(crate) fn patch_entry(
        &mut self,
        slot: MealSlot,
        entry_id: &str,
        patch: &EntryPatch,
    ) -> Option<FoodEntry> {
        let entry = self
            .meal_mut(slot)
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)?;
        entry.apply(patch);
        Some(entry.clone())
    }

    /// Remove an entry; false when no entry has that id
    pub(crate) fn remove_entry(&mut self, slot: MealSlot, entry_id: &str) -> bool {
        let entries = &mut self.meal_mut(slot).entries;
        match entries.iter().position(|e| e.id == entry_id) {
            Some(idx) => {
                entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// All entries across every slot, in display order
    pub fn all_entries(&self) -> impl Iterator<Item = (MealSlot, &FoodEntry)> {
        MealSlot::all()
            .iter()
            .flat_map(move |slot| self.entries(*slot).iter().map(move |e| (*slot, e)))
    }

    pub fn is_empty(&self) -> bool {
        self.all_entries().next().is_none()
    }
}

/// The whole diary, keyed by `YYYY-MM-DD`
pub type Diary = BTreeMap<String, DiaryDay>;

/// Daily targets. Any JSON number is accepted per field and rounded to a
/// whole target, so `1800.5` reads as `1801` instead of failing the document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goals {
    #[serde(default = "default_calorie_goal", deserialize_with = "whole_goal")]
    pub calories: u32,
    #[serde(default = "default_protein_goal", deserialize_with = "whole_goal")]
    pub protein: u32,
    #[serde(default = "default_carbs_goal", deserialize_with = "whole_goal")]
    pub carbs: u32,
    #[serde(default = "default_fat_goal", deserialize_with = "whole_goal")]
    pub fat: u32,
}

fn whole_goal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, u32::MAX as f64) as u32)
}

fn default_calorie_goal() -> u32 {
    2000
}

fn default_protein_goal() -> u32 {
    150
}

fn default_carbs_goal() -> u32 {
    250
}

fn default_fat_goal() -> u32 {
    65
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: default_calorie_goal(),
            protein: default_protein_goal(),
            carbs: default_carbs_goal(),
            fat: default_fat_goal(),
        }
    }
}

/// Placeholder user profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

/// One way of measuring a food (`"1 cup"`, `"g"`, `"1 medium"`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServingUnit {
    pub label: String,
    #[serde(default = "default_qty")]
    pub default_qty: f64,
    /// Multiplier from one of this unit to the food's reference amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
}

impl ServingUnit {
    pub fn new(label: impl Into<String>, default_qty: f64, factor: Option<f64>) -> Self {
        Self {
            label: label.into(),
            default_qty,
            factor,
        }
    }
}

/// A food that can be logged
///
/// Macro values are per reference amount (`reference_grams`, 100 g unless
/// the catalog says otherwise).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub units: Vec<ServingUnit>,
    #[serde(default)]
    pub default_unit: String,
    #[serde(default = "default_reference_grams")]
    pub reference_grams: f64,
    #[serde(flatten)]
    pub macros: Macros,
}

fn default_reference_grams() -> f64 {
    100.0
}

impl FoodDefinition {
    /// Index of the default unit, falling back to the first unit
    pub fn default_unit_index(&self) -> usize {
        self.units
            .iter()
            .position(|u| u.label == self.default_unit)
            .unwrap_or(0)
    }

    pub fn default_unit(&self) -> Option<&ServingUnit> {
        self.units.get(self.default_unit_index())
    }

    pub fn unit_by_label(&self, label: &str) -> Option<&ServingUnit> {
        self.units.iter().find(|u| u.label == label)
    }
}
