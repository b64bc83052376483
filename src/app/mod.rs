//! Diary Orchestrator
//!
//! [`DiaryApp`] owns the page state: the selected date, the loaded day and
//! the open panel (food picker or food detail). Every action updates that
//! state and, when it touches the diary, writes through the [`DiaryStore`]
//! and reloads. The HTTP layer renders [`DiaryApp::page_model`] after each
//! action.
//!
//! Lookups that miss (unknown food, unknown entry, no open panel) leave the
//! state unchanged and report `false` / `None`.

pub mod foods;

pub use foods::{all_foods, display_serving, find_food, list_item, new_entry, resolve_unit, search_items};

use chrono::NaiveDate;
use std::sync::Arc;

use crate::catalog::{CatalogHandle, CatalogStatus};
use crate::storage::{
    compute_day_totals, compute_meal_totals, compute_nutrition, DiaryDay, DiaryStore, EntryPatch,
    FoodDefinition, FoodEntry, MealSlot, ServingUnit, Totals,
};
use crate::ui::{render_page, DetailModel, FoodListItem, PageModel, PickerModel};

/// Default length of the recent foods list
pub const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct PickerState {
    slot: MealSlot,
    query: String,
}

#[derive(Debug, Clone)]
struct DetailState {
    slot: MealSlot,
    food: FoodDefinition,
    unit_index: usize,
    qty: f64,
    /// Entry being edited, `None` when adding
    entry_id: Option<String>,
}

impl DetailState {
    /// Selected unit, or the fallback serving for foods without units
    fn unit(&self) -> Option<ServingUnit> {
        self.food
            .units
            .get(self.unit_index)
            .cloned()
            .or_else(|| resolve_unit(&self.food, None))
    }
}

/// Page state and actions for one diary
pub struct DiaryApp {
    store: Arc<DiaryStore>,
    catalog: CatalogHandle,
    date: NaiveDate,
    day: DiaryDay,
    recent_limit: usize,
    picker: Option<PickerState>,
    detail: Option<DetailState>,
}

impl DiaryApp {
    pub fn new(
        store: Arc<DiaryStore>,
        catalog: CatalogHandle,
        date: NaiveDate,
        recent_limit: usize,
    ) -> Self {
        let day = store.get_day(date);
        Self {
            store,
            catalog,
            date,
            day,
            recent_limit,
            picker: None,
            detail: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day(&self) -> &DiaryDay {
        &self.day
    }

    /// Re-read the current day from the store
    pub fn reload(&mut self) {
        self.day = self.store.get_day(self.date);
    }

    // ---------- navigation ----------

    /// Step back one day; stays put at the earliest representable date
    pub fn prev_day(&mut self) {
        match self.date.pred_opt() {
            Some(date) => self.go_to(date),
            None => tracing::debug!(date = %self.date, "No earlier date"),
        }
    }

    /// Step forward one day; stays put at the latest representable date
    pub fn next_day(&mut self) {
        match self.date.succ_opt() {
            Some(date) => self.go_to(date),
            None => tracing::debug!(date = %self.date, "No later date"),
        }
    }

    /// Jump to `date`, closing any open panel
    pub fn go_to(&mut self, date: NaiveDate) {
        self.date = date;
        self.close_panels();
        self.reload();
        tracing::debug!(date = %date, "Selected date");
    }

    // ---------- totals ----------

    pub fn totals(&self) -> Totals {
        compute_day_totals(&self.day)
    }

    pub fn meal_totals(&self) -> Vec<(MealSlot, Totals)> {
        MealSlot::all()
            .iter()
            .map(|slot| (*slot, compute_meal_totals(self.day.entries(*slot))))
            .collect()
    }

    // ---------- foods ----------

    /// Catalog foods plus custom foods
    pub fn all_foods(&self) -> Vec<FoodDefinition> {
        all_foods(&self.catalog.current(), &self.store.get_custom_foods())
    }

    pub fn find_food(&self, food_id: &str) -> Option<FoodDefinition> {
        find_food(
            &self.catalog.current(),
            &self.store.get_custom_foods(),
            food_id,
        )
    }

    /// Recently logged foods that are still known, newest first
    pub fn recent_foods(&self) -> Vec<FoodDefinition> {
        let catalog = self.catalog.current();
        let custom = self.store.get_custom_foods();
        self.store
            .recent_food_ids(self.recent_limit)
            .iter()
            .filter_map(|id| find_food(&catalog, &custom, id))
            .collect()
    }

    // ---------- food picker ----------

    /// Open the picker for `slot` with an empty query
    pub fn open_picker(&mut self, slot: MealSlot) {
        self.detail = None;
        self.picker = Some(PickerState {
            slot,
            query: String::new(),
        });
    }

    /// Set the picker's search query; false when the picker is closed
    pub fn search(&mut self, query: &str) -> bool {
        match self.picker.as_mut() {
            Some(picker) => {
                picker.query = query.to_string();
                true
            }
            None => false,
        }
    }

    /// Move from the picker to the detail panel for `food_id`
    pub fn select_food(&mut self, food_id: &str) -> bool {
        let Some(slot) = self.picker.as_ref().map(|p| p.slot) else {
            return false;
        };
        let Some(food) = self.find_food(food_id) else {
            tracing::debug!(food_id = %food_id, "Selected food not found");
            return false;
        };

        let unit_index = food.default_unit_index();
        let qty = food.units.get(unit_index).map(|u| u.default_qty).unwrap_or(1.0);

        self.picker = None;
        self.detail = Some(DetailState {
            slot,
            food,
            unit_index,
            qty,
            entry_id: None,
        });
        true
    }

    // ---------- food detail ----------

    /// Update unit and quantity in the detail panel.
    ///
    /// Picking a different unit resets the quantity to that unit's default;
    /// otherwise `qty` replaces the quantity when given. False when the panel
    /// is closed.
    pub fn set_detail(&mut self, unit_index: Option<usize>, qty: Option<f64>) -> bool {
        let Some(detail) = self.detail.as_mut() else {
            return false;
        };

        match unit_index {
            Some(idx) if idx != detail.unit_index && idx < detail.food.units.len() => {
                detail.unit_index = idx;
                detail.qty = detail.food.units[idx].default_qty;
            }
            _ => {
                if let Some(qty) = qty.filter(|q| q.is_finite() && *q >= 0.0) {
                    detail.qty = qty;
                }
            }
        }
        true
    }

    /// Persist the detail panel: add a new entry or update the edited one.
    ///
    /// Closes the panel and reloads on success.
    pub fn confirm_detail(&mut self) -> Option<FoodEntry> {
        let detail = self.detail.as_ref()?;
        let conversions = self.catalog.current().unit_conversions.clone();
        let unit = detail.unit()?;

        let data = new_entry(&detail.food, detail.qty, &unit, &conversions);
        let saved = match &detail.entry_id {
            Some(entry_id) => {
                let patch = EntryPatch::serving(data.serving_qty, data.serving_label, data.macros);
                self.store
                    .update_entry(self.date, detail.slot, entry_id, &patch)
            }
            None => Some(self.store.add_entry(self.date, detail.slot, data)),
        };

        if saved.is_some() {
            self.detail = None;
            self.reload();
        }
        saved
    }

    // ---------- entries ----------

    /// Open the detail panel prefilled from an existing entry
    pub fn edit_entry(&mut self, slot: MealSlot, entry_id: &str) -> bool {
        let Some(entry) = self.day.find_entry(slot, entry_id).cloned() else {
            return false;
        };
        let Some(food) = self.find_food(&entry.food_id) else {
            tracing::debug!(entry_id = %entry_id, food_id = %entry.food_id, "Food for entry not found");
            return false;
        };

        let unit_index = food
            .units
            .iter()
            .position(|u| u.label == entry.serving_label)
            .unwrap_or_else(|| food.default_unit_index());

        self.picker = None;
        self.detail = Some(DetailState {
            slot,
            food,
            unit_index,
            qty: entry.serving_qty,
            entry_id: Some(entry.id),
        });
        true
    }

    pub fn remove_entry(&mut self, slot: MealSlot, entry_id: &str) -> bool {
        let removed = self.store.remove_entry(self.date, slot, entry_id);
        if removed {
            if self
                .detail
                .as_ref()
                .and_then(|d| d.entry_id.as_deref())
                == Some(entry_id)
            {
                self.detail = None;
            }
            self.reload();
        }
        removed
    }

    pub fn close_panels(&mut self) {
        self.picker = None;
        self.detail = None;
    }

    // ---------- rendering ----------

    /// Snapshot of everything the page shows
    pub fn page_model(&self, today: NaiveDate) -> PageModel {
        PageModel {
            date: self.date,
            today,
            day: self.day.clone(),
            totals: self.totals(),
            meal_totals: self.meal_totals(),
            goals: self.store.get_goals(),
            picker: self.picker_model(),
            detail: self.detail_model(),
        }
    }

    pub fn render(&self, today: NaiveDate) -> String {
        render_page(&self.page_model(today))
    }

    fn picker_model(&self) -> Option<PickerModel> {
        let picker = self.picker.as_ref()?;
        let catalog = self.catalog.current();
        let conversions = &catalog.unit_conversions;

        let recent: Vec<FoodListItem> = if picker.query.trim().is_empty() {
            self.recent_foods()
                .iter()
                .map(|food| list_item(food, conversions))
                .collect()
        } else {
            Vec::new()
        };

        Some(PickerModel {
            slot: picker.slot,
            query: picker.query.clone(),
            recent,
            results: search_items(&self.all_foods(), &picker.query, conversions),
            catalog_loading: self.catalog.status() == CatalogStatus::Loading,
        })
    }

    fn detail_model(&self) -> Option<DetailModel> {
        let detail = self.detail.as_ref()?;
        let conversions = self.catalog.current().unit_conversions.clone();
        let unit = detail.unit()?;
        let nutrition = compute_nutrition(&detail.food, detail.qty, &unit, &conversions);

        Some(DetailModel {
            slot: detail.slot,
            food_name: detail.food.name.clone(),
            unit_labels: detail.food.units.iter().map(|u| u.label.clone()).collect(),
            unit_index: detail.unit_index,
            qty: detail.qty,
            nutrition,
            editing: detail.entry_id.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::storage::{Macros, MemoryStore, NewEntry};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    fn app_with(catalog: CatalogHandle) -> DiaryApp {
        let store = Arc::new(DiaryStore::new(Box::new(MemoryStore::new())));
        DiaryApp::new(store, catalog, date(), DEFAULT_RECENT_LIMIT)
    }

    fn app() -> DiaryApp {
        app_with(CatalogHandle::ready(sample_catalog()))
    }

    #[test]
    fn test_navigation_round_trip() {
        let mut app = app();
        app.prev_day();
        assert_eq!(app.date(), NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
        app.next_day();
        app.next_day();
        assert_eq!(app.date(), NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        app.prev_day();
        assert_eq!(app.date(), date());
    }

    #[test]
    fn test_navigation_stops_at_date_limits() {
        let mut app = app();
        app.go_to(NaiveDate::MAX);
        app.open_picker(MealSlot::Lunch);
        app.next_day();
        assert_eq!(app.date(), NaiveDate::MAX);
        assert!(app.page_model(date()).picker.is_some());
        app.prev_day();
        assert_eq!(app.date(), NaiveDate::MAX.pred_opt().unwrap());

        app.go_to(NaiveDate::MIN);
        app.prev_day();
        assert_eq!(app.date(), NaiveDate::MIN);
        app.next_day();
        assert_eq!(app.date(), NaiveDate::MIN.succ_opt().unwrap());
    }

    #[test]
    fn test_navigation_closes_panels_and_reloads() {
        let mut app = app();
        app.store.add_entry(
            date().succ_opt().unwrap(),
            MealSlot::Lunch,
            NewEntry {
                food_id: "banana".to_string(),
                name: "Banana".to_string(),
                serving_qty: 1.0,
                serving_label: "1 serving".to_string(),
                macros: Macros::new(105.0, 1.3, 27.0, 0.4),
            },
        );

        app.open_picker(MealSlot::Lunch);
        app.next_day();
        assert!(app.page_model(date()).picker.is_none());
        assert_eq!(app.totals().calories, 105.0);
    }

    #[test]
    fn test_add_flow() {
        let mut app = app();
        app.open_picker(MealSlot::Breakfast);
        assert!(app.search("oats"));
        assert_eq!(app.page_model(date()).picker.unwrap().results.len(), 1);

        assert!(app.select_food("oats_rolled"));
        let model = app.page_model(date());
        assert!(model.picker.is_none());
        let detail = model.detail.unwrap();
        assert_eq!(detail.unit_index, 0);
        assert_eq!(detail.qty, 1.0);
        assert_eq!(detail.nutrition.calories, 154.0);

        assert!(app.set_detail(Some(0), Some(2.0)));
        let entry = app.confirm_detail().unwrap();
        assert_eq!(entry.serving_qty, 2.0);
        assert_eq!(entry.calories, 308.0);

        assert!(app.page_model(date()).detail.is_none());
        assert_eq!(app.day().entries(MealSlot::Breakfast).len(), 1);
        assert_eq!(app.totals().calories, 308.0);
    }

    #[test]
    fn test_unit_change_resets_quantity() {
        let mut app = app();
        app.open_picker(MealSlot::Snacks);
        app.select_food("banana");
        app.set_detail(None, Some(3.0));
        assert_eq!(app.page_model(date()).detail.unwrap().qty, 3.0);

        app.set_detail(Some(1), Some(3.0));
        let detail = app.page_model(date()).detail.unwrap();
        assert_eq!(detail.unit_index, 1);
        assert_eq!(detail.qty, 100.0);
        assert_eq!(detail.nutrition.calories, 105.0);
    }

    #[test]
    fn test_food_without_units_shows_what_is_saved() {
        let mut app = app();
        app.store.add_custom_food(FoodDefinition {
            id: "broth".to_string(),
            name: "Bone broth".to_string(),
            units: Vec::new(),
            default_unit: String::new(),
            reference_grams: 100.0,
            macros: Macros::new(33.33, 1.234, 0.5, 0.25),
        });

        app.open_picker(MealSlot::Dinner);
        assert!(app.select_food("broth"));
        app.set_detail(None, Some(1.5));
        let shown = app.page_model(date()).detail.unwrap().nutrition;
        assert_eq!(shown, Macros::new(50.0, 1.9, 0.8, 0.4));

        let entry = app.confirm_detail().unwrap();
        assert_eq!(entry.serving_label, "serving");
        assert_eq!(entry.macros(), shown);
    }

    #[test]
    fn test_edit_entry_updates_in_place() {
        let mut app = app();
        app.open_picker(MealSlot::Dinner);
        app.select_food("chicken_breast");
        let added = app.confirm_detail().unwrap();

        assert!(app.edit_entry(MealSlot::Dinner, &added.id));
        assert!(app.page_model(date()).detail.unwrap().editing);
        app.set_detail(None, Some(2.0));
        let updated = app.confirm_detail().unwrap();

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.calories, 330.0);
        assert_eq!(app.day().entries(MealSlot::Dinner).len(), 1);
    }

    #[test]
    fn test_remove_entry() {
        let mut app = app();
        let before = app.totals();
        app.open_picker(MealSlot::Lunch);
        app.select_food("greek_yogurt");
        let entry = app.confirm_detail().unwrap();
        assert_ne!(app.totals(), before);

        assert!(app.remove_entry(MealSlot::Lunch, &entry.id));
        assert_eq!(app.totals(), before);
        assert!(!app.remove_entry(MealSlot::Lunch, &entry.id));
    }

    #[test]
    fn test_missing_lookups_short_circuit() {
        let mut app = app();
        assert!(!app.search("oats"));
        assert!(!app.select_food("banana"));
        assert!(!app.set_detail(Some(1), None));
        assert!(app.confirm_detail().is_none());
        assert!(!app.edit_entry(MealSlot::Lunch, "nope"));

        app.open_picker(MealSlot::Lunch);
        assert!(!app.select_food("pizza"));
        assert!(app.page_model(date()).picker.is_some());
    }

    #[test]
    fn test_recent_foods_listed_when_query_empty() {
        let mut app = app();
        for id in ["banana", "oats_rolled"] {
            app.open_picker(MealSlot::Breakfast);
            app.select_food(id);
            app.confirm_detail();
        }

        app.open_picker(MealSlot::Lunch);
        let picker = app.page_model(date()).picker.unwrap();
        assert_eq!(picker.recent.len(), 2);
        assert_eq!(picker.results.len(), 4);

        app.search("ban");
        assert!(app.page_model(date()).picker.unwrap().recent.is_empty());
    }

    #[test]
    fn test_catalog_loading_degrades_picker() {
        let mut app = app_with(CatalogHandle::new());
        app.open_picker(MealSlot::Lunch);
        let picker = app.page_model(date()).picker.unwrap();
        assert!(picker.catalog_loading);
        assert!(picker.results.is_empty());
        assert!(!app.select_food("banana"));
    }

    #[test]
    fn test_render_contains_page_contract() {
        let app = app();
        let html = app.render(date());
        for id in ["date-label", "meals-container", "summary-calories", "food-detail-screen", "add-food-panel"] {
            assert!(html.contains(&format!("id=\"{}\"", id)), "missing {}", id);
        }
        assert!(html.contains("Today, Feb 16"));
    }
}
