//! Diary Store
//!
//! Date-keyed diary persistence on top of a [`KeyValueStore`]:
//! - Diary days under `ct_diary` (one JSON object keyed by `YYYY-MM-DD`)
//! - Goals under `ct_goals`
//! - Profile under `ct_profile`
//! - Custom foods under `ct_custom_foods`
//!
//! Every read or write failure is logged and answered with an empty or
//! default value. Callers never see a storage error.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::kv::KeyValueStore;
use crate::storage::types::{
    Diary, DiaryDay, EntryPatch, FoodDefinition, FoodEntry, Goals, MealSlot, NewEntry, Profile,
};
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;

/// Keys of the documents held in the key-value store
pub mod keys {
    pub const DIARY: &str = "ct_diary";
    pub const GOALS: &str = "ct_goals";
    pub const PROFILE: &str = "ct_profile";
    pub const CUSTOM_FOODS: &str = "ct_custom_foods";
}

/// Canonical diary key for a date: `YYYY-MM-DD`
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Diary persistence service
pub struct DiaryStore {
    kv: Box<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles on the diary document
    write_lock: Mutex<()>,
}

impl DiaryStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// True when the backing store answers a read
    pub fn probe(&self) -> bool {
        match self.kv.get(keys::GOALS) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Storage probe failed");
                false
            }
        }
    }

    // ---------- low-level helpers ----------

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.kv.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Storage read error");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| self.kv.set(key, &raw));

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Storage write error");
                false
            }
        }
    }

    fn load_diary(&self) -> Diary {
        self.read(keys::DIARY).unwrap_or_default()
    }

    /// Run `f` against the diary and persist it when `f` reports a change
    fn modify_diary<R>(&self, f: impl FnOnce(&mut Diary) -> (R, bool)) -> R {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut diary = self.load_diary();
        let (result, changed) = f(&mut diary);
        if changed {
            self.write(keys::DIARY, &diary);
        }
        result
    }

    // ---------- diary ----------

    /// Meals for a date; an empty day with all four slots when nothing is logged
    pub fn get_day(&self, date: NaiveDate) -> DiaryDay {
        self.load_diary()
            .remove(&date_key(date))
            .unwrap_or_default()
    }

    /// Add an entry to a meal, assigning a fresh id and timestamp
    pub fn add_entry(&self, date: NaiveDate, slot: MealSlot, data: NewEntry) -> FoodEntry {
        let key = date_key(date);

        self.modify_diary(|diary| {
            let day = diary.entry(key.clone()).or_default();
            let entry = FoodEntry {
                id: generate_id(day),
                food_id: data.food_id,
                name: data.name,
                serving_qty: data.serving_qty,
                serving_label: data.serving_label,
                calories: data.macros.calories,
                protein: data.macros.protein,
                carbs: data.macros.carbs,
                fat: data.macros.fat,
                added_at: Utc::now(),
            };
            day.meal_mut(slot).entries.push(entry.clone());

            tracing::info!(date = %key, slot = %slot, entry_id = %entry.id, food_id = %entry.food_id, "Added entry");
            (entry, true)
        })
    }

    /// Update an existing entry; `None` when the day or entry does not exist
    pub fn update_entry(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        entry_id: &str,
        patch: &EntryPatch,
    ) -> Option<FoodEntry> {
        let key = date_key(date);

        self.modify_diary(|diary| {
            let updated = diary
                .get_mut(&key)
                .and_then(|day| day.patch_entry(slot, entry_id, patch));

            match &updated {
                Some(_) => tracing::info!(date = %key, slot = %slot, entry_id = %entry_id, "Updated entry"),
                None => tracing::debug!(date = %key, slot = %slot, entry_id = %entry_id, "Entry to update not found"),
            }

            let changed = updated.is_some();
            (updated, changed)
        })
    }

    /// Remove an entry; false when the day or entry does not exist
    pub fn remove_entry(&self, date: NaiveDate, slot: MealSlot, entry_id: &str) -> bool {
        let key = date_key(date);

        self.modify_diary(|diary| {
            let removed = diary
                .get_mut(&key)
                .map(|day| day.remove_entry(slot, entry_id))
                .unwrap_or(false);

            if removed {
                tracing::info!(date = %key, slot = %slot, entry_id = %entry_id, "Removed entry");
            }
            (removed, removed)
        })
    }

    /// Distinct food ids across the whole diary, most recently added first
    pub fn recent_food_ids(&self, limit: usize) -> Vec<String> {
        let diary = self.load_diary();

        let mut entries: Vec<&FoodEntry> = diary
            .values()
            .flat_map(|day| day.all_entries().map(|(_, e)| e))
            .filter(|e| !e.food_id.is_empty())
            .collect();
        entries.sort_by(|a, b| b.added_at.cmp(&a.added_at));

        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|e| seen.insert(e.food_id.as_str()))
            .take(limit)
            .map(|e| e.food_id.clone())
            .collect()
    }

    // ---------- goals ----------

    /// Daily goals, default-filled when unset or partially set
    pub fn get_goals(&self) -> Goals {
        self.read(keys::GOALS).unwrap_or_default()
    }

    pub fn save_goals(&self, goals: &Goals) {
        if self.write(keys::GOALS, goals) {
            tracing::info!(
                calories = goals.calories,
                protein = goals.protein,
                carbs = goals.carbs,
                fat = goals.fat,
                "Saved goals"
            );
        }
    }

    // ---------- profile ----------

    pub fn get_profile(&self) -> Profile {
        self.read(keys::PROFILE).unwrap_or_default()
    }

    pub fn save_profile(&self, profile: &Profile) {
        self.write(keys::PROFILE, profile);
    }

    // ---------- custom foods ----------

    pub fn get_custom_foods(&self) -> Vec<FoodDefinition> {
        self.read(keys::CUSTOM_FOODS).unwrap_or_default()
    }

    /// Store a custom food, replacing one with the same id
    pub fn add_custom_food(&self, food: FoodDefinition) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut foods = self.get_custom_foods();
        match foods.iter_mut().find(|f| f.id == food.id) {
            Some(existing) => *existing = food.clone(),
            None => foods.push(food.clone()),
        }

        if self.write(keys::CUSTOM_FOODS, &foods) {
            tracing::info!(food_id = %food.id, "Saved custom food");
        }
    }
}

/// Entry id unique within the day
fn generate_id(day: &DiaryDay) -> String {
    loop {
        let id = uuid::Uuid::new_v4().simple().to_string();
        if day.all_entries().all(|(_, e)| e.id != id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryStore;
    use crate::storage::nutrition::compute_day_totals;
    use crate::storage::types::Macros;

    fn store() -> DiaryStore {
        DiaryStore::new(Box::new(MemoryStore::new()))
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn new_entry(food_id: &str, calories: f64) -> NewEntry {
        NewEntry {
            food_id: food_id.to_string(),
            name: food_id.to_uppercase(),
            serving_qty: 1.0,
            serving_label: "1 serving".to_string(),
            macros: Macros::new(calories, 10.0, 20.0, 5.0),
        }
    }

    #[test]
    fn test_date_key_format() {
        assert_eq!(date_key(date(6)), "2026-02-06");
    }

    #[test]
    fn test_unknown_day_is_empty() {
        let store = store();
        let day = store.get_day(date(16));
        assert!(day.is_empty());
        assert_eq!(day, DiaryDay::default());
    }

    #[test]
    fn test_add_entry_assigns_id_and_persists() {
        let store = store();
        let entry = store.add_entry(date(16), MealSlot::Breakfast, new_entry("banana", 105.0));

        assert!(!entry.id.is_empty());
        assert_eq!(entry.food_id, "banana");

        let day = store.get_day(date(16));
        assert_eq!(day.entries(MealSlot::Breakfast), &[entry]);
        assert!(day.entries(MealSlot::Lunch).is_empty());
        assert!(store.get_day(date(17)).is_empty());
    }

    #[test]
    fn test_entry_ids_unique_within_day() {
        let store = store();
        let mut ids = HashSet::new();
        for slot in MealSlot::all() {
            for _ in 0..5 {
                let entry = store.add_entry(date(16), *slot, new_entry("oats", 150.0));
                assert!(ids.insert(entry.id));
            }
        }
    }

    #[test]
    fn test_add_then_remove_restores_totals() {
        let store = store();
        store.add_entry(date(16), MealSlot::Lunch, new_entry("rice", 206.0));
        let before = compute_day_totals(&store.get_day(date(16)));

        let added = store.add_entry(date(16), MealSlot::Lunch, new_entry("chicken", 248.0));
        let during = compute_day_totals(&store.get_day(date(16)));
        assert_eq!(during.calories, before.calories + 248.0);

        assert!(store.remove_entry(date(16), MealSlot::Lunch, &added.id));
        assert_eq!(compute_day_totals(&store.get_day(date(16))), before);
    }

    #[test]
    fn test_remove_missing_entry() {
        let store = store();
        assert!(!store.remove_entry(date(16), MealSlot::Dinner, "nope"));

        let entry = store.add_entry(date(16), MealSlot::Dinner, new_entry("salmon", 208.0));
        assert!(!store.remove_entry(date(16), MealSlot::Lunch, &entry.id));
        assert!(!store.remove_entry(date(16), MealSlot::Dinner, "nope"));
    }

    #[test]
    fn test_update_entry() {
        let store = store();
        let entry = store.add_entry(date(16), MealSlot::Snacks, new_entry("almonds", 164.0));

        let patch = EntryPatch::serving(2.0, "1 oz", Macros::new(328.0, 12.0, 12.0, 28.0));
        let updated = store
            .update_entry(date(16), MealSlot::Snacks, &entry.id, &patch)
            .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.added_at, entry.added_at);
        assert_eq!(updated.serving_qty, 2.0);
        assert_eq!(updated.calories, 328.0);
        assert_eq!(updated.name, "ALMONDS");

        let day = store.get_day(date(16));
        assert_eq!(day.find_entry(MealSlot::Snacks, &entry.id), Some(&updated));
    }

    #[test]
    fn test_update_missing_entry_returns_none() {
        let store = store();
        let patch = EntryPatch {
            calories: Some(1.0),
            ..Default::default()
        };
        assert!(store.update_entry(date(16), MealSlot::Lunch, "x", &patch).is_none());
    }

    #[test]
    fn test_goals_default_when_unset() {
        let store = store();
        assert_eq!(
            store.get_goals(),
            Goals {
                calories: 2000,
                protein: 150,
                carbs: 250,
                fat: 65
            }
        );

        let goals = Goals {
            calories: 1800,
            protein: 140,
            carbs: 180,
            fat: 60,
        };
        store.save_goals(&goals);
        assert_eq!(store.get_goals(), goals);
    }

    #[test]
    fn test_stored_fractional_goals_are_kept() {
        let kv = MemoryStore::new();
        kv.set(keys::GOALS, r#"{"calories": 1800.5, "protein": 140}"#).unwrap();
        let store = DiaryStore::new(Box::new(kv));

        let goals = store.get_goals();
        assert_eq!(goals.calories, 1801);
        assert_eq!(goals.protein, 140);
        assert_eq!(goals.fat, 65);
    }

    #[test]
    fn test_corrupt_documents_fall_back_to_defaults() {
        let kv = MemoryStore::new();
        kv.set(keys::DIARY, "{not json").unwrap();
        kv.set(keys::GOALS, "[1, 2]").unwrap();
        let store = DiaryStore::new(Box::new(kv));

        assert!(store.get_day(date(16)).is_empty());
        assert_eq!(store.get_goals(), Goals::default());
        assert!(store.recent_food_ids(5).is_empty());

        // a write replaces the corrupt document with a fresh diary
        let entry = store.add_entry(date(16), MealSlot::Lunch, new_entry("rice", 206.0));
        assert_eq!(store.get_day(date(16)).entries(MealSlot::Lunch), &[entry]);
    }

    #[test]
    fn test_recent_food_ids_distinct_newest_first() {
        let store = store();
        store.add_entry(date(14), MealSlot::Breakfast, new_entry("oats", 150.0));
        store.add_entry(date(15), MealSlot::Lunch, new_entry("rice", 206.0));
        store.add_entry(date(16), MealSlot::Dinner, new_entry("oats", 150.0));
        store.add_entry(date(16), MealSlot::Snacks, new_entry("almonds", 164.0));

        // identical timestamps are possible on fast machines; pin them
        let days = [
            (14, MealSlot::Breakfast, 1),
            (15, MealSlot::Lunch, 2),
            (16, MealSlot::Dinner, 3),
            (16, MealSlot::Snacks, 4),
        ];
        let mut diary: Diary = store.read(keys::DIARY).unwrap();
        for (d, slot, minute) in days {
            let entry = &mut diary.get_mut(&date_key(date(d))).unwrap().meal_mut(slot).entries[0];
            let stamp = format!("2026-02-16T10:0{}:00Z", minute);
            entry.added_at = chrono::DateTime::parse_from_rfc3339(&stamp)
                .unwrap()
                .with_timezone(&Utc);
        }
        store.write(keys::DIARY, &diary);

        assert_eq!(store.recent_food_ids(10), vec!["almonds", "oats", "rice"]);
        assert_eq!(store.recent_food_ids(2), vec!["almonds", "oats"]);
        assert!(store.recent_food_ids(0).is_empty());
    }

    #[test]
    fn test_profile_and_custom_foods() {
        let store = store();
        assert_eq!(store.get_profile(), Profile::default());
        assert!(store.get_custom_foods().is_empty());

        let profile = Profile {
            display_name: Some("Sam".to_string()),
            weight_kg: Some(70.5),
        };
        store.save_profile(&profile);
        assert_eq!(store.get_profile(), profile);

        let mut food = FoodDefinition {
            id: "protein_bar".to_string(),
            name: "Protein Bar".to_string(),
            units: vec![],
            default_unit: String::new(),
            reference_grams: 100.0,
            macros: Macros::new(200.0, 20.0, 22.0, 7.0),
        };
        store.add_custom_food(food.clone());
        food.name = "Protein Bar, chocolate".to_string();
        store.add_custom_food(food.clone());

        assert_eq!(store.get_custom_foods(), vec![food]);
    }
}
