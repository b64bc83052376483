//! Presentation
//!
//! Server-rendered diary page. [`views`] holds the Leptos components that
//! turn a [`PageModel`] into HTML; interactive pieces are plain POST forms
//! handled by the `/ui/*` routes.

pub mod format;
pub mod views;

pub use format::{date_label, progress_class, progress_pct, rounded};
pub use views::{
    render_page, render_to_html, DateHeader, DetailModel, DiaryPage, FoodDetail, FoodListItem,
    FoodPicker, MealSection, Meals, PageModel, PickerModel, ProgressBar, SummaryCard,
};
