//! Page Routes
//!
//! The rendered diary page and the form actions behind its buttons. Every
//! action redirects back to `/` with `303 See Other`; lookups that miss
//! (unknown slot, food or entry) are ignored.
//!
//! - GET / - Rendered page
//! - POST /ui/prev, /ui/next, /ui/today, /ui/date - Date navigation
//! - POST /ui/meals/:slot/add - Open the food picker
//! - POST /ui/picker/search, /ui/picker/select - Picker search and selection
//! - POST /ui/detail, /ui/detail/confirm - Recompute or save the detail panel
//! - POST /ui/panels/close - Close any open panel
//! - POST /ui/entries/:slot/:id/edit, /ui/entries/:slot/:id/remove

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::api::dto::{DateForm, DetailForm, SearchForm, SelectForm};
use crate::api::state::{today, AppState};
use crate::storage::MealSlot;

fn back() -> Redirect {
    Redirect::to("/")
}

fn parse_slot(raw: &str) -> Option<MealSlot> {
    match raw.parse() {
        Ok(slot) => Some(slot),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring UI action");
            None
        }
    }
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut app = state.app.lock().await;
    // entries may have changed through the JSON API
    app.reload();
    Html(app.render(today()))
}

/// POST /ui/prev
pub async fn prev_day(State(state): State<Arc<AppState>>) -> Redirect {
    state.app.lock().await.prev_day();
    back()
}

/// POST /ui/next
pub async fn next_day(State(state): State<Arc<AppState>>) -> Redirect {
    state.app.lock().await.next_day();
    back()
}

/// POST /ui/today
pub async fn go_today(State(state): State<Arc<AppState>>) -> Redirect {
    state.app.lock().await.go_to(today());
    back()
}

/// POST /ui/date
pub async fn go_to_date(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DateForm>,
) -> Redirect {
    match NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d") {
        Ok(date) => state.app.lock().await.go_to(date),
        Err(_) => tracing::debug!(date = %form.date, "Ignoring invalid date"),
    }
    back()
}

/// POST /ui/meals/:slot/add
pub async fn open_picker(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Redirect {
    if let Some(slot) = parse_slot(&slot) {
        state.app.lock().await.open_picker(slot);
    }
    back()
}

/// POST /ui/picker/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Redirect {
    state.app.lock().await.search(&form.q);
    back()
}

/// POST /ui/picker/select
pub async fn select_food(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SelectForm>,
) -> Redirect {
    state.app.lock().await.select_food(&form.food_id);
    back()
}

/// POST /ui/detail
pub async fn update_detail(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DetailForm>,
) -> Redirect {
    state
        .app
        .lock()
        .await
        .set_detail(form.unit_index(), form.qty());
    back()
}

/// POST /ui/detail/confirm
///
/// Applies the submitted unit and quantity before saving.
pub async fn confirm_detail(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DetailForm>,
) -> Redirect {
    let mut app = state.app.lock().await;
    app.set_detail(form.unit_index(), form.qty());
    app.confirm_detail();
    back()
}

/// POST /ui/panels/close
pub async fn close_panels(State(state): State<Arc<AppState>>) -> Redirect {
    state.app.lock().await.close_panels();
    back()
}

/// POST /ui/entries/:slot/:id/edit
pub async fn edit_entry(
    State(state): State<Arc<AppState>>,
    Path((slot, id)): Path<(String, String)>,
) -> Redirect {
    if let Some(slot) = parse_slot(&slot) {
        state.app.lock().await.edit_entry(slot, &id);
    }
    back()
}

/// POST /ui/entries/:slot/:id/remove
pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    Path((slot, id)): Path<(String, String)>,
) -> Redirect {
    if let Some(slot) = parse_slot(&slot) {
        state.app.lock().await.remove_entry(slot, &id);
    }
    back()
}
