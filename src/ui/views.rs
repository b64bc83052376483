//! Views
//!
//! Leptos components rendered to HTML on the server. Element ids form the
//! contract the page, its styles and its tests rely on (`date-label`,
//! `summary-calories`, `fd-qty`, ...). Every render rebuilds from scratch;
//! interactive pieces are plain POST forms handled by the `/ui/*` routes.

use chrono::NaiveDate;
use leptos::*;

use crate::storage::{format_qty, DiaryDay, FoodEntry, Goals, Macros, MealSlot, Totals};
use crate::ui::format::{date_label, progress_class, progress_pct, rounded};

/// Everything the page needs for one render
#[derive(Debug, Clone)]
pub struct PageModel {
    pub date: NaiveDate,
    pub today: NaiveDate,
    pub day: DiaryDay,
    pub totals: Totals,
    /// Per-slot totals in display order
    pub meal_totals: Vec<(MealSlot, Totals)>,
    pub goals: Goals,
    pub picker: Option<PickerModel>,
    pub detail: Option<DetailModel>,
}

/// One row of the food picker
#[derive(Debug, Clone, PartialEq)]
pub struct FoodListItem {
    pub food_id: String,
    pub name: String,
    pub display_serving: String,
    pub display_calories: i64,
}

/// Food picker panel state
#[derive(Debug, Clone, PartialEq)]
pub struct PickerModel {
    pub slot: MealSlot,
    pub query: String,
    /// Recently logged foods, shown above the list while the query is empty
    pub recent: Vec<FoodListItem>,
    pub results: Vec<FoodListItem>,
    pub catalog_loading: bool,
}

/// Food detail panel state
#[derive(Debug, Clone, PartialEq)]
pub struct DetailModel {
    pub slot: MealSlot,
    pub food_name: String,
    pub unit_labels: Vec<String>,
    pub unit_index: usize,
    pub qty: f64,
    pub nutrition: Macros,
    /// True when the panel edits an existing entry instead of adding one
    pub editing: bool,
}

/// A single-button form posting to `action`
#[component]
fn ActionButton(
    #[prop(into)]
    action: String,
    #[prop(into)]
    label: String,
    #[prop(optional, into)]
    button_id: Option<String>,
    #[prop(optional, into)]
    button_class: Option<String>,
    #[prop(optional, into)]
    title: Option<String>,
) -> impl IntoView {
    view! {
        <form method="post" action=action>
            <button type="submit" id=button_id class=button_class title=title>{label}</button>
        </form>
    }
}

// ---------- date header ----------

#[component]
pub fn DateHeader(date: NaiveDate, today: NaiveDate) -> impl IntoView {
    view! {
        <header class="date-header">
            <ActionButton action="/ui/prev" label="‹" button_id="prev-day-btn" button_class="nav-btn" title="Previous day"/>
            <h1 id="date-label">{date_label(date, today)}</h1>
            <ActionButton action="/ui/next" label="›" button_id="next-day-btn" button_class="nav-btn" title="Next day"/>
            {(date != today).then(|| view! {
                <ActionButton action="/ui/today" label="Today" button_id="today-btn" button_class="nav-btn"/>
            })}
        </header>
    }
}

// ---------- summary card ----------

#[component]
pub fn SummaryCard(totals: Totals, goals: Goals) -> impl IntoView {
    let remaining = goals.calories as i64 - rounded(totals.calories);
    let remaining_class = if remaining < 0 {
        "remaining-value over"
    } else {
        "remaining-value"
    };

    view! {
        <section id="summary-card" class="summary-card">
            <div class="summary-calories">
                <span id="summary-calories" class="summary-value">{rounded(totals.calories).to_string()}</span>
                <span class="summary-sep">" / "</span>
                <span id="goal-calories" class="summary-goal">{goals.calories.to_string()}</span>
                <div class="summary-remaining">
                    <span id="remaining-calories" class=remaining_class>{remaining.to_string()}</span>
                    <span class="remaining-label">" remaining"</span>
                </div>
                <ProgressBar metric="calories" current=totals.calories goal=goals.calories/>
            </div>
            <div class="summary-macros">
                <MacroSummary metric="protein" label="Protein" current=totals.protein goal=goals.protein/>
                <MacroSummary metric="carbs" label="Carbs" current=totals.carbs goal=goals.carbs/>
                <MacroSummary metric="fat" label="Fat" current=totals.fat goal=goals.fat/>
            </div>
        </section>
    }
}

#[component]
fn MacroSummary(metric: &'static str, label: &'static str, current: f64, goal: u32) -> impl IntoView {
    view! {
        <div class="summary-macro">
            <span class="macro-label">{label}</span>
            <span id=format!("summary-{}", metric) class="summary-value">{format!("{}g", rounded(current))}</span>
            <span class="summary-sep">" / "</span>
            <span id=format!("goal-{}", metric) class="summary-goal">{format!("{}g", goal)}</span>
            <ProgressBar metric=metric current=current goal=goal/>
        </div>
    }
}

/// Fill capped at 100%, colored by how close `current` is to `goal`
#[component]
pub fn ProgressBar(metric: &'static str, current: f64, goal: u32) -> impl IntoView {
    let pct = progress_pct(current, goal);

    view! {
        <div class="progress">
            <div
                id=format!("progress-{}", metric)
                class=format!("progress-bar {}", progress_class(pct))
                style=format!("width: {}%", format_qty(pct))
            ></div>
        </div>
    }
}

// ---------- meal sections ----------

#[component]
pub fn Meals(day: DiaryDay, meal_totals: Vec<(MealSlot, Totals)>) -> impl IntoView {
    view! {
        <main id="meals-container">
            {MealSlot::all().iter().copied().map(|meal| {
                let totals = meal_totals
                    .iter()
                    .find(|(s, _)| *s == meal)
                    .map(|(_, t)| *t)
                    .unwrap_or_default();
                let entries = day.entries(meal).to_vec();
                view! { <MealSection meal=meal entries=entries totals=totals/> }
            }).collect_view()}
        </main>
    }
}

#[component]
pub fn MealSection(meal: MealSlot, entries: Vec<FoodEntry>, totals: Totals) -> impl IntoView {
    let body = if entries.is_empty() {
        view! { <div class="empty-meal">"No foods logged yet"</div> }.into_view()
    } else {
        view! {
            <>
                <div class="meal-macro-row">
                    <span class="macro-chip protein-chip">{format!("P {}g", rounded(totals.protein))}</span>
                    <span class="macro-chip carbs-chip">{format!("C {}g", rounded(totals.carbs))}</span>
                    <span class="macro-chip fat-chip">{format!("F {}g", rounded(totals.fat))}</span>
                </div>
                {entries.into_iter().map(|entry| view! { <EntryRow meal=meal entry=entry/> }).collect_view()}
            </>
        }
        .into_view()
    };

    view! {
        <section class="meal-section" data-meal=meal.as_str()>
            <div class="meal-header">
                <div class="meal-header-left">
                    <h2 class="meal-title">{meal.label()}</h2>
                    <span class="meal-macros-summary">{format!("{} Cal", rounded(totals.calories))}</span>
                </div>
                <ActionButton
                    action=format!("/ui/meals/{}/add", meal)
                    label="+"
                    button_class="add-food-btn"
                    title=format!("Add food to {}", meal.label())
                />
            </div>
            {body}
        </section>
    }
}

#[component]
fn EntryRow(meal: MealSlot, entry: FoodEntry) -> impl IntoView {
    let base = format!("/ui/entries/{}/{}", meal, entry.id);
    let portion = entry.portion_label();

    view! {
        <div class="food-entry" data-entry-id=entry.id.clone()>
            <div class="food-info">
                <span class="food-name">{entry.name.clone()}</span>
                <span class="food-portion">{portion}</span>
            </div>
            <div class="food-macros">
                <span class="food-cal">{rounded(entry.calories).to_string()}</span>
                <span class="food-macro-detail">
                    <span class="fm-p">{rounded(entry.protein).to_string()}</span>
                    <span class="fm-c">{rounded(entry.carbs).to_string()}</span>
                    <span class="fm-f">{rounded(entry.fat).to_string()}</span>
                </span>
            </div>
            <div class="food-actions">
                <ActionButton action=format!("{}/edit", base) label="Edit" button_class="edit-entry-btn"/>
                <ActionButton action=format!("{}/remove", base) label="×" button_class="remove-entry-btn" title="Remove"/>
            </div>
        </div>
    }
}

// ---------- food detail screen ----------

/// The detail panel; rendered hidden when no food is selected
#[component]
pub fn FoodDetail(detail: Option<DetailModel>) -> impl IntoView {
    let Some(detail) = detail else {
        return view! { <section id="food-detail-screen" class="panel hidden"></section> }.into_view();
    };

    let DetailModel {
        slot,
        food_name,
        unit_labels,
        unit_index,
        qty,
        nutrition,
        editing,
    } = detail;

    let options = unit_labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| view! { <option value=i.to_string() selected={i == unit_index}>{label}</option> })
        .collect_view();

    view! {
        <section id="food-detail-screen" class="panel">
            <div class="panel-header">
                <span id="fd-meal-label">{slot.label()}</span>
                <ActionButton action="/ui/panels/close" label="×" button_id="fd-close-btn" button_class="close-btn"/>
            </div>
            <h2 id="fd-name">{food_name}</h2>
            <div class="fd-macros">
                <DetailValue value_id="fd-cal" label="Calories" value=format_qty(nutrition.calories)/>
                <DetailValue value_id="fd-protein" label="Protein" value=format_qty(nutrition.protein)/>
                <DetailValue value_id="fd-carbs" label="Carbs" value=format_qty(nutrition.carbs)/>
                <DetailValue value_id="fd-fat" label="Fat" value=format_qty(nutrition.fat)/>
            </div>
            <form id="food-detail-form" method="post" action="/ui/detail">
                <label for="fd-qty">"Amount"</label>
                <input
                    id="fd-qty"
                    name="qty"
                    type="number"
                    step="any"
                    min="0"
                    value=format_qty(qty)
                    onchange="this.form.requestSubmit()"
                />
                <label for="fd-unit">"Unit"</label>
                <select id="fd-unit" name="unit" onchange="this.form.requestSubmit()">
                    {options}
                </select>
                <button type="submit" class="fd-recalc-btn">"Update"</button>
                <button id="fd-add-btn" type="submit" formaction="/ui/detail/confirm">
                    {if editing { "Save" } else { "Add" }}
                </button>
            </form>
        </section>
    }
    .into_view()
}

#[component]
fn DetailValue(value_id: &'static str, label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="fd-macro">
            <span id=value_id class="fd-value">{value}</span>
            <span class="fd-label">{label}</span>
        </div>
    }
}

// ---------- add food panel ----------

/// Overlay plus picker panel; both rendered hidden when the picker is closed
#[component]
pub fn FoodPicker(picker: Option<PickerModel>) -> impl IntoView {
    let Some(picker) = picker else {
        return view! {
            <>
                <form id="add-food-overlay" class="overlay hidden" method="post" action="/ui/panels/close"></form>
                <section id="add-food-panel" class="panel hidden"></section>
            </>
        }
        .into_view();
    };

    let PickerModel {
        slot,
        query,
        recent,
        results,
        catalog_loading,
    } = picker;

    // Recent foods only head an unfiltered list
    let recent_section = (query.trim().is_empty() && !recent.is_empty()).then(|| {
        view! {
            <>
                <h3 class="food-list-heading">"Recent"</h3>
                {recent.into_iter().map(|item| view! { <FoodListRow item=item recent=true/> }).collect_view()}
                <h3 class="food-list-heading">"All foods"</h3>
            </>
        }
    });

    let list = if results.is_empty() {
        let message = if catalog_loading { "Loading foods…" } else { "No foods found" };
        view! { <div class="food-list-empty">{message}</div> }.into_view()
    } else {
        results
            .into_iter()
            .map(|item| view! { <FoodListRow item=item recent=false/> })
            .collect_view()
    };

    view! {
        <>
            <form id="add-food-overlay" class="overlay" method="post" action="/ui/panels/close">
                <button type="submit" class="overlay-dismiss" aria-label="Close"></button>
            </form>
            <section id="add-food-panel" class="panel">
                <div class="panel-header">
                    <h2 id="panel-title">{format!("Add to {}", slot.label())}</h2>
                    <ActionButton action="/ui/panels/close" label="×" button_id="panel-close-btn" button_class="close-btn"/>
                </div>
                <form id="food-search-form" method="post" action="/ui/picker/search">
                    <input
                        id="food-search-input"
                        name="q"
                        type="search"
                        placeholder="Search foods"
                        autofocus=true
                        value=query
                    />
                </form>
                <div id="food-list">
                    {recent_section}
                    {list}
                </div>
            </section>
        </>
    }
    .into_view()
}

#[component]
fn FoodListRow(item: FoodListItem, recent: bool) -> impl IntoView {
    let class = if recent { "food-list-item recent" } else { "food-list-item" };

    view! {
        <form class=class method="post" action="/ui/picker/select">
            <input type="hidden" name="food_id" value=item.food_id/>
            <button type="submit" class="food-list-item-btn">
                <div class="food-list-item-info">
                    <span class="food-list-item-name">{item.name}</span>
                    <span class="food-list-item-serving">{item.display_serving}</span>
                </div>
                <span class="food-list-item-cal">{item.display_calories.to_string()}</span>
            </button>
        </form>
    }
}

// ---------- page ----------

/// Body of the page: header, summary, meals and both panels
#[component]
pub fn DiaryPage(model: PageModel) -> impl IntoView {
    let PageModel {
        date,
        today,
        day,
        totals,
        meal_totals,
        goals,
        picker,
        detail,
    } = model;

    view! {
        <div id="app">
            <DateHeader date=date today=today/>
            <SummaryCard totals=totals goals=goals/>
            <Meals day=day meal_totals=meal_totals/>
            <FoodPicker picker=picker/>
            <FoodDetail detail=detail/>
        </div>
    }
}

/// Render a view to an HTML string
pub fn render_to_html<F, N>(view: F) -> String
where
    F: FnOnce() -> N + 'static,
    N: IntoView,
{
    leptos::ssr::render_to_string(view).to_string()
}

/// Complete HTML document
pub fn render_page(model: &PageModel) -> String {
    let model = model.clone();
    let title = format!("macrolog · {}", model.date);

    let html = render_to_html(move || {
        view! {
            <html lang="en">
                <head>
                    <meta charset="utf-8"/>
                    <meta name="viewport" content="width=device-width, initial-scale=1"/>
                    <title>{title}</title>
                    <style inner_html=STYLES></style>
                </head>
                <body>
                    <DiaryPage model=model/>
                </body>
            </html>
        }
    });

    format!("<!DOCTYPE html>{}", html)
}

const STYLES: &str = "\
body{font-family:system-ui,sans-serif;margin:0 auto;max-width:40rem;padding:1rem}\
.hidden{display:none}\
.date-header{display:flex;align-items:center;justify-content:space-between}\
.summary-card,.meal-section,.panel{border:1px solid #ddd;border-radius:8px;margin:1rem 0;padding:1rem}\
.over{color:#c0392b}\
.progress{background:#eee;border-radius:4px;height:6px}\
.progress-bar{height:6px;border-radius:4px}\
.bar-ok{background:#27ae60}.bar-warn{background:#f39c12}.bar-over{background:#c0392b}\
.meal-header,.food-entry,.panel-header,.food-list-item-btn{display:flex;justify-content:space-between;align-items:center}\
.food-list-item-btn{width:100%}\
.food-info,.food-list-item-info{display:flex;flex-direction:column}\
.empty-meal,.food-list-empty{color:#888}\
.macro-chip{margin-right:.5rem}\
form{display:inline}\
";
