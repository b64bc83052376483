//! Settings Routes
//!
//! - GET /api/v1/goals - Daily goals (defaults when unset)
//! - PUT /api/v1/goals - Replace daily goals
//! - GET /api/v1/profile - User profile
//! - PUT /api/v1/profile - Replace user profile

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::storage::{Goals, Profile};

/// GET /api/v1/goals
pub async fn get_goals(State(state): State<Arc<AppState>>) -> Json<Goals> {
    Json(state.store.get_goals())
}

/// PUT /api/v1/goals
///
/// Fields left out of the body take their default value.
pub async fn put_goals(
    State(state): State<Arc<AppState>>,
    Json(goals): Json<Goals>,
) -> Json<Goals> {
    state.store.save_goals(&goals);
    Json(state.store.get_goals())
}

/// GET /api/v1/profile
pub async fn get_profile(State(state): State<Arc<AppState>>) -> Json<Profile> {
    Json(state.store.get_profile())
}

/// PUT /api/v1/profile
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<Profile>,
) -> Json<Profile> {
    state.store.save_profile(&profile);
    Json(state.store.get_profile())
}
