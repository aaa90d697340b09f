use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::types::track::ActivityRecord;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/activities/:activity_id", get(get_activity))
}

async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> Result<Json<ActivityRecord>, AppError> {
    state
        .get_activity(&activity_id)
        .map(Json)
        .ok_or(AppError::ActivityNotFound(activity_id))
}
