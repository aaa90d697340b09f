use axum::{routing::post, Json, Router};
use serde::Deserialize;

use crate::pipeline::stats::compute_stats;
use crate::state::AppState;
use crate::types::track::{ActivityStats, LocationPoint};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/stats", post(stats))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StatsRequest {
    #[serde(default)]
    points: Vec<LocationPoint>,
    duration_seconds: f64,
}

/// Stateless summary of a caller-held track.
async fn stats(Json(request): Json<StatsRequest>) -> Json<ActivityStats> {
    Json(compute_stats(&request.points, request.duration_seconds))
}
