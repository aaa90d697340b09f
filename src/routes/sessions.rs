use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, SessionError};
use crate::session::{SessionStatus, TrackingSession};
use crate::state::AppState;
use crate::types::track::{ActivityRecord, ActivityStats, LocationPoint};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(start))
        .route("/api/sessions/:session_id/points", post(record))
        .route("/api/sessions/:session_id/pause", post(pause))
        .route("/api/sessions/:session_id/resume", post(resume))
        .route("/api/sessions/:session_id/stop", post(stop))
        .route("/api/sessions/:session_id/stats", get(live_stats))
}

#[derive(Serialize)]
struct StartResponse {
    session_id: String,
    status: SessionStatus,
}

#[derive(Serialize)]
struct LiveResponse {
    session_id: String,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    point_count: usize,
    stats: ActivityStats,
}

#[derive(Serialize)]
struct StopResponse {
    activity_id: String,
    point_count: usize,
    stats: ActivityStats,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointsBody {
    One(LocationPoint),
    Many(Vec<LocationPoint>),
}

impl PointsBody {
    fn into_vec(self) -> Vec<LocationPoint> {
        match self {
            PointsBody::One(point) => vec![point],
            PointsBody::Many(points) => points,
        }
    }
}

async fn start(State(state): State<AppState>) -> Json<StartResponse> {
    let session_id = Uuid::new_v4().to_string();
    state.insert_session(session_id.clone(), TrackingSession::start(Utc::now()));

    tracing::info!("Started tracking session {}", session_id);

    Json(StartResponse {
        session_id,
        status: SessionStatus::Active,
    })
}

/// Appends points in order. The batch is all-or-nothing: if any point is
/// rejected, none of them are recorded.
async fn record(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<PointsBody>,
) -> Result<Json<LiveResponse>, AppError> {
    let points = body.into_vec();
    let count = points.len();

    let response = update(&state, &session_id, |session| {
        session.record_all(points).map(|_| ())
    })?;

    tracing::debug!(
        "Recorded {} points on session {} ({} total)",
        count,
        session_id,
        response.point_count
    );

    Ok(Json(response))
}

async fn pause(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<LiveResponse>, AppError> {
    let response = update(&state, &session_id, |session| session.pause(Utc::now()))?;
    tracing::info!("Paused session {}", session_id);
    Ok(Json(response))
}

async fn resume(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<LiveResponse>, AppError> {
    let response = update(&state, &session_id, |session| session.resume(Utc::now()))?;
    tracing::info!("Resumed session {}", session_id);
    Ok(Json(response))
}

async fn live_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<LiveResponse>, AppError> {
    Ok(Json(update(&state, &session_id, |_| Ok(()))?))
}

async fn stop(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StopResponse>, AppError> {
    let mut session = state
        .remove_session(&session_id)
        .ok_or_else(|| AppError::SessionNotFound(session_id.clone()))?;

    let completed_at = Utc::now();
    let stats = session.stop(completed_at)?;
    let points = session.into_points();
    let point_count = points.len();

    let activity_id = Uuid::new_v4().to_string();
    state.insert_activity(
        activity_id.clone(),
        ActivityRecord {
            stats,
            points,
            completed_at,
        },
    );

    tracing::info!(
        "Stopped session {} as activity {} ({} points, {:.2} mi, {:.0} s active)",
        session_id,
        activity_id,
        point_count,
        stats.distance,
        stats.duration
    );

    Ok(Json(StopResponse {
        activity_id,
        point_count,
        stats,
    }))
}

fn update(
    state: &AppState,
    session_id: &str,
    f: impl FnOnce(&mut TrackingSession) -> Result<(), SessionError>,
) -> Result<LiveResponse, AppError> {
    let outcome = state
        .with_session(session_id, |session| -> Result<LiveResponse, SessionError> {
            f(session)?;
            Ok(LiveResponse {
                session_id: session_id.to_string(),
                status: session.status(),
                started_at: session.started_at(),
                point_count: session.points().len(),
                stats: session.live_stats(Utc::now()),
            })
        })
        .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))?;

    Ok(outcome?)
}
