use axum::extract::Multipart;
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::{parse, stats::compute_stats};
use crate::state::AppState;
use crate::types::track::{ActivityRecord, ActivityStats, FileFormat};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[derive(Serialize)]
struct UploadResponse {
    activity_id: String,
    file_type: String,
    point_count: usize,
    stats: ActivityStats,
}

/// Imports a recorded GPX or FIT track. The active duration defaults to the
/// recorded span and can be overridden with a `duration_seconds` field when
/// the file includes paused stretches.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut duration_override: Option<f64> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            AppError::BadRequest(format!("Failed to read file bytes: {}", e))
                        })?
                        .to_vec(),
                );
            }
            "duration_seconds" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read duration: {}", e))
                })?;
                let seconds = text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|s| s.is_finite())
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("Invalid duration_seconds: {}", text))
                    })?;
                duration_override = Some(seconds);
            }
            _ => {}
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename =
        filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    let format = FileFormat::from_filename(&filename)
        .ok_or_else(|| AppError::BadRequest("Unsupported file format".to_string()))?;

    tracing::info!("Parsing {} file: {}", format.name(), filename);

    let parsed = parse::parse(&bytes, format)?;
    let file_type = parsed.file_format.name();
    let duration = duration_override.unwrap_or_else(|| parsed.recorded_seconds());
    let stats = compute_stats(&parsed.points, duration);
    let point_count = parsed.points.len();

    let activity_id = Uuid::new_v4().to_string();
    state.insert_activity(
        activity_id.clone(),
        ActivityRecord {
            stats,
            points: parsed.points,
            completed_at: Utc::now(),
        },
    );

    tracing::info!(
        "Imported {} as activity {} ({} points, {:.2} mi)",
        filename,
        activity_id,
        point_count,
        stats.distance
    );

    Ok(Json(UploadResponse {
        activity_id,
        file_type: file_type.to_string(),
        point_count,
        stats,
    }))
}
