use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use cartoffer_core::{SegmentResolver, UserId};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SetSegmentRequest {
    pub user_id: UserId,
    pub segment: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentQuery {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub segment: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/user_segment", get(get_segment).post(set_segment))
}

/// GET /api/v1/user_segment?user_id=N
/// Same shape the HTTP segment resolver consumes.
pub async fn get_segment(
    State(state): State<AppState>,
    query: Result<Query<SegmentQuery>, QueryRejection>,
) -> Result<Json<SegmentResponse>, AppError> {
    let Query(query) = query?;
    let directory = state.segment_directory.as_ref().ok_or_else(|| {
        AppError::ConflictError("segments are resolved by an external service".to_string())
    })?;

    let segment = directory
        .segment_of(query.user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no segment for user {}", query.user_id)))?;

    Ok(Json(SegmentResponse { segment }))
}

/// POST /api/v1/user_segment
/// Assign a user to a segment in the in-process directory.
pub async fn set_segment(
    State(state): State<AppState>,
    payload: Result<Json<SetSegmentRequest>, JsonRejection>,
) -> Result<Json<SegmentResponse>, AppError> {
    let Json(req) = payload?;
    let directory = state.segment_directory.as_ref().ok_or_else(|| {
        AppError::ConflictError("segments are resolved by an external service".to_string())
    })?;

    directory.set_segment(req.user_id, &req.segment).await?;

    Ok(Json(SegmentResponse {
        segment: req.segment.trim().to_string(),
    }))
}
