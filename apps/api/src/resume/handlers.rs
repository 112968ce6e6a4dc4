use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::parse_upload;
use crate::resume::models::ParsedProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
    /// Overrides `PARSE_DEBUG` for this request.
    #[serde(default)]
    pub debug: Option<bool>,
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ParsedProfile>, AppError> {
    let limit = state.config.max_upload_bytes;
    if req.text.len() > limit {
        return Err(AppError::PayloadTooLarge(limit));
    }
    let debug = req.debug.unwrap_or(state.config.parse_debug);
    let parser = state.parser.clone();

    // CPU-bound; keep it off the async executor.
    let profile = tokio::task::spawn_blocking(move || parser.parse(&req.text, debug))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("parse task failed: {e}")))?;

    info!(
        "Parsed text resume: {} careers, {} education",
        profile.careers.len(),
        profile.education.len()
    );
    Ok(Json(profile))
}

/// POST /api/v1/resumes/upload
///
/// Multipart with a `file` field. Extraction failures still return 200 with
/// the profile's `error` field set.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParsedProfile>, AppError> {
    let limit = state.config.max_upload_bytes;
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.txt").to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::Validation("missing multipart field 'file'".into()))?;
    if data.len() > limit {
        return Err(AppError::PayloadTooLarge(limit));
    }

    let debug = state.config.parse_debug;
    let parser = state.parser.clone();
    let profile =
        tokio::task::spawn_blocking(move || parse_upload(&parser, &file_name, &data, debug))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("upload parse task failed: {e}")))?;

    Ok(Json(profile))
}

fn multipart_error(e: MultipartError, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(limit)
    } else {
        AppError::Validation(e.body_text())
    }
}
