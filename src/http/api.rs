use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::media::index::{list_media, MediaListing};
use crate::media::upload::{self, UploadError};

/// Multipart form field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "meme";

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub votes: u64,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub message: &'static str,
}

/// GET /api/memes: fresh directory read joined with a snapshot of the ledger.
pub async fn list_memes(State(state): State<AppState>) -> Result<Json<MediaListing>, ApiError> {
    let votes = state.ledger.snapshot().await;
    let dir = state.media_dir.clone();
    let listing = tokio::task::spawn_blocking(move || list_media(&dir, &votes))
        .await
        .map_err(|e| ApiError::Internal(format!("listing task failed: {e}")))??;
    Ok(Json(listing))
}

/// POST /api/vote: `{"filename": "..."}` → `{"success": true, "votes": n}`.
pub async fn vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let filename = request.filename.unwrap_or_default();
    let votes = state.ledger.increment(&filename).await?;
    Ok(Json(VoteResponse {
        success: true,
        votes,
    }))
}

/// POST /api/upload: multipart form with the file in field `meme`.
/// The file is validated before any byte touches the media directory.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let limit = state.max_upload_bytes;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A plain text field under the file's name is not a file.
        let Some(filename) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_owned);

        let accepted = upload::validate(&filename, content_type.as_deref())?;
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if bytes.len() > limit {
            return Err(UploadError::TooLarge { limit }.into());
        }

        upload::store(&state.media_dir, &accepted, &bytes).await?;
        return Ok(Json(UploadResponse {
            success: true,
            filename: accepted.filename,
            message: "File uploaded successfully!",
        }));
    }

    Err(UploadError::MissingFile.into())
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { limit }.into()
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
