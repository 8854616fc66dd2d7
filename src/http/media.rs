use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use http_range_header::parse_range_header;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::http::state::AppState;
use crate::media::mime::classify;

/// A gallery file resolved from a request path: location, size and content type.
struct ServedFile {
    path: PathBuf,
    size: u64,
    mime: &'static str,
}

/// Resolve `filename` inside the media directory. Returns None for names that
/// are not a single path component, are outside the allow-list, or do not exist.
async fn lookup_file(state: &AppState, filename: &str) -> Option<ServedFile> {
    if filename.is_empty() || filename == ".." || filename.contains(['/', '\\', '\0']) {
        return None;
    }
    let path = state.media_dir.join(filename);
    let (_, mime) = classify(&path)?;
    let meta = tokio::fs::metadata(&path).await.ok()?;
    if !meta.is_file() {
        return None;
    }
    Some(ServedFile {
        path,
        size: meta.len(),
        mime,
    })
}

fn file_headers(file: &ServedFile) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(file.mime));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.size));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers
}

fn unsatisfiable(size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [(header::CONTENT_RANGE, format!("bytes */{}", size))],
    )
        .into_response()
}

/// HEAD /memes/{filename}: headers only, the file is not opened.
pub async fn serve_media_head(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    match lookup_file(&state, &filename).await {
        Some(file) => (StatusCode::OK, file_headers(&file)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /memes/{filename}: stream the whole file, or one byte range per RFC 7233.
pub async fn serve_media_get(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req_headers: HeaderMap,
) -> Response {
    let Some(file) = lookup_file(&state, &filename).await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let headers = file_headers(&file);

    if let Some(range_val) = req_headers.get(header::RANGE) {
        let Ok(range_str) = range_val.to_str() else {
            return unsatisfiable(file.size);
        };
        return range_response(&file, range_str, headers).await;
    }

    let handle = match tokio::fs::File::open(&file.path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to open file {}: {}", file.path.display(), e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let body = Body::from_stream(ReaderStream::new(handle));
    (StatusCode::OK, headers, body).into_response()
}

/// 206 with the first satisfiable range, or 416. Multi-range requests get the first range only.
async fn range_response(file: &ServedFile, range_str: &str, mut headers: HeaderMap) -> Response {
    let Ok(parsed) = parse_range_header(range_str) else {
        return unsatisfiable(file.size);
    };
    let Ok(ranges) = parsed.validate(file.size) else {
        return unsatisfiable(file.size);
    };
    let Some(first) = ranges.into_iter().next() else {
        return unsatisfiable(file.size);
    };

    let start = *first.start();
    let end = *first.end();
    let length = end - start + 1;

    let mut handle = match tokio::fs::File::open(&file.path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Range response: failed to open file {}: {}", file.path.display(), e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    if let Err(e) = handle.seek(std::io::SeekFrom::Start(start)).await {
        tracing::error!("Range response: failed to seek in file {}: {}", file.path.display(), e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let content_range = format!("bytes {}-{}/{}", start, end, file.size);
    if let Ok(value) = HeaderValue::from_str(&content_range) {
        headers.insert(header::CONTENT_RANGE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));

    let body = Body::from_stream(ReaderStream::new(handle.take(length)));
    (StatusCode::PARTIAL_CONTENT, headers, body).into_response()
}
