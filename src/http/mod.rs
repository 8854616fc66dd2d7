pub mod api;
pub mod error;
pub mod media;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::state::AppState;

/// Slack on top of the file size limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let upload_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .route("/api/memes", get(api::list_memes))
        .route(
            "/api/upload",
            post(api::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/vote", post(api::vote))
        .route(
            "/memes/{filename}",
            get(media::serve_media_get).head(media::serve_media_head),
        );

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
