use std::path::PathBuf;
use std::sync::Arc;

use crate::votes::VoteLedger;

/// Shared application state injected into all route handlers via axum::extract::State.
#[derive(Clone)]
pub struct AppState {
    /// Gallery directory, re-read on every listing.
    pub media_dir: PathBuf,
    /// The single writer path for vote counts.
    pub ledger: Arc<VoteLedger>,
    pub max_upload_bytes: usize,
    /// Browser client served as the router fallback, if configured.
    pub static_dir: Option<PathBuf>,
}
