use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::path::{Path, PathBuf};

use crate::media::mime::{classify, classify_mime, MediaKind};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Uploaded file has no filename")]
    MissingInput,
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
    #[error("Only image and video files are allowed!")]
    UnsupportedMedia {
        filename: String,
        content_type: Option<String>,
    },
    #[error("File too large (limit {limit} bytes)")]
    TooLarge { limit: usize },
    #[error("failed to store upload at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An upload that passed validation and is safe to write into the media directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub filename: String,
    pub kind: MediaKind,
}

/// Check a client-supplied filename and declared content type against the allow-lists.
///
/// The filename must be a single path component. Its extension and the content
/// type must both be allow-listed and name the same kind.
pub fn validate(filename: &str, content_type: Option<&str>) -> Result<AcceptedUpload, UploadError> {
    if filename.trim().is_empty() {
        return Err(UploadError::MissingInput);
    }
    if filename == "." || filename == ".." || filename.contains(['/', '\\', '\0']) {
        return Err(UploadError::InvalidFilename(filename.to_string()));
    }

    let unsupported = || UploadError::UnsupportedMedia {
        filename: filename.to_string(),
        content_type: content_type.map(str::to_owned),
    };
    let (ext_kind, _) = classify(Path::new(filename)).ok_or_else(unsupported)?;
    let mime_kind = content_type.and_then(classify_mime).ok_or_else(unsupported)?;
    if ext_kind != mime_kind {
        return Err(unsupported());
    }

    Ok(AcceptedUpload {
        filename: filename.to_string(),
        kind: ext_kind,
    })
}

/// Write `bytes` to `dir/<filename>`, replacing any existing file of that name.
///
/// Data goes to a hidden `.part` file first, which the listing never shows,
/// and is renamed into place once complete. The temp name does not derive
/// from `filename`, so any name the filesystem accepts can be stored and
/// concurrent uploads never share a temp file. Returns the final path.
pub async fn store(dir: &Path, upload: &AcceptedUpload, bytes: &[u8]) -> Result<PathBuf, UploadError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| UploadError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

    let target = dir.join(&upload.filename);
    let partial = dir.join(partial_name());

    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        tracing::warn!("Upload replaces existing file {}", target.display());
    }

    if let Err(source) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(UploadError::Write {
            path: partial,
            source,
        });
    }
    tokio::fs::rename(&partial, &target)
        .await
        .map_err(|source| UploadError::Write {
            path: target.clone(),
            source,
        })?;

    tracing::info!("Stored upload {} ({} bytes)", target.display(), bytes.len());
    Ok(target)
}

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// `.upload-<pid>-<seq>.part`, unique within the process.
fn partial_name() -> String {
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(".upload-{}-{}.part", std::process::id(), seq)
}
