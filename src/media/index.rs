use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use crate::media::mime::{classify, MediaKind};
use crate::votes::VoteCounts;

/// One gallery file joined with its vote count. Rebuilt on every listing, never cached.
/// Field names on the wire follow the browser client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaEntry {
    /// Directory entry name; unique within the listing.
    pub filename: String,
    /// Filename with the allow-listed extension stripped.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Filesystem modification time.
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(rename = "votes")]
    pub vote_count: u64,
}

/// Listing result. Entries are in directory-read order; sorting is left to the client.
#[derive(Debug, Clone, Serialize)]
pub struct MediaListing {
    #[serde(rename = "memes")]
    pub entries: Vec<MediaEntry>,
    pub count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Unable to read memes folder")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Enumerate `dir` (non-recursive) and join each allow-listed file with `votes`.
///
/// Creates `dir` first if it does not exist. Fails as a whole when the
/// directory, or any allow-listed file in it, cannot be read; entries outside
/// the allow-list (including subdirectories) are skipped silently.
pub fn list_media(dir: &Path, votes: &VoteCounts) -> Result<MediaListing, IndexError> {
    let start = Instant::now();
    std::fs::create_dir_all(dir).map_err(|source| IndexError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Broken symlinks and vanished files only matter when they look like media.
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                if e.depth() > 0 && classify(&path).is_none() {
                    tracing::debug!("Skipping unreadable non-media entry {}: {}", path.display(), e);
                    continue;
                }
                return Err(IndexError::DirectoryRead {
                    path,
                    source: e.into(),
                });
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let Some((kind, _mime)) = classify(entry.path()) else {
            continue;
        };
        let Some(filename) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::debug!("Skipping non UTF-8 filename {}", entry.path().display());
            continue;
        };

        let stat = entry.metadata().map_err(|e| IndexError::DirectoryRead {
            path: entry.path().to_path_buf(),
            source: e.into(),
        })?;
        let modified = stat.modified().map_err(|source| IndexError::DirectoryRead {
            path: entry.path().to_path_buf(),
            source,
        })?;

        entries.push(MediaEntry {
            display_name: display_name(&filename),
            created_at: DateTime::<Utc>::from(modified),
            size_bytes: stat.len(),
            kind,
            vote_count: votes.get(&filename),
            filename,
        });
    }

    tracing::debug!(
        "Listed {} media files in {} ({:.1}ms)",
        entries.len(),
        dir.display(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let count = entries.len();
    Ok(MediaListing { entries, count })
}

/// `"cat.final.JPG"` → `"cat.final"`. Only the last extension is stripped.
pub fn display_name(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}
