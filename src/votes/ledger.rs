use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Filename required")]
    MissingInput,
    #[error("failed to persist votes to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode votes: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read-only copy of the ledger taken at one instant. Lookups for unknown
/// filenames yield 0.
#[derive(Debug, Clone, Default)]
pub struct VoteCounts(BTreeMap<String, u64>);

impl VoteCounts {
    pub fn get(&self, filename: &str) -> u64 {
        self.0.get(filename).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for VoteCounts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        VoteCounts(iter.into_iter().collect())
    }
}

/// Process-wide vote ledger.
///
/// Loaded once at startup; every increment rewrites the whole snapshot before
/// returning. The mutex is held across increment *and* write, so concurrent
/// votes are applied and persisted one at a time and none is lost on disk.
/// Keys are never validated against the media directory: stale entries for
/// deleted files are kept.
#[derive(Debug)]
pub struct VoteLedger {
    path: PathBuf,
    counts: Mutex<BTreeMap<String, u64>>,
}

impl VoteLedger {
    /// Load the snapshot at `path`. A missing, unreadable or malformed
    /// snapshot yields an empty ledger; startup never fails here.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counts = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, u64>>(&raw) {
                Ok(counts) => {
                    tracing::debug!("Loaded {} vote counts from {}", counts.len(), path.display());
                    counts
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed vote ledger {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No vote ledger at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!("Cannot read vote ledger {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        VoteLedger {
            path,
            counts: Mutex::new(counts),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add one vote for `filename` and persist the full ledger. Returns the new count.
    ///
    /// On a persistence failure the in-memory increment stays applied; the next
    /// successful write brings disk back in line.
    pub async fn increment(&self, filename: &str) -> Result<u64, LedgerError> {
        if filename.is_empty() {
            return Err(LedgerError::MissingInput);
        }

        let mut counts = self.counts.lock().await;
        let count = counts.entry(filename.to_owned()).or_insert(0);
        *count = count.saturating_add(1);
        let new_count = *count;
        tracing::debug!("vote {} -> {}", filename, new_count);

        self.persist(&counts).await?;
        Ok(new_count)
    }

    pub async fn count(&self, filename: &str) -> u64 {
        self.counts.lock().await.get(filename).copied().unwrap_or(0)
    }

    pub async fn snapshot(&self) -> VoteCounts {
        VoteCounts(self.counts.lock().await.clone())
    }

    /// Write to a sibling temp file, then rename over the snapshot.
    async fn persist(&self, counts: &BTreeMap<String, u64>) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(counts)?;
        let temp = temp_path(&self.path);

        tokio::fs::write(&temp, json)
            .await
            .map_err(|source| LedgerError::Persistence {
                path: temp.clone(),
                source,
            })?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|source| LedgerError::Persistence {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
