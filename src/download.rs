//! Topic-sorted PDF retrieval. One failed item is one skipped book; the
//! run carries on to the next record.

use crate::model::BookRecord;
use crate::scrape::{Fetch, ScrapeError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure retrieving one item's binary. Carries the record's title and
/// topic so the log line identifies the book; never aborts the run.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Could not create topic directory {path} for '{title}': {source}")]
    CreateDir {
        title: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not fetch '{title}' ({topic}): {source}")]
    Fetch {
        title: String,
        topic: String,
        source: ScrapeError,
    },

    #[error("Could not write '{title}' ({topic}) to {path}: {source}")]
    Write {
        title: String,
        topic: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What [DownloadOrchestrator::ensure_downloaded] did for one record.
#[derive(Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    /// The target file already exists; nothing was fetched.
    AlreadyPresent(PathBuf),
}

/// Fetches each record's PDF into `bookpath/topic/title.pdf`, creating the
/// topic directory on demand. Tracks paths claimed during the run so two
/// records whose titles normalize to the same name do not overwrite each
/// other: the later one gets a ` (n)` counter suffix.
pub struct DownloadOrchestrator {
    bookpath: PathBuf,
    claimed: HashMap<PathBuf, String>,
}

impl DownloadOrchestrator {
    pub fn new(bookpath: impl Into<PathBuf>) -> Self {
        Self {
            bookpath: bookpath.into(),
            claimed: HashMap::new(),
        }
    }

    /// Ensure the record's PDF is on disk. Creating an existing topic
    /// directory is a no-op; a file already at the target path is reported
    /// as [DownloadOutcome::AlreadyPresent] without refetching, which keeps
    /// re-runs against the same library idempotent.
    pub fn ensure_downloaded(
        &mut self,
        fetcher: &mut impl Fetch,
        record: &BookRecord,
    ) -> Result<DownloadOutcome, DownloadError> {
        let dir = self.bookpath.join(&record.topic);
        fs::create_dir_all(&dir).map_err(|source| DownloadError::CreateDir {
            title: record.title.clone(),
            path: dir.clone(),
            source,
        })?;

        let target = self.claim_path(&dir, record);
        if target.exists() {
            return Ok(DownloadOutcome::AlreadyPresent(target));
        }

        let bytes =
            fetcher
                .fetch_bytes(&record.pdf_url())
                .map_err(|source| DownloadError::Fetch {
                    title: record.title.clone(),
                    topic: record.topic.clone(),
                    source,
                })?;
        fs::write(&target, bytes).map_err(|source| DownloadError::Write {
            title: record.title.clone(),
            topic: record.topic.clone(),
            path: target.clone(),
            source,
        })?;
        Ok(DownloadOutcome::Downloaded(target))
    }

    /// Pick the target path for a record. The same record always gets the
    /// same path back; a different record colliding on the name is moved to
    /// the next free ` (n)` suffix.
    fn claim_path(&mut self, dir: &Path, record: &BookRecord) -> PathBuf {
        let mut candidate = dir.join(format!("{}.pdf", record.title));
        let mut n = 2;
        while let Some(owner) = self.claimed.get(&candidate) {
            if owner == &record.item_link {
                return candidate;
            }
            candidate = dir.join(format!("{} ({}).pdf", record.title, n));
            n += 1;
        }
        self.claimed
            .insert(candidate.clone(), record.item_link.clone());
        candidate
    }
}
