//! CSV catalog: one row per book. Loaded whole, extended by reconciliation
//! (existing rows are never rewritten), saved whole as the merged table.

use crate::model::{BookRecord, SPRINGER_BASE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column reconciliation keys on; a loaded file without it is rejected
/// before any network activity.
pub const SOURCE_LINK_COLUMN: &str = "SourceLink";

/// Separator for multi-valued cells (keywords, authors).
const CELL_SEPARATOR: &str = "; ";

/// Errors from loading or saving the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot access catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid catalog {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Catalog {path} has no '{column}' column; cannot reconcile against it.")]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
    },
}

/// One persisted catalog row. Field names match the CSV header exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "DOI")]
    pub doi: String,
    #[serde(rename = "SourceLink")]
    pub source_link: String,
    #[serde(rename = "PdfLink")]
    pub pdf_link: String,
    #[serde(rename = "LocalPath")]
    pub local_path: String,
}

/// Ordered collection of catalog rows, keyed by DOI. Reconciliation only
/// appends; fresh crawls build it from scratch.
#[derive(Debug, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from resolved records (fresh-crawl mode). Records
    /// repeating an already-seen key are dropped.
    pub fn from_records<'a, I>(records: I, bookpath: &Path) -> Self
    where
        I: IntoIterator<Item = &'a BookRecord>,
    {
        let mut catalog = Self::new();
        for record in records {
            catalog.push_record(record, bookpath);
        }
        catalog
    }

    /// Load a persisted catalog. The header must contain the
    /// [SOURCE_LINK_COLUMN]; its absence is a configuration error, never
    /// silently treated as "everything is new".
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let mut reader = csv::Reader::from_path(path).map_err(|source| CatalogError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let headers = reader
            .headers()
            .map_err(|source| CatalogError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        if !headers.iter().any(|h| h == SOURCE_LINK_COLUMN) {
            return Err(CatalogError::MissingColumn {
                path: path.to_path_buf(),
                column: SOURCE_LINK_COLUMN,
            });
        }
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row.map_err(|source| CatalogError::Csv {
                path: path.to_path_buf(),
                source,
            })?);
        }
        Ok(Self { rows })
    }

    /// Write the whole table to `path` (the merged table in check mode).
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let mut writer = csv::Writer::from_path(path).map_err(|source| CatalogError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        for row in &self.rows {
            writer.serialize(row).map_err(|source| CatalogError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        }
        writer.flush().map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Item links already present, derived from the stored source links.
    /// Rows whose source link does not start with the site base are kept
    /// verbatim (they simply never match a live link).
    pub fn known_item_links(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .map(|row| {
                row.source_link
                    .strip_prefix(SPRINGER_BASE)
                    .unwrap_or(&row.source_link)
                    .to_string()
            })
            .collect()
    }

    fn contains_key(&self, doi: &str) -> bool {
        self.rows.iter().any(|row| row.doi == doi)
    }

    /// Append one resolved record as a row. Returns false (and appends
    /// nothing) when the record's key is already present, keeping the
    /// combined table unique on DOI.
    pub fn push_record(&mut self, record: &BookRecord, bookpath: &Path) -> bool {
        if self.contains_key(&record.doi()) {
            return false;
        }
        self.rows.push(row_from_record(record, bookpath));
        true
    }
}

/// Project one record into its catalog row. LocalPath is stored without an
/// extension; the download step owns the `.pdf` suffix.
pub fn row_from_record(record: &BookRecord, bookpath: &Path) -> CatalogRow {
    CatalogRow {
        title: record.title.clone(),
        topic: record.topic.clone(),
        keywords: record.keywords.join(CELL_SEPARATOR),
        authors: record
            .authors
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(CELL_SEPARATOR),
        doi: record.doi(),
        source_link: record.source_url(),
        pdf_link: record.pdf_url(),
        local_path: record.local_path(bookpath).display().to_string(),
    }
}
