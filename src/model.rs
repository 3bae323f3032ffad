//! Canonical data model for one catalog entry and its derived links.
//!
//! The URL and path transforms here are the wire contract with the site;
//! the scanner, downloader, and catalog all derive from this one place.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Site root. Item links are relative to this; no trailing slash.
pub const SPRINGER_BASE: &str = "https://link.springer.com";

/// One resolved book: the item link is the stable key, everything else is
/// extracted from the detail page (with sentinels where extraction failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// Site-relative path of the form `/book/10.1XXX/<rest>`. Unique key.
    pub item_link: String,
    /// Normalized display title. Never empty; safe to use in a file name.
    pub title: String,
    /// Subject classification, used verbatim as a directory name. Never empty.
    pub topic: String,
    /// Ordered keywords; an empty vector when the page carries none.
    pub keywords: Vec<String>,
    /// Normalized author names; may be empty. BTreeSet keeps output deterministic.
    pub authors: BTreeSet<String>,
}

impl BookRecord {
    /// Full detail-page URL: base + item link.
    pub fn source_url(&self) -> String {
        format!("{}{}", SPRINGER_BASE, self.item_link)
    }

    /// Full PDF URL: drop the leading `/book` segment, prefix with
    /// `/content/pdf`, suffix with `.pdf`.
    pub fn pdf_url(&self) -> String {
        let rest = self
            .item_link
            .strip_prefix("/book")
            .unwrap_or(&self.item_link);
        format!("{}/content/pdf{}.pdf", SPRINGER_BASE, rest)
    }

    /// DOI: the item link with the leading `/book/` dropped.
    pub fn doi(&self) -> String {
        self.item_link
            .strip_prefix("/book/")
            .unwrap_or(&self.item_link)
            .to_string()
    }

    /// Library path `bookpath/topic/title`, without an extension. The
    /// download step appends `.pdf`; the catalog stores this form as-is.
    pub fn local_path(&self, bookpath: &Path) -> PathBuf {
        bookpath.join(&self.topic).join(&self.title)
    }
}
