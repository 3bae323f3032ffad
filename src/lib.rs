//! openshelf: CLI scraper that mirrors Springer open-access books into a
//! topic-sorted library and keeps a CSV catalog in sync with the live listing.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod download;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod scrape;

// Re-exports for CLI and consumers.
pub use catalog::{Catalog, CatalogError, CatalogRow};
pub use download::{DownloadError, DownloadOrchestrator, DownloadOutcome};
pub use model::BookRecord;
pub use scrape::listing::{ListingScan, ListingScanner};
pub use scrape::patterns::{Field, Patterns};
pub use scrape::resolver::ItemResolver;
pub use scrape::{Fetch, PoliteClient, PoliteClientBuilder, ScrapeError};
