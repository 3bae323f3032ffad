//! Listing traversal: page URLs, page-count discovery, link harvesting.

use crate::model::SPRINGER_BASE;
use crate::scrape::error::ScrapeError;
use crate::scrape::patterns::{Field, Patterns};
use crate::scrape::Fetch;

/// Books shown on a full listing page. A non-final page yielding fewer
/// links than this is flagged as short.
pub const PAGE_CAPACITY: usize = 20;

/// Listing page URL for a zero-based page index.
pub fn listing_page_url(page: u32) -> String {
    format!(
        "{}/search/page/{}?facet-content-type=%22Book%22&package=openaccess",
        SPRINGER_BASE, page
    )
}

/// Outcome of a listing walk: item links in encounter order (not
/// deduplicated) plus the indices of pages that under-yielded.
#[derive(Debug, Default)]
pub struct ListingScan {
    pub links: Vec<String>,
    pub short_pages: Vec<u32>,
}

/// Walks listing pages and harvests item links via the link pattern.
pub struct ListingScanner<'a> {
    patterns: &'a Patterns,
}

impl<'a> ListingScanner<'a> {
    pub fn new(patterns: &'a Patterns) -> Self {
        Self { patterns }
    }

    /// Read the total page count from the listing's own pagination marker.
    /// Probes page 1; a page without the marker cannot bound the crawl.
    pub fn discover_page_count(&self, fetcher: &mut impl Fetch) -> Result<u32, ScrapeError> {
        let url = listing_page_url(1);
        let html = fetcher.fetch_text(&url)?;
        match self
            .patterns
            .first(&html, Field::TotalPages)
            .and_then(|v| v.parse::<u32>().ok())
        {
            Some(count) => Ok(count),
            None => Err(ScrapeError::PageCountMarkerMissing { url }),
        }
    }

    /// Fetch pages `0..pages` in order and collect every item link found.
    /// A non-final page yielding fewer than [PAGE_CAPACITY] links is
    /// recorded in `short_pages`; its links are still included and the
    /// scan neither retries nor aborts.
    pub fn scan(&self, fetcher: &mut impl Fetch, pages: u32) -> Result<ListingScan, ScrapeError> {
        let mut scan = ListingScan::default();
        for page in 0..pages {
            let html = fetcher.fetch_text(&listing_page_url(page))?;
            let mut found = self.patterns.extract(&html, Field::Link);
            if found.len() < PAGE_CAPACITY && page + 1 != pages {
                scan.short_pages.push(page);
            }
            scan.links.append(&mut found);
        }
        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::testutil::MockFetch;

    /// A listing page body with `n` item links, numbered from `first`.
    fn page_body(first: u32, n: u32) -> String {
        (first..first + n)
            .map(|i| format!("<a href=\"/book/10.1007/978-3-030-{:05}-1\">B</a>\n", i))
            .collect()
    }

    #[test]
    fn scan_returns_links_in_increasing_page_order() -> Result<(), ScrapeError> {
        let patterns = Patterns::new()?;
        let mut fetch = MockFetch::new()
            .page(listing_page_url(0), page_body(0, 20))
            .page(listing_page_url(1), page_body(20, 20))
            .page(listing_page_url(2), page_body(40, 3));
        let scan = ListingScanner::new(&patterns).scan(&mut fetch, 3)?;
        assert_eq!(scan.links.len(), 43);
        assert_eq!(scan.links[0], "/book/10.1007/978-3-030-00000-1");
        assert_eq!(scan.links[20], "/book/10.1007/978-3-030-00020-1");
        assert_eq!(scan.links[42], "/book/10.1007/978-3-030-00042-1");
        let mut sorted = scan.links.clone();
        sorted.sort();
        assert_eq!(scan.links, sorted);
        Ok(())
    }

    #[test]
    fn short_final_page_is_not_flagged() -> Result<(), ScrapeError> {
        let patterns = Patterns::new()?;
        let mut fetch = MockFetch::new()
            .page(listing_page_url(0), page_body(0, 20))
            .page(listing_page_url(1), page_body(20, 5));
        let scan = ListingScanner::new(&patterns).scan(&mut fetch, 2)?;
        assert!(scan.short_pages.is_empty());
        assert_eq!(scan.links.len(), 25);
        Ok(())
    }

    #[test]
    fn short_middle_page_is_flagged_but_links_kept() -> Result<(), ScrapeError> {
        let patterns = Patterns::new()?;
        let mut fetch = MockFetch::new()
            .page(listing_page_url(0), page_body(0, 7))
            .page(listing_page_url(1), page_body(20, 20));
        let scan = ListingScanner::new(&patterns).scan(&mut fetch, 2)?;
        assert_eq!(scan.short_pages, vec![0]);
        assert_eq!(scan.links.len(), 27);
        // A flagged page is never the designated last page.
        assert!(scan.short_pages.iter().all(|p| p + 1 != 2));
        // Flagging caused no retry.
        assert_eq!(fetch.request_count(&listing_page_url(0)), 1);
        Ok(())
    }

    #[test]
    fn discover_page_count_reads_marker() -> Result<(), ScrapeError> {
        let patterns = Patterns::new()?;
        let mut fetch = MockFetch::new().page(
            listing_page_url(1),
            r#"<input name="total-pages" value="51"/>"#,
        );
        let count = ListingScanner::new(&patterns).discover_page_count(&mut fetch)?;
        assert_eq!(count, 51);
        Ok(())
    }

    #[test]
    fn discover_page_count_without_marker_is_fatal() -> Result<(), ScrapeError> {
        let patterns = Patterns::new()?;
        let mut fetch = MockFetch::new().page(listing_page_url(1), "<html>no marker</html>");
        let result = ListingScanner::new(&patterns).discover_page_count(&mut fetch);
        match result {
            Err(ScrapeError::PageCountMarkerMissing { url }) => {
                assert_eq!(url, listing_page_url(1));
                Ok(())
            }
            other => panic!("expected PageCountMarkerMissing, got {:?}", other),
        }
    }

    #[test]
    fn listing_url_shape() {
        assert_eq!(
            listing_page_url(0),
            "https://link.springer.com/search/page/0?facet-content-type=%22Book%22&package=openaccess"
        );
    }
}
