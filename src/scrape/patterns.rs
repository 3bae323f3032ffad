//! Named extraction patterns applied to raw page text, one per metadata field.
//!
//! Extraction rules live here and nowhere else; the resolver and scanner ask
//! for a field by name and get back whatever the page yielded, including
//! nothing. Swapping a rule (or the whole mechanism) does not touch callers.

use crate::scrape::error::ScrapeError;
use regex::Regex;
use std::str::FromStr;

/// Fields the extractor knows how to pull out of page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Item links on a listing page.
    Link,
    /// Book title from the detail page `<title>` tag.
    Title,
    /// Primary subject classification.
    Topic,
    /// Inner text of the embedded keyword array.
    KeywordList,
    /// Author names, preferred markup.
    AuthorPrimary,
    /// Author names, older markup; tried when the primary yields nothing.
    AuthorFallback,
    /// Total-page-count marker on the listing.
    TotalPages,
}

impl FromStr for Field {
    type Err = ScrapeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "link" => Ok(Field::Link),
            "title" => Ok(Field::Title),
            "topic" => Ok(Field::Topic),
            "keyword_list" => Ok(Field::KeywordList),
            "author_primary" => Ok(Field::AuthorPrimary),
            "author_fallback" => Ok(Field::AuthorFallback),
            "total_pages" => Ok(Field::TotalPages),
            _ => Err(ScrapeError::UnknownField {
                name: name.to_string(),
            }),
        }
    }
}

/// Compiled patterns, one per [Field]. Built once per run.
#[derive(Debug)]
pub struct Patterns {
    link: Regex,
    title: Regex,
    topic: Regex,
    keyword_list: Regex,
    author_primary: Regex,
    author_fallback: Regex,
    total_pages: Regex,
}

/// Compile one pattern or report which field's rule is broken (avoids
/// panicking on Regex::new).
fn compile(field: &'static str, pattern: &str) -> Result<Regex, ScrapeError> {
    Regex::new(pattern).map_err(|source| ScrapeError::Pattern { field, source })
}

impl Patterns {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            link: compile("link", r"/book/10\.10[0-9]{2}/[0-9]*-?\d*-?\d*-?\d*-?\d")?,
            title: compile(
                "title",
                r"<title>([a-zA-Z0-9 ü,\-—:;&–öä'’]*) \| SpringerLink<",
            )?,
            topic: compile("topic", r#""primarySubject":"(\D*?)""#)?,
            keyword_list: compile("keyword_list", r"'kwrd': \[(.*)\]")?,
            author_primary: compile("author_primary", r#""authors__name">(.*?)<"#)?,
            author_fallback: compile("author_fallback", r#""author-text">([a-zA-Z ]*?)<"#)?,
            total_pages: compile("total_pages", r#"name="total-pages" value="(\d*)"/"#)?,
        })
    }

    fn regex_for(&self, field: Field) -> &Regex {
        match field {
            Field::Link => &self.link,
            Field::Title => &self.title,
            Field::Topic => &self.topic,
            Field::KeywordList => &self.keyword_list,
            Field::AuthorPrimary => &self.author_primary,
            Field::AuthorFallback => &self.author_fallback,
            Field::TotalPages => &self.total_pages,
        }
    }

    /// Every match of the field's pattern, in page order. The first capture
    /// group where the pattern has one, the whole match otherwise. An empty
    /// result is a report, not an error; the caller decides what a miss means.
    pub fn extract(&self, text: &str, field: Field) -> Vec<String> {
        self.regex_for(field)
            .captures_iter(text)
            .map(|caps| {
                caps.get(1)
                    .unwrap_or_else(|| caps.get(0).expect("capture 0 always present"))
                    .as_str()
                    .to_string()
            })
            .collect()
    }

    /// First match of the field's pattern, if any.
    pub fn first(&self, text: &str, field: Field) -> Option<String> {
        self.extract(text, field).into_iter().next()
    }

    /// Author names with the fallback policy applied: the primary pattern,
    /// or the older markup when the primary yields nothing.
    pub fn authors(&self, text: &str) -> Vec<String> {
        let primary = self.extract(text, Field::AuthorPrimary);
        if primary.is_empty() {
            self.extract(text, Field::AuthorFallback)
        } else {
            primary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_SNIPPET: &str = r#"
<a href="/book/10.1007/978-3-030-00001-1" title="First Book">First</a>
<a href="/book/10.1057/978-1-137-00002-2" title="Second Book">Second</a>
<input name="total-pages" value="12"/>
"#;

    const DETAIL_SNIPPET: &str = r#"
<head><title>Machine Learning Basics | SpringerLink</title></head>
<script>dataLayer = [{"primarySubject":"Computer Science","kwds":1}];</script>
<script>var cfg = {'kwrd': ["learning","models","data"]};</script>
<span class="authors__name">Jane Doe</span><span class="authors__name">Ada Lovelace</span>
"#;

    fn patterns() -> Patterns {
        Patterns::new().expect("fixed patterns compile")
    }

    #[test]
    fn extract_links_in_page_order() {
        let links = patterns().extract(LISTING_SNIPPET, Field::Link);
        assert_eq!(
            links,
            vec![
                "/book/10.1007/978-3-030-00001-1",
                "/book/10.1057/978-1-137-00002-2"
            ]
        );
    }

    #[test]
    fn extract_total_pages_marker() {
        assert_eq!(
            patterns().first(LISTING_SNIPPET, Field::TotalPages),
            Some("12".to_string())
        );
    }

    #[test]
    fn extract_title_strips_site_suffix() {
        assert_eq!(
            patterns().first(DETAIL_SNIPPET, Field::Title),
            Some("Machine Learning Basics".to_string())
        );
    }

    #[test]
    fn extract_topic_from_embedded_json() {
        assert_eq!(
            patterns().first(DETAIL_SNIPPET, Field::Topic),
            Some("Computer Science".to_string())
        );
    }

    #[test]
    fn extract_keyword_list_inner_text() {
        assert_eq!(
            patterns().first(DETAIL_SNIPPET, Field::KeywordList),
            Some(r#""learning","models","data""#.to_string())
        );
    }

    #[test]
    fn extract_missing_field_reports_nothing() {
        let p = patterns();
        assert!(p.extract("<html></html>", Field::Topic).is_empty());
        assert_eq!(p.first("<html></html>", Field::Title), None);
    }

    #[test]
    fn authors_prefers_primary_markup() {
        let authors = patterns().authors(DETAIL_SNIPPET);
        assert_eq!(authors, vec!["Jane Doe", "Ada Lovelace"]);
    }

    #[test]
    fn authors_falls_back_to_older_markup() {
        let html = r#"<span class="author-text">Grace Hopper</span>"#;
        assert_eq!(patterns().authors(html), vec!["Grace Hopper"]);
    }

    #[test]
    fn authors_empty_when_both_patterns_miss() {
        assert!(patterns().authors("<html></html>").is_empty());
    }

    #[test]
    fn field_from_str_round_trips_known_names() -> Result<(), ScrapeError> {
        assert_eq!("link".parse::<Field>()?, Field::Link);
        assert_eq!("author_fallback".parse::<Field>()?, Field::AuthorFallback);
        Ok(())
    }

    #[test]
    fn field_from_str_rejects_unknown_name() {
        let result = "isbn".parse::<Field>();
        match result {
            Err(ScrapeError::UnknownField { name }) => assert_eq!(name, "isbn"),
            other => panic!("expected UnknownField, got {:?}", other),
        }
    }
}
