//! Data models for crawled articles.
//!
//! This module defines [`ArticleRecord`], the unit of output produced by the
//! crawl and consumed by both the Supabase store and the digest mailer, plus
//! the link-keyed deduplication applied before persistence.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One article discovered from the listing within the recency window.
///
/// Records are assembled once by the crawl loop and immutable afterwards.
/// `link` is the natural unique key: it is always an absolute URL by the time
/// a record exists, and the Supabase table upserts on it.
///
/// `full_content` is always populated: either the cleaned body text, the
/// "not found" sentinel, or an error description when the render step failed.
/// Extraction failure is data, not an error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Article headline from the listing entry.
    pub title: String,
    /// Absolute article URL; unique key across the pipeline.
    pub link: String,
    /// Listing summary with newline runs collapsed to single spaces.
    pub summary: String,
    /// Publication timestamp in KST, serialized as RFC 3339 for PostgREST.
    pub published_at: DateTime<FixedOffset>,
    /// Cleaned body text, or a sentinel/error string from the extractor.
    pub full_content: String,
}

/// Deduplicate records by `link`, later record wins.
///
/// Keeps the position of the first occurrence of each link while replacing
/// its contents with the last record seen for that link, so repeated listing
/// entries (the site sometimes pins an article on both pages) collapse to the
/// freshest version without reordering the digest.
pub fn dedupe_by_link(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ArticleRecord> = Vec::with_capacity(records.len());

    for record in records {
        match slots.get(&record.link) {
            Some(&i) => unique[i] = record,
            None => {
                slots.insert(record.link.clone(), unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(link: &str, title: &str) -> ArticleRecord {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        ArticleRecord {
            title: title.to_string(),
            link: link.to_string(),
            summary: "summary".to_string(),
            published_at: kst.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            full_content: "content".to_string(),
        }
    }

    #[test]
    fn test_dedupe_later_record_wins() {
        let records = vec![
            record("https://www.aitimes.com/a", "first title"),
            record("https://www.aitimes.com/b", "other"),
            record("https://www.aitimes.com/a", "second title"),
        ];

        let unique = dedupe_by_link(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].link, "https://www.aitimes.com/a");
        assert_eq!(unique[0].title, "second title");
        assert_eq!(unique[1].link, "https://www.aitimes.com/b");
    }

    #[test]
    fn test_dedupe_preserves_first_seen_order() {
        let records = vec![
            record("https://www.aitimes.com/1", "a"),
            record("https://www.aitimes.com/2", "b"),
            record("https://www.aitimes.com/1", "c"),
            record("https://www.aitimes.com/3", "d"),
        ];

        let links: Vec<String> = dedupe_by_link(records)
            .into_iter()
            .map(|r| r.link)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://www.aitimes.com/1",
                "https://www.aitimes.com/2",
                "https://www.aitimes.com/3"
            ]
        );
    }

    #[test]
    fn test_dedupe_empty_input() {
        assert!(dedupe_by_link(Vec::new()).is_empty());
    }

    #[test]
    fn test_record_serializes_rfc3339_timestamp() {
        let json = serde_json::to_string(&record("https://www.aitimes.com/a", "t")).unwrap();
        assert!(json.contains("2025-06-01T12:00:00+09:00"));
        assert!(json.contains("\"link\":\"https://www.aitimes.com/a\""));
    }
}
