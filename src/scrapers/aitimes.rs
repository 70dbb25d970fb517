//! AI Times listing crawler.
//!
//! Walks the paginated article listing at
//! [aitimes.com](https://www.aitimes.com/news/articleList.html?view_type=sm),
//! keeps entries published within the trailing 24 hours, and assembles one
//! [`ArticleRecord`] per kept entry, body text included.
//!
//! # Listing dates
//!
//! The site exposes publish times as `MM-DD HH:MM` with no year, so the year
//! is inferred from the current time. The one predictable ambiguity is the
//! year boundary: a late-December article seen during a January run would
//! parse eleven months into the future. That single case is corrected by
//! subtracting a year; every other future-looking candidate is taken as-is.

use crate::models::ArticleRecord;
use crate::scrapers::content;
use crate::utils::kst;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Listing endpoint, queried with `view_type` and `page`.
pub const LIST_URL: &str = "https://www.aitimes.com/news/articleList.html";
/// Site origin, prepended to relative article links.
pub const BASE_URL: &str = "https://www.aitimes.com";
/// Listing view variant the selectors below are written against.
const VIEW_TYPE: &str = "sm";
/// Inclusive page range walked per invocation.
const FIRST_PAGE: u32 = 1;
const LAST_PAGE: u32 = 2;

/// Browser-like User-Agent for the listing requests.
pub const LISTING_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:115.0) Gecko/20100101 Firefox/115.0";

/// Listing request timeout.
pub const LISTING_TIMEOUT: StdDuration = StdDuration::from_secs(10);

static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul.altlist-webzine > li.altlist-webzine-item").unwrap());
static INFO_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.altlist-info-item").unwrap());
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2.altlist-subject a").unwrap());
static SUMMARY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.altlist-summary").unwrap());

/// Some anchors wrap the real article URL in a tracking path, e.g.
/// `/bridge(https://www.aitimes.com/news/articleView.html?idxno=1)`.
static EMBEDDED_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((https?://[^)]+)\)").unwrap());
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());

/// One listing entry that passed the recency filter, before body extraction.
#[derive(Debug, PartialEq)]
pub struct ListingEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Parse a listing date fragment and decide inclusion.
///
/// Returns the absolute KST timestamp if the entry falls within the trailing
/// 24-hour window (strictly after `now − 24h`), `None` otherwise. A malformed
/// fragment is `None` as well — the caller skips the entry and moves on.
///
/// Year-rollover correction: a candidate strictly after `now`, seen while
/// `now` is in January and the candidate in December, gets `now.year − 1`.
/// No other month pairing is corrected.
pub fn recent_publish_time(
    fragment: &str,
    now: DateTime<FixedOffset>,
) -> Option<DateTime<FixedOffset>> {
    let naive =
        NaiveDateTime::parse_from_str(&format!("{}-{}", now.year(), fragment), "%Y-%m-%d %H:%M")
            .ok()?;
    let mut candidate = naive.and_local_timezone(kst()).single()?;

    if candidate > now && now.month() == 1 && candidate.month() == 12 {
        candidate = candidate.with_year(now.year() - 1)?;
    }

    (candidate > now - Duration::days(1)).then_some(candidate)
}

/// Normalize a raw listing href into an absolute URL.
///
/// Resolution order: an embedded parenthesized absolute URL wins, then an
/// already-absolute href is passed through, then everything else is treated
/// as a path under the site origin. Never fails.
pub fn resolve_link(raw: &str) -> String {
    if let Some(captures) = EMBEDDED_URL.captures(raw) {
        return captures[1].to_string();
    }
    if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("{BASE_URL}{raw}")
    }
}

/// Parse one listing page into the entries inside the recency window.
///
/// Entries missing a date, title anchor, or summary are skipped; the listing
/// mixes ad items into the same markup and those lack the full structure.
/// Order is the page's document order.
pub fn parse_listing(html: &str, now: DateTime<FixedOffset>) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for item in document.select(&ITEM_SELECTOR) {
        // Last info item is the publish time; earlier ones hold the byline.
        let Some(date_tag) = item.select(&INFO_SELECTOR).last() else {
            continue;
        };
        let date_str = date_tag.text().collect::<String>().trim().to_string();

        let Some(published_at) = recent_publish_time(&date_str, now) else {
            debug!(date = %date_str, "Listing entry outside window or unparseable");
            continue;
        };

        let (Some(title_tag), Some(summary_tag)) = (
            item.select(&TITLE_SELECTOR).next(),
            item.select(&SUMMARY_SELECTOR).next(),
        ) else {
            warn!(date = %date_str, "Listing entry missing title or summary; skipping");
            continue;
        };
        let Some(href) = title_tag.value().attr("href") else {
            continue;
        };

        let summary = summary_tag.text().collect::<String>().trim().to_string();
        entries.push(ListingEntry {
            title: title_tag.text().collect::<String>().trim().to_string(),
            link: resolve_link(href),
            summary: NEWLINE_RUNS.replace_all(&summary, " ").into_owned(),
            published_at,
        });
    }

    entries
}

/// Fetch one listing page as raw HTML.
///
/// A non-2xx status is a hard failure: the error propagates and aborts the
/// whole crawl rather than producing a partial digest.
#[instrument(level = "info", skip(client, list_url))]
pub async fn fetch_page(
    client: &reqwest::Client,
    list_url: &str,
    page: u32,
) -> Result<String, Box<dyn Error>> {
    let page_param = page.to_string();
    let url = Url::parse_with_params(
        list_url,
        [("view_type", VIEW_TYPE), ("page", page_param.as_str())],
    )?;
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// Crawl the configured listing pages and extract every recent article.
///
/// This is the whole discovery/extraction pass: fetch each page, parse its
/// entries, and run the content extractor on every entry inside the recency
/// window, one article at a time. Returns records in page order, then in-page
/// document order.
#[instrument(level = "info", skip_all)]
pub async fn crawl_recent(
    client: &reqwest::Client,
    now: DateTime<FixedOffset>,
    settle: StdDuration,
) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
    let mut records = Vec::new();

    for page in FIRST_PAGE..=LAST_PAGE {
        let html = fetch_page(client, LIST_URL, page).await?;
        let entries = parse_listing(&html, now);
        info!(page, count = entries.len(), "Parsed listing entries inside window");

        for entry in entries {
            debug!(link = %entry.link, "Extracting article body");
            let extraction = content::article_content(&entry.link, settle).await;
            records.push(ArticleRecord {
                title: entry.title,
                link: entry.link,
                summary: entry.summary,
                published_at: entry.published_at,
                full_content: extraction.into_content(),
            });
        }
    }

    info!(count = records.len(), "Crawl produced article records");
    Ok(records)
}
