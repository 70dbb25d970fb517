//! Article body extraction via a headless browser.
//!
//! AI Times article pages assemble part of their markup client-side, so the
//! raw HTTP response is not enough: each article is loaded in a fresh
//! headless Chromium session, given a fixed settle delay to finish rendering,
//! and the resulting DOM is mined for paragraph text.
//!
//! Extraction is an ordered list of [`ExtractStrategy`] values tried in
//! sequence: the dedicated content container first, the whole document body
//! as a fallback. The surviving text then goes through a line-level cleanup
//! that strips navigation fragments, reporter contact lines, and copyright
//! boilerplate before collapsing everything to a single normalized line.
//!
//! Nothing in here aborts the pipeline. A render failure becomes
//! [`Extraction::Failed`], an unusable page becomes [`Extraction::NotFound`],
//! and both turn into plain strings in the record.

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Returned when no usable body text could be extracted.
pub const NOT_FOUND: &str = "기사 본문을 찾을 수 없습니다.";

/// Chrome-like User-Agent for the rendering session.
const RENDER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";

/// Lines shorter than this are navigation/UI fragments, not body text.
const MIN_LINE_CHARS: usize = 20;

static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#article-view-content-div").unwrap());
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Outcome of one article's body extraction.
///
/// Extraction never escalates into a pipeline error; the orchestrator turns
/// the outcome into the record's `full_content` via [`Extraction::into_content`].
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Cleaned, whitespace-normalized body text.
    Body(String),
    /// The page rendered, but yielded no usable body text.
    NotFound,
    /// Navigation or rendering threw; carries the error description.
    Failed(String),
}

impl Extraction {
    /// Collapse the outcome into the string stored on the record.
    pub fn into_content(self) -> String {
        match self {
            Extraction::Body(text) => text,
            Extraction::NotFound => NOT_FOUND.to_string(),
            Extraction::Failed(reason) => format!("기사 본문 크롤링 중 오류 발생: {reason}"),
        }
    }
}

/// One way of pulling raw paragraph text out of a parsed document.
///
/// `extract` returns `None` when the strategy does not apply to this document
/// (its root element is absent). An applicable strategy that finds no text
/// returns an empty string, which deliberately does NOT fall through to the
/// next strategy: a present-but-empty content container means the article has
/// no body, not that the fallback should scrape the page chrome.
trait ExtractStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, document: &Html) -> Option<String>;
}

/// Tier 1: paragraphs inside the article's dedicated content container.
struct ContainerParagraphs;

/// Tier 2: paragraphs anywhere under the document body.
struct BodyParagraphs;

fn paragraphs_under(root: ElementRef<'_>) -> String {
    root.select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ExtractStrategy for ContainerParagraphs {
    fn name(&self) -> &'static str {
        "container"
    }

    fn extract(&self, document: &Html) -> Option<String> {
        document
            .select(&CONTAINER_SELECTOR)
            .next()
            .map(paragraphs_under)
    }
}

impl ExtractStrategy for BodyParagraphs {
    fn name(&self) -> &'static str {
        "body"
    }

    fn extract(&self, document: &Html) -> Option<String> {
        document.select(&BODY_SELECTOR).next().map(paragraphs_under)
    }
}

/// Clean raw newline-joined paragraph text into a single normalized line.
///
/// Drops lines that are empty or shorter than 20 characters after trimming,
/// reporter contact lines (byline token plus an `@`), and copyright footers
/// (copyright token plus reproduction-prohibition token). Whatever survives
/// is collapsed to single-space-separated text.
pub fn clean_article_text(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().count() >= MIN_LINE_CHARS)
        .filter(|line| !(line.contains("기자") && line.contains('@')))
        .filter(|line| !(line.contains("저작권자") && line.contains("무단전재")))
        .collect();

    WHITESPACE_RUNS
        .replace_all(&kept.join("\n"), " ")
        .trim()
        .to_string()
}

/// Extract the article body from rendered HTML.
pub fn extract_from_html(html: &str) -> Extraction {
    let document = Html::parse_document(html);
    let strategies: [&dyn ExtractStrategy; 2] = [&ContainerParagraphs, &BodyParagraphs];

    for strategy in strategies {
        let Some(raw) = strategy.extract(&document) else {
            continue;
        };
        debug!(strategy = strategy.name(), bytes = raw.len(), "Extraction strategy applied");

        let cleaned = clean_article_text(&raw);
        if cleaned.is_empty() {
            return Extraction::NotFound;
        }
        return Extraction::Body(cleaned);
    }

    Extraction::NotFound
}

/// Render an article URL and return the settled DOM as HTML.
///
/// One Chromium process per article, torn down on every exit path. The fixed
/// settle delay stands in for DOM-ready polling; the site finishes rendering
/// well within it and the reproducible timing is worth the latency.
async fn render_page(url: &str, settle: Duration) -> Result<String, Box<dyn Error>> {
    let config = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-dev-shm-usage")
        .build()?;
    let (mut browser, mut handler) = Browser::launch(config).await?;
    let events = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let rendered = async {
        let page = browser.new_page("about:blank").await?;
        page.set_user_agent(RENDER_USER_AGENT).await?;
        page.goto(url).await?;
        sleep(settle).await;
        let html = page.content().await?;
        page.close().await?;
        Ok::<_, Box<dyn Error>>(html)
    }
    .await;

    // Teardown happens whether rendering succeeded or not; a leaked Chromium
    // process outlives the invocation.
    let _ = browser.close().await;
    let _ = browser.wait().await;
    events.abort();

    rendered
}

/// Fetch and extract one article's body text.
///
/// Never returns an error: a failed render is reported inside the outcome so
/// one broken article cannot abort the rest of the crawl.
#[instrument(level = "info", skip(settle), fields(%url))]
pub async fn article_content(url: &str, settle: Duration) -> Extraction {
    match render_page(url, settle).await {
        Ok(html) => extract_from_html(&html),
        Err(e) => {
            warn!(error = %e, "Article render failed");
            Extraction::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_LINE_A: &str = "인공지능 기술이 빠르게 발전하면서 산업 전반의 변화가 가속되고 있다.";
    const LONG_LINE_B: &str = "전문가들은 규제와 혁신 사이의 균형이 무엇보다 중요하다고 강조했다.";

    #[test]
    fn test_container_keeps_only_long_lines() {
        let html = format!(
            r#"<html><body>
            <div id="article-view-content-div">
              <p>{LONG_LINE_A}</p>
              <p>짧은 문장.</p>
              <p>{LONG_LINE_B}</p>
            </div>
            </body></html>"#
        );

        let result = extract_from_html(&html);
        assert_eq!(
            result,
            Extraction::Body(format!("{LONG_LINE_A} {LONG_LINE_B}"))
        );
    }

    #[test]
    fn test_byline_with_email_is_dropped() {
        let html = format!(
            r#"<div id="article-view-content-div">
              <p>{LONG_LINE_A}</p>
              <p>홍길동 기자 hong@example.com 제보는 언제든 환영합니다</p>
            </div>"#
        );

        let result = extract_from_html(&html);
        assert_eq!(result, Extraction::Body(LONG_LINE_A.to_string()));
    }

    #[test]
    fn test_copyright_footer_is_dropped() {
        let html = format!(
            r#"<div id="article-view-content-div">
              <p>{LONG_LINE_A}</p>
              <p>저작권자 © AI타임스 무단전재 및 재배포, AI학습 이용 금지</p>
            </div>"#
        );

        let result = extract_from_html(&html);
        assert_eq!(result, Extraction::Body(LONG_LINE_A.to_string()));
    }

    #[test]
    fn test_internal_whitespace_runs_are_collapsed() {
        let html = format!(
            r#"<div id="article-view-content-div">
              <p>공백이   여러 개    들어간 문장이지만 충분히 긴 줄입니다.</p>
              <p>{LONG_LINE_B}</p>
            </div>"#
        );

        let result = extract_from_html(&html);
        assert_eq!(
            result,
            Extraction::Body(format!(
                "공백이 여러 개 들어간 문장이지만 충분히 긴 줄입니다. {LONG_LINE_B}"
            ))
        );
    }

    #[test]
    fn test_body_fallback_when_container_absent() {
        let html = format!(
            r#"<html><body>
            <nav><p>메뉴</p></nav>
            <article><p>{LONG_LINE_A}</p></article>
            </body></html>"#
        );

        let result = extract_from_html(&html);
        assert_eq!(result, Extraction::Body(LONG_LINE_A.to_string()));
    }

    #[test]
    fn test_empty_container_does_not_fall_through_to_body() {
        // The container exists but holds no paragraphs; the body does. The
        // fallback must not fire, so the outcome is the sentinel.
        let html = format!(
            r#"<html><body>
            <div id="article-view-content-div"></div>
            <footer><p>{LONG_LINE_B}</p></footer>
            </body></html>"#
        );

        assert_eq!(extract_from_html(&html), Extraction::NotFound);
    }

    #[test]
    fn test_unusable_page_yields_not_found() {
        assert_eq!(
            extract_from_html("<html><body><p>짧음</p></body></html>"),
            Extraction::NotFound
        );
        assert_eq!(extract_from_html(""), Extraction::NotFound);
    }

    #[test]
    fn test_clean_article_text_drops_short_and_empty_lines() {
        let text = format!("{LONG_LINE_A}\n\n   \n너무 짧음\n{LONG_LINE_B}");
        assert_eq!(
            clean_article_text(&text),
            format!("{LONG_LINE_A} {LONG_LINE_B}")
        );
    }

    #[test]
    fn test_clean_article_text_counts_characters_not_bytes() {
        // 19 Hangul characters is 57 bytes but still below the threshold.
        let line = "가".repeat(19);
        assert_eq!(clean_article_text(&line), "");
        let kept = "가".repeat(20);
        assert_eq!(clean_article_text(&kept), kept);
    }

    #[test]
    fn test_into_content_mapping() {
        assert_eq!(Extraction::Body("본문".into()).into_content(), "본문");
        assert_eq!(Extraction::NotFound.into_content(), NOT_FOUND);
        assert_eq!(
            Extraction::Failed("timeout".into()).into_content(),
            "기사 본문 크롤링 중 오류 발생: timeout"
        );
    }
}
