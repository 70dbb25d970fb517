//! HTML digest rendering and SMTP delivery.
//!
//! Renders one HTML document with a block per article (linked title, summary,
//! publish date) and sends it to the single configured recipient over
//! authenticated SMTPS. Rendering is a pure function so it can be tested
//! without a transport.

use crate::models::ArticleRecord;
use chrono::{DateTime, FixedOffset};
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error;
use tracing::{info, instrument};

/// SMTP connection and addressing for the digest mail.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub recipient: String,
}

impl MailConfig {
    /// Assemble the config from the CLI surface; any missing credential
    /// means the mail step is skipped entirely.
    pub fn from_parts(
        server: String,
        port: u16,
        user: Option<String>,
        password: Option<String>,
        recipient: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            server,
            port,
            user: user?,
            password: password?,
            recipient: recipient?,
        })
    }
}

/// Digest subject line, dated in Korean like the site's audience expects.
pub fn digest_subject(now: DateTime<FixedOffset>) -> String {
    format!("[{}] AITimes 주간 AI 뉴스 요약", now.format("%Y년 %m월 %d일"))
}

/// Render the digest body: one visual block per record.
pub fn render_digest(records: &[ArticleRecord], now: DateTime<FixedOffset>) -> String {
    let mut html = format!(
        r#"<html>
<head>
    <style>
        body {{ font-family: sans-serif; }}
        .article {{
            border-bottom: 1px solid #eee;
            padding-bottom: 15px;
            margin-bottom: 15px;
        }}
        .article:last-child {{
            border-bottom: none;
        }}
        h2 a {{ color: #0066cc; text-decoration: none; }}
        h2 a:hover {{ text-decoration: underline; }}
        p {{ color: #333; }}
        small {{ color: #888; }}
    </style>
</head>
<body>
    <h1>[{}] AITimes 신규 기사</h1>
"#,
        now.format("%Y년 %m월 %d일")
    );

    for record in records {
        html.push_str(&format!(
            r#"    <div class="article">
        <h2><a href="{}">{}</a></h2>
        <p>{}</p>
        <small>발행일: {}</small>
    </div>
"#,
            record.link,
            record.title,
            record.summary,
            record.published_at.format("%Y-%m-%d %H:%M")
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Send the digest mail, no-op on an empty record set.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub async fn send_digest(
    config: &MailConfig,
    records: &[ArticleRecord],
    now: DateTime<FixedOffset>,
) -> Result<(), Box<dyn Error>> {
    if records.is_empty() {
        info!("No new articles; digest mail not sent");
        return Ok(());
    }

    let message = Message::builder()
        .from(config.user.parse::<Mailbox>()?)
        .to(config.recipient.parse::<Mailbox>()?)
        .subject(digest_subject(now))
        .singlepart(SinglePart::html(render_digest(records, now)))?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)?
        .port(config.port)
        .credentials(Credentials::new(
            config.user.clone(),
            config.password.clone(),
        ))
        .build();

    transport.send(message).await?;
    info!(recipient = %config.recipient, "Digest mail sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::kst;
    use chrono::TimeZone;

    fn sample_now() -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn sample_record() -> ArticleRecord {
        ArticleRecord {
            title: "AI 업계 소식".to_string(),
            link: "https://www.aitimes.com/news/articleView.html?idxno=7".to_string(),
            summary: "한 줄 요약입니다.".to_string(),
            published_at: kst().with_ymd_and_hms(2025, 6, 15, 11, 0, 0).unwrap(),
            full_content: "본문".to_string(),
        }
    }

    #[test]
    fn test_from_parts_requires_all_credentials() {
        assert!(MailConfig::from_parts(
            "smtp.gmail.com".into(),
            465,
            Some("a@b.c".into()),
            Some("pw".into()),
            None
        )
        .is_none());

        let config = MailConfig::from_parts(
            "smtp.gmail.com".into(),
            465,
            Some("a@b.c".into()),
            Some("pw".into()),
            Some("d@e.f".into()),
        )
        .unwrap();
        assert_eq!(config.recipient, "d@e.f");
    }

    #[test]
    fn test_digest_subject_korean_date() {
        assert_eq!(
            digest_subject(sample_now()),
            "[2025년 06월 15일] AITimes 주간 AI 뉴스 요약"
        );
    }

    #[test]
    fn test_render_digest_one_block_per_record() {
        let html = render_digest(&[sample_record()], sample_now());

        assert!(html.contains("<h1>[2025년 06월 15일] AITimes 신규 기사</h1>"));
        assert!(html
            .contains(r#"<a href="https://www.aitimes.com/news/articleView.html?idxno=7">AI 업계 소식</a>"#));
        assert!(html.contains("<p>한 줄 요약입니다.</p>"));
        assert!(html.contains("발행일: 2025-06-15 11:00"));
    }

    #[test]
    fn test_render_digest_empty_has_no_article_blocks() {
        let html = render_digest(&[], sample_now());
        assert!(!html.contains(r#"<div class="article">"#));
    }
}
