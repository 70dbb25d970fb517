//! # AI Times Digest
//!
//! A single-site news pipeline that crawls recently published AI Times
//! articles, extracts their full text through a headless browser, archives
//! them to Supabase, and emails an HTML digest.
//!
//! ## Architecture
//!
//! One sequential pass per invocation (run it from cron):
//! 1. **Discovery**: walk listing pages 1–2, keep entries from the trailing
//!    24 hours (listing dates carry no year; see the scraper for the
//!    year-rollover handling)
//! 2. **Extraction**: render each kept article and pull the cleaned body text
//! 3. **Persistence**: upsert the records into Supabase, keyed on `link`
//! 4. **Digest**: mail one HTML summary to the configured recipient
//!
//! Missing Supabase or SMTP credentials degrade the corresponding step to a
//! logged skip; discovery and extraction always run. Downstream failures are
//! reported, never fatal — a failed upsert still lets the mail go out.
//!
//! ## Usage
//!
//! ```sh
//! SUPABASE_URL=... SUPABASE_KEY=... SMTP_USER=... SMTP_PASSWORD=... \
//!   RECIPIENT_EMAIL=you@example.com aitimes_digest
//! ```

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod mailer;
mod models;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use mailer::MailConfig;
use scrapers::aitimes;
use store::Store;
use utils::now_kst;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("aitimes_digest starting up");

    let args = Cli::parse();

    // Adapter states are decided once, up front; either can be absent
    // without stopping discovery.
    let store = Store::from_credentials(args.supabase_url.clone(), args.supabase_key.clone());
    if matches!(store, Store::Unconfigured) {
        warn!("Supabase credentials missing; running without persistence");
    }
    let mail = MailConfig::from_parts(
        args.smtp_server.clone(),
        args.smtp_port,
        args.smtp_user.clone(),
        args.smtp_password.clone(),
        args.recipient_email.clone(),
    );
    if mail.is_none() {
        warn!("SMTP credentials missing; running without digest mail");
    }

    // One HTTP client for all listing pages, keep-alive included.
    let client = reqwest::Client::builder()
        .user_agent(aitimes::LISTING_USER_AGENT)
        .timeout(aitimes::LISTING_TIMEOUT)
        .build()?;

    let now = now_kst();
    let settle = Duration::from_secs(args.settle_secs);
    info!(%now, settle_secs = args.settle_secs, "Starting crawl");

    let records = match aitimes::crawl_recent(&client, now, settle).await {
        Ok(records) => records,
        Err(e) => {
            // Page-level failure: no partial digest. Downstream is skipped
            // and the process still exits cleanly.
            error!(error = %e, "Crawl failed; skipping persistence and mail");
            return Ok(());
        }
    };
    info!(count = records.len(), "Crawl complete");

    match &store {
        Store::Configured(supabase) => match supabase.upsert(&records).await {
            Ok(rows) => info!(rows, "Supabase upsert complete"),
            Err(e) => error!(error = %e, "Supabase upsert failed"),
        },
        Store::Unconfigured => {
            warn!(count = records.len(), "Datastore unconfigured; persistence skipped")
        }
    }

    match &mail {
        Some(config) => match mailer::send_digest(config, &records, now).await {
            Ok(()) => info!("Digest mail step complete"),
            Err(e) => error!(error = %e, "Digest mail failed"),
        },
        None => warn!("Digest mail skipped; SMTP credentials missing"),
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");

    Ok(())
}
