//! Command-line interface definitions for the AI Times digest crawler.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials are optional and environment-backed so the pipeline can run in
//! a degraded mode (discovery and extraction only) when they are absent.

use clap::Parser;

/// Command-line arguments for the AI Times digest crawler.
///
/// Everything here is configuration for the external adapters; the crawl
/// itself needs no arguments. Missing Supabase credentials skip persistence,
/// missing SMTP credentials skip the digest mail — neither stops discovery.
///
/// # Examples
///
/// ```sh
/// # Degraded mode: crawl and log only
/// aitimes_digest
///
/// # Full pipeline, credentials from the environment
/// SUPABASE_URL=... SUPABASE_KEY=... SMTP_USER=... SMTP_PASSWORD=... \
///   RECIPIENT_EMAIL=you@example.com aitimes_digest
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SMTP server hostname for the digest mail
    #[arg(long, env = "SMTP_SERVER", default_value = "smtp.gmail.com")]
    pub smtp_server: String,

    /// SMTP port (implicit TLS)
    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    /// SMTP login, also used as the From address
    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    /// SMTP password or app password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Recipient address for the digest mail
    #[arg(long, env = "RECIPIENT_EMAIL")]
    pub recipient_email: Option<String>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase service role or anon key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Seconds to let an article page settle before reading the rendered DOM
    #[arg(long, default_value_t = 3)]
    pub settle_secs: u64,
}
