//! Supabase persistence adapter.
//!
//! Articles are archived to a Supabase table through the PostgREST interface:
//! one `POST /rest/v1/articles?on_conflict=link` per invocation with
//! `Prefer: resolution=merge-duplicates`, which makes repeated runs
//! idempotent on the `link` column.
//!
//! The store is a typed state, not a nullable global: [`Store::Unconfigured`]
//! is the degraded mode where discovery and extraction still run but nothing
//! is persisted.

use crate::models::{dedupe_by_link, ArticleRecord};
use crate::utils::truncate_for_log;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Table holding the crawled articles, unique on `link`.
const TABLE: &str = "articles";

/// Datastore state decided once at startup from the provided credentials.
#[derive(Debug)]
pub enum Store {
    Configured(SupabaseStore),
    Unconfigured,
}

impl Store {
    /// Build the store from optional credentials; either one missing means
    /// the degraded, persistence-free mode.
    pub fn from_credentials(url: Option<String>, key: Option<String>) -> Self {
        match (url, key) {
            (Some(url), Some(key)) => Store::Configured(SupabaseStore::new(url, key)),
            _ => Store::Unconfigured,
        }
    }
}

/// Client for the Supabase PostgREST endpoint.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl std::fmt::Debug for SupabaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SupabaseStore {
    pub fn new(base_url: String, key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            key,
        }
    }

    /// Upsert records keyed on `link`, returning the number of rows the
    /// server reports back.
    ///
    /// The input is deduplicated first (later record wins), and an empty
    /// input is a silent no-op. A non-2xx response comes back as an error for
    /// the caller to report; it never panics past the call boundary.
    #[instrument(level = "info", skip_all, fields(count = records.len()))]
    pub async fn upsert(&self, records: &[ArticleRecord]) -> Result<usize, Box<dyn Error>> {
        if records.is_empty() {
            debug!("No records to persist");
            return Ok(0);
        }

        let unique = dedupe_by_link(records.to_vec());
        info!(unique = unique.len(), "Upserting articles to Supabase");

        let endpoint = format!("{}/rest/v1/{TABLE}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&endpoint)
            .query(&[("on_conflict", "link")])
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&unique)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(format!(
                "Supabase upsert failed with {status}: {}",
                truncate_for_log(&body, 300)
            )
            .into());
        }

        let rows: serde_json::Value = serde_json::from_str(&body)?;
        Ok(rows.as_array().map_or(0, |r| r.len()))
    }
}
