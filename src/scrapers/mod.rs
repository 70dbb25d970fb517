//! Article discovery and extraction for the AI Times listing site.
//!
//! The crawl follows a two-phase pattern:
//!
//! 1. **Discovery** ([`aitimes`]): walk the paginated listing, parse each
//!    entry's partial `MM-DD HH:MM` timestamp, keep entries from the trailing
//!    24 hours, and normalize their links to absolute URLs.
//! 2. **Extraction** ([`content`]): render each kept article in a headless
//!    browser and pull the body text out of the DOM with an ordered list of
//!    extraction strategies.
//!
//! # Failure isolation
//!
//! A listing page that returns a non-2xx status aborts the whole crawl (the
//! run is not worth a partial digest). Everything narrower is isolated: a
//! malformed listing date skips that entry, a failed article render becomes
//! an error string in the record's `full_content`.

pub mod aitimes;
pub mod content;
