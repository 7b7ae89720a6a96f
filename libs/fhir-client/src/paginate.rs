//! Pagination combining for query-result bundles
//!
//! A search against the data store can span several pages linked by "next"
//! relations. The combiner follows those links sequentially (each
//! continuation URL is only discovered from the previous page) and merges
//! every page's entries into one logical bundle, preserving arrival order.

use std::future::Future;

use url::{Position, Url};

use crate::error::{Error, Result};
use crate::models::{Bundle, BundleEntry};

/// Upper bound on continuation fetches for a single search. The protocol has
/// no page-count signal; the cap keeps a misbehaving server that always
/// returns a "next" link from looping forever.
pub const DEFAULT_MAX_PAGES: usize = 32;

/// One continuation fetch: the stripped base URL plus the flattened query
/// parameters recovered from a "next" link.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Scheme, host, and path only; the query is carried in `params`.
    pub base_url: String,
    pub params: Vec<(String, String)>,
}

/// Split a continuation URL into a [`PageRequest`].
///
/// Each query key keeps its first occurrence's value; the remote API is not
/// expected to repeat keys.
pub fn split_page_url(next: &str) -> Result<PageRequest> {
    let url = Url::parse(next)?;
    let base_url = url[..Position::AfterPath].to_string();

    let mut params: Vec<(String, String)> = Vec::new();
    for (key, value) in url.query_pairs() {
        if !params.iter().any(|(k, _)| k.as_str() == key.as_ref()) {
            params.push((key.into_owned(), value.into_owned()));
        }
    }

    Ok(PageRequest { base_url, params })
}

/// Follow "next" links and merge all pages into one bundle.
///
/// `fetch` issues the signed GET for one continuation page. Entries are
/// appended in page order; every other top-level field of the initial bundle
/// is left unchanged. Any fetch failure propagates - the caller never sees a
/// partially combined result.
pub async fn combine_pages<F, Fut>(initial: Bundle, mut fetch: F, max_pages: usize) -> Result<Bundle>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Bundle>>,
{
    let mut combined = initial;
    let mut entries: Vec<BundleEntry> = combined.entry.take().unwrap_or_default();
    tracing::debug!(count = entries.len(), "entries before combine");

    let mut next = combined.next_url().map(str::to_string);
    let mut fetched = 0usize;

    while let Some(url) = next {
        if fetched >= max_pages {
            return Err(Error::TooManyPages { limit: max_pages });
        }

        let page = split_page_url(&url)?;
        let mut bundle = fetch(page).await?;
        fetched += 1;

        let new_entries = bundle.entry.take().unwrap_or_default();
        tracing::debug!(added = new_entries.len(), page = fetched, "merged continuation page");
        entries.extend(new_entries);

        next = bundle.next_url().map(str::to_string);
    }

    combined.entry = Some(entries);
    tracing::debug!(total = combined.entry_count(), "entries after combine");
    Ok(combined)
}
