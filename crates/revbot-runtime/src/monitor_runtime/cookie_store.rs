use std::collections::BTreeMap;

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable view of the session cookies used for one remote call.
pub struct CookieSnapshot {
    version: u64,
    header: String,
}

impl CookieSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Rendered `Cookie` header value (`name=value; name=value`).
    pub fn header_value(&self) -> &str {
        &self.header
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}

#[derive(Debug)]
/// Owned session cookie store, the only cross-tick mutable state.
///
/// Remote calls read immutable snapshots; a successful refresh merges the
/// server-set cookies and bumps the version, so the engine can replace its
/// snapshot atomically on the next call.
pub struct CookieStore {
    cookies: BTreeMap<String, String>,
    version: u64,
}

impl CookieStore {
    pub fn new(initial: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            cookies: initial.into_iter().collect(),
            version: 0,
        }
    }

    pub fn snapshot(&self) -> CookieSnapshot {
        let header = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        CookieSnapshot {
            version: self.version,
            header,
        }
    }

    /// Merge refreshed cookies into the store. The version is bumped only
    /// when at least one cookie was applied.
    pub fn merge(&mut self, refreshed: impl IntoIterator<Item = (String, String)>) -> CookieSnapshot {
        let mut applied = false;
        for (name, value) in refreshed {
            self.cookies.insert(name, value);
            applied = true;
        }
        if applied {
            self.version = self.version.saturating_add(1);
        }
        self.snapshot()
    }
}

/// Issue a GET against the platform base URL and collect any cookies the
/// server sets. An empty result means the session could not be refreshed.
pub(crate) async fn fetch_refreshed_cookies(
    http: &reqwest::Client,
    base_url: &str,
    current: &CookieSnapshot,
) -> Result<Vec<(String, String)>> {
    let mut request = http.get(base_url);
    if !current.is_empty() {
        request = request.header(reqwest::header::COOKIE, current.header_value());
    }
    let response = request
        .send()
        .await
        .context("cookie refresh request failed")?;
    if !response.status().is_success() {
        return Ok(Vec::new());
    }
    let mut refreshed = Vec::new();
    for header in response.headers().get_all(reqwest::header::SET_COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        if let Some(pair) = parse_set_cookie_pair(raw) {
            refreshed.push(pair);
        }
    }
    Ok(refreshed)
}

/// Parse the `name=value` pair out of a `Set-Cookie` header, dropping
/// attributes such as `Path` and `HttpOnly`.
fn parse_set_cookie_pair(raw: &str) -> Option<(String, String)> {
    let first = raw.split(';').next()?;
    let (name, value) = first.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
