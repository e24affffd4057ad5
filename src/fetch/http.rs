// src/fetch/http.rs
// =============================================================================
// This module fetches rendered pages over HTTP.
//
// Key functionality:
// - GET requests with browser-like headers (some origins serve stripped-down
//   markup to unknown agents)
// - Manual redirect following, hop by hop, so the full chain is recorded
//   for the fetch diagnostics report
// - Transport-level retries with a linear backoff
//
// Redirects are capped at 10 hops; a longer chain is almost certainly a
// loop and gets reported as the last status seen.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const MAX_REDIRECT_HOPS: usize = 10;
const TRANSPORT_RETRIES: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) DrupalComponentScanner/1.0";

/// One hop of a redirect chain, as exported in the fetch diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectHop {
    pub from: String,
    pub to: String,
    pub status: u16,
}

/// Outcome of fetching one URL. A transport failure (DNS, timeout, TLS)
/// surfaces as status 0 with an empty body rather than an error: one dead
/// page must never abort a scan of hundreds.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub html: String,
    pub final_url: String,
    pub chain: Vec<RedirectHop>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Builds the shared HTTP client. Redirects are disabled at the client level
/// so fetch_page can follow them manually and record each hop.
pub fn build_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ja,ja-JP;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(20))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Failed to build HTTP client")
}

/// Fetches a page, following redirects manually up to MAX_REDIRECT_HOPS.
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    let mut current = url.to_string();
    let mut chain = Vec::new();

    for _hop in 0..=MAX_REDIRECT_HOPS {
        let response = match fetch_once(client, &current).await {
            Some(response) => response,
            None => {
                return FetchResult {
                    status: 0,
                    html: String::new(),
                    final_url: current,
                    chain,
                };
            }
        };

        let status = response.status();
        if status.is_redirection() {
            if let Some(target) = redirect_target(&response, &current) {
                if chain.len() >= MAX_REDIRECT_HOPS {
                    eprintln!(
                        "Warning: Redirect chain exceeded {} hops for {}",
                        MAX_REDIRECT_HOPS, url
                    );
                    return FetchResult {
                        status: status.as_u16(),
                        html: String::new(),
                        final_url: current,
                        chain,
                    };
                }
                chain.push(RedirectHop {
                    from: current.clone(),
                    to: target.clone(),
                    status: status.as_u16(),
                });
                current = target;
                continue;
            }
            // 3xx without a usable Location header: treat as terminal
        }

        let html = response.text().await.unwrap_or_default();
        return FetchResult {
            status: status.as_u16(),
            html,
            final_url: current,
            chain,
        };
    }

    // Unreachable in practice: the loop always returns within the hop cap.
    FetchResult {
        status: 0,
        html: String::new(),
        final_url: current,
        chain,
    }
}

// One GET with transport retries. Returns None when every attempt failed.
async fn fetch_once(client: &Client, url: &str) -> Option<reqwest::Response> {
    for attempt in 1..=TRANSPORT_RETRIES {
        match client.get(url).send().await {
            Ok(response) => return Some(response),
            Err(e) => {
                if attempt == TRANSPORT_RETRIES {
                    eprintln!("Warning: Request failed for {}: {}", url, e);
                    return None;
                }
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * u64::from(attempt));
                tokio::time::sleep(delay).await;
            }
        }
    }
    None
}

fn redirect_target(response: &reqwest::Response, current: &str) -> Option<String> {
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())?;

    if location.starts_with("http://") || location.starts_with("https://") {
        return Some(location.to_string());
    }
    Url::parse(current)
        .ok()
        .and_then(|base| base.join(location).ok())
        .map(|u| u.to_string())
}

/// True for the statuses that definitively mean "page gone".
pub fn is_hard_not_found(status: u16) -> bool {
    status == StatusCode::NOT_FOUND.as_u16() || status == StatusCode::GONE.as_u16()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client() {
        assert!(build_client().is_ok());
    }

    #[test]
    fn test_fetch_result_success_range() {
        let ok = FetchResult {
            status: 204,
            html: String::new(),
            final_url: "https://example.com".to_string(),
            chain: Vec::new(),
        };
        assert!(ok.is_success());

        let moved = FetchResult { status: 301, ..ok.clone() };
        assert!(!moved.is_success());

        let dead = FetchResult { status: 0, ..ok };
        assert!(!dead.is_success());
    }

    #[test]
    fn test_hard_not_found_statuses() {
        assert!(is_hard_not_found(404));
        assert!(is_hard_not_found(410));
        assert!(!is_hard_not_found(200));
        assert!(!is_hard_not_found(500));
    }
}
