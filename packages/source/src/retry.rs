//! HTTP retry helpers for transient errors.
//!
//! Every HTTP collaborator goes through [`send_json`] or [`send_text`]
//! instead of calling `reqwest::RequestBuilder::send()` directly, so
//! connection failures, timeouts, HTTP 429 and HTTP 5xx are retried with
//! exponential backoff. Anything else (4xx, unparseable bodies, and all
//! schema or matching problems further up) is returned immediately.
//!
//! ```ignore
//! let body = retry::send_json("px_stat", || client.get(&url)).await?;
//! let html = retry::send_text("listing_site", || client.get(&url)).await?;
//! ```

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts for transient HTTP errors.
///
/// Backoff is 1s then 2s, so a request gives up after three attempts and
/// 3 seconds of waiting. Enrichment runs interactively, and the caller's
/// per-stage deadline bounds the total anyway.
const MAX_RETRIES: u32 = 2;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(service: &str, build_request: F) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let text = send_text(service, build_request).await?;

    serde_json::from_str(&text).map_err(|e| {
        log::warn!(
            "[{service}] JSON parse failed: {e}\n  received: {} bytes\n  body preview: {}",
            text.len(),
            preview(&text),
        );
        SourceError::Json(e)
    })
}

/// Sends an HTTP request and returns the response body as a `String`.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries or the
/// body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(service: &str, build_request: F) -> Result<String, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(service, &build_request, MAX_RETRIES).await?;
    Ok(response.text().await?)
}

/// Core retry loop shared by [`send_json`] and [`send_text`].
///
/// Returns the successful [`reqwest::Response`] (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    service: &str,
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<SourceError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << (attempt - 1)); // 1s, 2s
            log::warn!("[{service}] retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("[{service}] transient error: {e}");
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("[{service}] HTTP {status}");
                        last_error = Some(SourceError::upstream(service, format!("HTTP {status}")));
                        continue;
                    }
                    return Err(SourceError::upstream(
                        service,
                        format!("HTTP {status} after {max_retries} retries"),
                    ));
                }

                // 4xx (not 429) is permanent
                if status.is_client_error() {
                    return Err(SourceError::upstream(service, format!("HTTP {status}")));
                }

                log::debug!("[{service}] {} -> {status}", response.url());
                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| exhausted(service)))
}

fn exhausted(service: &str) -> SourceError {
    SourceError::upstream(service, "request failed after all retries")
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let text = "€".repeat(200);
        let p = preview(&text);
        assert!(p.len() <= BODY_PREVIEW_LEN);
        assert!(p.chars().all(|c| c == '€'));
    }

    #[test]
    fn preview_keeps_short_bodies() {
        assert_eq!(preview("{}"), "{}");
    }
}
