//! Authenticated JSON fetches against the upstream translation API.

use anyhow::Context;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;

use crate::api_error::RelayApiError;
use crate::GatewayConfig;

/// Upstream response headers with this prefix are replayed to clients.
pub(crate) const VENDOR_HEADER_PREFIX: &str = "x-transifex";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// One fetched upstream document plus the vendor headers that arrived
/// with it.
#[derive(Debug, Clone)]
pub(crate) struct UpstreamPayload {
    pub(crate) value: Value,
    pub(crate) vendor_headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub(crate) struct UpstreamClient {
    client: Client,
    username: String,
    password: String,
}

impl UpstreamClient {
    pub(crate) fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let timeout_ms = config.upstream_timeout_ms.max(1_000);
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .context("build upstream http client")?;
        Ok(Self {
            client,
            username: config.upstream_username.clone(),
            password: config.upstream_password.clone(),
        })
    }

    /// GET a JSON document with basic auth. The credential never reaches
    /// the log stream; the reproduction line names its environment
    /// variable instead.
    pub(crate) async fn fetch_json(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<UpstreamPayload, RelayApiError> {
        tracing::debug!(
            "curl -i -L --user {}:$LINGO_UPSTREAM_PASSWORD -X GET '{}'",
            self.username,
            url
        );
        let mut request = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await.map_err(|error| {
            tracing::warn!("upstream request failed: url={url} error={error}");
            RelayApiError::bad_gateway(
                "upstream_request_failed",
                format!("upstream request failed: {error}"),
            )
        })?;
        let status = response.status();
        let vendor_headers = vendor_headers(response.headers());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayApiError::bad_gateway(
                "upstream_status",
                format!(
                    "upstream replied {}: {}",
                    status.as_u16(),
                    truncate_error_body(&body)
                ),
            ));
        }
        let value = response.json::<Value>().await.map_err(|error| {
            RelayApiError::bad_gateway(
                "upstream_invalid_json",
                format!("upstream body is not JSON: {error}"),
            )
        })?;
        Ok(UpstreamPayload {
            value,
            vendor_headers,
        })
    }
}

fn vendor_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with(VENDOR_HEADER_PREFIX))
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn truncate_error_body(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let truncated = trimmed
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect::<String>();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    #[test]
    fn unit_vendor_headers_keep_only_the_prefixed_names() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-transifex-version"),
            HeaderValue::from_static("3"),
        );
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );
        let kept = vendor_headers(&headers);
        assert_eq!(
            kept,
            vec![("x-transifex-version".to_string(), "3".to_string())]
        );
    }

    #[test]
    fn error_body_preview_is_bounded_and_marked() {
        assert_eq!(truncate_error_body("   "), "<empty>");
        assert_eq!(truncate_error_body("short"), "short");
        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 5);
        let preview = truncate_error_body(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), MAX_ERROR_BODY_CHARS + 3);
    }
}
