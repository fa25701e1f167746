//! dcrdata explorer API client.

use async_trait::async_trait;
use serde_json::Value;

use crate::constants::{BEST_BLOCK_ENDPOINT, BLOCK_RANGE_ENDPOINT};
use crate::domain::{BlockPayload, BlockTime, ViewError};

use super::http::{HttpClient, HttpConfig};
use super::source::ReportSource;

// ============================================================================
// Client
// ============================================================================

/// Client for one dcrdata instance.
#[derive(Debug, Clone)]
pub struct DcrdataClient {
    http: HttpClient,
    base_url: String,
}

impl DcrdataClient {
    /// Create a client with the default HTTP configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::ClientInit`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ViewError> {
        Ok(Self::with_http(
            HttpClient::with_config(HttpConfig::default())?,
            base_url,
        ))
    }

    /// Create a client on an existing HTTP client.
    #[must_use]
    pub fn with_http(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an explorer path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Fetch the current best block.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn best_block(&self) -> Result<Option<BlockPayload>, ViewError> {
        fetch_best_block(self).await
    }

    /// Fetch blocks `first..=last`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a block
    /// array.
    pub async fn block_range(&self, first: u64, last: u64) -> Result<Vec<BlockPayload>, ViewError> {
        fetch_block_range(self, first, last).await
    }
}

// ============================================================================
// Source-generic Fetches
// ============================================================================

/// Fetch the current best block from any source.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn fetch_best_block(
    source: &dyn ReportSource,
) -> Result<Option<BlockPayload>, ViewError> {
    Ok(source
        .request_json(BEST_BLOCK_ENDPOINT)
        .await?
        .map(block_from_api))
}

/// Fetch blocks `first..=last` from any source.
///
/// # Errors
///
/// Returns an error if the request fails or the body is not a block array.
pub async fn fetch_block_range(
    source: &dyn ReportSource,
    first: u64,
    last: u64,
) -> Result<Vec<BlockPayload>, ViewError> {
    let path = format!("{BLOCK_RANGE_ENDPOINT}/{first}/{last}");
    let blocks = match source.request_json(&path).await? {
        Some(Value::Array(items)) => items.into_iter().map(block_from_api).collect(),
        Some(other) => {
            return Err(ViewError::parse(format!(
                "expected a block array from {path}, got {other}"
            )));
        }
        None => Vec::new(),
    };
    Ok(blocks)
}

#[async_trait]
impl ReportSource for DcrdataClient {
    async fn request_json(&self, url: &str) -> Result<Option<Value>, ViewError> {
        let url = self.url(url);
        tracing::debug!("GET {url}");
        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&body)?;
        Ok((!value.is_null()).then_some(value))
    }
}

/// Decode a block from the REST API.
///
/// REST blocks carry only `time`; the age column reads `unixStamp`, so it is
/// filled from `time` when missing.
#[must_use]
pub fn block_from_api(value: Value) -> BlockPayload {
    let mut block = BlockPayload::from_value(value);
    if block.unix_stamp == 0
        && let BlockTime::Unix(secs) = block.time
    {
        block.unix_stamp = secs;
    }
    block
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StaticSource;
    use serde_json::json;

    fn client(base: &str) -> DcrdataClient {
        DcrdataClient::with_http(
            HttpClient::with_config(HttpConfig::default()).unwrap(),
            base,
        )
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let cases = [
            ("https://explorer.example", "/api/block/best", "https://explorer.example/api/block/best"),
            ("https://explorer.example/", "/api/block/best", "https://explorer.example/api/block/best"),
            ("http://localhost:7777", "api/x?y=1", "http://localhost:7777/api/x?y=1"),
        ];
        for (base, path, expected) in cases {
            assert_eq!(client(base).url(path), expected, "base={base}");
        }
    }

    #[test]
    fn test_block_from_api_fills_unix_stamp() {
        let block = block_from_api(json!({"height": 10, "time": 1_700_000_000}));
        assert_eq!(block.unix_stamp, 1_700_000_000);

        let block = block_from_api(json!({"height": 10, "unixStamp": 5, "time": 1_700_000_000}));
        assert_eq!(block.unix_stamp, 5);

        let block = block_from_api(json!({"height": 10, "time": "2024-01-01"}));
        assert_eq!(block.unix_stamp, 0);
    }

    #[tokio::test]
    async fn test_fetch_block_range_decodes_array() {
        let source = StaticSource::new().with_response(
            "/api/block/range/9/10",
            json!([{"height": 9, "time": 100}, {"height": 10, "time": 200}]),
        );
        let blocks = fetch_block_range(&source, 9, 10).await.unwrap();
        let heights: Vec<u64> = blocks.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![9, 10]);
        assert_eq!(blocks[1].unix_stamp, 200);
    }

    #[tokio::test]
    async fn test_fetch_block_range_rejects_object() {
        let source =
            StaticSource::new().with_response("/api/block/range/1/2", json!({"height": 1}));
        assert!(matches!(
            fetch_block_range(&source, 1, 2).await,
            Err(ViewError::Parse { .. })
        ));
        assert!(fetch_block_range(&source, 3, 4).await.unwrap().is_empty());
    }
}
