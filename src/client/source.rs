//! The JSON source the controllers fetch through.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ViewError;

/// Fetches JSON documents by explorer path.
///
/// `url` is a path with query, e.g.
/// `/api/finance-report/detail?type=year&time=2021`. An empty or `null`
/// response is `Ok(None)`.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch and decode one document.
    async fn request_json(&self, url: &str) -> Result<Option<Value>, ViewError>;
}

/// A fixed set of responses keyed by URL.
///
/// Unknown URLs answer `None`. Every request is recorded, so callers can
/// check which fetches were issued.
#[derive(Debug, Default)]
pub struct StaticSource {
    responses: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
}

impl StaticSource {
    /// Create a source with no responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `value`.
    #[must_use]
    pub fn with_response(mut self, url: impl Into<String>, value: Value) -> Self {
        self.responses.insert(url.into(), value);
        self
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ReportSource for StaticSource {
    async fn request_json(&self, url: &str) -> Result<Option<Value>, ViewError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        Ok(self
            .responses
            .get(url)
            .filter(|v| !v.is_null())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_source_records_requests() {
        let source = StaticSource::new()
            .with_response("/a", json!({"x": 1}))
            .with_response("/null", Value::Null);

        assert_eq!(source.request_json("/a").await.unwrap(), Some(json!({"x": 1})));
        assert_eq!(source.request_json("/null").await.unwrap(), None);
        assert_eq!(source.request_json("/missing").await.unwrap(), None);
        assert_eq!(source.requests(), vec!["/a", "/null", "/missing"]);
    }
}
