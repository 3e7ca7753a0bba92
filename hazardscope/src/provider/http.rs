//! HTTP client abstraction for testability

use super::types::ServiceError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Trait for asynchronous HTTP client operations.
///
/// Services take a generic client so tests can substitute canned responses
/// for real network traffic.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The fully encoded URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-2xx statuses.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ServiceError>> + Send;
}

/// Default per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("hazardscope/", env!("CARGO_PKG_VERSION"));

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with the default timeout.
    pub fn new() -> Result<Self, ServiceError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    /// Creates a new AsyncReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ServiceError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ServiceError::HttpError(format!("Request failed: {}", e)));
            }
        };

        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(ServiceError::HttpError(format!("HTTP {} from {}", response.status(), url)));
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(ServiceError::HttpError(format!("Failed to read response: {}", e)))
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Mock async HTTP client returning a fixed response and recording URLs.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, ServiceError>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockAsyncHttpClient {
        pub fn new(response: Result<Vec<u8>, ServiceError>) -> Self {
            Self {
                response,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn json(body: &str) -> Self {
            Self::new(Ok(body.as_bytes().to_vec()))
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
            self.requests.lock().push(url.to_string());
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_async_client_success() {
        let mock = MockAsyncHttpClient::new(Ok(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.requests(), vec!["http://example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_async_client_error() {
        let mock = MockAsyncHttpClient::new(Err(ServiceError::HttpError("Test error".to_string())));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::with_timeout(5).is_ok());
    }
}
