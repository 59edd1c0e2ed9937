//! Recommendation service client.
//!
//! Provides the `RecommendationService` trait and its HTTP implementation.
//! The controller only sees the trait, so tests and alternative transports
//! can stand in for the real service.

use shopsense_model::RecommendationResult;
use shopsense_query::RecommendRequest;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Path of the recommendation endpoint, relative to the service base URL.
pub const RECOMMEND_PATH: &str = "/api/recommend";

/// Errors from the recommendation call.
///
/// None of these reach the user verbatim; the controller collapses them
/// into one generic message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Trait for recommendation services (HTTP, in-process fakes, etc.)
pub trait RecommendationService {
    /// Ask for product ids matching the request's preference.
    fn recommend(
        &self,
        request: &RecommendRequest<'_>,
    ) -> impl Future<Output = Result<RecommendationResult, ServiceError>> + Send;

    /// Get the service name for logging.
    fn name(&self) -> &'static str;
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the recommendation service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Recommendation service reached over HTTP.
pub struct HttpRecommendationService {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpRecommendationService {
    pub fn new(config: ClientConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Setup(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL of the recommendation endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            RECOMMEND_PATH
        )
    }
}

impl RecommendationService for HttpRecommendationService {
    async fn recommend(
        &self,
        request: &RecommendRequest<'_>,
    ) -> Result<RecommendationResult, ServiceError> {
        let url = self.endpoint();

        tracing::debug!(
            url = %url,
            products = request.products.len(),
            "Requesting recommendations"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        let result = RecommendationResult::from_value(&json);
        tracing::debug!(count = result.recommended_ids.len(), "Decoded recommendations");

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shopsense_model::Catalog;
    use shopsense_query::Preference;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request with `status` and `body`, returning the
    /// raw request that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&received);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&received).into_owned()
        });

        (base_url, handle)
    }

    fn service(base_url: String) -> HttpRecommendationService {
        HttpRecommendationService::new(ClientConfig {
            base_url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let svc = service("http://localhost:4000/".to_string());
        assert_eq!(svc.endpoint(), "http://localhost:4000/api/recommend");

        let svc = service("http://localhost:4000".to_string());
        assert_eq!(svc.endpoint(), "http://localhost:4000/api/recommend");
    }

    #[tokio::test]
    async fn test_recommend_posts_catalog_and_decodes_ids() {
        let (base_url, server) = serve_once("200 OK", r#"{"recommendedIds": [3, 4]}"#).await;
        let svc = service(base_url);

        let catalog = Catalog::builtin();
        let preference = Preference::parse("phone under 500").unwrap();
        let result = svc
            .recommend(&RecommendRequest::new(&preference, &catalog))
            .await
            .unwrap();
        assert_eq!(result.recommended_ids, vec![3, 4]);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/recommend HTTP/1.1"));
        let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["preference"], "phone under 500");
        assert_eq!(body["products"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_missing_field_is_empty_result() {
        let (base_url, server) = serve_once("200 OK", "{}").await;
        let svc = service(base_url);

        let catalog = Catalog::builtin();
        let preference = Preference::parse("anything").unwrap();
        let result = svc
            .recommend(&RecommendRequest::new(&preference, &catalog))
            .await
            .unwrap();
        assert!(result.recommended_ids.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base_url, server) =
            serve_once("500 Internal Server Error", r#"{"error": "Internal server error"}"#).await;
        let svc = service(base_url);

        let catalog = Catalog::builtin();
        let preference = Preference::parse("laptop").unwrap();
        let err = svc
            .recommend(&RecommendRequest::new(&preference, &catalog))
            .await
            .unwrap_err();
        match err {
            ServiceError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("Internal server error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (base_url, server) = serve_once("200 OK", "not json").await;
        let svc = service(base_url);

        let catalog = Catalog::builtin();
        let preference = Preference::parse("headphones").unwrap();
        let err = svc
            .recommend(&RecommendRequest::new(&preference, &catalog))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_service_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let svc = service(base_url);
        let catalog = Catalog::builtin();
        let preference = Preference::parse("phone").unwrap();
        let err = svc
            .recommend(&RecommendRequest::new(&preference, &catalog))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Connection(_)));
    }
}
