//! GraphQL-over-HTTP transport.
//!
//! One [`GraphqlTransport::execute`] call performs exactly one HTTP exchange
//! and maps the outcome onto the [`ApiError`] taxonomy. Retrying is the
//! caller's concern.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::context::RequestContext;
use super::diagnostics::{DiagnosticRecord, DiagnosticSink, NoopSink};
use super::error::{ApiError, Result};

/// Linear's GraphQL endpoint.
pub const LINEAR_API_URL: &str = "https://api.linear.app/graphql";

/// HTTP client timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self {
            query: query.into(),
            variables: Some(variables),
        }
    }

    /// A request with the `variables` key omitted.
    pub fn without_variables(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }
}

/// Executes GraphQL requests and returns the `data` payload.
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, ctx: &RequestContext, request: &GraphqlRequest) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorBody>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorBody {
    message: String,
}

fn join_messages(errors: &[GraphqlErrorBody]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Map an HTTP status and body to the `data` payload or a typed error.
///
/// 401 and 429 are classified before the body is looked at. Any other
/// non-200 is an API error carrying the GraphQL messages when the body has
/// them. A 200 with a non-empty `errors` array is also an API error.
pub fn classify_response(status: u16, body: &str) -> Result<Value> {
    match status {
        401 => Err(ApiError::auth("authentication failed - invalid API key")),
        429 => Err(ApiError::rate_limit("rate limit exceeded")),
        200 => {
            let envelope: Envelope = serde_json::from_str(body)
                .map_err(|e| ApiError::api(format!("failed to decode response: {}", e), 200))?;
            match envelope.errors {
                Some(errors) if !errors.is_empty() => Err(ApiError::api(
                    format!("GraphQL errors: {}", join_messages(&errors)),
                    200,
                )),
                _ => Ok(envelope.data.unwrap_or(Value::Null)),
            }
        }
        other => {
            let message = serde_json::from_str::<Envelope>(body)
                .ok()
                .and_then(|envelope| envelope.errors)
                .filter(|errors| !errors.is_empty())
                .map(|errors| format!("GraphQL errors: {}", join_messages(&errors)))
                .unwrap_or_else(|| format!("unexpected status code: {}", other));
            Err(ApiError::api(message, other))
        }
    }
}

/// The production transport, backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("sink", &self.sink)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport for the public Linear endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(LINEAR_API_URL, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("lazylinear/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            sink: Arc::new(NoopSink),
        })
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Send the request and read the full body.
    async fn send(&self, ctx: &RequestContext, request: &GraphqlRequest) -> Result<(u16, String)> {
        let exchange = async {
            let response = self
                .client
                .post(&self.endpoint)
                .header(header::AUTHORIZATION, &self.api_key)
                .header(header::CONTENT_TYPE, "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| ApiError::network(format!("request failed: {}", e)))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::network(format!("failed to read response body: {}", e)))?;
            Ok((status, body))
        };

        match ctx.deadline() {
            Some(deadline) => tokio::time::timeout_at(deadline, exchange)
                .await
                .map_err(|_| ApiError::network("request deadline exceeded"))?,
            None => exchange.await,
        }
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn execute(&self, ctx: &RequestContext, request: &GraphqlRequest) -> Result<Value> {
        self.sink.record(&DiagnosticRecord::Request {
            method: "POST".to_string(),
            url: self.endpoint.clone(),
            variables: request.variables.clone(),
        });

        let started = Instant::now();
        let outcome = self.send(ctx, request).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok((status, body)) => {
                debug!("Response status={} bytes={} in {}ms", status, body.len(), duration_ms);
                self.sink.record(&DiagnosticRecord::Response {
                    status,
                    duration_ms,
                    bytes: body.len(),
                });
                classify_response(status, &body)
            }
            Err(err) => {
                debug!("Request failed after {}ms: {}", duration_ms, err);
                self.sink.record(&DiagnosticRecord::Error {
                    message: err.message.clone(),
                    duration_ms,
                });
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorKind;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Debug, Default)]
    struct RecordingSink {
        records: Mutex<Vec<DiagnosticRecord>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn record(&self, record: &DiagnosticRecord) {
            self.records.lock().unwrap().push(record.clone());
        }
    }

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/graphql", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let lower = line.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (url, handle)
    }

    #[test]
    fn test_classify_401_is_auth() {
        let err = classify_response(401, "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(err.code, 401);
        assert_eq!(err.message, "authentication failed - invalid API key");
    }

    #[test]
    fn test_classify_429_is_rate_limit() {
        let err = classify_response(429, r#"{"errors":[{"message":"ignored"}]}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimit);
        assert_eq!(err.code, 429);
    }

    #[test]
    fn test_classify_other_status_without_graphql_body() {
        let err = classify_response(503, "<html>Service Unavailable</html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.code, 503);
        assert_eq!(err.message, "unexpected status code: 503");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_other_status_extracts_graphql_messages() {
        let body = r#"{"errors":[{"message":"Argument Validation Error","extensions":{"code":"INVALID_INPUT"}}]}"#;
        let err = classify_response(400, body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "GraphQL errors: Argument Validation Error");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_200_with_errors_concatenates_messages() {
        let body = r#"{"data":null,"errors":[{"message":"first"},{"message":"second","path":["issues"]}]}"#;
        let err = classify_response(200, body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.code, 200);
        assert_eq!(err.message, "GraphQL errors: first; second");
    }

    #[test]
    fn test_classify_200_returns_data() {
        let data = classify_response(200, r#"{"data":{"viewer":{"id":"u1"}}}"#).unwrap();
        assert_eq!(data["viewer"]["id"], "u1");
    }

    #[test]
    fn test_classify_200_with_empty_errors_returns_data() {
        let data = classify_response(200, r#"{"data":{"ok":true},"errors":[]}"#).unwrap();
        assert_eq!(data["ok"], true);
    }

    #[test]
    fn test_classify_200_with_garbage_body() {
        let err = classify_response(200, "not json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Api);
        assert_eq!(err.code, 200);
    }

    #[test]
    fn test_request_serialization_omits_missing_variables() {
        let request = GraphqlRequest::without_variables("query { viewer { id } }");
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("variables").is_none());

        let request = GraphqlRequest::new("query", serde_json::json!({"first": 50}));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["variables"]["first"], 50);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let transport = HttpTransport::new("lin_api_secret").unwrap();
        let debug = format!("{:?}", transport);
        assert!(!debug.contains("lin_api_secret"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(transport.endpoint, LINEAR_API_URL);
    }

    #[tokio::test]
    async fn test_execute_sends_raw_key_and_returns_data() {
        let (url, server) = serve_once("200 OK", r#"{"data":{"viewer":{"id":"u1"}}}"#).await;
        let sink = Arc::new(RecordingSink::default());
        let transport = HttpTransport::with_endpoint(url, "lin_api_key")
            .unwrap()
            .with_sink(sink.clone());

        let request = GraphqlRequest::new("query { viewer { id } }", serde_json::json!({"a": 1}));
        let data = transport
            .execute(
                &RequestContext::background().deadline_in(Duration::from_secs(30)),
                &request,
            )
            .await
            .unwrap();
        assert_eq!(data["viewer"]["id"], "u1");

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /graphql"));
        assert!(raw.contains("authorization: lin_api_key\r\n"));
        assert!(raw.contains("content-type: application/json"));

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(&records[0], DiagnosticRecord::Request { variables: Some(_), .. }));
        assert!(matches!(&records[1], DiagnosticRecord::Response { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_execute_maps_401() {
        let (url, server) = serve_once("401 Unauthorized", "").await;
        let transport = HttpTransport::with_endpoint(url, "bad").unwrap();
        let err = transport
            .execute(
                &RequestContext::background(),
                &GraphqlRequest::without_variables("query { viewer { id } }"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_connection_refused_is_network() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/graphql", listener.local_addr().unwrap());
        drop(listener);

        let sink = Arc::new(RecordingSink::default());
        let transport = HttpTransport::with_endpoint(url, "key")
            .unwrap()
            .with_sink(sink.clone());
        let err = transport
            .execute(
                &RequestContext::background(),
                &GraphqlRequest::without_variables("query { viewer { id } }"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(err.code, 0);
        let records = sink.records.lock().unwrap();
        assert!(matches!(records.last(), Some(DiagnosticRecord::Error { .. })));
    }
}
