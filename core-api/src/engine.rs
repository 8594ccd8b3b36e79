//! Resilient Request Engine
//!
//! Turns a [`RequestDescriptor`] into a network exchange: ensures the
//! session is hydrated, attaches the bearer header, builds the final URL,
//! executes under a per-call timeout, classifies the outcome, and retries
//! according to the decision table in [`crate::retry`].
//!
//! Each logical call owns its own timeout-derived cancellation signal;
//! cancelling one call never affects another in flight. There is no manual
//! cancellation surface — timeout is the only trigger.
//!
//! ## Example
//!
//! ```no_run
//! use core_api::{RequestDescriptor, RequestEngine};
//! # async fn example(engine: RequestEngine) -> core_api::error::Result<()> {
//! let descriptor = RequestDescriptor::get("/categories").tag("categories.list");
//! let categories = engine.execute(&descriptor).await?;
//! # Ok(())
//! # }
//! ```

use crate::descriptor::{RequestBody, RequestDescriptor};
use crate::error::{ApiError, Result};
use crate::retry::{self, RetryDecision, RetrySchedule};
use crate::url;
use bridge_traits::error::BridgeError;
use bridge_traits::http::{HttpRequest, HttpResponse, HttpTransport};
use bytes::Bytes;
use core_session::SessionStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Engine-level view of one attempt's outcome.
enum AttemptOutcome {
    Response(HttpResponse),
    TimedOut,
    Failed(BridgeError),
}

/// What to do after evaluating a response.
enum Step {
    Done(Value),
    RetryAfter(Duration),
}

/// The authenticated, retrying HTTP request engine.
///
/// Cheap to clone; clones share the transport and session.
#[derive(Clone)]
pub struct RequestEngine {
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    base_url: String,
    default_timeout: Duration,
    default_retries: u32,
    default_base_delay: Duration,
}

impl RequestEngine {
    /// Create an engine for the given API origin.
    ///
    /// The origin is normalized once here: trailing slash stripped, `/api`
    /// prefix appended unless already present.
    pub fn new(transport: Arc<dyn HttpTransport>, session: SessionStore, origin: &str) -> Self {
        Self {
            transport,
            session,
            base_url: url::normalize_base(origin),
            default_timeout: Duration::from_secs(15),
            default_retries: 1,
            default_base_delay: Duration::from_millis(300),
        }
    }

    /// Override the default per-call timeout.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Override the default retry budget.
    pub fn default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    /// Override the default base backoff delay.
    pub fn default_base_delay(mut self, delay: Duration) -> Self {
        self.default_base_delay = delay;
        self
    }

    /// The session store this engine authenticates with.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The transport used for raw exchanges (upload transfers bypass the
    /// engine and talk to this directly).
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// Execute a logical call and return the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Every failure is a classified [`ApiError`]; see the crate-level
    /// taxonomy.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Value> {
        self.session.ensure_hydrated().await;

        let call_id = Uuid::new_v4();
        let final_url = url::build_url(&self.base_url, &descriptor.path, &descriptor.query);
        let timeout = descriptor.timeout.unwrap_or(self.default_timeout);
        let retries = descriptor.retries.unwrap_or(self.default_retries);
        let base_delay = descriptor.base_delay.unwrap_or(self.default_base_delay);
        let mut schedule = RetrySchedule::new(retries, base_delay);

        loop {
            let request = self.build_request(descriptor, &final_url)?;
            debug!(
                call_id = %call_id,
                tag = %descriptor.tag,
                method = descriptor.method.as_str(),
                url = %final_url,
                attempt = schedule.attempt(),
                "Executing API request"
            );

            let outcome = match tokio::time::timeout(timeout, self.transport.execute(request)).await
            {
                Err(_) => AttemptOutcome::TimedOut,
                Ok(Err(BridgeError::Timeout)) => AttemptOutcome::TimedOut,
                Ok(Err(e)) => AttemptOutcome::Failed(e),
                Ok(Ok(response)) => AttemptOutcome::Response(response),
            };

            let delay = match outcome {
                AttemptOutcome::Response(response) => {
                    let status = response.status;
                    match self.evaluate(&mut schedule, response)? {
                        Step::Done(value) => {
                            debug!(call_id = %call_id, status, "API request succeeded");
                            return Ok(value);
                        }
                        Step::RetryAfter(delay) => {
                            warn!(
                                call_id = %call_id,
                                status,
                                delay_ms = delay.as_millis() as u64,
                                "Retryable status; backing off"
                            );
                            delay
                        }
                    }
                }
                AttemptOutcome::TimedOut => match schedule.next_delay(None) {
                    Some(delay) => {
                        warn!(
                            call_id = %call_id,
                            timeout_ms = timeout.as_millis() as u64,
                            "Request timed out; retrying"
                        );
                        delay
                    }
                    None => {
                        return Err(ApiError::Timeout {
                            timeout_ms: timeout.as_millis() as u64,
                        })
                    }
                },
                AttemptOutcome::Failed(e) => match schedule.next_delay(None) {
                    Some(delay) => {
                        warn!(call_id = %call_id, error = %e, "Transport failure; retrying");
                        delay
                    }
                    None => {
                        return Err(ApiError::Transport {
                            message: e.to_string(),
                        })
                    }
                },
            };

            tokio::time::sleep(delay).await;
        }
    }

    /// Execute and deserialize the response body into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        let value = self.execute(descriptor).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Serde(e.to_string()))
    }

    fn build_request(&self, descriptor: &RequestDescriptor, final_url: &str) -> Result<HttpRequest> {
        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert(
            "X-Requested-With".to_string(),
            "XMLHttpRequest".to_string(),
        );
        if let Some(RequestBody::Json(_)) = &descriptor.body {
            // Opaque payloads own their Content-Type (multipart boundary etc.)
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        for (key, value) in &descriptor.headers {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(key));
            headers.insert(key.clone(), value.clone());
        }

        let caller_set_auth = headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("authorization"));
        if !caller_set_auth {
            if let Some(token) = self.session.get() {
                headers.insert("Authorization".to_string(), format!("Bearer {}", token));
            }
        }

        let body = match &descriptor.body {
            Some(RequestBody::Json(value)) => Some(Bytes::from(
                serde_json::to_vec(value)
                    .map_err(|e| ApiError::Serde(format!("failed to encode request body: {}", e)))?,
            )),
            Some(RequestBody::Raw(bytes)) => Some(bytes.clone()),
            None => None,
        };

        Ok(HttpRequest {
            method: descriptor.method,
            url: final_url.to_string(),
            headers,
            body,
            // The engine owns the cancellation signal; no transport timeout.
            timeout: None,
        })
    }

    fn evaluate(&self, schedule: &mut RetrySchedule, response: HttpResponse) -> Result<Step> {
        if response.status == 204 {
            return Ok(Step::Done(Value::Object(Default::default())));
        }

        let content_type = response.header("Content-Type").unwrap_or("").to_string();
        let text = response.text();

        if looks_like_html(&text, &content_type) {
            let status = if response.status == 0 { 503 } else { response.status };
            return Err(ApiError::ProtocolViolation {
                status,
                content_type: if content_type.is_empty() {
                    "unknown".to_string()
                } else {
                    content_type
                },
                snippet: snippet(&text),
            });
        }

        let parsed: Value =
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));

        if response.is_success() {
            return Ok(Step::Done(if text.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                parsed
            }));
        }

        let status = response.status;
        let message = failure_message(&parsed, &text, status);

        match retry::decide(status) {
            RetryDecision::Terminal => Err(ApiError::ClientError {
                status,
                message,
                raw: Some(parsed),
            }),
            RetryDecision::HonorRetryAfter => {
                let hint = retry::retry_after_hint(&response);
                match schedule.next_delay(hint) {
                    Some(delay) => Ok(Step::RetryAfter(delay)),
                    None => Err(ApiError::RateLimited {
                        message,
                        raw: Some(parsed),
                    }),
                }
            }
            RetryDecision::Backoff => match schedule.next_delay(None) {
                Some(delay) => Ok(Step::RetryAfter(delay)),
                None => Err(ApiError::ServerError {
                    status,
                    message,
                    raw: Some(parsed),
                }),
            },
        }
    }
}

/// HTML document detection: leading `<!doctype` / `<html>` (any case) or an
/// HTML content-type claim.
fn looks_like_html(text: &str, content_type: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype")
        || head.starts_with("<html")
        || content_type.to_ascii_lowercase().contains("text/html")
}

fn snippet(text: &str) -> String {
    text.trim().chars().take(160).collect()
}

/// Failure message preference order: body `message`, body `error`, raw text,
/// canonical status text.
fn failure_message(parsed: &Value, text: &str, status: u16) -> String {
    if let Some(message) = parsed.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(error) = parsed.get("error").and_then(Value::as_str) {
        return error.to_string();
    }
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return snippet(trimmed);
    }
    status_text(status).to_string()
}

fn status_text(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "HTTP error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::Sequence;
    use serde_json::json;

    mock! {
        Transport {}

        #[async_trait]
        impl HttpTransport for Transport {
            async fn execute(
                &self,
                request: HttpRequest,
            ) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    /// SecureStore with nothing persisted; hydration finds no token.
    struct NullStore;

    #[async_trait]
    impl bridge_traits::storage::SecureStore for NullStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> bridge_traits::error::Result<()> {
            Ok(())
        }
        async fn get_secret(
            &self,
            _key: &str,
        ) -> bridge_traits::error::Result<Option<Vec<u8>>> {
            Ok(None)
        }
        async fn delete_secret(&self, _key: &str) -> bridge_traits::error::Result<()> {
            Ok(())
        }
    }

    /// Transport that never responds; only the engine's timeout can end it.
    struct PendingTransport;

    #[async_trait]
    impl HttpTransport for PendingTransport {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> bridge_traits::error::Result<HttpResponse> {
            std::future::pending().await
        }
    }

    fn fresh_session() -> SessionStore {
        SessionStore::new(Arc::new(NullStore))
    }

    fn engine_with(transport: MockTransport) -> RequestEngine {
        RequestEngine::new(Arc::new(transport), fresh_session(), "https://api.test")
            .default_base_delay(Duration::from_millis(1))
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/json".to_string(),
        );
        HttpResponse {
            status,
            headers,
            body: Bytes::from(body.as_bytes().to_vec()),
        }
    }

    #[tokio::test]
    async fn success_returns_parsed_json_with_default_headers() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.url == "https://api.test/api/categories"
                    && request.headers.get("Accept").map(String::as_str)
                        == Some("application/json")
                    && request.headers.get("X-Requested-With").map(String::as_str)
                        == Some("XMLHttpRequest")
                    && !request.headers.contains_key("Authorization")
                    && !request.headers.contains_key("Content-Type")
            })
            .returning(|_| Ok(json_response(200, r#"[{"id":1,"name":"Cleaning"}]"#)));

        let engine = engine_with(transport);
        let value = engine
            .execute(&RequestDescriptor::get("/categories").tag("categories.list"))
            .await
            .unwrap();

        assert_eq!(value[0]["name"], "Cleaning");
    }

    #[tokio::test]
    async fn bearer_header_attached_when_token_cached() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.headers.get("Authorization").map(String::as_str)
                    == Some("Bearer tok-123")
            })
            .returning(|_| Ok(json_response(200, "{}")));

        let session = fresh_session();
        session.set("tok-123");
        let engine = RequestEngine::new(Arc::new(transport), session, "https://api.test");

        engine
            .execute(&RequestDescriptor::get("/users/me"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn caller_authorization_is_not_overridden() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.headers.get("authorization").map(String::as_str) == Some("Basic abc")
                    && !request.headers.contains_key("Authorization")
            })
            .returning(|_| Ok(json_response(200, "{}")));

        let session = fresh_session();
        session.set("tok-123");
        let engine = RequestEngine::new(Arc::new(transport), session, "https://api.test");

        engine
            .execute(&RequestDescriptor::get("/external").header("authorization", "Basic abc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_content_yields_empty_object() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(|_| {
            Ok(HttpResponse {
                status: 204,
                headers: HashMap::new(),
                body: Bytes::new(),
            })
        });

        let engine = engine_with(transport);
        let value = engine
            .execute(&RequestDescriptor::delete("/services/9"))
            .await
            .unwrap();

        assert_eq!(value, json!({}));
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_retry_until_budget_exhausted() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(3)
            .returning(|_| Ok(json_response(500, r#"{"message":"boom"}"#)));

        let engine = engine_with(transport);
        let error = engine
            .execute(&RequestDescriptor::get("/services").retries(2))
            .await
            .unwrap_err();

        match error {
            ApiError::ServerError { status, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn html_response_short_circuits_retries() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(|_| {
            let mut headers = HashMap::new();
            headers.insert("Content-Type".to_string(), "text/html".to_string());
            Ok(HttpResponse {
                status: 502,
                headers,
                body: Bytes::from_static(b"<!DOCTYPE HTML><html><body>Bad gateway</body></html>"),
            })
        });

        let engine = engine_with(transport);
        let error = engine
            .execute(&RequestDescriptor::get("/services").retries(3))
            .await
            .unwrap_err();

        match error {
            ApiError::ProtocolViolation {
                status,
                content_type,
                snippet,
            } => {
                assert_eq!(status, 502);
                assert_eq!(content_type, "text/html");
                assert!(snippet.contains("DOCTYPE"));
            }
            other => panic!("expected ProtocolViolation, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_at_least_retry_after() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                let mut headers = HashMap::new();
                headers.insert("Retry-After".to_string(), "2".to_string());
                Ok(HttpResponse {
                    status: 429,
                    headers,
                    body: Bytes::from_static(b"{}"),
                })
            });
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json_response(200, r#"{"ok":true}"#)));

        let engine = engine_with(transport);
        let started = tokio::time::Instant::now();
        let value = engine
            .execute(&RequestDescriptor::get("/services").retries(1))
            .await
            .unwrap();

        assert_eq!(value["ok"], true);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn client_errors_are_terminal_with_server_message() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(404, r#"{"message":"Service not found"}"#)));

        let engine = engine_with(transport);
        let error = engine
            .execute(&RequestDescriptor::get("/services/999").retries(5))
            .await
            .unwrap_err();

        match error {
            ApiError::ClientError { status, message, raw } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Service not found");
                assert!(raw.is_some());
            }
            other => panic!("expected ClientError, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_classified_within_the_descriptor_budget() {
        let engine = RequestEngine::new(
            Arc::new(PendingTransport),
            fresh_session(),
            "https://api.test",
        );

        let started = tokio::time::Instant::now();
        let error = engine
            .execute(
                &RequestDescriptor::get("/slow")
                    .timeout(Duration::from_millis(50))
                    .retries(0),
            )
            .await
            .unwrap_err();

        match error {
            ApiError::Timeout { timeout_ms } => assert_eq!(timeout_ms, 50),
            other => panic!("expected Timeout, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn non_json_success_body_is_wrapped_as_text() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(200, "pong")));

        let engine = engine_with(transport);
        let value = engine
            .execute(&RequestDescriptor::get("/health"))
            .await
            .unwrap();

        assert_eq!(value, Value::String("pong".to_string()));
    }

    #[tokio::test]
    async fn query_entries_survive_into_the_final_url() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .withf(|request| request.url == "https://api.test/api/services?a=1&d=x")
            .returning(|_| Ok(json_response(200, "[]")));

        let engine = engine_with(transport);
        engine
            .execute(
                &RequestDescriptor::get("/services")
                    .query("a", 1)
                    .query("b", Option::<String>::None)
                    .query("c", "")
                    .query("d", "x"),
            )
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_retry_then_classify_as_network() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(2).returning(|_| {
            Err(BridgeError::Connection("connection refused".to_string()))
        });

        let engine = engine_with(transport);
        let error = engine
            .execute(&RequestDescriptor::get("/services").retries(1))
            .await
            .unwrap_err();

        match error {
            ApiError::Transport { message } => assert!(message.contains("connection refused")),
            other => panic!("expected Transport, got {:?}", other),
        }
    }
}
