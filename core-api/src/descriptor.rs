//! Request descriptors.
//!
//! A [`RequestDescriptor`] captures one logical API call: method, path,
//! query, headers, body, and the per-call timeout/retry knobs. Descriptors
//! are immutable once built; the engine derives fresh attempt state for every
//! `execute` call.

use bridge_traits::http::HttpMethod;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Request payload.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Structured JSON; the engine sets `Content-Type: application/json`.
    Json(Value),
    /// Opaque bytes (binary or multipart). The caller owns the
    /// `Content-Type` header, including any multipart boundary; the engine
    /// never forces JSON onto it.
    Raw(Bytes),
}

/// One logical API call.
///
/// Built with the method constructors and chained setters:
///
/// ```
/// use core_api::descriptor::RequestDescriptor;
///
/// let descriptor = RequestDescriptor::get("/services")
///     .query("category", 12)
///     .query("search", "plumbing")
///     .tag("services.list");
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Relative path under the API prefix, or a full absolute URL.
    pub path: String,
    /// Query entries that survived the empty/None filter, in insertion order.
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
    /// Per-call timeout; `None` uses the engine default.
    pub timeout: Option<Duration>,
    /// Additional attempts after the first; `None` uses the engine default.
    pub retries: Option<u32>,
    /// Base delay for the backoff schedule; `None` uses the engine default.
    pub base_delay: Option<Duration>,
    /// Free-text diagnostic tag surfaced in logs.
    pub tag: String,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
            retries: None,
            base_delay: None,
            tag: String::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Add a query entry. Entries whose value is `None` or an empty string
    /// are dropped entirely, never sent as empty pairs.
    pub fn query(mut self, key: impl Into<String>, value: impl IntoQueryValue) -> Self {
        if let Some(value) = value.into_query_value() {
            self.query.push((key.into(), value));
        }
        self
    }

    /// Set a request header. Caller-set headers override engine defaults,
    /// including `Authorization`.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach an opaque payload. Set the matching `Content-Type` with
    /// [`RequestDescriptor::header`].
    pub fn raw_body(mut self, body: Bytes) -> Self {
        self.body = Some(RequestBody::Raw(body));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// Scalar conversion for query values.
///
/// `None` (and empty strings) mean "omit this entry".
pub trait IntoQueryValue {
    fn into_query_value(self) -> Option<String>;
}

impl IntoQueryValue for String {
    fn into_query_value(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl IntoQueryValue for &str {
    fn into_query_value(self) -> Option<String> {
        self.to_string().into_query_value()
    }
}

impl<T: IntoQueryValue> IntoQueryValue for Option<T> {
    fn into_query_value(self) -> Option<String> {
        self.and_then(IntoQueryValue::into_query_value)
    }
}

macro_rules! impl_into_query_value_for_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoQueryValue for $ty {
                fn into_query_value(self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_into_query_value_for_scalar!(i32, i64, u32, u64, f64, bool);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_and_absent_query_values_are_dropped() {
        let descriptor = RequestDescriptor::get("/services")
            .query("a", 1)
            .query("b", Option::<String>::None)
            .query("c", "")
            .query("d", "x");

        assert_eq!(
            descriptor.query,
            vec![
                ("a".to_string(), "1".to_string()),
                ("d".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn option_values_pass_through_when_present() {
        let descriptor = RequestDescriptor::get("/services").query("page", Some(3u32));
        assert_eq!(descriptor.query, vec![("page".to_string(), "3".to_string())]);
    }

    #[test]
    fn builder_sets_body_and_tag() {
        let descriptor = RequestDescriptor::post("/auth/login")
            .json(json!({"email": "a@b.c"}))
            .tag("auth.sign_in");

        assert!(matches!(descriptor.body, Some(RequestBody::Json(_))));
        assert_eq!(descriptor.tag, "auth.sign_in");
        assert_eq!(descriptor.method, HttpMethod::Post);
    }
}
