//! Error types
//!
//! Every fallible call in the library returns [`Error`]. Server-side
//! rejections keep their HTTP status and per-field messages in [`ApiError`]
//! so callers can branch on them without matching on rendered text.

use crate::api::http::RateLimit;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type using the library [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the API client.
#[derive(Debug, Error)]
pub enum Error {
    /// Request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Relative path could not be resolved against the base URL.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Response body did not match the expected shape.
    #[error("failed to decode response body: {source}")]
    Decoding {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No response was obtained (connection, TLS, timeout, DNS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings file could not be written.
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status),
            _ => None,
        }
    }

    /// True for a 404 answer from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(err) if err.is_not_found())
    }

    /// Errors worth retrying inside a polling loop: network failures,
    /// 429 and 5xx. Everything else is a caller or local problem.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Api(err) => {
                err.status == StatusCode::TOO_MANY_REQUESTS || err.status.is_server_error()
            }
            _ => false,
        }
    }
}

/// Structured non-2xx response.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code returned by the server
    pub status: StatusCode,
    /// Field name (or `non_field_errors` / `detail`) to messages
    pub fields: BTreeMap<String, Vec<String>>,
    /// Raw body when it was not a JSON error object
    pub raw: Option<String>,
    /// Rate-limit headers of the failing response
    pub rate_limit: RateLimit,
}

impl ApiError {
    /// Build an error from a response status and body.
    ///
    /// A JSON object body is flattened into field messages; anything else
    /// is kept verbatim in `raw`.
    pub fn from_body(status: StatusCode, body: &str, rate_limit: RateLimit) -> Self {
        let fields = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => {
                let mut fields = BTreeMap::new();
                for (key, value) in map {
                    collect_messages(&key, &value, &mut fields);
                }
                Some(fields)
            }
            _ => None,
        };

        match fields {
            Some(fields) => Self {
                status,
                fields,
                raw: None,
                rate_limit,
            },
            None => Self {
                status,
                fields: BTreeMap::new(),
                raw: Some(body.to_string()),
                rate_limit,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Messages reported for one field.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Human-readable message without the status prefix.
    pub fn message(&self) -> String {
        if !self.fields.is_empty() {
            return self
                .fields
                .iter()
                .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
                .collect::<Vec<_>>()
                .join("; ");
        }
        match self.raw.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => self
                .status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message())
    }
}

impl std::error::Error for ApiError {}

/// Flatten one error payload entry. Nested objects and lists of objects
/// (e.g. per-interface errors) get a `parent.child` / `parent[0]` prefix.
fn collect_messages(key: &str, value: &Value, out: &mut BTreeMap<String, Vec<String>>) {
    match value {
        Value::String(message) => out.entry(key.to_string()).or_default().push(message.clone()),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::String(message) => {
                        out.entry(key.to_string()).or_default().push(message.clone())
                    }
                    Value::Object(_) | Value::Array(_) => {
                        collect_messages(&format!("{}[{}]", key, index), item, out)
                    }
                    other => out.entry(key.to_string()).or_default().push(other.to_string()),
                }
            }
        }
        Value::Object(map) => {
            for (child, item) in map {
                collect_messages(&format!("{}.{}", key, child), item, out);
            }
        }
        Value::Null => {}
        other => out.entry(key.to_string()).or_default().push(other.to_string()),
    }
}

/// Failure of a [`wait_for`](crate::resource::Service::wait_for) call.
#[derive(Debug, Error)]
pub enum WaitError<R: fmt::Debug> {
    /// The predicate reported that the condition can never be met.
    #[error("condition can never be met: {reason}")]
    Unsatisfiable { reason: String, resource: Box<R> },

    /// Fetching the resource failed with an error that is not retried.
    #[error("failed to fetch resource after {attempts} attempt(s): {source}")]
    Fetch {
        attempts: u32,
        #[source]
        source: Error,
    },

    /// The cancellation token fired between attempts.
    #[error("wait cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32, last: Option<Box<R>> },

    /// The attempt or elapsed-time bound was exceeded.
    #[error("timed out after {attempts} attempt(s) in {elapsed:?}; last state: {last:?}")]
    TimedOut {
        attempts: u32,
        elapsed: Duration,
        last: Option<Box<R>>,
        last_error: Option<Error>,
    },
}

impl<R: fmt::Debug> WaitError<R> {
    /// Last resource snapshot observed before giving up, if any.
    pub fn last_resource(&self) -> Option<&R> {
        match self {
            WaitError::Unsatisfiable { resource, .. } => Some(resource),
            WaitError::Cancelled { last, .. } | WaitError::TimedOut { last, .. } => {
                last.as_deref()
            }
            WaitError::Fetch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_are_collected() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"name": "This field may not be blank.", "non_field_errors": ["a", "b"]}"#,
            RateLimit::default(),
        );
        assert_eq!(err.field("name"), Some(&["This field may not be blank.".to_string()][..]));
        assert_eq!(err.field("non_field_errors").map(<[String]>::len), Some(2));
        assert!(err.raw.is_none());
        assert_eq!(
            err.to_string(),
            "400 Bad Request: name: This field may not be blank.; non_field_errors: a b"
        );
    }

    #[test]
    fn test_nested_errors_get_prefixed() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"interfaces": [{"network": ["Unknown network."]}]}"#,
            RateLimit::default(),
        );
        assert!(err.field("interfaces[0].network").is_some());
    }

    #[test]
    fn test_non_json_body_is_kept_raw() {
        let err = ApiError::from_body(
            StatusCode::BAD_GATEWAY,
            "<html>upstream</html>",
            RateLimit::default(),
        );
        assert!(err.fields.is_empty());
        assert_eq!(err.raw.as_deref(), Some("<html>upstream</html>"));
        assert!(err.is_server_error());
        assert!(Error::Api(err).is_transient());
    }

    #[test]
    fn test_empty_body_falls_back_to_reason() {
        let err = ApiError::from_body(StatusCode::NOT_FOUND, "", RateLimit::default());
        assert_eq!(err.message(), "Not Found");
        assert!(Error::Api(err).is_not_found());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let err = ApiError::from_body(StatusCode::CONFLICT, "{}", RateLimit::default());
        assert!(!Error::Api(err).is_transient());
        let err = ApiError::from_body(StatusCode::TOO_MANY_REQUESTS, "{}", RateLimit::default());
        assert!(Error::Api(err).is_transient());
    }
}
