//! HTTP transport for the cloudscale REST API
//!
//! Builds requests relative to the configured base URL, attaches the
//! bearer token and JSON headers, and classifies responses into decoded
//! values or [`ApiError`]s. Nothing here retries.

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Rate-limit headers of a response. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed in the current window
    pub limit: Option<u64>,
    /// Requests left in the current window
    pub remaining: Option<u64>,
    /// When the window resets
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimit {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        Self {
            limit: number("ratelimit-limit"),
            remaining: number("ratelimit-remaining"),
            reset: number("ratelimit-reset")
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

/// A decoded successful response plus its metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub value: T,
    pub status: StatusCode,
    pub rate_limit: RateLimit,
}

/// A request that has been resolved and encoded but not sent yet.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    /// Append a query parameter.
    pub fn append_query(&mut self, key: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(key, value);
    }

    /// Replace every occurrence of a query parameter with a single value.
    pub fn set_query(&mut self, key: &str, value: &str) {
        let kept: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut pairs = self.url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(key, value);
    }
}

/// Raw successful response before decoding
struct RawResponse {
    status: StatusCode,
    body: String,
    rate_limit: RateLimit,
}

/// HTTP client wrapper for cloudscale API calls
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base: Url,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: config.api_url.clone(),
            token: config.token.expose().to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a relative path against the base URL.
    ///
    /// Absolute and scheme-relative paths are rejected, as is any path
    /// that would leave the base URL (e.g. through `..`).
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.starts_with("//") || Url::parse(path).is_ok() {
            return Err(invalid("absolute URLs are not allowed"));
        }

        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| invalid(&e.to_string()))?;

        if url.origin() != self.base.origin() || !url.path().starts_with(self.base.path()) {
            return Err(invalid("path escapes the API base URL"));
        }

        Ok(url)
    }

    /// Build a request for `method` on `path`, encoding `body` as JSON.
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<PreparedRequest>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let body = body
            .map(|b| serde_json::to_vec(b).map_err(Error::Encoding))
            .transpose()?;

        Ok(PreparedRequest { method, url, body })
    }

    /// Send a request and decode the JSON body into `T`.
    ///
    /// An empty body (e.g. 204) is decoded as JSON `null`, which suits
    /// `Option<_>`, `()` and `serde_json::Value` targets.
    pub async fn execute<T: DeserializeOwned>(&self, request: PreparedRequest) -> Result<ApiResponse<T>> {
        let raw = self.send(request).await?;

        let text = if raw.body.trim().is_empty() {
            "null"
        } else {
            raw.body.as_str()
        };

        let value = decode_json(text).map_err(|source| {
            tracing::warn!("Response did not match expected shape: {}", source);
            Error::Decoding {
                source,
                body: sanitize_for_log(&raw.body),
            }
        })?;

        Ok(ApiResponse {
            value,
            status: raw.status,
            rate_limit: raw.rate_limit,
        })
    }

    /// Send a request and ignore the response body.
    pub async fn execute_empty(&self, request: PreparedRequest) -> Result<ApiResponse<()>> {
        let raw = self.send(request).await?;
        Ok(ApiResponse {
            value: (),
            status: raw.status,
            rate_limit: raw.rate_limit,
        })
    }

    async fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .bearer_auth(&self.token)
            .header(ACCEPT, JSON_MEDIA_TYPE);

        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, JSON_MEDIA_TYPE).body(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        let rate_limit = RateLimit::from_headers(response.headers());
        let body = response.text().await?;

        tracing::debug!(
            "{} {} -> {} (rate limit remaining: {:?})",
            request.method,
            request.url.path(),
            status,
            rate_limit.remaining
        );

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::warn!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_body(status, &body, rate_limit).into());
        }

        Ok(RawResponse {
            status,
            body,
            rate_limit,
        })
    }
}

/// Percent-encode an identifier for use as a single path segment.
///
/// Empty, `.` and `..` ids are rejected: URL resolution would collapse
/// them onto the collection or its parent.
pub fn path_segment(id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::InvalidPath {
            path: id.to_string(),
            reason: "identifier is not a valid path segment".to_string(),
        });
    }
    Ok(urlencoding::encode(id).into_owned())
}

/// Decode a response body, treating `null` object members as absent.
///
/// Snapshot fields default when missing, so a `null` string or list
/// decodes to its empty value instead of failing.
pub(crate) fn decode_json<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    let mut value: Value = serde_json::from_str(text)?;
    drop_null_members(&mut value);
    serde_json::from_value(value)
}

fn drop_null_members(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(drop_null_members);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_null_members),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::ApiToken;
    use reqwest::header::HeaderValue;

    fn client(base: &str) -> HttpClient {
        let config = ClientConfig::new(ApiToken::new("t").unwrap())
            .with_api_url(base)
            .unwrap();
        HttpClient::new(&config).unwrap()
    }

    #[test]
    fn test_resolve_relative_path() {
        let http = client("https://api.example.com/");
        let url = http.resolve("v1/servers").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/servers");

        let url = http.resolve("/v1/volumes/abc").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/volumes/abc");
    }

    #[test]
    fn test_resolve_keeps_base_path() {
        let http = client("http://localhost:1234/prefix");
        let url = http.resolve("v1/servers").unwrap();
        assert_eq!(url.path(), "/prefix/v1/servers");
    }

    #[test]
    fn test_resolve_rejects_absolute_and_escaping_paths() {
        let http = client("http://localhost:1234/prefix/");
        assert!(matches!(
            http.resolve("https://evil.example/v1"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            http.resolve("//evil.example/v1"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            http.resolve("../v1/servers"),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_new_request_encodes_body() {
        let http = client("https://api.example.com/");
        let body = serde_json::json!({"name": "db-1"});
        let request = http.new_request(Method::POST, "v1/servers", Some(&body)).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some(&br#"{"name":"db-1"}"#[..]));

        let request = http
            .new_request::<()>(Method::GET, "v1/servers", None)
            .unwrap();
        assert!(request.body.is_none());
    }

    #[test]
    fn test_set_query_overwrites() {
        let http = client("https://api.example.com/");
        let mut request = http
            .new_request::<()>(Method::GET, "v1/servers", None)
            .unwrap();
        request.set_query("name", "a");
        request.append_query("tag:x", "1");
        request.set_query("name", "b");
        assert_eq!(request.url.query(), Some("tag%3Ax=1&name=b"));
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-limit", HeaderValue::from_static("1000"));
        headers.insert("ratelimit-remaining", HeaderValue::from_static("998"));
        headers.insert("ratelimit-reset", HeaderValue::from_static("1700000000"));
        let limit = RateLimit::from_headers(&headers);
        assert_eq!(limit.limit, Some(1000));
        assert_eq!(limit.remaining, Some(998));
        assert_eq!(limit.reset.map(|t| t.timestamp()), Some(1_700_000_000));

        assert_eq!(RateLimit::from_headers(&HeaderMap::new()), RateLimit::default());
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.contains("truncated, 500 bytes total"));
        assert_eq!(sanitize_for_log("a\nb"), "ab");
    }

    #[test]
    fn test_path_segment_encoding() {
        assert_eq!(path_segment("192.0.2.1/32").unwrap(), "192.0.2.1%2F32");
        assert_eq!(path_segment("2001:db8::1").unwrap(), "2001%3Adb8%3A%3A1");
        assert_eq!(path_segment("a..b").unwrap(), "a..b");
        for id in ["", ".", ".."] {
            assert!(matches!(path_segment(id), Err(Error::InvalidPath { .. })));
        }
    }

    #[test]
    fn test_decode_json_null_members() {
        #[derive(Debug, Default, serde::Deserialize)]
        #[serde(default)]
        struct Snapshot {
            name: String,
            items: Vec<String>,
            size: Option<u32>,
        }

        let decoded: Snapshot =
            decode_json(r#"{"name": null, "items": null, "size": null}"#).unwrap();
        assert_eq!(decoded.name, "");
        assert!(decoded.items.is_empty());
        assert_eq!(decoded.size, None);

        let nothing: Option<Snapshot> = decode_json("null").unwrap();
        assert!(nothing.is_none());
    }
}
