//! API credentials
//!
//! The library only ever receives a token explicitly through
//! [`ClientConfig`](crate::ClientConfig). Environment lookup lives here for
//! the command-line tool and integration setups that want it.

use crate::error::{Error, Result};
use std::fmt;

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "CLOUDSCALE_API_TOKEN";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "CLOUDSCALE_API_URL";

/// Bearer token sent with every API request.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap a token after checking it can be sent in a header.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim().to_string();
        if !validate_token(&token) {
            return Err(Error::Config(
                "API token must be non-empty printable ASCII without whitespace".to_string(),
            ));
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Header values may not carry control characters or spaces
fn validate_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_graphic())
}

/// Read the token from [`TOKEN_ENV`].
pub fn token_from_env() -> Option<ApiToken> {
    let value = std::env::var(TOKEN_ENV).ok()?;
    match ApiToken::new(value) {
        Ok(token) => Some(token),
        Err(_) => {
            tracing::warn!("Ignoring invalid token in {}", TOKEN_ENV);
            None
        }
    }
}

/// Read the API base URL override from [`API_URL_ENV`].
pub fn api_url_from_env() -> Option<String> {
    std::env::var(API_URL_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted() {
        let token = ApiToken::new("secret-token").unwrap();
        assert_eq!(format!("{:?}", token), "ApiToken(***)");
        assert_eq!(token.expose(), "secret-token");
    }

    #[test]
    fn test_token_rejects_whitespace() {
        assert!(ApiToken::new("").is_err());
        assert!(ApiToken::new("abc def").is_err());
        assert!(ApiToken::new("abc\ndef").is_err());
        assert_eq!(ApiToken::new("  trimmed\n").unwrap().expose(), "trimmed");
    }
}
