//! Configuration Management
//!
//! [`ClientConfig`] is what the library needs to talk to the API and is
//! always built explicitly. [`Config`] is the persisted settings file used
//! by the `cloudscale` command-line tool.

use crate::api::auth::{self, ApiToken};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "https://api.cloudscale.ch/";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`Client`](crate::Client).
///
/// Read-only once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub token: ApiToken,
    pub user_agent: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(token: ApiToken) -> Self {
        Self {
            // Constant is a valid absolute URL
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            token,
            user_agent: default_user_agent(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at another endpoint (staging, mock server).
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = parse_base_url(api_url)?;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn default_user_agent() -> String {
    format!("cloudscale-rs/{}", crate::VERSION)
}

/// Parse a base URL and make sure relative joins keep its path.
///
/// `http://host/api` would otherwise join `v1/servers` as `http://host/v1/servers`.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| Error::Config(format!("invalid API URL {:?}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(format!(
            "API URL must be an absolute http(s) URL, got {:?}",
            raw
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Persisted CLI settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint override
    #[serde(default)]
    pub api_url: Option<String>,
    /// API token
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cloudscale").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Write the settings as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_error = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(Error::Encoding)?;
        std::fs::write(path, content).map_err(io_error)?;

        Ok(())
    }

    /// Effective token (CLI > environment > config file)
    pub fn effective_token(&self, cli: Option<&str>) -> Result<ApiToken> {
        if let Some(token) = cli {
            return ApiToken::new(token);
        }
        if let Some(token) = auth::token_from_env() {
            return Ok(token);
        }
        match self.token.as_deref() {
            Some(token) => ApiToken::new(token),
            None => Err(Error::Config(format!(
                "no API token configured; pass --token or set {}",
                auth::TOKEN_ENV
            ))),
        }
    }

    /// Effective API URL (CLI > environment > config file > default)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(auth::api_url_from_env)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Build the client settings from the layered sources.
    pub fn client_config(&self, token: Option<&str>, api_url: Option<&str>) -> Result<ClientConfig> {
        let token = self.effective_token(token)?;
        ClientConfig::new(token).with_api_url(&self.effective_api_url(api_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/");
        assert_eq!(url.join("v1/servers").unwrap().path(), "/api/v1/servers");
    }

    #[test]
    fn test_base_url_rejects_non_http() {
        assert!(parse_base_url("ftp://example.com/").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_cli_token_wins() {
        let config = Config {
            api_url: None,
            token: Some("from-file".to_string()),
        };
        let token = config.effective_token(Some("from-cli")).unwrap();
        assert_eq!(token.expose(), "from-cli");
    }

    #[test]
    fn test_cli_url_wins() {
        let config = Config {
            api_url: Some("http://file.example/".to_string()),
            token: None,
        };
        assert_eq!(
            config.effective_api_url(Some("http://cli.example/")),
            "http://cli.example/"
        );
    }

    #[test]
    fn test_save_to_writes_json() {
        let dir = std::env::temp_dir().join(format!("cloudscale-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("config.json");
        let config = Config {
            api_url: Some("http://file.example/".to_string()),
            token: Some("secret".to_string()),
        };

        config.save_to(&path).unwrap();
        let saved: Config = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.token.as_deref(), Some("secret"));
        assert_eq!(saved.api_url.as_deref(), Some("http://file.example/"));

        // A regular file where a directory is expected
        let blocked = path.join("config.json");
        let err = config.save_to(&blocked).unwrap_err();
        assert!(matches!(err, Error::Io { ref path, .. } if path == &blocked));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
