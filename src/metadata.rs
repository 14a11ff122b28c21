//! Instance metadata service
//!
//! Read-only view a server has of itself through the link-local metadata
//! endpoint. Needs no token and only works from inside a server.

use crate::api::http::{decode_json, sanitize_for_log, RateLimit};
use crate::config::parse_base_url;
use crate::error::{ApiError, Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/";

const METADATA_PATH: &str = "openstack/2017-02-22/meta_data.json";
const USER_DATA_PATH: &str = "openstack/2017-02-22/user_data";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub uuid: String,
    pub name: String,
    pub hostname: String,
    pub availability_zone: String,
    pub launch_index: u32,
    pub project_id: String,
    pub public_keys: BTreeMap<String, String>,
    pub meta: ServerMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerMeta {
    pub cloudscale_uuid: String,
}

/// Client for the metadata endpoint
#[derive(Clone)]
pub struct MetadataClient {
    client: Client,
    base: Url,
}

impl MetadataClient {
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_METADATA_URL)
    }

    pub fn with_url(base: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: parse_base_url(base)?,
        })
    }

    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.base.join(path).map_err(|e| Error::InvalidPath {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("Metadata error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::from_body(status, &body, RateLimit::default()).into());
        }
        Ok(body)
    }

    pub async fn metadata(&self) -> Result<Metadata> {
        let body = self.fetch(METADATA_PATH).await?;
        decode_json(&body).map_err(|source| Error::Decoding {
            source,
            body: sanitize_for_log(&body),
        })
    }

    /// UUID of the server this runs on, as used by the API.
    pub async fn server_id(&self) -> Result<String> {
        Ok(self.metadata().await?.meta.cloudscale_uuid)
    }

    /// Raw user data the server was created with.
    pub async fn user_data(&self) -> Result<String> {
        self.fetch(USER_DATA_PATH).await
    }
}
