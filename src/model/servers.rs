//! Servers

use super::{ResourceRef, SubnetRef, TagMap, ZoneRef};
use crate::error::Result;
use crate::resource::Service;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

pub const SERVER_RUNNING: &str = "running";
pub const SERVER_STOPPED: &str = "stopped";
pub const SERVER_CHANGING: &str = "changing";
pub const SERVER_ERRORED: &str = "errored";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub status: String,
    pub flavor: ServerFlavor,
    pub image: ServerImage,
    pub zone: ZoneRef,
    pub volumes: Vec<ServerVolume>,
    pub interfaces: Vec<Interface>,
    pub ssh_fingerprints: Vec<String>,
    pub ssh_host_keys: Vec<String>,
    pub anti_affinity_with: Vec<ResourceRef>,
    pub server_groups: Vec<ResourceRef>,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerFlavor {
    pub slug: String,
    pub name: String,
    pub vcpu_count: u32,
    pub memory_gb: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerImage {
    pub slug: String,
    pub name: String,
    pub operating_system: String,
    pub default_username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerVolume {
    #[serde(rename = "type")]
    pub volume_type: String,
    pub device_path: String,
    pub size_gb: u32,
    pub uuid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    /// `public` or `private`
    #[serde(rename = "type")]
    pub interface_type: String,
    pub network: Option<ResourceRef>,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub version: u8,
    pub address: String,
    pub prefix_length: u8,
    pub gateway: Option<String>,
    pub reverse_ptr: Option<String>,
    pub subnet: Option<SubnetRef>,
}

/// Body of `POST /v1/servers`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCreateRequest {
    pub name: String,
    pub flavor: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_size_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<ServerVolumeRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<InterfaceRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_public_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_private_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_ipv6: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerVolumeRequest {
    pub size_gb: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

/// One interface of a create or update request.
///
/// Either `network` (`"public"` or a network UUID) or `addresses` is set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<AddressRequest>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressRequest {
    pub subnet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Body of `PATCH /v1/servers/{uuid}`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<InterfaceRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(Server, name = "server", id = uuid, path = "v1/servers", Retrievable, Deletable);
resource_requests!(Server, create = ServerCreateRequest, update = ServerUpdateRequest);

/// Power actions, `POST /v1/servers/{uuid}/{action}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Start,
    Stop,
    Reboot,
}

impl ServerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ServerAction::Start => "start",
            ServerAction::Stop => "stop",
            ServerAction::Reboot => "reboot",
        }
    }
}

impl Service<Server> {
    pub async fn action(&self, id: &str, action: ServerAction) -> Result<()> {
        let http = self.client().http();
        let path = format!("{}/{}", self.item_path(id)?, action.as_str());
        let request = http.new_request::<()>(Method::POST, &path, None)?;
        http.execute_empty(request).await?;
        tracing::info!("Requested {} of server {}", action.as_str(), id);
        Ok(())
    }

    pub async fn start(&self, id: &str) -> Result<()> {
        self.action(id, ServerAction::Start).await
    }

    pub async fn stop(&self, id: &str) -> Result<()> {
        self.action(id, ServerAction::Stop).await
    }

    pub async fn reboot(&self, id: &str) -> Result<()> {
        self.action(id, ServerAction::Reboot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_create_request_omits_optional_fields() {
        let request = ServerCreateRequest {
            name: "db-1".to_string(),
            flavor: "flex-4-2".to_string(),
            image: "debian-12".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "db-1", "flavor": "flex-4-2", "image": "debian-12"})
        );
    }

    #[test]
    fn test_empty_tags_are_sent() {
        let request = ServerUpdateRequest {
            tags: Some(TagMap::new()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"tags": {}}));
    }

    #[test]
    fn test_server_decodes_partial_payload() {
        let server: Server = serde_json::from_value(json!({
            "uuid": "47cec963-fcd2-482f-bdb6-24461b2d47b1",
            "name": "db-1",
            "status": "running",
            "zone": {"slug": "lpg1"},
            "interfaces": [{"type": "public", "addresses": [{"version": 4, "address": "192.0.2.10"}]}],
            "unknown_field": true
        }))
        .unwrap();
        assert_eq!(server.status, SERVER_RUNNING);
        assert_eq!(server.zone.slug, "lpg1");
        assert_eq!(server.interfaces[0].addresses[0].address, "192.0.2.10");
        assert!(server.tags.is_empty());
    }
}
