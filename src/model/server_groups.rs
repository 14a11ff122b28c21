//! Server groups

use super::{ResourceRef, TagMap, ZoneRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerGroup {
    pub href: String,
    pub uuid: String,
    pub name: String,
    /// Only `anti-affinity` today
    #[serde(rename = "type")]
    pub group_type: String,
    pub servers: Vec<ResourceRef>,
    pub zone: ZoneRef,
    pub tags: TagMap,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerGroupCreateRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerGroupUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(ServerGroup, name = "server group", id = uuid, path = "v1/server-groups", Retrievable, Deletable);
resource_requests!(ServerGroup, create = ServerGroupCreateRequest, update = ServerGroupUpdateRequest);
