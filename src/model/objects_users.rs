//! Object storage users

use super::TagMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectsUser {
    pub href: String,
    pub id: String,
    pub display_name: String,
    /// S3 credentials, `access_key` / `secret_key` pairs
    pub keys: Vec<BTreeMap<String, String>>,
    pub tags: TagMap,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectsUserCreateRequest {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectsUserUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(ObjectsUser, name = "objects user", id = id, path = "v1/objects-users", Retrievable, Deletable);
resource_requests!(ObjectsUser, create = ObjectsUserCreateRequest, update = ObjectsUserUpdateRequest);
