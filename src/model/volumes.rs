//! Volumes

use super::{TagMap, ZoneRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub size_gb: u32,
    /// `ssd` or `bulk`
    #[serde(rename = "type")]
    pub volume_type: String,
    pub server_uuids: Vec<String>,
    pub zone: ZoneRef,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeCreateRequest {
    pub name: String,
    pub size_gb: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_uuids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

/// The API changes one attribute per request; combining e.g. a resize
/// with an attach is rejected with a 400.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<u32>,
    /// `Some(vec![])` detaches the volume from every server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_uuids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(Volume, name = "volume", id = uuid, path = "v1/volumes", Retrievable, Deletable);
resource_requests!(Volume, create = VolumeCreateRequest, update = VolumeUpdateRequest);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detach_all_is_distinct_from_untouched() {
        let detach = VolumeUpdateRequest {
            server_uuids: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&detach).unwrap(), json!({"server_uuids": []}));

        let untouched = VolumeUpdateRequest::default();
        assert_eq!(serde_json::to_value(&untouched).unwrap(), json!({}));
    }
}
