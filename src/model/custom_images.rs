//! Custom images and their imports

use super::{ResourceRef, TagMap, ZoneRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const IMPORT_STARTED: &str = "started";
pub const IMPORT_IN_PROGRESS: &str = "in_progress";
pub const IMPORT_SUCCESS: &str = "success";
pub const IMPORT_FAILED: &str = "failed";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomImage {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub size_gb: u32,
    pub checksums: BTreeMap<String, String>,
    /// `pass-through` or `extend-cloud-config`
    pub user_data_handling: String,
    /// `bios` or `uefi`
    pub firmware_type: String,
    pub zones: Vec<ZoneRef>,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomImageUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data_handling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

// Created through an import, never directly
resource_kind!(CustomImage, name = "custom image", id = uuid, path = "v1/custom-images", Retrievable, Deletable);
resource_requests!(CustomImage, update = CustomImageUpdateRequest);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomImageImport {
    pub href: String,
    pub uuid: String,
    pub custom_image: ResourceRef,
    pub url: String,
    pub status: String,
    pub error_message: String,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomImageImportRequest {
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data_handling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_type: Option<String>,
    /// `raw`, `qcow2`, `iso`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(CustomImageImport, name = "custom image import", id = uuid, path = "v1/custom-images/import", Retrievable);
resource_requests!(CustomImageImport, create = CustomImageImportRequest);
