//! Read-only catalogs: regions, flavors, public images

use super::ZoneRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub slug: String,
    pub zones: Vec<ZoneRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flavor {
    pub slug: String,
    pub name: String,
    pub vcpu_count: u32,
    pub memory_gb: u32,
    pub zones: Vec<ZoneRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub slug: String,
    pub name: String,
    pub operating_system: String,
    pub default_username: Option<String>,
    pub zones: Vec<ZoneRef>,
}

resource_kind!(Region, name = "region", id = slug, path = "v1/regions");
resource_kind!(Flavor, name = "flavor", id = slug, path = "v1/flavors");
resource_kind!(Image, name = "image", id = slug, path = "v1/images");
