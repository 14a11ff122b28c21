//! Floating IPs
//!
//! Floating IPs are addressed by their IP, not a UUID.

use super::{RegionRef, ResourceRef, TagMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingIp {
    pub href: String,
    /// Address with prefix length, e.g. `192.0.2.123/32`
    pub network: String,
    pub ip_version: u8,
    pub next_hop: Option<String>,
    pub server: Option<ResourceRef>,
    pub load_balancer: Option<ResourceRef>,
    pub region: Option<RegionRef>,
    /// `regional` or `global`
    #[serde(rename = "type")]
    pub ip_type: String,
    pub reverse_ptr: Option<String>,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

impl FloatingIp {
    /// The address without prefix length, used as identifier.
    pub fn ip(&self) -> &str {
        self.network.split('/').next().unwrap_or(&self.network)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FloatingIpCreateRequest {
    pub ip_version: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ip_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_ptr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FloatingIpUpdateRequest {
    /// Reassign to this server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    /// Reassign to this load balancer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_ptr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

impl crate::resource::ResourceKind for FloatingIp {
    const NAME: &'static str = "floating IP";

    fn id(&self) -> &str {
        self.ip()
    }
}

impl crate::resource::TopLevel for FloatingIp {
    const PATH: &'static str = "v1/floating-ips";
}

impl crate::resource::Retrievable for FloatingIp {}
impl crate::resource::Deletable for FloatingIp {}
resource_requests!(FloatingIp, create = FloatingIpCreateRequest, update = FloatingIpUpdateRequest);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;

    #[test]
    fn test_id_strips_prefix_length() {
        let ip = FloatingIp {
            network: "2001:db8::cafe/128".to_string(),
            ..Default::default()
        };
        assert_eq!(ip.id(), "2001:db8::cafe");
    }
}
