//! Private networks and their subnets

use super::{ResourceRef, SubnetRef, TagMap, ZoneRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub mtu: u32,
    pub subnets: Vec<SubnetRef>,
    pub zone: ZoneRef,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkCreateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_create_ipv4_subnet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(Network, name = "network", id = uuid, path = "v1/networks", Retrievable, Deletable);
resource_requests!(Network, create = NetworkCreateRequest, update = NetworkUpdateRequest);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subnet {
    pub href: String,
    pub uuid: String,
    pub cidr: String,
    pub network: ResourceRef,
    pub gateway_address: Option<String>,
    pub dns_servers: Vec<String>,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubnetCreateRequest {
    pub cidr: String,
    /// UUID of the parent network
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubnetUpdateRequest {
    /// `Some(None)` removes the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_address: Option<Option<String>>,
    /// `Some(None)` restores the provider's default resolvers,
    /// `Some(Some(vec![]))` disables DNS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_servers: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(Subnet, name = "subnet", id = uuid, path = "v1/subnets", Retrievable, Deletable);
resource_requests!(Subnet, create = SubnetCreateRequest, update = SubnetUpdateRequest);
