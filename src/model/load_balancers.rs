//! Load balancers, pools, pool members, listeners and health monitors
//!
//! Pool members are the only nested collection in the API; they live
//! below their pool at `v1/load-balancers/pools/{pool}/members`.

use super::{ResourceRef, SubnetRef, TagMap, ZoneRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LOAD_BALANCER_RUNNING: &str = "running";
pub const LOAD_BALANCER_CHANGING: &str = "changing";
pub const LOAD_BALANCER_ERROR: &str = "error";

pub const MEMBER_UP: &str = "up";
pub const MEMBER_DOWN: &str = "down";
pub const MEMBER_NO_MONITOR: &str = "no_monitor";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancer {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub flavor: LoadBalancerFlavor,
    pub status: String,
    pub vip_addresses: Vec<VipAddress>,
    pub zone: ZoneRef,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VipAddress {
    pub version: u8,
    pub address: String,
    pub subnet: SubnetRef,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerCreateRequest {
    pub name: String,
    pub flavor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_addresses: Option<Vec<VipAddressRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VipAddressRequest {
    pub subnet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(LoadBalancer, name = "load balancer", id = uuid, path = "v1/load-balancers", Retrievable, Deletable);
resource_requests!(LoadBalancer, create = LoadBalancerCreateRequest, update = LoadBalancerUpdateRequest);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerFlavor {
    pub slug: String,
    pub name: String,
}

resource_kind!(LoadBalancerFlavor, name = "load balancer flavor", id = slug, path = "v1/load-balancers/flavors");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerPool {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub load_balancer: ResourceRef,
    /// `round_robin`, `least_connections`, `source_ip`
    pub algorithm: String,
    /// `tcp`, `proxy`, `proxyv2`
    pub protocol: String,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerPoolCreateRequest {
    pub name: String,
    pub load_balancer: String,
    pub algorithm: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerPoolUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(LoadBalancerPool, name = "load balancer pool", id = uuid, path = "v1/load-balancers/pools", Retrievable, Deletable);
resource_requests!(LoadBalancerPool, create = LoadBalancerPoolCreateRequest, update = LoadBalancerPoolUpdateRequest);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerPoolMember {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub enabled: bool,
    pub pool: ResourceRef,
    pub load_balancer: ResourceRef,
    pub protocol_port: u16,
    pub monitor_port: Option<u16>,
    pub address: String,
    pub subnet: SubnetRef,
    /// `up`, `down`, `changing`, `no_monitor`
    pub monitor_status: String,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerPoolMemberCreateRequest {
    pub name: String,
    pub protocol_port: u16,
    pub address: String,
    pub subnet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerPoolMemberUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_port: Option<u16>,
    /// `Some(None)` monitors the protocol port again
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_port: Option<Option<u16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

impl crate::resource::ResourceKind for LoadBalancerPoolMember {
    const NAME: &'static str = "pool member";

    fn id(&self) -> &str {
        &self.uuid
    }
}

impl crate::resource::Nested for LoadBalancerPoolMember {
    const PARENT_PATH: &'static str = "v1/load-balancers/pools";
    const CHILD_PATH: &'static str = "members";
}

impl crate::resource::Retrievable for LoadBalancerPoolMember {}
impl crate::resource::Deletable for LoadBalancerPoolMember {}
resource_requests!(
    LoadBalancerPoolMember,
    create = LoadBalancerPoolMemberCreateRequest,
    update = LoadBalancerPoolMemberUpdateRequest
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerListener {
    pub href: String,
    pub uuid: String,
    pub name: String,
    pub pool: Option<ResourceRef>,
    pub load_balancer: ResourceRef,
    pub protocol: String,
    pub protocol_port: u16,
    pub allowed_cidrs: Vec<String>,
    pub timeout_client_data_ms: u32,
    pub timeout_member_connect_ms: u32,
    pub timeout_member_data_ms: u32,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerListenerCreateRequest {
    pub name: String,
    pub pool: String,
    pub protocol: String,
    pub protocol_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_client_data_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_connect_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_data_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerListenerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_port: Option<u16>,
    /// `Some(vec![])` allows every source address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_cidrs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_client_data_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_connect_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_member_data_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(LoadBalancerListener, name = "listener", id = uuid, path = "v1/load-balancers/listeners", Retrievable, Deletable);
resource_requests!(
    LoadBalancerListener,
    create = LoadBalancerListenerCreateRequest,
    update = LoadBalancerListenerUpdateRequest
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerHealthMonitor {
    pub href: String,
    pub uuid: String,
    pub pool: ResourceRef,
    pub load_balancer: ResourceRef,
    pub delay_s: u32,
    pub timeout_s: u32,
    pub up_threshold: u32,
    pub down_threshold: u32,
    /// `ping`, `tcp`, `http`, `https`, `tls-hello`
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub http: Option<HealthMonitorHttp>,
    pub tags: TagMap,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthMonitorHttp {
    pub expected_codes: Vec<String>,
    pub method: String,
    pub url_path: String,
    pub version: String,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthMonitorHttpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerHealthMonitorCreateRequest {
    pub pool: String,
    #[serde(rename = "type")]
    pub monitor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_s: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_s: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HealthMonitorHttpRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadBalancerHealthMonitorUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_s: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_s: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HealthMonitorHttpRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

resource_kind!(LoadBalancerHealthMonitor, name = "health monitor", id = uuid, path = "v1/load-balancers/health-monitors", Retrievable, Deletable);
resource_requests!(
    LoadBalancerHealthMonitor,
    create = LoadBalancerHealthMonitorCreateRequest,
    update = LoadBalancerHealthMonitorUpdateRequest
);
