//! cloudscale Client
//!
//! Entry point of the library: holds the transport and hands out one
//! [`Service`] per resource family.

use super::http::{ApiResponse, HttpClient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::{
    CustomImage, CustomImageImport, Flavor, FloatingIp, Image, LoadBalancer, LoadBalancerFlavor,
    LoadBalancerHealthMonitor, LoadBalancerListener, LoadBalancerPool, LoadBalancerPoolMember,
    Network, ObjectsUser, Region, Server, ServerGroup, Subnet, Volume,
};
use crate::resource::Service;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// API client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    config: Arc<ClientConfig>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(&config)?;
        tracing::debug!("Client configured for {}", config.api_url);

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Send an arbitrary request relative to the API base and decode the
    /// answer, keeping status and rate-limit metadata.
    pub async fn execute<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.new_request(method, path, body)?;
        self.http.execute(request).await
    }

    // =========================================================================
    // Compute
    // =========================================================================

    pub fn servers(&self) -> Service<Server> {
        Service::new(self.clone())
    }

    pub fn server_groups(&self) -> Service<ServerGroup> {
        Service::new(self.clone())
    }

    pub fn volumes(&self) -> Service<Volume> {
        Service::new(self.clone())
    }

    pub fn custom_images(&self) -> Service<CustomImage> {
        Service::new(self.clone())
    }

    pub fn custom_image_imports(&self) -> Service<CustomImageImport> {
        Service::new(self.clone())
    }

    // =========================================================================
    // Networking
    // =========================================================================

    pub fn networks(&self) -> Service<Network> {
        Service::new(self.clone())
    }

    pub fn subnets(&self) -> Service<Subnet> {
        Service::new(self.clone())
    }

    pub fn floating_ips(&self) -> Service<FloatingIp> {
        Service::new(self.clone())
    }

    // =========================================================================
    // Load balancing
    // =========================================================================

    pub fn load_balancers(&self) -> Service<LoadBalancer> {
        Service::new(self.clone())
    }

    pub fn load_balancer_flavors(&self) -> Service<LoadBalancerFlavor> {
        Service::new(self.clone())
    }

    pub fn load_balancer_pools(&self) -> Service<LoadBalancerPool> {
        Service::new(self.clone())
    }

    /// Members of one pool. Fails for a pool id that is not a valid
    /// path segment.
    pub fn load_balancer_pool_members(&self, pool_id: &str) -> Result<Service<LoadBalancerPoolMember>> {
        Service::scoped(self.clone(), pool_id)
    }

    pub fn load_balancer_listeners(&self) -> Service<LoadBalancerListener> {
        Service::new(self.clone())
    }

    pub fn load_balancer_health_monitors(&self) -> Service<LoadBalancerHealthMonitor> {
        Service::new(self.clone())
    }

    // =========================================================================
    // Object storage and catalogs
    // =========================================================================

    pub fn objects_users(&self) -> Service<ObjectsUser> {
        Service::new(self.clone())
    }

    pub fn regions(&self) -> Service<Region> {
        Service::new(self.clone())
    }

    pub fn flavors(&self) -> Service<Flavor> {
        Service::new(self.clone())
    }

    pub fn images(&self) -> Service<Image> {
        Service::new(self.clone())
    }
}
