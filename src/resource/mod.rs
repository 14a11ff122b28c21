//! Generic resource operations
//!
//! One [`Service`] implementation serves every resource family. A family
//! is a model type implementing [`ResourceKind`] plus the capability traits
//! for the verbs the API offers on it:
//!
//! - [`TopLevel`] / [`Nested`] - where the collection lives
//! - [`Retrievable`] - `GET {path}/{id}`
//! - [`Creatable`] - `POST {path}`
//! - [`Updatable`] - `PATCH {path}/{id}`
//! - [`Deletable`] - `DELETE {path}/{id}`
//!
//! Listing (`GET {path}`) is available on every kind. Verbs a family does
//! not support simply do not exist on its service.
//!
//! # Example
//!
//! ```ignore
//! use cloudscale::{Client, model::VolumeUpdateRequest};
//!
//! async fn detach_all(client: &Client, id: &str) -> cloudscale::Result<()> {
//!     let request = VolumeUpdateRequest {
//!         server_uuids: Some(vec![]),
//!         ..Default::default()
//!     };
//!     client.volumes().update(id, &request).await
//! }
//! ```

mod conditions;
mod wait;

pub use conditions::*;
pub use wait::{poll_until, Condition, FetchErrorPolicy, WaitOptions};

use crate::api::client::Client;
use crate::api::http::path_segment;
use crate::api::query::{self, ListOption};
use crate::error::Result;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// A remote object snapshot decoded from the API.
pub trait ResourceKind: DeserializeOwned + Send + Sync + 'static {
    /// Human-readable family name used in logs
    const NAME: &'static str;

    /// Identifier used in item paths (UUID, slug, or IP address)
    fn id(&self) -> &str;
}

/// Collection directly below the API root.
pub trait TopLevel: ResourceKind {
    /// Collection path relative to the base URL, e.g. `v1/servers`
    const PATH: &'static str;
}

/// Collection scoped under a parent resource.
pub trait Nested: ResourceKind {
    /// Parent collection path, e.g. `v1/load-balancers/pools`
    const PARENT_PATH: &'static str;
    /// Child collection segment below the parent id, e.g. `members`
    const CHILD_PATH: &'static str;
}

pub trait Retrievable: ResourceKind {}

pub trait Creatable: ResourceKind {
    type CreateRequest: Serialize + Send + Sync;
}

pub trait Updatable: ResourceKind {
    type UpdateRequest: Serialize + Send + Sync;
}

pub trait Deletable: ResourceKind {}

/// CRUD operations for one resource family, bound to a collection path.
pub struct Service<K> {
    client: Client,
    collection: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for Service<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection: self.collection.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for Service<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("collection", &self.collection)
            .finish()
    }
}

impl<K: TopLevel> Service<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            collection: K::PATH.to_string(),
            _kind: PhantomData,
        }
    }
}

impl<K: Nested> Service<K> {
    /// Bind the service to the children of one parent.
    pub fn scoped(client: Client, parent_id: &str) -> Result<Self> {
        Ok(Self {
            client,
            collection: format!(
                "{}/{}/{}",
                K::PARENT_PATH,
                path_segment(parent_id)?,
                K::CHILD_PATH
            ),
            _kind: PhantomData,
        })
    }
}

impl<K: ResourceKind> Service<K> {
    /// Collection path this service operates on.
    pub fn path(&self) -> &str {
        &self.collection
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn item_path(&self, id: &str) -> Result<String> {
        Ok(format!("{}/{}", self.collection, path_segment(id)?))
    }

    /// List the collection, applying the given query modifiers.
    ///
    /// Order is whatever the server returns.
    pub async fn list(&self, options: &[ListOption]) -> Result<Vec<K>> {
        let http = self.client.http();
        let mut request = http.new_request::<()>(Method::GET, &self.collection, None)?;
        query::apply_all(&mut request, options);

        let response = http.execute::<Option<Vec<K>>>(request).await?;
        let items = response.value.unwrap_or_default();
        tracing::debug!("Listed {} {}(s)", items.len(), K::NAME);
        Ok(items)
    }
}

impl<K: Retrievable> Service<K> {
    pub async fn get(&self, id: &str) -> Result<K> {
        let http = self.client.http();
        let request = http.new_request::<()>(Method::GET, &self.item_path(id)?, None)?;
        Ok(http.execute::<K>(request).await?.value)
    }
}

impl<K: Creatable> Service<K> {
    pub async fn create(&self, request: &K::CreateRequest) -> Result<K> {
        let http = self.client.http();
        let request = http.new_request(Method::POST, &self.collection, Some(request))?;
        let created = http.execute::<K>(request).await?.value;
        tracing::info!("Created {} {}", K::NAME, created.id());
        Ok(created)
    }
}

impl<K: Updatable> Service<K> {
    /// Patch the resource. Fields left `None` in the request are not sent.
    pub async fn update(&self, id: &str, request: &K::UpdateRequest) -> Result<()> {
        let http = self.client.http();
        let request = http.new_request(Method::PATCH, &self.item_path(id)?, Some(request))?;
        http.execute_empty(request).await?;
        tracing::info!("Updated {} {}", K::NAME, id);
        Ok(())
    }
}

impl<K: Deletable> Service<K> {
    pub async fn delete(&self, id: &str) -> Result<()> {
        let http = self.client.http();
        let request = http.new_request::<()>(Method::DELETE, &self.item_path(id)?, None)?;
        http.execute_empty(request).await?;
        tracing::info!("Deleted {} {}", K::NAME, id);
        Ok(())
    }
}
