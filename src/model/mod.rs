//! Resource and request shapes
//!
//! Resources are read-only snapshots; every field defaults when the API
//! omits it. Requests serialize only the fields that are `Some`, so
//! `Some(TagMap::new())` clears tags while `None` leaves them untouched.
//! Fields the API accepts as explicit `null` are `Option<Option<T>>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value labels attached to a resource
pub type TagMap = BTreeMap<String, String>;

/// Zone a resource lives in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneRef {
    pub slug: String,
}

/// Region a resource lives in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionRef {
    pub slug: String,
}

/// Link to another resource as embedded in responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    pub href: String,
    pub uuid: String,
    pub name: String,
}

/// Link to a subnet as embedded in responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetRef {
    pub href: String,
    pub uuid: String,
    pub cidr: String,
}

/// Implements [`ResourceKind`](crate::resource::ResourceKind) and the
/// listed capabilities for a model type.
macro_rules! resource_kind {
    (@cap $ty:ty, Retrievable) => {
        impl $crate::resource::Retrievable for $ty {}
    };
    (@cap $ty:ty, Deletable) => {
        impl $crate::resource::Deletable for $ty {}
    };
    ($ty:ty, name = $name:literal, id = $id:ident, path = $path:literal $(, $cap:ident)* $(,)?) => {
        impl $crate::resource::ResourceKind for $ty {
            const NAME: &'static str = $name;
            fn id(&self) -> &str {
                &self.$id
            }
        }
        impl $crate::resource::TopLevel for $ty {
            const PATH: &'static str = $path;
        }
        $( resource_kind!(@cap $ty, $cap); )*
    };
}

/// Implements the request-carrying capabilities for a model type.
macro_rules! resource_requests {
    ($ty:ty, create = $create:ty, update = $update:ty) => {
        resource_requests!($ty, create = $create);
        resource_requests!($ty, update = $update);
    };
    ($ty:ty, create = $create:ty) => {
        impl $crate::resource::Creatable for $ty {
            type CreateRequest = $create;
        }
    };
    ($ty:ty, update = $update:ty) => {
        impl $crate::resource::Updatable for $ty {
            type UpdateRequest = $update;
        }
    };
}

mod catalog;
mod custom_images;
mod floating_ips;
mod load_balancers;
mod networks;
mod objects_users;
mod server_groups;
mod servers;
mod volumes;

pub use catalog::*;
pub use custom_images::*;
pub use floating_ips::*;
pub use load_balancers::*;
pub use networks::*;
pub use objects_users::*;
pub use server_groups::*;
pub use servers::*;
pub use volumes::*;
