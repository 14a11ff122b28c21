//! Typed client for the cloudscale.ch REST API
//!
//! - [`api`] - transport, authentication and list filters
//! - [`model`] - resource snapshots and their create/update requests
//! - [`resource`] - generic CRUD service and state polling
//! - [`metrics`] - object storage bucket metrics
//! - [`metadata`] - instance metadata service
//!
//! ```ignore
//! use cloudscale::{ApiToken, Client, ClientConfig, WaitOptions};
//! use cloudscale::resource::server_is_running;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn boot(id: &str) -> anyhow::Result<()> {
//!     let client = Client::new(ClientConfig::new(ApiToken::new("token")?))?;
//!     let servers = client.servers();
//!     servers.start(id).await?;
//!     servers
//!         .wait_for(id, server_is_running(), &WaitOptions::default(), &CancellationToken::new())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod model;
pub mod resource;

/// Version injected at compile time via CLOUDSCALE_VERSION env var,
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("CLOUDSCALE_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

pub use api::auth::ApiToken;
pub use api::client::Client;
pub use api::http::{ApiResponse, RateLimit};
pub use api::query::{with_name_filter, with_tag_filter, ListOption};
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result, WaitError};
pub use resource::{
    poll_until, Condition, Creatable, Deletable, FetchErrorPolicy, Nested, ResourceKind,
    Retrievable, Service, TopLevel, Updatable, WaitOptions,
};
pub use tokio_util::sync::CancellationToken;
