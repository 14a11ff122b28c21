//! cloudscale API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - API token handling
//! - [`client`] - Main client handing out per-resource services
//! - [`http`] - Request building, response decoding, rate-limit metadata
//! - [`query`] - Tag and name filters for list requests
//!
//! # Example
//!
//! ```ignore
//! use cloudscale::{ApiToken, Client, ClientConfig};
//!
//! async fn example() -> cloudscale::Result<()> {
//!     let client = Client::new(ClientConfig::new(ApiToken::new("token")?))?;
//!     let servers = client.servers().list(&[]).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod query;
