//! CPM Client - read-only backend access
//!
//! Provides the outbound seam of the reconciliation engine:
//! - [`ApiClient`]: JSON GET against the project-management backend
//! - [`HttpApiClient`]: reqwest implementation with bearer authentication
//! - [`TokenSource`]: credentials read fresh from external storage
//!
//! # Example
//!
//! ```rust,ignore
//! use cpm_client::{ApiClient, ClientConfig, HttpApiClient};
//!
//! # async fn example() -> Result<(), cpm_client::ClientError> {
//! let client = HttpApiClient::new(ClientConfig::from_env())?;
//! let projects = client.get_json("/projects").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod http;
pub mod token;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use http::{ApiClient, HttpApiClient};
#[cfg(feature = "mock")]
pub use http::MockApiClient;
pub use token::{EnvToken, FileToken, StaticToken, TokenConfig, TokenSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
