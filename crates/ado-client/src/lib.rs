//! Azure DevOps work item client.
//!
//! This crate is the backing adapter of the `ado-mcp` server. It owns the
//! connection to one Azure DevOps project and exposes a small, normalized
//! view of work items.
//!
//! # Layers
//!
//! - [`config`] - connection settings loaded from `ADO_*` variables
//! - [`rest`] - the raw REST surface ([`rest::WorkItemApi`]) and its HTTPS
//!   implementation
//! - [`domain`] - normalized [`ItemRecord`] and [`Comment`] records
//! - [`client`] - the [`AdoClient`] adapter implementing [`WorkItemBackend`]
//!
//! # Example
//!
//! ```no_run
//! use ado_client::{AdoClient, WorkItemBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> ado_client::Result<()> {
//!     let client = AdoClient::from_env()?;
//!     let item = client.fetch_item(42).await?;
//!     println!("{}: {} ({})", item.id, item.title, item.state);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod rest;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{AdoClient, WorkItemBackend};
pub use config::AdoConfig;
pub use domain::{Comment, IdentityRef, ItemRecord};
pub use error::{Error, Result};
