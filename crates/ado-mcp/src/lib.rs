//! MCP server for Azure DevOps work items.
//!
//! This crate provides an MCP (Model Context Protocol) server that lets AI
//! assistants read Azure DevOps work items and move them between states.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps the
//! `WorkItemBackend` trait from the `ado-client` crate. The backend is built
//! lazily on the first tool call, so a server with missing credentials
//! still starts and reports the problem as tool output.
//!
//! # Tools
//!
//! - `get_work_item` - Show a work item's fields, description, repro steps
//!   and comments
//! - `update_work_item_status` - Set a work item's state and confirm the
//!   result

pub mod context;
pub mod environment;
pub mod error;
pub mod models;
pub mod report;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::AdoMcpServer;
