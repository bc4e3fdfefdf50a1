//! Azure DevOps MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use ado_mcp::AdoMcpServer;
use ado_mcp::environment::load_env_file;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// MCP server exposing Azure DevOps work items over stdio.
#[derive(Debug, Parser)]
#[command(name = "ado-mcp", version, about)]
struct Args {
    /// Read ADO_* variables from this file instead of a `.env` in the
    /// current directory.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Stdout carries the MCP stream; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    load_env_file(args.env_file.as_deref())
        .with_context(|| format!("Failed to load environment file {:?}", args.env_file))?;

    tracing::info!("Starting ado-mcp server");

    let server = AdoMcpServer::new();
    server.run().await?;

    Ok(())
}
