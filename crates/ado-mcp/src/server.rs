//! MCP server implementation.
//!
//! This module adapts [`Tools`] to the rmcp `ServerHandler` interface and
//! runs it over stdio.

use crate::context::{BackendFactory, ClientContext, EnvBackendFactory};
use crate::error::{Error, Result};
use crate::tools::{InvocationResult, ToolDescriptor, Tools};
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, RoleServer, ServiceExt};
use std::sync::Arc;
use tracing::info;

/// The Azure DevOps MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct AdoMcpServer {
    /// Tool implementations.
    tools: Arc<Tools>,
}

impl AdoMcpServer {
    /// Create a server that reads its credentials from the environment on
    /// the first tool call.
    #[must_use]
    pub fn new() -> Self {
        Self::with_factory(EnvBackendFactory)
    }

    /// Create a server with a custom backend factory.
    pub fn with_factory(factory: impl BackendFactory + 'static) -> Self {
        Self::with_context(ClientContext::new(factory))
    }

    /// Create a server over an existing backend context.
    #[must_use]
    pub fn with_context(context: ClientContext) -> Self {
        Self {
            tools: Arc::new(Tools::with_context(context)),
        }
    }

    /// Get a reference to the tools.
    #[must_use]
    pub fn tools(&self) -> &Arc<Tools> {
        &self.tools
    }

    /// Serve MCP requests on stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns `Error::Mcp` if the handshake fails or the service task
    /// terminates abnormally.
    pub async fn run(self) -> Result<()> {
        info!("Serving MCP over stdio");
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        info!(?reason, "MCP session ended");
        Ok(())
    }
}

impl Default for AdoMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&ToolDescriptor> for Tool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Tool::new(
            descriptor.name,
            descriptor.description,
            Arc::clone(&descriptor.input_schema),
        )
    }
}

impl From<InvocationResult> for CallToolResult {
    fn from(result: InvocationResult) -> Self {
        let is_error = result.is_error();
        let content = result.segments.into_iter().map(Content::text).collect();
        if is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl ServerHandler for AdoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ado-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Azure DevOps MCP server. Use get_work_item to read a work item and update_work_item_status to change its state."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        let tools = self.tools.list_tools().iter().map(Tool::from).collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let result = self
            .tools
            .call_tool(&request.name, request.arguments.as_ref())
            .await;
        Ok(result.into())
    }
}
