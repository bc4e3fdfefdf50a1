//! MCP tool registry and dispatch.
//!
//! [`Tools`] owns the static tool registry and routes each invocation to
//! the Azure DevOps backend. Every failure, from missing credentials to a
//! rejected backend request, comes back as text in an [`InvocationResult`]
//! and never as a protocol fault.

use crate::context::{BackendFactory, ClientContext};
use crate::error::{Error, ErrorKind, Result};
use crate::models::{
    GET_WORK_ITEM, GetWorkItemParams, ToolRequest, UPDATE_WORK_ITEM_STATUS,
    UpdateWorkItemStatusParams,
};
use crate::report::{status_update_report, work_item_report};
use ado_client::WorkItemBackend;
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

/// JSON object type used for tool arguments and schemas.
pub type JsonObject = Map<String, Value>;

/// Appended to configuration errors so operators know what to set.
const CONFIGURATION_HINT: &str =
    "Please ensure ADO_ORGANIZATION, ADO_PROJECT, and ADO_PAT environment variables are set.";

/// A registered tool: its name, description and input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Stable tool name.
    pub name: &'static str,
    /// Human readable description shown to the model.
    pub description: &'static str,
    /// JSON schema of the tool's arguments.
    pub input_schema: Arc<JsonObject>,
}

static REGISTRY: LazyLock<Vec<ToolDescriptor>> = LazyLock::new(|| {
    vec![
        ToolDescriptor {
            name: GET_WORK_ITEM,
            description: "Get detailed information about an Azure DevOps work item including description, steps to reproduce, comments, status, and other metadata. Works with all work item types (Bugs, Tasks, User Stories, etc.)",
            input_schema: input_schema::<GetWorkItemParams>(),
        },
        ToolDescriptor {
            name: UPDATE_WORK_ITEM_STATUS,
            description: "Update the state/status of an Azure DevOps work item. Common states include: New, Active, Resolved, Closed, Removed. Note: Available states depend on your work item type and process template.",
            input_schema: input_schema::<UpdateWorkItemStatusParams>(),
        },
    ]
});

/// The tool registry, in listing order.
#[must_use]
pub fn registry() -> &'static [ToolDescriptor] {
    &REGISTRY
}

fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(map)) => Arc::new(map),
        Ok(other) => {
            error!(schema = %T::schema_name(), value = %other, "Input schema is not a JSON object");
            Arc::new(JsonObject::new())
        }
        Err(e) => {
            error!(schema = %T::schema_name(), error = %e, "Failed to serialize input schema");
            Arc::new(JsonObject::new())
        }
    }
}

/// Outcome of one tool call: the text returned to the client, plus the
/// error category when the call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Text content blocks. Always exactly one in this server.
    pub segments: Vec<String>,
    /// Set when the text describes a failure.
    pub error: Option<ErrorKind>,
}

impl InvocationResult {
    /// A successful result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![text.into()],
            error: None,
        }
    }

    /// A failed result carrying an in-band error message.
    #[must_use]
    pub fn failure(kind: ErrorKind, text: impl Into<String>) -> Self {
        Self {
            segments: vec![text.into()],
            error: Some(kind),
        }
    }

    /// Whether the call failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The first text segment.
    #[must_use]
    pub fn first_text(&self) -> &str {
        self.segments.first().map_or("", String::as_str)
    }
}

/// Tool implementations for the Azure DevOps MCP server.
pub struct Tools {
    context: ClientContext,
}

impl Tools {
    /// Create a Tools instance that builds its backend with `factory` on
    /// first use.
    pub fn new(factory: impl BackendFactory + 'static) -> Self {
        Self::with_context(ClientContext::new(factory))
    }

    /// Create a Tools instance over an existing context.
    #[must_use]
    pub fn with_context(context: ClientContext) -> Self {
        Self { context }
    }

    /// The lazily initialized backend context.
    #[must_use]
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// All registered tools, identical on every call.
    #[must_use]
    pub fn list_tools(&self) -> &'static [ToolDescriptor] {
        registry()
    }

    /// Run the tool called `name` with the given arguments.
    ///
    /// Never fails: configuration problems, invalid arguments, unknown
    /// tools and backend errors are all reported as text.
    pub async fn call_tool(&self, name: &str, arguments: Option<&JsonObject>) -> InvocationResult {
        info!(tool = name, "Tool call");

        let backend = match self.context.get_or_create().await {
            Ok(backend) => backend,
            Err(e) if e.is_configuration() => {
                warn!(error = %e, "Azure DevOps client is not configured");
                return InvocationResult::failure(
                    ErrorKind::Configuration,
                    format!("Error: {e}\n\n{CONFIGURATION_HINT}"),
                );
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize Azure DevOps client");
                return InvocationResult::failure(
                    ErrorKind::Backend,
                    format!("Failed to initialize Azure DevOps client: {e}"),
                );
            }
        };

        let empty = JsonObject::new();
        let arguments = arguments.unwrap_or(&empty);

        match dispatch(backend.as_ref(), name, arguments).await {
            Ok(text) => InvocationResult::text(text),
            Err(Error::UnknownTool(name)) => {
                warn!(tool = %name, "Unknown tool requested");
                InvocationResult::failure(ErrorKind::UnknownTool, format!("Unknown tool: {name}"))
            }
            Err(Error::Validation(e)) => {
                warn!(tool = name, error = %e, "Rejected tool arguments");
                InvocationResult::failure(ErrorKind::Validation, format!("Error: {e}"))
            }
            Err(e) => {
                warn!(tool = name, error = %e, "Tool call failed");
                InvocationResult::failure(e.kind(), format!("Error executing {name}: {e}"))
            }
        }
    }
}

async fn dispatch(
    backend: &dyn WorkItemBackend,
    name: &str,
    arguments: &JsonObject,
) -> Result<String> {
    match ToolRequest::parse(name, arguments)? {
        ToolRequest::GetWorkItem(params) => {
            let item = backend.fetch_item(params.work_item_id).await?;
            Ok(work_item_report(&item))
        }
        ToolRequest::UpdateWorkItemStatus(params) => {
            let item = backend
                .set_state(params.work_item_id, &params.new_state)
                .await?;
            Ok(status_update_report(params.work_item_id, &item))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_and_order() {
        let names: Vec<&str> = registry().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["get_work_item", "update_work_item_status"]);
    }

    #[test]
    fn test_registry_is_stable() {
        let first = registry();
        let second = registry();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_work_item_schema() {
        let schema = &registry()[0].input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["work_item_id"]["type"], "integer");
        assert_eq!(schema["required"], serde_json::json!(["work_item_id"]));
    }

    #[test]
    fn test_every_tool_publishes_an_object_schema() {
        for tool in registry() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.input_schema["properties"].is_object(), "{}", tool.name);
        }
    }

    #[test]
    fn test_invocation_result_helpers() {
        let ok = InvocationResult::text("done");
        assert!(!ok.is_error());
        assert_eq!(ok.first_text(), "done");

        let failed = InvocationResult::failure(ErrorKind::Validation, "Error: x is required");
        assert!(failed.is_error());
        assert_eq!(failed.segments.len(), 1);
    }
}
