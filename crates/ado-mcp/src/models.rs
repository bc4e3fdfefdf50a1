//! Tool parameter models.
//!
//! Each tool has a parameter struct whose JSON schema is published in the
//! tool listing. Incoming argument maps are validated against the declared
//! parameters and turned into a [`ToolRequest`] before any backend call.

use crate::error::{Error, Result, ValidationError};
use schemars::JsonSchema;
use serde_json::{Map, Value};

/// Name of the work item lookup tool.
pub const GET_WORK_ITEM: &str = "get_work_item";
/// Name of the state update tool.
pub const UPDATE_WORK_ITEM_STATUS: &str = "update_work_item_status";

const WORK_ITEM_ID: &str = "work_item_id";
const NEW_STATE: &str = "new_state";

/// Parameters for the `get_work_item` tool.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct GetWorkItemParams {
    /// The ID of the work item to retrieve
    pub work_item_id: i64,
}

/// Parameters for the `update_work_item_status` tool.
#[derive(Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct UpdateWorkItemStatusParams {
    /// The ID of the work item to update
    pub work_item_id: i64,

    /// The new state to set (e.g., 'Active', 'Resolved', 'Closed'). Must be a valid state for the work item type.
    pub new_state: String,
}

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    /// `get_work_item`
    GetWorkItem(GetWorkItemParams),
    /// `update_work_item_status`
    UpdateWorkItemStatus(UpdateWorkItemStatusParams),
}

impl ToolRequest {
    /// Validate `arguments` for the tool called `name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTool` for an unregistered name, and
    /// `Error::Validation` when a required argument is missing, has the
    /// wrong type, or an undeclared argument is present.
    pub fn parse(name: &str, arguments: &Map<String, Value>) -> Result<Self> {
        match name {
            GET_WORK_ITEM => {
                require(arguments, &[WORK_ITEM_ID])?;
                reject_undeclared(GET_WORK_ITEM, arguments, &[WORK_ITEM_ID])?;
                Ok(Self::GetWorkItem(GetWorkItemParams {
                    work_item_id: work_item_id(arguments)?,
                }))
            }
            UPDATE_WORK_ITEM_STATUS => {
                require(arguments, &[WORK_ITEM_ID, NEW_STATE])?;
                reject_undeclared(UPDATE_WORK_ITEM_STATUS, arguments, &[WORK_ITEM_ID, NEW_STATE])?;
                Ok(Self::UpdateWorkItemStatus(UpdateWorkItemStatusParams {
                    work_item_id: work_item_id(arguments)?,
                    new_state: text_argument(arguments, NEW_STATE)?,
                }))
            }
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }

    /// The registered name of the tool this request targets.
    #[must_use]
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::GetWorkItem(_) => GET_WORK_ITEM,
            Self::UpdateWorkItemStatus(_) => UPDATE_WORK_ITEM_STATUS,
        }
    }
}

/// Fail with every name in `fields` when any of them is not supplied.
///
/// Presence is checked for all fields before any type is, so a missing
/// argument is always reported as missing.
fn require(arguments: &Map<String, Value>, fields: &[&'static str]) -> Result<()> {
    if fields.iter().any(|field| is_absent(arguments.get(*field))) {
        return Err(Error::Validation(ValidationError::Missing {
            fields: fields.to_vec(),
        }));
    }
    Ok(())
}

/// Missing, null, `false`, zero, blank strings and empty containers all
/// count as not supplied.
fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::Bool(true)) => false,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON),
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Read a supplied `work_item_id`.
///
/// Numeric strings are accepted because some clients quote integers.
fn work_item_id(arguments: &Map<String, Value>) -> Result<i64> {
    let id = match arguments.get(WORK_ITEM_ID) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    id.filter(|id| *id > 0).ok_or(Error::Validation(ValidationError::InvalidType {
        field: WORK_ITEM_ID,
        expected: "a positive integer",
    }))
}

/// Read a supplied string argument, trimmed.
fn text_argument(arguments: &Map<String, Value>, field: &'static str) -> Result<String> {
    match arguments.get(field) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        _ => Err(Error::Validation(ValidationError::InvalidType {
            field,
            expected: "a string",
        })),
    }
}

fn reject_undeclared(
    tool: &'static str,
    arguments: &Map<String, Value>,
    declared: &[&str],
) -> Result<()> {
    match arguments.keys().find(|key| !declared.contains(&key.as_str())) {
        Some(field) => Err(Error::Validation(ValidationError::UnexpectedArgument {
            tool,
            field: field.clone(),
        })),
        None => Ok(()),
    }
}
