//! Normalized work item records.
//!
//! Azure DevOps returns work item fields as a loosely typed map keyed by
//! reference name (`System.Title`, `System.AssignedTo`, ...). This module
//! reduces that map to plain records with a fixed default for every field.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Backend reference names for the fields this crate reads.
pub mod fields {
    /// Work item title.
    pub const TITLE: &str = "System.Title";
    /// Work item type (Bug, Task, User Story, ...).
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    /// Workflow state.
    pub const STATE: &str = "System.State";
    /// HTML description.
    pub const DESCRIPTION: &str = "System.Description";
    /// Assignee identity.
    pub const ASSIGNED_TO: &str = "System.AssignedTo";
    /// Creation timestamp.
    pub const CREATED_DATE: &str = "System.CreatedDate";
    /// Last change timestamp.
    pub const CHANGED_DATE: &str = "System.ChangedDate";
    /// Creator identity.
    pub const CREATED_BY: &str = "System.CreatedBy";
    /// Area path.
    pub const AREA_PATH: &str = "System.AreaPath";
    /// Iteration path.
    pub const ITERATION_PATH: &str = "System.IterationPath";
    /// Semicolon separated tags.
    pub const TAGS: &str = "System.Tags";
    /// Repro steps, only defined for bug-like types.
    pub const REPRO_STEPS: &str = "Microsoft.VSTS.TCM.ReproSteps";
}

/// Shown when a work item has no assignee.
pub const UNASSIGNED: &str = "Unassigned";
/// Shown when an author cannot be determined.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// An identity-valued field as the backend may deliver it.
///
/// Identity fields normally arrive as objects with a `displayName`, but
/// older payloads and some integrations send a bare string instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityRef {
    /// A structured identity object.
    Identity {
        /// The identity's display name, if the object carried one.
        display_name: Option<String>,
    },
    /// A plain string value.
    Raw(String),
    /// The field was missing or null.
    #[default]
    Absent,
}

impl IdentityRef {
    /// Classify a raw JSON value.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Object(map)) => Self::Identity {
                display_name: map
                    .get("displayName")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            Some(Value::String(s)) => Self::Raw(s.clone()),
            Some(other) => Self::Raw(other.to_string()),
        }
    }

    /// Reduce the identity to a display string, using `default` when absent.
    #[must_use]
    pub fn display_or(&self, default: &str) -> String {
        match self {
            Self::Identity {
                display_name: Some(name),
            }
            | Self::Raw(name) => name.clone(),
            Self::Identity { display_name: None } | Self::Absent => default.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for IdentityRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(Self::from_value(value.as_ref()))
    }
}

/// A single discussion comment on a work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment body (HTML).
    pub text: String,
    /// Author display name, or [`UNKNOWN_AUTHOR`].
    pub created_by: String,
    /// Creation timestamp as sent by the backend, or empty.
    pub created_date: String,
}

/// A fully normalized work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Work item id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Work item type name.
    pub work_item_type: String,
    /// Current workflow state.
    pub state: String,
    /// Description (HTML), possibly empty.
    pub description: String,
    /// Assignee display name, or [`UNASSIGNED`].
    pub assigned_to: String,
    /// Creation timestamp.
    pub created_date: String,
    /// Last change timestamp.
    pub changed_date: String,
    /// Creator display name, or [`UNKNOWN_AUTHOR`].
    pub created_by: String,
    /// Area path.
    pub area_path: String,
    /// Iteration path.
    pub iteration_path: String,
    /// Tags, as one string.
    pub tags: String,
    /// Repro steps. `None` when the work item type has no such field,
    /// which is different from an empty value.
    pub steps_to_reproduce: Option<String>,
    /// Full comment history, oldest first.
    pub comments: Vec<Comment>,
}

impl ItemRecord {
    /// Build a record from the backend field map and an already fetched
    /// comment list.
    #[must_use]
    pub fn from_fields(id: i64, raw: &Map<String, Value>, comments: Vec<Comment>) -> Self {
        Self {
            id,
            title: text_field(raw, fields::TITLE),
            work_item_type: text_field(raw, fields::WORK_ITEM_TYPE),
            state: text_field(raw, fields::STATE),
            description: text_field(raw, fields::DESCRIPTION),
            assigned_to: IdentityRef::from_value(raw.get(fields::ASSIGNED_TO))
                .display_or(UNASSIGNED),
            created_date: text_field(raw, fields::CREATED_DATE),
            changed_date: text_field(raw, fields::CHANGED_DATE),
            created_by: IdentityRef::from_value(raw.get(fields::CREATED_BY))
                .display_or(UNKNOWN_AUTHOR),
            area_path: text_field(raw, fields::AREA_PATH),
            iteration_path: text_field(raw, fields::ITERATION_PATH),
            tags: text_field(raw, fields::TAGS),
            steps_to_reproduce: raw.get(fields::REPRO_STEPS).map(value_to_text),
            comments,
        }
    }

    /// Number of comments. Always equal to `comments.len()`.
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}

fn text_field(raw: &Map<String, Value>, name: &str) -> String {
    raw.get(name).map(value_to_text).unwrap_or_default()
}

/// Render a scalar field value as text. Null becomes the empty string.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {other}"),
        }
    }

    #[rstest]
    #[case::identity(json!({"displayName": "Ada Lovelace", "uniqueName": "ada@example.com"}), "Ada Lovelace")]
    #[case::identity_without_name(json!({"uniqueName": "ada@example.com"}), "Unassigned")]
    #[case::raw_string(json!("Grace Hopper <grace@example.com>"), "Grace Hopper <grace@example.com>")]
    #[case::null(Value::Null, "Unassigned")]
    #[case::number(json!(17), "17")]
    fn test_identity_display(#[case] value: Value, #[case] expected: &str) {
        let identity = IdentityRef::from_value(Some(&value));
        assert_eq!(identity.display_or(UNASSIGNED), expected);
    }

    #[test]
    fn test_identity_absent() {
        assert_eq!(IdentityRef::from_value(None), IdentityRef::Absent);
        assert_eq!(IdentityRef::Absent.display_or(UNKNOWN_AUTHOR), "Unknown");
    }

    #[test]
    fn test_identity_deserializes_from_any_shape() {
        let parsed: Vec<IdentityRef> =
            serde_json::from_value(json!([{"displayName": "Ada"}, "raw", null])).unwrap();
        assert_eq!(
            parsed,
            vec![
                IdentityRef::Identity {
                    display_name: Some("Ada".to_string())
                },
                IdentityRef::Raw("raw".to_string()),
                IdentityRef::Absent,
            ]
        );
    }

    #[test]
    fn test_from_fields_full_payload() {
        let fields = as_map(json!({
            "System.Title": "Crash on launch",
            "System.WorkItemType": "Bug",
            "System.State": "Active",
            "System.Description": "<p>Boom</p>",
            "System.AssignedTo": {"displayName": "Ada Lovelace"},
            "System.CreatedDate": "2024-03-01T10:00:00Z",
            "System.ChangedDate": "2024-03-02T11:30:00Z",
            "System.CreatedBy": {"displayName": "Grace Hopper"},
            "System.AreaPath": "Fabrikam\\Mobile",
            "System.IterationPath": "Fabrikam\\Sprint 4",
            "System.Tags": "crash; mobile",
            "Microsoft.VSTS.TCM.ReproSteps": "<ol><li>Open app</li></ol>"
        }));
        let comments = vec![Comment {
            text: "Seen on iOS too".to_string(),
            created_by: "Ada Lovelace".to_string(),
            created_date: "2024-03-02T09:00:00Z".to_string(),
        }];

        let record = ItemRecord::from_fields(7, &fields, comments);

        assert_eq!(record.id, 7);
        assert_eq!(record.title, "Crash on launch");
        assert_eq!(record.work_item_type, "Bug");
        assert_eq!(record.state, "Active");
        assert_eq!(record.assigned_to, "Ada Lovelace");
        assert_eq!(record.created_by, "Grace Hopper");
        assert_eq!(record.area_path, "Fabrikam\\Mobile");
        assert_eq!(record.tags, "crash; mobile");
        assert_eq!(
            record.steps_to_reproduce.as_deref(),
            Some("<ol><li>Open app</li></ol>")
        );
        assert_eq!(record.comment_count(), 1);
    }

    #[test]
    fn test_from_fields_applies_defaults() {
        let record = ItemRecord::from_fields(3, &Map::new(), Vec::new());

        assert_eq!(record.title, "");
        assert_eq!(record.state, "");
        assert_eq!(record.description, "");
        assert_eq!(record.assigned_to, UNASSIGNED);
        assert_eq!(record.created_by, UNKNOWN_AUTHOR);
        assert_eq!(record.tags, "");
        assert_eq!(record.steps_to_reproduce, None);
        assert!(record.comments.is_empty());
        assert_eq!(record.comment_count(), 0);
    }

    #[test]
    fn test_repro_steps_presence_is_preserved() {
        let empty = as_map(json!({"Microsoft.VSTS.TCM.ReproSteps": ""}));
        let record = ItemRecord::from_fields(1, &empty, Vec::new());
        assert_eq!(record.steps_to_reproduce, Some(String::new()));

        let absent = as_map(json!({"System.Title": "Task"}));
        let record = ItemRecord::from_fields(1, &absent, Vec::new());
        assert_eq!(record.steps_to_reproduce, None);
    }

    #[test]
    fn test_non_string_scalars_are_stringified() {
        let fields = as_map(json!({"System.Title": 42, "System.Tags": null}));
        let record = ItemRecord::from_fields(1, &fields, Vec::new());
        assert_eq!(record.title, "42");
        assert_eq!(record.tags, "");
    }
}
