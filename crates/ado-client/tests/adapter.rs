//! Integration tests for the Azure DevOps adapter.
//!
//! These tests drive the public API with a custom `WorkItemApi` to verify:
//! - Field normalization of realistic backend payloads
//! - Comment count consistency and comment fallbacks
//! - Error wrapping for fetch and update
//! - Configuration loading without touching the process environment

use ado_client::config::{DEFAULT_BASE_URL, ENV_ORGANIZATION, ENV_PAT, ENV_PROJECT};
use ado_client::rest::{RawComment, RawWorkItem, WorkItemApi};
use ado_client::{AdoClient, AdoConfig, Error, IdentityRef, Result, WorkItemBackend};
use async_trait::async_trait;
use rstest::rstest;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Test Helpers
// ============================================================================

/// Single work item backend that remembers the last state written.
struct SingleItemApi {
    fields: Mutex<Map<String, Value>>,
    comments: Option<Vec<RawComment>>,
    reject_updates: bool,
    fetches: AtomicUsize,
}

impl SingleItemApi {
    fn new(fields: Value, comments: Option<Vec<RawComment>>) -> Self {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object");
        };
        Self {
            fields: Mutex::new(fields),
            comments,
            reject_updates: false,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WorkItemApi for SingleItemApi {
    async fn get_work_item(&self, id: i64) -> Result<RawWorkItem> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if id != 7 {
            return Err(Error::api(404, &format!("TF401232: Work item {id} does not exist")));
        }
        Ok(RawWorkItem {
            id,
            fields: self.fields.lock().unwrap().clone(),
        })
    }

    async fn get_comments(&self, _id: i64) -> Result<Vec<RawComment>> {
        self.comments
            .clone()
            .ok_or_else(|| Error::api(403, "Comments are disabled"))
    }

    async fn update_state(&self, _id: i64, state: &str) -> Result<()> {
        if self.reject_updates {
            return Err(Error::api(400, "VS402625: state transition not allowed"));
        }
        self.fields
            .lock()
            .unwrap()
            .insert("System.State".to_string(), json!(state));
        Ok(())
    }
}

fn bug_payload() -> Value {
    json!({
        "System.Title": "Crash on launch",
        "System.WorkItemType": "Bug",
        "System.State": "Active",
        "System.Description": "<div>App exits immediately</div>",
        "System.AssignedTo": {
            "displayName": "Ada Lovelace",
            "uniqueName": "ada@contoso.com"
        },
        "System.CreatedBy": {"displayName": "Grace Hopper"},
        "System.CreatedDate": "2024-03-01T10:00:00Z",
        "System.ChangedDate": "2024-03-02T11:30:00Z",
        "System.AreaPath": "Fabrikam\\Mobile",
        "System.IterationPath": "Fabrikam\\Sprint 4",
        "System.Tags": "crash; mobile",
        "Microsoft.VSTS.TCM.ReproSteps": "1. Tap the icon",
        "System.Rev": 12
    })
}

fn comment(text: &str, author: IdentityRef) -> RawComment {
    RawComment {
        text: Some(text.to_string()),
        created_by: author,
        created_date: Some("2024-03-03T09:00:00Z".to_string()),
    }
}

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test]
async fn test_fetch_item_normalizes_every_field() {
    let comments = vec![
        comment("Seen on iOS", IdentityRef::Raw("svc-build".to_string())),
        comment("Fixed in main", IdentityRef::Absent),
    ];
    let client = AdoClient::with_api(SingleItemApi::new(bug_payload(), Some(comments)));

    let record = client.fetch_item(7).await.unwrap();

    assert_eq!(record.title, "Crash on launch");
    assert_eq!(record.work_item_type, "Bug");
    assert_eq!(record.description, "<div>App exits immediately</div>");
    assert_eq!(record.assigned_to, "Ada Lovelace");
    assert_eq!(record.created_by, "Grace Hopper");
    assert_eq!(record.area_path, "Fabrikam\\Mobile");
    assert_eq!(record.tags, "crash; mobile");
    assert_eq!(record.steps_to_reproduce.as_deref(), Some("1. Tap the icon"));
    assert_eq!(record.comment_count(), 2);
    assert_eq!(record.comment_count(), record.comments.len());
    assert_eq!(record.comments[0].created_by, "svc-build");
    assert_eq!(record.comments[1].created_by, "Unknown");
}

#[tokio::test]
async fn test_fetch_item_defaults_for_sparse_payload() {
    let client = AdoClient::with_api(SingleItemApi::new(json!({}), Some(Vec::new())));

    let record = client.fetch_item(7).await.unwrap();

    assert_eq!(record.id, 7);
    assert_eq!(record.title, "");
    assert_eq!(record.assigned_to, "Unassigned");
    assert_eq!(record.created_by, "Unknown");
    assert_eq!(record.steps_to_reproduce, None);
    assert_eq!(record.comment_count(), 0);
}

#[tokio::test]
async fn test_disabled_comments_do_not_fail_fetch() {
    let client = AdoClient::with_api(SingleItemApi::new(bug_payload(), None));

    assert!(client.fetch_comments(7).await.is_empty());
    let record = client.fetch_item(7).await.unwrap();
    assert!(record.comments.is_empty());
}

#[tokio::test]
async fn test_fetch_missing_item_is_wrapped() {
    let client = AdoClient::with_api(SingleItemApi::new(bug_payload(), None));

    let err = client.fetch_item(42).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to get work item 42: Azure DevOps API error 404: TF401232: Work item 42 does not exist"
    );
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_set_state_rereads_record() {
    let client = AdoClient::with_api(SingleItemApi::new(bug_payload(), Some(Vec::new())));

    let record = client.set_state(7, "Resolved").await.unwrap();

    assert_eq!(record.state, "Resolved");
    assert_eq!(record.title, "Crash on launch");
    assert_eq!(client.api().fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_update_is_wrapped() {
    let mut api = SingleItemApi::new(bug_payload(), Some(Vec::new()));
    api.reject_updates = true;
    let client = AdoClient::with_api(api);

    let err = client.set_state(7, "Closed").await.unwrap_err();

    assert!(matches!(err, Error::StateUpdate { id: 7, .. }));
    assert!(err.to_string().contains("VS402625: state transition not allowed"));
    assert_eq!(client.api().fetches.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Configuration
// ============================================================================

#[rstest]
#[case::nothing(&[], "ADO_ORGANIZATION, ADO_PROJECT, ADO_PAT")]
#[case::no_pat(&[(ENV_ORGANIZATION, "contoso"), (ENV_PROJECT, "Fabrikam")], "ADO_PAT")]
#[case::blank_project(
    &[(ENV_ORGANIZATION, "contoso"), (ENV_PROJECT, "  "), (ENV_PAT, "secret")],
    "ADO_PROJECT"
)]
fn test_missing_configuration(#[case] vars: &[(&str, &str)], #[case] names: &str) {
    let err = AdoConfig::from_lookup(lookup(vars)).unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().ends_with(names));
}

#[test]
fn test_configured_client_never_prints_token() {
    let config = AdoConfig::from_lookup(lookup(&[
        (ENV_ORGANIZATION, "contoso"),
        (ENV_PROJECT, "Fabrikam"),
        (ENV_PAT, "super-secret-pat"),
    ]))
    .unwrap();

    assert_eq!(config.organization_url(), format!("{DEFAULT_BASE_URL}/contoso"));
    assert!(!format!("{config:?}").contains("super-secret-pat"));

    let client = AdoClient::from_config(&config).unwrap();
    assert!(!format!("{client:?}").contains("super-secret-pat"));
}
