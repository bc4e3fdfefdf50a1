//! Scripted [`WorkItemApi`] for tests.
//!
//! Available under `#[cfg(test)]` and with the `test-util` feature so the
//! MCP crate can run the real adapter without a network.

use crate::domain;
use crate::error::{Error, Result};
use crate::rest::{RawComment, RawWorkItem, WorkItemApi};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A backend call recorded by [`MockApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `get_work_item(id)`
    GetWorkItem(i64),
    /// `get_comments(id)`
    GetComments(i64),
    /// `update_state(id, state)`
    UpdateState(i64, String),
}

#[derive(Debug, Default)]
struct MockState {
    items: HashMap<i64, Map<String, Value>>,
    comments: HashMap<i64, Vec<RawComment>>,
    comments_disabled: HashSet<i64>,
    fetch_failure: Option<String>,
    update_failure: Option<String>,
    calls: Vec<MockCall>,
}

/// In-memory work item backend with scripted failures.
///
/// # Behavior
///
/// - `get_work_item`: returns the scripted fields, or a 404 API error
/// - `get_comments`: returns scripted comments (empty by default), or a 403
///   API error for items registered with [`MockApi::with_comments_disabled`]
/// - `update_state`: writes `System.State` so a later fetch observes it
#[derive(Debug, Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a work item. `fields` must be a JSON object.
    #[must_use]
    pub fn with_item(self, id: i64, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.lock().items.insert(id, fields);
        self
    }

    /// Register the comments for a work item.
    #[must_use]
    pub fn with_comments(self, id: i64, comments: Vec<RawComment>) -> Self {
        self.lock().comments.insert(id, comments);
        self
    }

    /// Make the comments endpoint reject requests for a work item.
    #[must_use]
    pub fn with_comments_disabled(self, id: i64) -> Self {
        self.lock().comments_disabled.insert(id);
        self
    }

    /// Make every `get_work_item` call fail with the given message.
    #[must_use]
    pub fn failing_fetch(self, message: impl Into<String>) -> Self {
        self.lock().fetch_failure = Some(message.into());
        self
    }

    /// Make every `update_state` call fail with the given message.
    #[must_use]
    pub fn failing_update(self, message: impl Into<String>) -> Self {
        self.lock().update_failure = Some(message.into());
        self
    }

    /// All calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WorkItemApi for MockApi {
    async fn get_work_item(&self, id: i64) -> Result<RawWorkItem> {
        let mut state = self.lock();
        state.calls.push(MockCall::GetWorkItem(id));

        if let Some(message) = &state.fetch_failure {
            return Err(Error::api(500, message));
        }
        state
            .items
            .get(&id)
            .map(|fields| RawWorkItem {
                id,
                fields: fields.clone(),
            })
            .ok_or_else(|| Error::api(404, &format!("TF401232: Work item {id} does not exist")))
    }

    async fn get_comments(&self, id: i64) -> Result<Vec<RawComment>> {
        let mut state = self.lock();
        state.calls.push(MockCall::GetComments(id));

        if state.comments_disabled.contains(&id) {
            return Err(Error::api(403, "Comments are not enabled for this work item"));
        }
        Ok(state.comments.get(&id).cloned().unwrap_or_default())
    }

    async fn update_state(&self, id: i64, new_state: &str) -> Result<()> {
        let mut state = self.lock();
        state
            .calls
            .push(MockCall::UpdateState(id, new_state.to_string()));

        if let Some(message) = &state.update_failure {
            return Err(Error::api(400, message));
        }
        let fields = state
            .items
            .get_mut(&id)
            .ok_or_else(|| Error::api(404, &format!("TF401232: Work item {id} does not exist")))?;
        fields.insert(
            domain::fields::STATE.to_string(),
            Value::String(new_state.to_string()),
        );
        Ok(())
    }
}
