//! The work item adapter.
//!
//! [`AdoClient`] is the single point of contact with Azure DevOps. It turns
//! raw payloads into [`ItemRecord`]s and wraps backend failures with the
//! operation and work item they belong to.

use crate::config::AdoConfig;
use crate::domain::{Comment, ItemRecord};
use crate::error::{Error, Result};
use crate::rest::{RestApi, WorkItemApi};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Work item operations exposed to the tool layer.
///
/// Implementations must be `Send + Sync`; the server shares one instance
/// for the whole process.
#[async_trait]
pub trait WorkItemBackend: Send + Sync {
    /// Fetch every field and the full comment history of a work item.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemFetch` wrapping the backend failure.
    async fn fetch_item(&self, id: i64) -> Result<ItemRecord>;

    /// Fetch the comments of a work item.
    ///
    /// Items without comments, or with comments disabled, yield an empty
    /// list rather than an error.
    async fn fetch_comments(&self, id: i64) -> Vec<Comment>;

    /// Set the state of a work item and return the record as re-read after
    /// the update.
    ///
    /// # Errors
    ///
    /// Returns `Error::StateUpdate` wrapping the backend failure.
    async fn set_state(&self, id: i64, new_state: &str) -> Result<ItemRecord>;
}

/// Azure DevOps adapter over a [`WorkItemApi`] transport.
#[derive(Debug)]
pub struct AdoClient<A = RestApi> {
    api: A,
}

impl AdoClient<RestApi> {
    /// Build a client for the project described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` for an unusable base URL, or
    /// `Error::Connection` if the HTTP client cannot be created.
    pub fn from_config(config: &AdoConfig) -> Result<Self> {
        info!(
            organization = %config.organization,
            project = %config.project,
            "Creating Azure DevOps client"
        );
        Ok(Self::with_api(RestApi::new(config)?))
    }

    /// Build a client from `ADO_ORGANIZATION`, `ADO_PROJECT` and `ADO_PAT`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if any of them is missing.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&AdoConfig::from_env()?)
    }
}

impl<A: WorkItemApi> AdoClient<A> {
    /// Wrap an existing transport.
    pub fn with_api(api: A) -> Self {
        Self { api }
    }

    /// The underlying transport.
    pub fn api(&self) -> &A {
        &self.api
    }
}

#[async_trait]
impl<A: WorkItemApi> WorkItemBackend for AdoClient<A> {
    async fn fetch_item(&self, id: i64) -> Result<ItemRecord> {
        debug!(work_item_id = id, "Fetching work item");
        let raw = self
            .api
            .get_work_item(id)
            .await
            .map_err(|e| Error::item_fetch(id, e))?;

        let comments = self.fetch_comments(id).await;
        Ok(ItemRecord::from_fields(raw.id, &raw.fields, comments))
    }

    async fn fetch_comments(&self, id: i64) -> Vec<Comment> {
        match self.api.get_comments(id).await {
            Ok(comments) => comments.into_iter().map(Comment::from).collect(),
            Err(e) => {
                warn!(work_item_id = id, error = %e, "Comments unavailable, treating as none");
                Vec::new()
            }
        }
    }

    async fn set_state(&self, id: i64, new_state: &str) -> Result<ItemRecord> {
        info!(work_item_id = id, state = new_state, "Updating work item state");
        let wrap = |e| Error::state_update(id, new_state, e);

        self.api.update_state(id, new_state).await.map_err(wrap)?;
        self.fetch_item(id).await.map_err(wrap)
    }
}
