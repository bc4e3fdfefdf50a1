//! Raw access to the Azure DevOps work item tracking REST API.
//!
//! [`WorkItemApi`] is the narrow surface the adapter needs from the
//! backend. [`RestApi`] implements it over HTTPS with `reqwest`; tests
//! substitute a scripted implementation.

use crate::config::{AdoConfig, ENV_BASE_URL};
use crate::domain::{Comment, IdentityRef, UNKNOWN_AUTHOR};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Upper bound on comment pages followed for one work item.
pub const MAX_COMMENT_PAGES: usize = 100;

/// Content type required by the work item update endpoint.
const JSON_PATCH: &str = "application/json-patch+json";

/// A work item as returned by the backend, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawWorkItem {
    /// Work item id.
    pub id: i64,
    /// Field values keyed by reference name.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A comment as returned by the backend, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    /// Comment body.
    #[serde(default)]
    pub text: Option<String>,
    /// Author identity.
    #[serde(default)]
    pub created_by: IdentityRef,
    /// Creation timestamp.
    #[serde(default)]
    pub created_date: Option<String>,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Self {
            text: raw.text.unwrap_or_default(),
            created_by: raw.created_by.display_or(UNKNOWN_AUTHOR),
            created_date: raw.created_date.unwrap_or_default(),
        }
    }
}

/// One page of the comments endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentPage {
    #[serde(default)]
    comments: Vec<RawComment>,
    #[serde(default)]
    continuation_token: Option<String>,
}

/// A single JSON-patch operation.
#[derive(Debug, Serialize)]
struct PatchOperation<'a> {
    op: &'static str,
    path: &'static str,
    value: &'a str,
}

/// The backend calls the adapter relies on.
///
/// Every method may fail with a transport, authentication or API error.
#[async_trait]
pub trait WorkItemApi: Send + Sync {
    /// Fetch all fields of a work item.
    async fn get_work_item(&self, id: i64) -> Result<RawWorkItem>;

    /// Fetch the complete comment history of a work item, oldest first.
    async fn get_comments(&self, id: i64) -> Result<Vec<RawComment>>;

    /// Set the `System.State` field of a work item.
    async fn update_state(&self, id: i64, state: &str) -> Result<()>;
}

/// HTTPS implementation of [`WorkItemApi`].
#[derive(Clone)]
pub struct RestApi {
    http: Client,
    project_url: Url,
    api_version: String,
    token: String,
}

impl RestApi {
    /// Build a client for the project named in `config`.
    ///
    /// No request is sent here; connection problems surface on first use.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the base URL is not a valid
    /// hierarchical URL, or `Error::Connection` if the HTTP client cannot be
    /// built.
    pub fn new(config: &AdoConfig) -> Result<Self> {
        let invalid_base = || {
            Error::Configuration(format!(
                "Invalid {ENV_BASE_URL}: '{}'",
                config.base_url
            ))
        };

        let mut project_url = Url::parse(&config.organization_url()).map_err(|_| invalid_base())?;
        project_url
            .path_segments_mut()
            .map_err(|()| invalid_base())?
            .pop_if_empty()
            .push(&config.project);

        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            project_url,
            api_version: config.api_version.clone(),
            token: config.personal_access_token.clone(),
        })
    }

    /// URL of a resource below `{organization}/{project}`.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.project_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn work_item_url(&self, id: i64) -> Url {
        self.endpoint(&["_apis", "wit", "workitems", &id.to_string()])
    }

    fn comments_url(&self, id: i64) -> Url {
        self.endpoint(&["_apis", "wit", "workItems", &id.to_string(), "comments"])
    }

    /// The comments endpoint is only published as a preview API.
    fn comments_api_version(&self) -> String {
        format!("{}-preview.4", self.api_version)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request
            .basic_auth("", Some(&self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl fmt::Debug for RestApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestApi")
            .field("project_url", &self.project_url.as_str())
            .field("api_version", &self.api_version)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WorkItemApi for RestApi {
    async fn get_work_item(&self, id: i64) -> Result<RawWorkItem> {
        debug!(work_item_id = id, "GET work item");
        let request = self.http.get(self.work_item_url(id)).query(&[
            ("$expand", "All"),
            ("api-version", self.api_version.as_str()),
        ]);
        self.send_json(request).await
    }

    async fn get_comments(&self, id: i64) -> Result<Vec<RawComment>> {
        let api_version = self.comments_api_version();
        let mut comments = Vec::new();
        let mut continuation: Option<String> = None;

        for page_number in 0..MAX_COMMENT_PAGES {
            debug!(work_item_id = id, page = page_number, "GET comments");
            let mut request = self
                .http
                .get(self.comments_url(id))
                .query(&[("api-version", api_version.as_str())]);
            if let Some(token) = &continuation {
                request = request.query(&[("continuationToken", token.as_str())]);
            }

            let page: CommentPage = self.send_json(request).await?;
            comments.extend(page.comments);

            match page.continuation_token {
                Some(token) if !token.is_empty() => continuation = Some(token),
                _ => return Ok(comments),
            }
        }

        warn!(
            work_item_id = id,
            pages = MAX_COMMENT_PAGES,
            fetched = comments.len(),
            "Comment history truncated at page limit"
        );
        Ok(comments)
    }

    async fn update_state(&self, id: i64, state: &str) -> Result<()> {
        debug!(work_item_id = id, state, "PATCH work item state");
        let document = [PatchOperation {
            op: "add",
            path: "/fields/System.State",
            value: state,
        }];

        let request = self
            .http
            .patch(self.work_item_url(id))
            .query(&[("api-version", self.api_version.as_str())])
            .header(CONTENT_TYPE, JSON_PATCH)
            .body(serde_json::to_vec(&document)?);

        self.send(request).await.map(|_| ())
    }
}
