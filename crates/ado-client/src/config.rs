//! Connection settings for Azure DevOps.
//!
//! Settings come from environment-style key lookups. The three required
//! values (organization, project, personal access token) are validated
//! eagerly so a misconfigured client never reaches the network.

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the organization name.
pub const ENV_ORGANIZATION: &str = "ADO_ORGANIZATION";
/// Environment variable holding the project name.
pub const ENV_PROJECT: &str = "ADO_PROJECT";
/// Environment variable holding the personal access token.
pub const ENV_PAT: &str = "ADO_PAT";
/// Optional override for the service root.
pub const ENV_BASE_URL: &str = "ADO_BASE_URL";
/// Optional override for the REST API version.
pub const ENV_API_VERSION: &str = "ADO_API_VERSION";
/// Optional request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ADO_TIMEOUT_SECS";

/// Default service root for Azure DevOps Services.
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "7.1";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings needed to reach one Azure DevOps project.
#[derive(Clone, PartialEq, Eq)]
pub struct AdoConfig {
    /// Organization name (the first path segment after the service root).
    pub organization: String,
    /// Project name or id.
    pub project: String,
    /// Personal access token used for basic authentication.
    pub personal_access_token: String,
    /// Service root, without a trailing slash.
    pub base_url: String,
    /// REST API version sent with every request.
    pub api_version: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl AdoConfig {
    /// Create a config with default base URL, API version and timeout.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if any value is empty.
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        personal_access_token: impl Into<String>,
    ) -> Result<Self> {
        let organization = organization.into();
        let project = project.into();
        let personal_access_token = personal_access_token.into();

        let missing: Vec<&str> = [
            (ENV_ORGANIZATION, &organization),
            (ENV_PROJECT, &project),
            (ENV_PAT, &personal_access_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(missing_variables(&missing));
        }

        Ok(Self {
            organization: organization.trim().to_string(),
            project: project.trim().to_string(),
            personal_access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Load the config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if a required variable is unset or
    /// blank, or if the timeout is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AdoConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).unwrap_or_default();
        let mut config = Self::new(value(ENV_ORGANIZATION), value(ENV_PROJECT), value(ENV_PAT))?;

        if let Some(base_url) = non_blank(lookup(ENV_BASE_URL)) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_version) = non_blank(lookup(ENV_API_VERSION)) {
            config.api_version = api_version;
        }
        if let Some(raw) = non_blank(lookup(ENV_TIMEOUT_SECS)) {
            config.request_timeout = parse_timeout(&raw)?;
        }

        Ok(config)
    }

    /// The organization root, e.g. `https://dev.azure.com/contoso`.
    #[must_use]
    pub fn organization_url(&self) -> String {
        format!("{}/{}", self.base_url, self.organization)
    }
}

impl fmt::Debug for AdoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdoConfig")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("personal_access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::Configuration(format!(
            "Invalid {ENV_TIMEOUT_SECS}: '{raw}'. Expected a positive number of seconds"
        ))),
    }
}

fn missing_variables(names: &[&str]) -> Error {
    Error::Configuration(format!(
        "Missing required environment variables: {}",
        names.join(", ")
    ))
}
