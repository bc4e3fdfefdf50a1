//! Lazily constructed backend for the MCP server.
//!
//! The server starts without an Azure DevOps connection. The first tool
//! call builds one through a [`BackendFactory`]; every later call reuses it.
//! A failed construction leaves the slot empty, so the next call tries
//! again (for example after the operator fixes the environment).

use ado_client::{AdoClient, WorkItemBackend};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// The backend shared by every tool call.
pub type SharedBackend = Arc<dyn WorkItemBackend>;

/// Builds the backend on first use.
pub trait BackendFactory: Send + Sync {
    /// Construct a backend.
    ///
    /// # Errors
    ///
    /// Returns `ado_client::Error::Configuration` when credentials are
    /// missing, or any other error raised while setting up the client.
    fn create(&self) -> ado_client::Result<SharedBackend>;
}

impl<F> BackendFactory for F
where
    F: Fn() -> ado_client::Result<SharedBackend> + Send + Sync,
{
    fn create(&self) -> ado_client::Result<SharedBackend> {
        self()
    }
}

/// Factory reading `ADO_ORGANIZATION`, `ADO_PROJECT` and `ADO_PAT` from
/// the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvBackendFactory;

impl BackendFactory for EnvBackendFactory {
    fn create(&self) -> ado_client::Result<SharedBackend> {
        Ok(Arc::new(AdoClient::from_env()?))
    }
}

/// Owns the lazily created backend.
pub struct ClientContext {
    factory: Box<dyn BackendFactory>,
    backend: OnceCell<SharedBackend>,
}

impl ClientContext {
    /// Create a context that will build its backend with `factory`.
    pub fn new(factory: impl BackendFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            backend: OnceCell::new(),
        }
    }

    /// Create a context around an already constructed backend.
    #[must_use]
    pub fn with_backend(backend: SharedBackend) -> Self {
        Self {
            factory: Box::new(EnvBackendFactory),
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    /// Return the backend, constructing it if this is the first call or
    /// every earlier attempt failed.
    ///
    /// # Errors
    ///
    /// Returns the factory's error; nothing is cached in that case.
    pub async fn get_or_create(&self) -> ado_client::Result<SharedBackend> {
        self.backend
            .get_or_try_init(|| async {
                debug!("Constructing Azure DevOps backend");
                self.factory
                    .create()
                    .inspect(|_| info!("Azure DevOps backend ready"))
            })
            .await
            .cloned()
    }

    /// Whether a backend has been constructed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.backend.initialized()
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new(EnvBackendFactory)
    }
}
