//! Loading `ADO_*` settings from env files.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load variables from `path`, or from a `.env` file found in the current
/// directory or its parents when `path` is `None`.
///
/// Variables already present in the process environment are never
/// overridden. A missing `.env` is fine; a missing explicit file is not.
///
/// Returns the file that was loaded, if any.
///
/// # Errors
///
/// Returns an error if an explicitly requested file cannot be read or
/// parsed.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    if let Some(path) = path {
        dotenvy::from_path(path)?;
        debug!(path = %path.display(), "Loaded environment file");
        return Ok(Some(path.to_path_buf()));
    }

    match dotenvy::dotenv() {
        Ok(found) => {
            debug!(path = %found.display(), "Loaded environment file");
            Ok(Some(found))
        }
        Err(e) if e.not_found() => Ok(None),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable .env file");
            Ok(None)
        }
    }
}
