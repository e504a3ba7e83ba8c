//! Session persistence.
//!
//! The client never holds the session in a global; it reads and writes it
//! through a [`SessionStore`] handed to it at construction. The file-backed
//! store keeps the session in `<base>/session.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rxdesk_types::Session;

use crate::api::{ApiError, ApiResult};
use crate::config::paths;

/// Durable home of the current session.
///
/// Implementations must make `save` all-or-nothing: a reader sees either the
/// previous session, the new one, or none, never a partial document.
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, if any.
    ///
    /// # Errors
    /// Returns a storage error if the backing medium cannot be read.
    fn load(&self) -> ApiResult<Option<Session>>;

    /// Replaces the stored session.
    ///
    /// # Errors
    /// Returns a storage error if the session cannot be written.
    fn save(&self, session: &Session) -> ApiResult<()>;

    /// Removes the stored session. Returns whether one existed.
    ///
    /// # Errors
    /// Returns a storage error if the session cannot be removed.
    fn clear(&self) -> ApiResult<bool>;
}

/// Session store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$RXDESK_HOME/session.json`.
    pub fn default_location() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ApiResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            ApiError::storage(format!(
                "Failed to read session from {}",
                self.path.display()
            ))
            .with_details(e.to_string())
        })?;

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // Only an outside edit can produce this; the store never
                // writes a partial document. Treat it as logged out.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable session file"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> ApiResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| {
            ApiError::storage(format!("Failed to create directory {}", dir.display()))
                .with_details(e.to_string())
        })?;

        let contents = serde_json::to_string_pretty(session).map_err(|e| {
            ApiError::storage("Failed to serialize session").with_details(e.to_string())
        })?;

        // NamedTempFile is created 0600 on unix; the rename makes the write
        // atomic.
        let write_err = |e: std::io::Error| {
            ApiError::storage(format!(
                "Failed to write session to {}",
                self.path.display()
            ))
            .with_details(e.to_string())
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        Ok(())
    }

    fn clear(&self) -> ApiResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ApiError::storage(format!(
                "Failed to remove session at {}",
                self.path.display()
            ))
            .with_details(e.to_string())),
        }
    }
}

/// In-process session store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> ApiResult<std::sync::MutexGuard<'_, Option<Session>>> {
        self.session
            .lock()
            .map_err(|_poisoned| ApiError::storage("Session store lock poisoned"))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ApiResult<Option<Session>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, session: &Session) -> ApiResult<()> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ApiResult<bool> {
        Ok(self.slot()?.take().is_some())
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    match token.get(..8) {
        Some(prefix) if token.len() > 16 => format!("{prefix}..."),
        _ => "***".to_string(),
    }
}
