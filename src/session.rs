//! Session storage
//!
//! The bearer token and username live in durable storage. They are written by
//! the external login step, read at startup, and cleared on logout or a 401.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Authenticated dashboard session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }

    /// Name shown in the header chip
    pub fn display_name(&self) -> &str {
        if self.username.trim().is_empty() {
            "Trader"
        } else {
            &self.username
        }
    }
}

/// Read/clear contract over wherever the session is persisted
pub trait SessionStore: Send + Sync {
    /// Current session, or `None` when logged out
    fn get(&self) -> Option<Session>;

    /// Persist a session obtained from the login boundary
    fn save(&self, session: &Session) -> Result<()>;

    /// Forget the session
    fn clear(&self) -> Result<()>;
}

/// JSON file backed store
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read session file: {e}");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.token.is_empty() => Some(session),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring corrupt session file: {e}");
                None
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if session.token.trim().is_empty() {
            return Err(DashboardError::Session("token must not be empty".into()));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used when embedding the controller and in tests
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sentinel-{name}-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let store = FileSessionStore::new(temp_path("roundtrip"));
        assert!(store.get().is_none());

        store.save(&Session::new("tok-1", "asha")).unwrap();
        assert_eq!(store.get(), Some(Session::new("tok-1", "asha")));

        store.clear().unwrap();
        assert!(store.get().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_corrupt_reads_absent() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(&path);
        assert!(store.get().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_empty_token_rejected() {
        let store = FileSessionStore::new(temp_path("empty"));
        assert!(store.save(&Session::new("  ", "x")).is_err());
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(Session::new("t", "").display_name(), "Trader");
        assert_eq!(Session::new("t", "ravi").display_name(), "ravi");
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new(Some(Session::new("t", "u")));
        assert!(store.get().is_some());
        store.clear().unwrap();
        assert!(store.get().is_none());
    }
}
