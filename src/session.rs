//! Authenticated session, passed explicitly to every request-issuing call

use crate::api::models::{AuthPayload, User};
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identity and tokens of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn bearer(&self) -> &str {
        &self.access_token
    }
}

impl From<AuthPayload> for Session {
    fn from(auth: AuthPayload) -> Self {
        Self {
            user: auth.user,
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
        }
    }
}

/// Keeps the last session on disk between runs
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory, if one can be determined
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("io", "taskdeck", "taskdeck")
            .map(|dirs| Self::at(dirs.data_dir().join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session; `None` when nothing was saved
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        debug!(user = %session.user.id, "Restored session");
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Forget the saved session; a missing file is not an error
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_store() -> SessionStore {
        let dir = std::env::temp_dir().join(format!("taskdeck-test-{}", uuid::Uuid::new_v4()));
        SessionStore::at(dir.join("session.json"))
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store();
        let session = fixtures::session();
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));
        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_without_file() {
        assert!(temp_store().clear().is_ok());
    }

    #[test]
    fn test_from_auth_payload() {
        let auth = AuthPayload {
            user: fixtures::user(),
            access_token: "a".to_string(),
            refresh_token: None,
        };
        let session = Session::from(auth);
        assert_eq!(session.user_id(), "u1");
        assert_eq!(session.bearer(), "a");
    }

    #[test]
    fn test_default_location_does_not_panic() {
        let _store = SessionStore::default_location();
    }
}
