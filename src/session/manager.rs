//! Persisted "who is signed in" marker.
//!
//! A small JSON file in the data directory records the last granted login
//! so later invocations can tell whether someone is signed in. It carries
//! no secret and is not a bearer token.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub logged_in_at: Option<DateTime<Utc>>,
}

pub struct SessionManager {
    path: PathBuf,
}

impl SessionManager {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn save_session(&self, user_id: i64, email: &str) -> Result<()> {
        let state = SessionState {
            is_logged_in: true,
            user_id: Some(user_id),
            user_email: Some(email.to_string()),
            logged_in_at: Some(Utc::now()),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create session dir: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&state)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session: {}", self.path.display()))?;
        Ok(())
    }

    /// Current state. A missing or unreadable file counts as signed out.
    pub fn load(&self) -> SessionState {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return SessionState::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt session file: {e}");
            SessionState::default()
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.load().is_logged_in
    }

    pub fn user_id(&self) -> Option<i64> {
        let state = self.load();
        if state.is_logged_in {
            state.user_id
        } else {
            None
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to clear session: {}", self.path.display())),
        }
    }
}
