//! Session persistence over a [`KeyValueStore`].
//!
//! The active session is one JSON blob under one key. Completed sessions are
//! appended to a bounded JSON array under a second key.

use deepdive_core::config::StorageConfig;
use deepdive_core::error::{DeepDiveError, Result};
use deepdive_core::session::{DeepDiveSession, SESSION_FORMAT_VERSION};
use deepdive_core::store::KeyValueStore;
use std::sync::Arc;

/// Loads, saves and archives Deep Dive sessions.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    active_key: String,
    history_key: String,
    history_limit: usize,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            active_key: config.active_session_key.clone(),
            history_key: config.history_key.clone(),
            history_limit: config.history_limit,
        }
    }

    pub fn active_key(&self) -> &str {
        &self.active_key
    }

    /// Reads the active session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))`: a usable session is stored
    /// - `Ok(None)`: nothing stored
    /// - `Err(_)`: the store failed, or the stored value is unreadable
    pub async fn try_load_active(&self) -> Result<Option<DeepDiveSession>> {
        match self.store.get(&self.active_key).await? {
            Some(raw) => parse_session(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the active session, treating every failure as "no session".
    pub async fn load_active(&self) -> Option<DeepDiveSession> {
        match self.try_load_active().await {
            Ok(session) => session,
            Err(err) if err.is_unreadable() => {
                tracing::warn!("Ignoring unreadable session under '{}': {}", self.active_key, err);
                None
            }
            Err(err) => {
                tracing::error!("Failed to load session from '{}': {}", self.active_key, err);
                None
            }
        }
    }

    /// Overwrites the active slot with `session`.
    pub async fn save_active(&self, session: &DeepDiveSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.store.set(&self.active_key, &json).await?;
        tracing::debug!(session_id = %session.id, phase = %session.phase, "Saved active session");
        Ok(())
    }

    pub async fn clear_active(&self) -> Result<()> {
        self.store.remove(&self.active_key).await
    }

    /// Appends `session` to the history list, dropping the oldest beyond the limit.
    pub async fn archive(&self, session: &DeepDiveSession) -> Result<()> {
        let mut history = self.history().await;
        history.retain(|s| s.id != session.id);
        history.push(session.clone());
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }

        let json = serde_json::to_string(&history)?;
        self.store.set(&self.history_key, &json).await
    }

    /// Completed sessions, oldest first. Unreadable entries are skipped.
    pub async fn history(&self) -> Vec<DeepDiveSession> {
        let raw = match self.store.get(&self.history_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::error!("Failed to load session history: {}", err);
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("Ignoring unreadable session history: {}", err);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<DeepDiveSession>(entry) {
                Ok(session) if session.is_well_formed() => Some(session),
                Ok(session) => {
                    tracing::warn!("Skipping malformed archived session {}", session.id);
                    None
                }
                Err(err) => {
                    tracing::warn!("Skipping unreadable archived session: {}", err);
                    None
                }
            })
            .collect()
    }
}

fn parse_session(raw: &str) -> Result<DeepDiveSession> {
    let session: DeepDiveSession = serde_json::from_str(raw)?;
    if session.version != SESSION_FORMAT_VERSION {
        return Err(DeepDiveError::malformed(format!(
            "unsupported session version {} (expected {})",
            session.version, SESSION_FORMAT_VERSION
        )));
    }
    if !session.is_well_formed() {
        return Err(DeepDiveError::malformed(format!(
            "session {} violates structural invariants",
            session.id
        )));
    }
    Ok(session)
}
