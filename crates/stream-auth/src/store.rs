//! In-memory credential store
//!
//! Maps storage keys to captured credentials. A tokio Mutex serializes
//! access; reads clone the stored value out so callers never hold the lock
//! across await points. Same-key `put` is last-write-wins, so a doubled
//! browser callback cannot corrupt state.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use crate::credential::OAuthCredential;

/// Thread-safe key → credential map.
#[derive(Default)]
pub struct CredentialStore {
    state: Mutex<HashMap<String, OAuthCredential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the credential filed under `key`.
    pub async fn put(&self, key: String, credential: OAuthCredential) {
        let mut state = self.state.lock().await;
        state.insert(key.clone(), credential);
        debug!(key, "stored credential");
    }

    /// Get a clone of the credential filed under `key`.
    pub async fn get(&self, key: &str) -> Option<OAuthCredential> {
        let state = self.state.lock().await;
        state.get(key).cloned()
    }

    /// List all storage keys.
    pub async fn keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.keys().cloned().collect()
    }

    /// Number of stored credentials.
    pub async fn len(&self) -> usize {
        let state = self.state.lock().await;
        state.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
