//! Credential model produced by a provider exchange

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A credential obtained by exchanging an authorization code.
///
/// `user_id` is the provider-assigned numeric identity of the authorizing
/// account; `scopes` is a set, so re-granting a scope never duplicates it.
/// Until the credential is filed in a store it is owned exclusively by the
/// callback that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthCredential {
    pub user_id: u64,
    pub display_name: String,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl OAuthCredential {
    pub fn new(user_id: u64, display_name: String, access_token: String) -> Self {
        Self {
            user_id,
            display_name,
            scopes: BTreeSet::new(),
            access_token,
            refresh_token: None,
        }
    }

    /// Union `scopes` into the granted set. Re-adding an existing scope is
    /// a no-op.
    pub fn add_scopes<I>(&mut self, scopes: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.scopes.extend(scopes);
    }
}
