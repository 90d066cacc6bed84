//! Storage-key resolution
//!
//! Decides which key a captured credential is filed under. A non-empty
//! `state` lets scripted flows pre-assign a logical name (e.g. a named bot
//! account); the `CHANNEL` sentinel, or no state at all, files the
//! credential under its own user id. Exactly one of the two sources wins.

use stream_auth::OAuthCredential;
use stream_auth::constants::CHANNEL_KEY_SENTINEL;

pub fn resolve_storage_key(state: &str, credential: &OAuthCredential) -> String {
    if !state.is_empty() && state != CHANNEL_KEY_SENTINEL {
        state.to_owned()
    } else {
        credential.user_id.to_string()
    }
}
