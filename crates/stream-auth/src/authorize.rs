//! Authorization URL construction
//!
//! Builds the browser URLs a user visits to grant access. The `state`
//! parameter rides through the provider unchanged; scripted flows set it to
//! a custom value to pre-assign the storage key, interactive flows pass the
//! `CHANNEL` sentinel.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

use crate::constants::{STREAMLABS_AUTHORIZE_ENDPOINT, TWITCH_AUTHORIZE_ENDPOINT};

/// Generate a random state token for flows that pre-assign a storage key.
///
/// 24 random bytes encoded as URL-safe base64 (no padding); opaque to the
/// provider, returned verbatim in the redirect.
pub fn generate_state_token() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the Twitch authorization URL.
pub fn twitch_authorization_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    state: &str,
) -> String {
    authorization_url(TWITCH_AUTHORIZE_ENDPOINT, client_id, redirect_uri, scopes, state)
}

/// Build the Streamlabs authorization URL.
pub fn streamlabs_authorization_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    state: &str,
) -> String {
    authorization_url(
        STREAMLABS_AUTHORIZE_ENDPOINT,
        client_id,
        redirect_uri,
        scopes,
        state,
    )
}

fn authorization_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    state: &str,
) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        endpoint,
        client_id,
        urlencoded(redirect_uri),
        urlencoded(scopes),
        state,
    )
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that would break URL parameter parsing.
fn urlencoded(s: &str) -> String {
    s.replace(' ', "%20").replace(':', "%3A").replace('/', "%2F")
}
