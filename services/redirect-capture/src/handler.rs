//! Provider callback handling
//!
//! One flow serves every provider: parse the redirect, exchange the code,
//! union the granted scopes into the credential, resolve the storage key,
//! file the credential, and render the outcome. The listener stop is
//! requested after the response body is built; graceful shutdown drains the
//! in-flight response, so the stop never truncates it.

use axum::response::Html;
use tracing::{info, warn};

use stream_auth::exchange::CredentialExchanger;
use stream_auth::store::CredentialStore;

use crate::keys::resolve_storage_key;
use crate::listener::StopHandle;
use crate::parse::{self, RedirectQuery};

/// Body rendered for any failed authorization attempt.
pub const AUTH_FAILED_BODY: &str = "Authentication failed!";

/// Handle one provider redirect, then request the listener stop.
///
/// Every path through this function reaches the stop request; a failed
/// parse or exchange still tears the listener down.
pub async fn handle_callback(
    exchanger: &dyn CredentialExchanger,
    store: &CredentialStore,
    stop: &StopHandle,
    query: RedirectQuery,
) -> Html<String> {
    let body = run_callback(exchanger, store, &query).await;
    stop.stop();
    Html(body)
}

async fn run_callback(
    exchanger: &dyn CredentialExchanger,
    store: &CredentialStore,
    query: &RedirectQuery,
) -> String {
    let provider = exchanger.provider_id();

    let parsed = match parse::parse(query) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(provider, error = %e, "rejecting malformed redirect");
            return AUTH_FAILED_BODY.to_owned();
        }
    };

    let mut credential = match exchanger.exchange(&parsed.code).await {
        Ok(credential) => credential,
        Err(e) => {
            warn!(provider, error = %e, "code exchange failed");
            return AUTH_FAILED_BODY.to_owned();
        }
    };

    credential.add_scopes(parsed.scopes);

    let key = resolve_storage_key(&parsed.state, &credential);
    let display_name = credential.display_name.clone();
    store.put(key.clone(), credential).await;
    info!(provider, key, display_name, "credential stored");

    format!("Welcome {display_name}!")
}
