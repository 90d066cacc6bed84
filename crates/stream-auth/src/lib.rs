//! Provider credential library for local OAuth redirect capture
//!
//! Covers everything that is provider-specific about completing an OAuth2
//! authorization-code flow for the supported streaming services (Twitch and
//! Streamlabs): building the browser authorization URL, exchanging the
//! returned code for a credential, and filing credentials in a store. The
//! redirect listener itself lives in the `redirect-capture` service; this
//! crate has no dependency on it and can be tested independently.
//!
//! Credential flow:
//! 1. Host process builds `authorize::twitch_authorization_url()` (or the
//!    Streamlabs equivalent) and shows it to the user
//! 2. The browser redirect delivers an authorization code
//! 3. The listener calls `CredentialExchanger::exchange()` with the code
//! 4. The resulting `OAuthCredential` is filed via `CredentialStore::put()`

pub mod authorize;
pub mod constants;
pub mod credential;
pub mod error;
pub mod exchange;
pub mod secret;
pub mod store;

pub use constants::*;
pub use credential::OAuthCredential;
pub use error::{Error, Result};
pub use exchange::{CredentialExchanger, StreamlabsExchanger, TwitchExchanger};
pub use secret::Secret;
pub use store::CredentialStore;
