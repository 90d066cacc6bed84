//! Provider endpoint and listener constants
//!
//! Public OAuth client configuration for the supported providers. None of
//! these values are secrets; client secrets are resolved by the service
//! configuration and wrapped in [`crate::Secret`].

/// Twitch authorization endpoint (browser consent page)
pub const TWITCH_AUTHORIZE_ENDPOINT: &str = "https://id.twitch.tv/oauth2/authorize";

/// Twitch token endpoint for authorization-code exchange
pub const TWITCH_TOKEN_ENDPOINT: &str = "https://id.twitch.tv/oauth2/token";

/// Twitch Helix users endpoint, used to resolve the authorized identity
pub const TWITCH_USERS_ENDPOINT: &str = "https://api.twitch.tv/helix/users";

/// Streamlabs authorization endpoint (browser consent page)
pub const STREAMLABS_AUTHORIZE_ENDPOINT: &str = "https://streamlabs.com/api/v1.0/authorize";

/// Streamlabs token endpoint for authorization-code exchange
pub const STREAMLABS_TOKEN_ENDPOINT: &str = "https://streamlabs.com/api/v1.0/token";

/// Streamlabs user endpoint, used to resolve the authorized identity
pub const STREAMLABS_USER_ENDPOINT: &str = "https://streamlabs.com/api/v1.0/user";

/// Well-known loopback redirect path for Twitch callbacks
pub const TWITCH_REDIRECT_PATH: &str = "/oauth/twitch";

/// Well-known loopback redirect path for Streamlabs callbacks
pub const STREAMLABS_REDIRECT_PATH: &str = "/oauth/streamlabs";

/// Default port for the loopback redirect listener.
///
/// Providers require the redirect URI to exactly match one registered in
/// the app settings, so the port must be predictable.
pub const DEFAULT_LOCAL_PORT: u16 = 7090;

/// Reserved `state` value meaning "file the credential under its own user
/// id" rather than a caller-supplied key.
pub const CHANNEL_KEY_SENTINEL: &str = "CHANNEL";

/// Scopes requested from Twitch when the host process initiates a flow
pub const TWITCH_DEFAULT_SCOPES: &str = "user:read:email chat:read chat:edit";

/// Scopes requested from Streamlabs when the host process initiates a flow
pub const STREAMLABS_DEFAULT_SCOPES: &str = "donations.read alerts.create";
