//! Authorization-code exchange per provider
//!
//! Each exchanger turns a redirect's authorization code into an
//! [`OAuthCredential`]: one POST to the provider's token endpoint, then an
//! identity lookup so the credential carries the provider-assigned user id
//! and display name. A rejected or expired code surfaces as an error the
//! caller treats as a failed authorization attempt, never as a crash.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::constants::{
    STREAMLABS_TOKEN_ENDPOINT, STREAMLABS_USER_ENDPOINT, TWITCH_TOKEN_ENDPOINT,
    TWITCH_USERS_ENDPOINT,
};
use crate::credential::OAuthCredential;
use crate::error::{Error, Result};
use crate::secret::Secret;

/// Abstraction over a provider's code → credential exchange.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn CredentialExchanger>` is shared across callback routes).
pub trait CredentialExchanger: Send + Sync {
    /// Identifier for logging (e.g. "twitch", "streamlabs")
    fn provider_id(&self) -> &str;

    /// Exchange an authorization code for a credential.
    fn exchange<'a>(
        &'a self,
        code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<OAuthCredential>> + Send + 'a>>;
}

/// Token endpoint response shared by both providers.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// POST an authorization-code grant to `endpoint` and parse the token body.
async fn request_token(
    client: &reqwest::Client,
    endpoint: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = client
        .post(endpoint)
        .form(form)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Exchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::InvalidResponse(format!("invalid token response: {e}")))
}

// ---------------------------------------------------------------------------
// Twitch

#[derive(Debug, Deserialize)]
struct HelixUsersResponse {
    data: Vec<HelixUser>,
}

#[derive(Debug, Deserialize)]
struct HelixUser {
    id: String,
    display_name: String,
}

/// Exchanges Twitch authorization codes and resolves the authorized user
/// via the Helix users endpoint.
pub struct TwitchExchanger {
    client: reqwest::Client,
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    token_endpoint: String,
    users_endpoint: String,
}

impl TwitchExchanger {
    pub fn new(
        client: reqwest::Client,
        client_id: String,
        client_secret: Secret<String>,
        redirect_uri: String,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            redirect_uri,
            token_endpoint: TWITCH_TOKEN_ENDPOINT.into(),
            users_endpoint: TWITCH_USERS_ENDPOINT.into(),
        }
    }

    /// Override the provider endpoints (tests run against local mock servers).
    pub fn with_endpoints(
        mut self,
        token_endpoint: impl Into<String>,
        users_endpoint: impl Into<String>,
    ) -> Self {
        self.token_endpoint = token_endpoint.into();
        self.users_endpoint = users_endpoint.into();
        self
    }

    async fn exchange_inner(&self, code: &str) -> Result<OAuthCredential> {
        let token = request_token(
            &self.client,
            &self.token_endpoint,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose().as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await?;

        let response = self
            .client
            .get(&self.users_endpoint)
            .bearer_auth(&token.access_token)
            .header("Client-Id", &self.client_id)
            .send()
            .await
            .map_err(|e| Error::Http(format!("user lookup request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Exchange(format!(
                "users endpoint returned {status}: {body}"
            )));
        }

        let users: HelixUsersResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid users response: {e}")))?;
        let user = users
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("users endpoint returned no entries".into()))?;
        let user_id = user
            .id
            .parse::<u64>()
            .map_err(|_| Error::InvalidResponse(format!("non-numeric user id: {}", user.id)))?;

        let mut credential = OAuthCredential::new(user_id, user.display_name, token.access_token);
        credential.refresh_token = token.refresh_token;
        Ok(credential)
    }
}

impl CredentialExchanger for TwitchExchanger {
    fn provider_id(&self) -> &str {
        "twitch"
    }

    fn exchange<'a>(
        &'a self,
        code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<OAuthCredential>> + Send + 'a>> {
        Box::pin(self.exchange_inner(code))
    }
}

// ---------------------------------------------------------------------------
// Streamlabs

#[derive(Debug, Deserialize)]
struct StreamlabsUserResponse {
    streamlabs: StreamlabsProfile,
}

#[derive(Debug, Deserialize)]
struct StreamlabsProfile {
    id: u64,
    display_name: String,
}

/// Exchanges Streamlabs authorization codes and resolves the authorized
/// user via the Streamlabs user endpoint.
pub struct StreamlabsExchanger {
    client: reqwest::Client,
    client_id: String,
    client_secret: Secret<String>,
    redirect_uri: String,
    token_endpoint: String,
    user_endpoint: String,
}

impl StreamlabsExchanger {
    pub fn new(
        client: reqwest::Client,
        client_id: String,
        client_secret: Secret<String>,
        redirect_uri: String,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            redirect_uri,
            token_endpoint: STREAMLABS_TOKEN_ENDPOINT.into(),
            user_endpoint: STREAMLABS_USER_ENDPOINT.into(),
        }
    }

    /// Override the provider endpoints (tests run against local mock servers).
    pub fn with_endpoints(
        mut self,
        token_endpoint: impl Into<String>,
        user_endpoint: impl Into<String>,
    ) -> Self {
        self.token_endpoint = token_endpoint.into();
        self.user_endpoint = user_endpoint.into();
        self
    }

    async fn exchange_inner(&self, code: &str) -> Result<OAuthCredential> {
        let token = request_token(
            &self.client,
            &self.token_endpoint,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose().as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await?;

        let response = self
            .client
            .get(&self.user_endpoint)
            .query(&[("access_token", token.access_token.as_str())])
            .send()
            .await
            .map_err(|e| Error::Http(format!("user lookup request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Exchange(format!(
                "user endpoint returned {status}: {body}"
            )));
        }

        let user: StreamlabsUserResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("invalid user response: {e}")))?;

        let mut credential = OAuthCredential::new(
            user.streamlabs.id,
            user.streamlabs.display_name,
            token.access_token,
        );
        credential.refresh_token = token.refresh_token;
        Ok(credential)
    }
}

impl CredentialExchanger for StreamlabsExchanger {
    fn provider_id(&self) -> &str {
        "streamlabs"
    }

    fn exchange<'a>(
        &'a self,
        code: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<OAuthCredential>> + Send + 'a>> {
        Box::pin(self.exchange_inner(code))
    }
}
