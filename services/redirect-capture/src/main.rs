//! Local OAuth redirect capture
//!
//! Bridges a browser-driven OAuth2 consent flow into a headless process:
//! 1. Arms a loopback HTTP listener on the configured port
//! 2. Logs the per-provider authorization URLs for the user to open
//! 3. Catches the provider redirect, exchanges the code for a credential,
//!    and files it in the credential store
//! 4. Tears the listener down after the callback, after the expiry timer,
//!    or on a shutdown signal, whichever happens first

mod config;
mod error;
mod handler;
mod keys;
mod listener;
mod parse;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stream_auth::authorize;
use stream_auth::constants::{
    CHANNEL_KEY_SENTINEL, STREAMLABS_DEFAULT_SCOPES, STREAMLABS_REDIRECT_PATH,
    TWITCH_DEFAULT_SCOPES, TWITCH_REDIRECT_PATH,
};
use stream_auth::exchange::{StreamlabsExchanger, TwitchExchanger};
use stream_auth::store::CredentialStore;

use crate::config::Config;
use crate::listener::{CallbackDeps, RedirectListener};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting stream-oauth redirect capture");

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let twitch_secret = config.twitch.client_secret.clone().context(
        "twitch client secret missing — set TWITCH_CLIENT_SECRET or twitch.client_secret_file",
    )?;
    let streamlabs_secret = config.streamlabs.client_secret.clone().context(
        "streamlabs client secret missing — set STREAMLABS_CLIENT_SECRET or streamlabs.client_secret_file",
    )?;

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", config.listener.port);
    let twitch_redirect = format!("{base}{TWITCH_REDIRECT_PATH}");
    let streamlabs_redirect = format!("{base}{STREAMLABS_REDIRECT_PATH}");

    let store = Arc::new(CredentialStore::new());
    let deps = CallbackDeps {
        twitch: Arc::new(TwitchExchanger::new(
            client.clone(),
            config.twitch.client_id.clone(),
            twitch_secret,
            twitch_redirect.clone(),
        )),
        streamlabs: Arc::new(StreamlabsExchanger::new(
            client,
            config.streamlabs.client_id.clone(),
            streamlabs_secret,
            streamlabs_redirect.clone(),
        )),
        store: store.clone(),
    };

    let capture = RedirectListener::new(config.listener.port, deps);
    capture.request_permission().await?;
    if let Some(addr) = capture.bound_addr().await {
        info!(%addr, base = %capture.server_base_address(), "waiting for provider redirect");
    }

    info!(
        url = %authorize::twitch_authorization_url(
            &config.twitch.client_id,
            &twitch_redirect,
            TWITCH_DEFAULT_SCOPES,
            CHANNEL_KEY_SENTINEL,
        ),
        "authorize Twitch by opening this URL"
    );
    info!(
        url = %authorize::streamlabs_authorization_url(
            &config.streamlabs.client_id,
            &streamlabs_redirect,
            STREAMLABS_DEFAULT_SCOPES,
            CHANNEL_KEY_SENTINEL,
        ),
        "authorize Streamlabs by opening this URL"
    );

    tokio::select! {
        _ = capture.closed() => info!("redirect listener closed"),
        _ = shutdown_signal() => capture.stop().await,
    }
    capture.closed().await;

    let final_state = capture.state().await;
    let captured = store.len().await;
    info!(state = ?final_state, credentials = captured, "capture finished");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
