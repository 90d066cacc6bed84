//! Ephemeral redirect listener lifecycle
//!
//! Owns the loopback HTTP listener that catches one browser redirect per
//! authorization attempt. The listener is armed on demand, torn down by the
//! first callback to complete, and in any case by the expiry timer, so an
//! unattended process never keeps the port reachable indefinitely.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use stream_auth::constants::{STREAMLABS_REDIRECT_PATH, TWITCH_REDIRECT_PATH};
use stream_auth::exchange::CredentialExchanger;
use stream_auth::store::CredentialStore;

use crate::error::{Error, Result};
use crate::handler::handle_callback;
use crate::parse::RedirectQuery;

/// How long an armed listener waits for a redirect before tearing itself down.
pub const LISTENER_EXPIRY: Duration = Duration::from_secs(360);

/// Informational banner for the root route and unregistered paths.
const BANNER: &str = "Local OAuth Listener ...";

/// Listener lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Running,
}

/// Shared stop flag for one armed listener.
///
/// `send_replace` is the compare-and-swap: exactly one of any set of
/// concurrent `stop` calls observes the false→true transition and with it
/// triggers the graceful shutdown; the rest observe `Stopped` and no-op.
#[derive(Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Request a stop. Returns true if this call performed the transition.
    pub fn stop(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until a stop has been requested.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Collaborators the callback routes need.
#[derive(Clone)]
pub struct CallbackDeps {
    pub twitch: Arc<dyn CredentialExchanger>,
    pub streamlabs: Arc<dyn CredentialExchanger>,
    pub store: Arc<CredentialStore>,
}

/// Shared router state: collaborators plus the current arming's stop flag.
#[derive(Clone)]
struct AppState {
    deps: CallbackDeps,
    stop: StopHandle,
}

/// One armed listener: stop flag, bound address, server and expiry tasks.
struct ActiveListener {
    stop: StopHandle,
    local_addr: SocketAddr,
    serve: JoinHandle<()>,
    expiry: JoinHandle<()>,
}

/// Lifecycle owner for the loopback redirect listener.
pub struct RedirectListener {
    port: u16,
    expiry: Duration,
    deps: CallbackDeps,
    active: Mutex<Option<ActiveListener>>,
}

impl RedirectListener {
    pub fn new(port: u16, deps: CallbackDeps) -> Self {
        Self {
            port,
            expiry: LISTENER_EXPIRY,
            deps,
            active: Mutex::new(None),
        }
    }

    /// Shorten the expiry window (tests).
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Base address providers redirect back to.
    pub fn server_base_address(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Arm the listener for one authorization attempt.
    ///
    /// No-op when already running. Otherwise binds the loopback port,
    /// installs the route table, and arms the one-shot expiry timer. A bind
    /// failure is reported to the caller; the process carries on.
    pub async fn request_permission(&self) -> Result<()> {
        let mut active = self.active.lock().await;

        if let Some(current) = active.take() {
            if !current.stop.is_stopped() {
                *active = Some(current);
                return Ok(());
            }
            // Previous arming has stopped; let its server finish releasing
            // the port before rebinding.
            current.expiry.abort();
            let _ = current.serve.await;
        }

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| Error::ListenerStart {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
        let local_addr = listener.local_addr().map_err(|e| Error::ListenerStart {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;

        let stop = StopHandle::new();
        let app = build_router(AppState {
            deps: self.deps.clone(),
            stop: stop.clone(),
        });

        let serve = tokio::spawn({
            let stop = stop.clone();
            async move {
                let shutdown = {
                    let stop = stop.clone();
                    async move { stop.stopped().await }
                };
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    warn!(error = %e, "redirect listener terminated with error");
                }
                // Server exit on the error path must leave the flag consistent.
                stop.stop();
                debug!("redirect listener closed");
            }
        });

        let expiry = tokio::spawn({
            let stop = stop.clone();
            let window = self.expiry;
            async move {
                tokio::time::sleep(window).await;
                if stop.stop() {
                    info!(
                        window_secs = window.as_secs(),
                        "authorization window expired, stopping listener"
                    );
                }
            }
        });

        info!(addr = %local_addr, "redirect listener armed");
        *active = Some(ActiveListener {
            stop,
            local_addr,
            serve,
            expiry,
        });
        Ok(())
    }

    /// Tear the listener down. No-op when already stopped.
    pub async fn stop(&self) {
        let active = self.active.lock().await;
        if let Some(active) = active.as_ref() {
            if active.stop.stop() {
                info!("redirect listener stop requested");
            }
        }
    }

    pub async fn state(&self) -> ListenerState {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(active) if !active.stop.is_stopped() => ListenerState::Running,
            _ => ListenerState::Stopped,
        }
    }

    /// Address the current arming is bound to (None when stopped).
    pub async fn bound_addr(&self) -> Option<SocketAddr> {
        let active = self.active.lock().await;
        active
            .as_ref()
            .filter(|a| !a.stop.is_stopped())
            .map(|a| a.local_addr)
    }

    /// Wait until the current arming has stopped (immediately if none).
    pub async fn closed(&self) {
        let stop = {
            let active = self.active.lock().await;
            match active.as_ref() {
                Some(active) => active.stop.clone(),
                None => return,
            }
        };
        stop.stopped().await;
    }
}

/// Build the redirect route table: info banner at the root, one redirect
/// route per provider, banner fallback for anything else. Exact-path match
/// only; an unregistered path performs no authorization side effects.
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route(TWITCH_REDIRECT_PATH, get(twitch_callback))
        .route(STREAMLABS_REDIRECT_PATH, get(streamlabs_callback))
        .fallback(banner)
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

async fn twitch_callback(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
) -> Html<String> {
    handle_callback(
        state.deps.twitch.as_ref(),
        &state.deps.store,
        &state.stop,
        query,
    )
    .await
}

async fn streamlabs_callback(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
) -> Html<String> {
    handle_callback(
        state.deps.streamlabs.as_ref(),
        &state.deps.store,
        &state.stop,
        query,
    )
    .await
}
