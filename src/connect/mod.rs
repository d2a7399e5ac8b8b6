//! Connect-account handshake
//!
//! One attempt runs strictly in order: ask the backend for an authorization
//! URL, open it in a popup, poll until the popup closes, then ask the backend
//! for the credentials its OAuth callback stored. The host store is only ever
//! touched through a merge updater.

pub mod button;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use crate::backend::{Backend, Identity};
use crate::config::Config;
use crate::error::HandshakeError;
use crate::integration::{
    credentials_present, ConnectionStatus, IntegrationParams, IntegrationStore,
};
use crate::popup::{wait_for_close, PopupFeatures, PopupOpener};

pub use button::{ButtonColor, ButtonContent, ButtonView};

/// Blocking user notification (alert dialog, stderr, ...).
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Notifier for terminal hosts.
#[derive(Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

/// Which integration this controller connects and how the popup behaves.
#[derive(Debug, Clone)]
pub struct IntegrationProfile {
    /// Tag stored in integration params `type`
    pub integration_type: String,
    pub display_name: String,
    pub poll_interval: Duration,
    pub popup: PopupFeatures,
}

impl IntegrationProfile {
    pub fn hubspot() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for IntegrationProfile {
    fn from(config: &Config) -> Self {
        Self {
            integration_type: config.integration_type.clone(),
            display_name: config.display_name.clone(),
            poll_interval: config.poll_interval(),
            popup: config.popup.clone(),
        }
    }
}

/// Result of a `connect` call that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    /// Already connected or connecting; nothing was started
    Skipped,
    /// Credentials were fetched and merged into the host params
    Connected(Value),
    /// Popup closed but the backend has no credentials yet
    NotYetAuthorized,
}

#[derive(Debug, Default)]
struct State {
    connected: bool,
    connecting: bool,
}

impl State {
    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_flags(self.connected, self.connecting)
    }
}

/// Drives the connect handshake for one identity pair.
pub struct ConnectController {
    identity: Identity,
    profile: IntegrationProfile,
    backend: Arc<dyn Backend>,
    opener: Arc<dyn PopupOpener>,
    store: Arc<dyn IntegrationStore>,
    notifier: Arc<dyn Notifier>,
    // Never held across an await
    state: Mutex<State>,
    status_tx: watch::Sender<ConnectionStatus>,
}

impl ConnectController {
    /// Build a controller. Initial status comes from the store's current
    /// params; no network calls are made.
    pub fn new(
        identity: Identity,
        profile: IntegrationProfile,
        backend: Arc<dyn Backend>,
        opener: Arc<dyn PopupOpener>,
        store: Arc<dyn IntegrationStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let connected = store.current().is_connected_to(&profile.integration_type);
        let state = State {
            connected,
            connecting: false,
        };
        let (status_tx, _rx) = watch::channel(state.status());

        Self {
            identity,
            profile,
            backend,
            opener,
            store,
            notifier,
            state: Mutex::new(state),
            status_tx,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.with_state(|s| s.status())
    }

    pub fn is_connected(&self) -> bool {
        self.with_state(|s| s.connected)
    }

    pub fn is_connecting(&self) -> bool {
        self.with_state(|s| s.connecting)
    }

    /// Status changes, for rendering glue.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    pub fn button(&self) -> ButtonView {
        ButtonView::for_status(self.status(), &self.profile.display_name)
    }

    /// Run one connect attempt. A no-op while connected or connecting.
    pub async fn connect(&self) -> Result<ConnectOutcome, HandshakeError> {
        let started = self.with_state(|s| {
            if s.connected || s.connecting {
                return false;
            }
            s.connecting = true;
            true
        });
        if !started {
            tracing::debug!("{} connect ignored: {}", self.profile.display_name, self.status());
            return Ok(ConnectOutcome::Skipped);
        }

        tracing::info!(
            "Starting {} authorization (user={}, org={})",
            self.profile.display_name,
            self.identity.user,
            self.identity.org
        );

        let auth_url = match self.backend.authorize(&self.identity).await {
            Ok(url) => url,
            Err(e) => {
                self.with_state(|s| s.connecting = false);
                let err = HandshakeError::Authorize(e);
                self.surface(&err);
                return Err(err);
            }
        };
        if auth_url.is_empty() {
            tracing::warn!("Backend returned an empty authorization URL");
        }

        let title = format!("{} Authorization", self.profile.display_name);
        let popup = self.opener.open(&auth_url, &title, &self.profile.popup);
        wait_for_close(popup.as_ref(), self.profile.poll_interval).await;
        drop(popup);

        self.reconcile_credentials().await
    }

    /// Turn popup closure into a definitive outcome. Clears `connecting` on
    /// every path, after the backend call has settled.
    async fn reconcile_credentials(&self) -> Result<ConnectOutcome, HandshakeError> {
        let outcome = self.fetch_credentials().await;
        self.with_state(|s| s.connecting = false);
        outcome
    }

    async fn fetch_credentials(&self) -> Result<ConnectOutcome, HandshakeError> {
        let payload = match self.backend.credentials(&self.identity).await {
            Ok(payload) => payload,
            Err(e) => {
                let err = HandshakeError::Credentials(e);
                self.surface(&err);
                return Err(err);
            }
        };

        if !credentials_present(&payload) {
            tracing::info!("No {} credentials available yet", self.profile.display_name);
            return Ok(ConnectOutcome::NotYetAuthorized);
        }

        self.with_state(|s| s.connected = true);
        let tag = self.profile.integration_type.clone();
        let credentials = payload.clone();
        self.store.update(Box::new(move |prev: &IntegrationParams| {
            prev.with_credentials(credentials, &tag)
        }));

        tracing::info!("{} connected", self.profile.display_name);
        Ok(ConnectOutcome::Connected(payload))
    }

    /// Recompute `connected` from host params. Call on every observed change.
    pub fn on_params_changed(&self, params: &IntegrationParams) -> ConnectionStatus {
        let connected = params.is_connected_to(&self.profile.integration_type);
        let status = self.with_state(|s| {
            s.connected = connected;
            s.status()
        });
        tracing::debug!("Integration params changed, {} is {}", self.profile.display_name, status);
        status
    }

    /// Feed store change notifications into `on_params_changed` until the
    /// sender goes away.
    pub async fn follow(&self, mut changes: watch::Receiver<IntegrationParams>) {
        while changes.changed().await.is_ok() {
            let params = changes.borrow_and_update().clone();
            self.on_params_changed(&params);
        }
    }

    fn surface(&self, err: &HandshakeError) {
        self.notifier
            .alert(&err.user_message(&self.profile.display_name));
        tracing::error!("{} handshake error: {:#}", self.profile.display_name, err);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let (result, status) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let result = f(&mut state);
            (result, state.status())
        };
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
        result
    }
}
