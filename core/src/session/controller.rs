//! Connection controller
//!
//! Owns the agent-session lifecycle for one channel: starting and stopping
//! the remote session, mirroring the connected flag into the store, and
//! running the liveness probe while connected.

use crate::session::api_client::SessionApi;
use crate::session::error::ConnectionError;
use crate::session::liveness::LivenessProbe;
use crate::session::types::SessionParams;
use crate::state::{AppStore, Notification, StoreAction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CONNECTED_MESSAGE: &str = "晓佑已连接";
const DISCONNECTED_MESSAGE: &str = "已断开晓佑";

/// Lifecycle state of the agent session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session
    #[default]
    Disconnected,
    /// Start request outstanding
    Connecting,
    /// Session running on the server
    Connected,
}

/// What a connect/disconnect call ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Session started (or was already running)
    Connected,
    /// Session stopped (or was not running)
    Disconnected,
    /// Another action was in flight; nothing was sent
    Suppressed,
}

/// Whether a connect/disconnect action is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Free to start an action
    Idle,
    /// An action holds the permit
    InFlight,
}

/// Single-permit gate guarding connect/disconnect
#[derive(Debug, Default)]
pub struct ActionGate {
    in_flight: AtomicBool,
}

impl ActionGate {
    /// Take the permit, or `None` if an action already holds it
    pub fn try_acquire(&self) -> Option<GatePermit<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GatePermit { gate: self })
    }

    /// Current gate state
    pub fn state(&self) -> GateState {
        if self.in_flight.load(Ordering::Acquire) {
            GateState::InFlight
        } else {
            GateState::Idle
        }
    }
}

/// Held for the duration of an action; releases the gate on drop
#[derive(Debug)]
pub struct GatePermit<'a> {
    gate: &'a ActionGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: ConnectionState,
    session: Option<SessionParams>,
    probe: Option<LivenessProbe>,
}

/// Drives connect, disconnect and liveness for the store's channel
pub struct ConnectionController {
    api: Arc<dyn SessionApi>,
    store: Arc<RwLock<AppStore>>,
    gate: ActionGate,
    inner: Mutex<Inner>,
    ping_interval: Duration,
}

impl ConnectionController {
    /// Create a controller in the `Disconnected` state
    pub fn new(
        api: Arc<dyn SessionApi>,
        store: Arc<RwLock<AppStore>>,
        ping_interval: Duration,
    ) -> Self {
        Self {
            api,
            store,
            gate: ActionGate::default(),
            inner: Mutex::new(Inner::default()),
            ping_interval,
        }
    }

    /// Shared store this controller mirrors into
    pub fn store(&self) -> &Arc<RwLock<AppStore>> {
        &self.store
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.inner().state
    }

    /// Whether a connect/disconnect action is outstanding
    pub fn is_loading(&self) -> bool {
        self.gate.state() == GateState::InFlight
    }

    /// Whether a liveness probe is running
    pub fn liveness_active(&self) -> bool {
        self.inner()
            .probe
            .as_ref()
            .map(LivenessProbe::is_running)
            .unwrap_or(false)
    }

    /// Parameters the current session was started with
    ///
    /// `None` when disconnected or when the session was adopted from the
    /// server rather than started here.
    pub fn active_session(&self) -> Option<SessionParams> {
        self.inner().session.clone()
    }

    /// Connect when disconnected, disconnect when connected
    pub async fn toggle(&self) -> Result<ActionOutcome, ConnectionError> {
        if self.state() == ConnectionState::Connected {
            self.disconnect().await
        } else {
            self.connect().await
        }
    }

    /// Start an agent session for the selected graph
    ///
    /// # Errors
    /// * `NoGraphSelected` / `EmptyChannel` - nothing was sent
    /// * `CapacityExceeded` / `ServiceFailure` - the server refused; the user
    ///   has been notified
    /// * `Api` - transport failure, propagated without notification
    pub async fn connect(&self) -> Result<ActionOutcome, ConnectionError> {
        let Some(_permit) = self.gate.try_acquire() else {
            debug!("Connect suppressed, another action is in flight");
            return Ok(ActionOutcome::Suppressed);
        };

        if self.state() == ConnectionState::Connected {
            return Ok(ActionOutcome::Connected);
        }

        let params = { self.store.read().await.session_params() };
        let params = match params {
            Some(p) if p.channel.trim().is_empty() => {
                return Err(self.reject(ConnectionError::EmptyChannel).await)
            }
            Some(p) => p,
            None => return Err(self.reject(ConnectionError::NoGraphSelected).await),
        };

        self.set_state(ConnectionState::Connecting);
        info!(
            channel = %params.channel,
            graph = %params.graph_name,
            language = %params.language,
            voice_type = %params.voice_type,
            "Starting agent session"
        );

        let response = match self.api.start_service(&params).await {
            Ok(response) => response,
            Err(e) => {
                self.mark_disconnected().await;
                warn!(channel = %params.channel, error = %e, "Start request failed");
                return Err(e.into());
            }
        };

        if !response.code.is_success() {
            self.mark_disconnected().await;
            let err = if response.code.is_capacity_exceeded() {
                ConnectionError::CapacityExceeded
            } else {
                ConnectionError::ServiceFailure {
                    code: response.code.clone(),
                    msg: response.message().to_string(),
                }
            };
            warn!(
                channel = %params.channel,
                code = %response.code,
                msg = %response.message(),
                "Agent server refused to start session"
            );
            return Err(self.reject(err).await);
        }

        let channel = params.channel.clone();
        self.inner().session = Some(params);
        self.mark_connected(channel).await;
        self.notify(Notification::success(CONNECTED_MESSAGE)).await;
        Ok(ActionOutcome::Connected)
    }

    /// Stop the agent session
    ///
    /// The liveness probe is cancelled and the state returns to
    /// `Disconnected` whatever the stop request returns.
    ///
    /// # Errors
    /// * `Api` - the stop request failed in transport; local state has
    ///   already been torn down
    pub async fn disconnect(&self) -> Result<ActionOutcome, ConnectionError> {
        let Some(_permit) = self.gate.try_acquire() else {
            debug!("Disconnect suppressed, another action is in flight");
            return Ok(ActionOutcome::Suppressed);
        };

        if self.state() != ConnectionState::Connected {
            return Ok(ActionOutcome::Disconnected);
        }

        let channel = { self.store.read().await.options.channel.clone() };
        info!(channel = %channel, "Stopping agent session");
        let result = self.api.stop_service(&channel).await;
        self.mark_disconnected().await;

        match result {
            Ok(response) => {
                if !response.code.is_success() {
                    warn!(
                        channel = %channel,
                        code = %response.code,
                        msg = %response.message(),
                        "Stop request returned failure code"
                    );
                }
                self.notify(Notification::success(DISCONNECTED_MESSAGE)).await;
                Ok(ActionOutcome::Disconnected)
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Stop request failed");
                Err(e.into())
            }
        }
    }

    /// Adopt a session that is already running for the store's channel
    ///
    /// Pings the channel once; if the server reports it alive the
    /// controller becomes `Connected` without sending a start request.
    /// Returns whether the controller is connected afterwards.
    ///
    /// Adoption takes the action gate once the ping answers. If a
    /// connect or disconnect holds it, or the channel changed while the
    /// ping was outstanding, the result is dropped.
    ///
    /// # Errors
    /// * `Api` - the ping failed in transport
    pub async fn check_existing_session(&self) -> Result<bool, ConnectionError> {
        let channel = { self.store.read().await.options.channel.clone() };
        if channel.trim().is_empty() {
            return Ok(false);
        }

        let response = self.api.ping(&channel).await?;
        if !response.code.is_success() {
            debug!(channel = %channel, code = %response.code, "No running session for channel");
            return Ok(false);
        }

        let Some(_permit) = self.gate.try_acquire() else {
            debug!(channel = %channel, "Adoption dropped, another action is in flight");
            return Ok(false);
        };

        let state = self.state();
        if state != ConnectionState::Disconnected {
            return Ok(state == ConnectionState::Connected);
        }

        let current = { self.store.read().await.options.channel.clone() };
        if current != channel {
            debug!(pinged = %channel, current = %current, "Channel changed during ping");
            return Ok(false);
        }

        info!(channel = %channel, "Adopting running agent session");
        self.mark_connected(channel).await;
        Ok(true)
    }

    // Callers hold the gate
    async fn mark_connected(&self, channel: String) {
        self.store
            .write()
            .await
            .dispatch(StoreAction::SetAgentConnected(true));
        let mut inner = self.inner();
        inner.state = ConnectionState::Connected;
        // replace, never stack, probes
        if let Some(previous) = inner.probe.take() {
            previous.stop();
        }
        inner.probe = Some(LivenessProbe::start(
            self.api.clone(),
            channel,
            self.ping_interval,
        ));
    }

    async fn mark_disconnected(&self) {
        {
            let mut inner = self.inner();
            if let Some(probe) = inner.probe.take() {
                probe.stop();
            }
            inner.session = None;
            inner.state = ConnectionState::Disconnected;
        }
        self.store
            .write()
            .await
            .dispatch(StoreAction::SetAgentConnected(false));
    }

    async fn reject(&self, err: ConnectionError) -> ConnectionError {
        if let Some(message) = err.user_message() {
            self.notify(Notification::error(message)).await;
        }
        err
    }

    async fn notify(&self, notification: Notification) {
        self.store
            .write()
            .await
            .dispatch(StoreAction::Notify(notification));
    }

    fn set_state(&self, state: ConnectionState) {
        self.inner().state = state;
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
