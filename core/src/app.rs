//! Application wiring
//!
//! Builds the store, the agent server client and the connection controller
//! from a [`Config`].

use crate::config::Config;
use crate::error::AppError;
use crate::session::{ConnectionController, HttpSessionApi, SessionApi};
use crate::state::{AppStore, NotificationLog};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Shared handles the front-end works with
#[derive(Clone)]
pub struct Companion {
    /// UI store
    pub store: Arc<RwLock<AppStore>>,
    /// Connection lifecycle
    pub controller: Arc<ConnectionController>,
}

impl Companion {
    /// Wire everything against the configured agent server
    ///
    /// # Errors
    /// * `AppError::Config` if the configuration does not validate
    /// * `AppError::Api` if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        config.validate()?;
        let api = HttpSessionApi::from_config(&config.server)?;
        info!(base_url = %api.base_url(), "Agent server client ready");
        Self::with_api(config, Arc::new(api))
    }

    /// Wire everything against a custom [`SessionApi`]
    ///
    /// # Errors
    /// * `AppError::Config` if the configuration does not validate
    pub fn with_api(config: &Config, api: Arc<dyn SessionApi>) -> Result<Self, AppError> {
        config.validate()?;
        let mut store = AppStore::with_options(config.session_options());
        store.language = config.language()?;
        store.voice_type = config.voice_type()?;
        store.notifications = NotificationLog::new(config.notification_limit);

        let store = Arc::new(RwLock::new(store));
        let controller = Arc::new(ConnectionController::new(
            api,
            store.clone(),
            config.liveness.interval(),
        ));

        Ok(Self { store, controller })
    }
}
