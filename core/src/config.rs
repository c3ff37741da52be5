//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::catalog::{Language, VoiceType};
use crate::session::liveness::MAX_PING_INTERVAL;
use crate::state::SessionOptions;
use std::env;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue {
        /// Environment variable name
        name: &'static str,
        /// Offending value
        value: String,
    },

    /// A numeric setting must be positive
    #[error("{0} must be > 0")]
    NotPositive(&'static str),

    /// A numeric setting exceeds its upper bound
    #[error("{name} must be <= {max}")]
    TooLarge {
        /// Environment variable name
        name: &'static str,
        /// Largest accepted value
        max: u64,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Agent server configuration
    pub server: AgentServerConfig,
    /// Liveness probe configuration
    pub liveness: LivenessConfig,
    /// Initial session identity and preferences
    pub session: SessionDefaults,
    /// Maximum number of toasts kept in the notification log
    pub notification_limit: usize,
}

/// Agent server configuration
#[derive(Debug, Clone)]
pub struct AgentServerConfig {
    /// Base URL of the agent server (no trailing slash needed)
    pub base_url: String,
    /// Per-request timeout (in seconds)
    pub request_timeout_secs: u64,
}

/// Liveness probe configuration
#[derive(Debug, Clone)]
pub struct LivenessConfig {
    /// Ping interval (in milliseconds)
    pub interval_ms: u64,
}

impl LivenessConfig {
    /// Ping interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Initial session identity and preferences
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    /// Room channel
    pub channel: String,
    /// User id
    pub user_id: u32,
    /// User display name
    pub user_name: String,
    /// Raw language value (validated by [`Config::validate`])
    pub language: String,
    /// Raw voice type value (validated by [`Config::validate`])
    pub voice_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: AgentServerConfig {
                base_url: "http://localhost:8080".to_string(),
                request_timeout_secs: 30,
            },
            liveness: LivenessConfig { interval_ms: 3000 },
            session: SessionDefaults {
                channel: random_channel(),
                user_id: random_user_id(),
                user_name: String::new(),
                language: Language::default().as_str().to_string(),
                voice_type: VoiceType::default().as_str().to_string(),
            },
            notification_limit: 50,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server: AgentServerConfig {
                base_url: env::var("AGENT_SERVER_URL").unwrap_or(defaults.server.base_url),
                request_timeout_secs: parse_var("AGENT_REQUEST_TIMEOUT_SECS")
                    .unwrap_or(defaults.server.request_timeout_secs),
            },
            liveness: LivenessConfig {
                interval_ms: parse_var("PING_INTERVAL_MS").unwrap_or(defaults.liveness.interval_ms),
            },
            session: SessionDefaults {
                channel: env::var("AGENT_CHANNEL").unwrap_or(defaults.session.channel),
                user_id: parse_var("AGENT_USER_ID").unwrap_or(defaults.session.user_id),
                user_name: env::var("AGENT_USER_NAME").unwrap_or(defaults.session.user_name),
                language: env::var("AGENT_LANGUAGE").unwrap_or(defaults.session.language),
                voice_type: env::var("AGENT_VOICE_TYPE").unwrap_or(defaults.session.voice_type),
            },
            notification_limit: parse_var("NOTIFICATION_LIMIT")
                .unwrap_or(defaults.notification_limit),
        }
    }

    /// Check values that cannot be validated while parsing
    ///
    /// # Errors
    /// * `ConfigError::InvalidValue` for a malformed URL, language or voice
    /// * `ConfigError::NotPositive` for a zero interval or timeout
    /// * `ConfigError::TooLarge` for a ping interval above an hour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.server.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                name: "AGENT_SERVER_URL",
                value: url.clone(),
            });
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::NotPositive("AGENT_REQUEST_TIMEOUT_SECS"));
        }
        if self.liveness.interval_ms == 0 {
            return Err(ConfigError::NotPositive("PING_INTERVAL_MS"));
        }
        let max_interval_ms = MAX_PING_INTERVAL.as_millis() as u64;
        if self.liveness.interval_ms > max_interval_ms {
            return Err(ConfigError::TooLarge {
                name: "PING_INTERVAL_MS",
                max: max_interval_ms,
            });
        }
        self.language()?;
        self.voice_type()?;
        Ok(())
    }

    /// Parsed initial language
    pub fn language(&self) -> Result<Language, ConfigError> {
        self.session
            .language
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "AGENT_LANGUAGE",
                value: self.session.language.clone(),
            })
    }

    /// Parsed initial voice type
    pub fn voice_type(&self) -> Result<VoiceType, ConfigError> {
        self.session
            .voice_type
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "AGENT_VOICE_TYPE",
                value: self.session.voice_type.clone(),
            })
    }

    /// Session identity for the store
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            channel: self.session.channel.clone(),
            user_name: self.session.user_name.clone(),
            user_id: self.session.user_id,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn random_channel() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("agent_{}", &id[..8])
}

fn random_user_id() -> u32 {
    // six digits, never zero
    (Uuid::new_v4().as_u128() % 900_000) as u32 + 100_000
}
