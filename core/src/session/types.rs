//! Session API wire types
//!
//! Request and response bodies exchanged with the agent server.

use crate::catalog::{Language, VoiceType};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Result code sent by the agent server for capacity limits
pub const CAPACITY_EXCEEDED_CODE: &str = "10001";

/// Result code returned by the agent server
///
/// The server is inconsistent about typing: success is usually the number
/// `0` while some failures (notably the capacity limit) arrive as strings.
/// Comparisons therefore go through the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultCode {
    /// Numeric code
    Number(i64),
    /// String-typed code
    Text(String),
}

impl ResultCode {
    /// `0` in either representation
    pub fn is_success(&self) -> bool {
        self.matches("0")
    }

    /// The concurrent-session limit sentinel
    pub fn is_capacity_exceeded(&self) -> bool {
        self.matches(CAPACITY_EXCEEDED_CODE)
    }

    fn matches(&self, expected: &str) -> bool {
        match self {
            ResultCode::Number(n) => n.to_string() == expected,
            ResultCode::Text(s) => s.trim() == expected,
        }
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        ResultCode::Number(0)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Number(n) => write!(f, "{}", n),
            ResultCode::Text(s) => f.write_str(s),
        }
    }
}

/// Generic `{ code, msg, data }` envelope
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiResponse {
    /// Result code, `0` on success
    pub code: ResultCode,
    /// Human-readable message
    #[serde(default)]
    pub msg: Option<String>,
    /// Optional payload
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Successful empty response
    pub fn ok() -> Self {
        Self {
            code: ResultCode::Number(0),
            msg: Some("success".to_string()),
            data: None,
        }
    }

    /// Failure response with the given code and message
    pub fn failure(code: ResultCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: Some(msg.into()),
            data: None,
        }
    }

    /// Message text, empty when the server omitted it
    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or_default()
    }
}

/// Everything the server needs to start an agent for a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Room identifier
    pub channel: String,
    /// Numeric user id joining the room
    pub user_id: u32,
    /// Graph to run
    pub graph_name: String,
    /// Agent language
    pub language: Language,
    /// TTS voice
    pub voice_type: VoiceType,
}

/// Body of `POST /api/agents/start`
#[derive(Debug, Serialize)]
pub struct StartServiceRequest {
    /// Per-call id for server-side tracing
    pub request_id: String,
    /// Room identifier
    pub channel_name: String,
    /// User id
    pub user_uid: u32,
    /// Graph to run
    pub graph_name: String,
    /// Agent language
    pub language: Language,
    /// TTS voice
    pub voice_type: VoiceType,
}

impl From<&SessionParams> for StartServiceRequest {
    fn from(params: &SessionParams) -> Self {
        Self {
            request_id: new_request_id(),
            channel_name: params.channel.clone(),
            user_uid: params.user_id,
            graph_name: params.graph_name.clone(),
            language: params.language,
            voice_type: params.voice_type,
        }
    }
}

/// Body of `POST /api/agents/ping` and `POST /api/agents/stop`
#[derive(Debug, Serialize)]
pub struct ChannelRequest {
    /// Per-call id for server-side tracing
    pub request_id: String,
    /// Room identifier
    pub channel_name: String,
}

impl ChannelRequest {
    /// Build a request for the given channel
    pub fn new(channel: &str) -> Self {
        Self {
            request_id: new_request_id(),
            channel_name: channel.to_string(),
        }
    }
}

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}
