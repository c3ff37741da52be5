//! Session error types
//!
//! Transport-level failures talking to the agent server, and the outcomes a
//! connect/disconnect action can fail with.

use crate::session::types::ResultCode;
use thiserror::Error;

/// Errors raised by a [`SessionApi`](crate::session::SessionApi) call
///
/// These never carry a server result code: a well-formed `{ code, msg }`
/// body is a successful call even when the code reports a failure.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or the response not received
    #[error("Failed to reach agent server: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx HTTP status
    #[error("Agent server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// The body was not the expected JSON envelope
    #[error("Failed to parse agent server response: {0}")]
    Decode(String),
}

/// Why a connect or disconnect action did not complete
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// No graph is selected, or the selected id is not in the graph list
    #[error("No graph selected")]
    NoGraphSelected,

    /// The channel name is empty
    #[error("Channel name is empty")]
    EmptyChannel,

    /// The server refused because the concurrent-session limit is reached
    #[error("Concurrent session limit reached")]
    CapacityExceeded,

    /// The server rejected the start request
    #[error("Agent server rejected request (code {code}): {msg}")]
    ServiceFailure {
        /// Result code from the server
        code: ResultCode,
        /// Message from the server
        msg: String,
    },

    /// Transport failure; not reported to the user by the controller
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ConnectionError {
    /// Toast text for errors the controller reports itself
    ///
    /// Returns `None` for transport errors, which are left to the caller.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ConnectionError::NoGraphSelected => Some("请先选择一个图谱".to_string()),
            ConnectionError::EmptyChannel => Some("请先设置频道名称".to_string()),
            ConnectionError::CapacityExceeded => {
                Some("当前同时在线体验人数已达上限，请稍后再试。".to_string())
            }
            ConnectionError::ServiceFailure { code, msg } => {
                Some(format!("错误码:{}，信息:{}", code, msg))
            }
            ConnectionError::Api(_) => None,
        }
    }
}
