//! Agent session module
//!
//! Talks to the agent server and drives the connect/disconnect lifecycle.
//! The controller only depends on the [`SessionApi`] trait so it can be
//! exercised without a network.

pub mod api_client;
pub mod controller;
pub mod error;
pub mod liveness;
pub mod types;

pub use api_client::{HttpSessionApi, SessionApi};
pub use controller::{ActionOutcome, ConnectionController, ConnectionState};
pub use error::{ApiError, ConnectionError};
pub use liveness::LivenessProbe;
pub use types::{ApiResponse, ResultCode, SessionParams};
