//! Companion Core Library
//!
//! Agent session lifecycle, agent server client, UI store and option
//! catalogs for the companion playground. The desktop front-end lives in
//! the root crate.

pub mod app;
/// Option catalogs and module registry
pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
/// UI store and notifications
pub mod state;

pub use app::Companion;
pub use config::Config;
pub use error::AppError;
