// State management module
// Handles the UI store and its notification log

pub mod app_state;
pub mod notifications;

pub use app_state::{AppStore, SessionOptions, StoreAction};
pub use notifications::{Notification, NotificationLevel, NotificationLog};
