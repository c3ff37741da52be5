// State management module
// Window-local view state; shared session state lives in companion-core

pub mod app_state;

pub use app_state::ViewState;
