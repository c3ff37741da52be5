//! Static catalogs
//!
//! Selectable options and the module registry used to describe graphs.

pub mod modules;
pub mod options;

pub use modules::{compatible_tools, find_module, Module, ModuleType};
pub use options::{default_graphs, GraphOption, Language, VoiceType};
