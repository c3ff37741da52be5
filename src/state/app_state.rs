// View state
// Window-local state that does not belong in the shared store

use companion_core::catalog::modules::{self, Module, ModuleType};

/// UI-specific state
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Channel text being edited (committed to the store on change)
    pub channel_input: String,
    /// LLM/V2V module whose compatible tools are listed
    pub selected_module: Option<&'static str>,
    /// Whether the module panel is visible
    pub modules_visible: bool,
    /// Whether the notification log is visible
    pub notifications_visible: bool,
}

impl ViewState {
    /// Create view state starting from the configured channel
    pub fn new(channel: &str) -> Self {
        Self {
            channel_input: channel.to_string(),
            selected_module: None,
            modules_visible: true,
            notifications_visible: true,
        }
    }

    /// Select an LLM-like module; other kinds are ignored
    /// Returns true if the selection changed
    pub fn select_module(&mut self, name: &'static str) -> bool {
        match modules::find_module(name) {
            Some(m) if is_model(m) => {
                let changed = self.selected_module != Some(name);
                self.selected_module = Some(name);
                changed
            }
            _ => false,
        }
    }

    /// Tools the selected module can call
    pub fn selected_tools(&self) -> Vec<&'static Module> {
        self.selected_module
            .map(modules::compatible_tools)
            .unwrap_or_default()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new("")
    }
}

fn is_model(module: &Module) -> bool {
    matches!(module.module_type, ModuleType::Llm | ModuleType::V2v)
}
