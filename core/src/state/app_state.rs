// Application store
// Global UI state mutated through dispatched actions

use crate::catalog::{default_graphs, GraphOption, Language, VoiceType};
use crate::session::SessionParams;
use crate::state::notifications::{Notification, NotificationLog};

/// Identity used to join a room
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionOptions {
    /// Room identifier; empty until chosen
    pub channel: String,
    /// Display name of the local user
    pub user_name: String,
    /// Numeric id of the local user
    pub user_id: u32,
}

/// Actions accepted by [`AppStore::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// Replace channel/user identity
    SetOptions(SessionOptions),
    /// Mirror the controller's connected flag
    SetAgentConnected(bool),
    /// Select a graph by id (`None` clears the selection)
    SetSelectedGraphId(Option<String>),
    /// Replace the available graphs
    SetGraphList(Vec<GraphOption>),
    /// Change the agent language
    SetLanguage(Language),
    /// Change the TTS voice
    SetVoiceType(VoiceType),
    /// Raise a toast
    Notify(Notification),
    /// Dismiss all toasts
    ClearNotifications,
}

/// Main application store
#[derive(Debug, Clone)]
pub struct AppStore {
    /// Channel and user identity
    pub options: SessionOptions,
    /// Whether an agent session is active for the channel
    pub agent_connected: bool,
    /// Id of the selected graph, if any
    pub selected_graph_id: Option<String>,
    /// Graphs the user can choose from
    pub graph_list: Vec<GraphOption>,
    /// Agent language
    pub language: Language,
    /// TTS voice
    pub voice_type: VoiceType,
    /// Toasts raised by actions
    pub notifications: NotificationLog,
}

impl Default for AppStore {
    fn default() -> Self {
        Self {
            options: SessionOptions::default(),
            agent_connected: false,
            selected_graph_id: None,
            graph_list: default_graphs(),
            language: Language::default(),
            voice_type: VoiceType::default(),
            notifications: NotificationLog::default(),
        }
    }
}

impl AppStore {
    /// Create a store with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store for the given identity
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Apply an action
    pub fn dispatch(&mut self, action: StoreAction) {
        match action {
            StoreAction::SetOptions(options) => self.options = options,
            StoreAction::SetAgentConnected(connected) => self.agent_connected = connected,
            StoreAction::SetSelectedGraphId(id) => self.selected_graph_id = id,
            StoreAction::SetGraphList(graphs) => {
                // drop a selection that no longer exists
                if let Some(id) = &self.selected_graph_id {
                    if !graphs.iter().any(|g| &g.graph_id == id) {
                        self.selected_graph_id = None;
                    }
                }
                self.graph_list = graphs;
            }
            StoreAction::SetLanguage(language) => self.language = language,
            StoreAction::SetVoiceType(voice_type) => self.voice_type = voice_type,
            StoreAction::Notify(notification) => self.notifications.push(notification),
            StoreAction::ClearNotifications => self.notifications.clear(),
        }
    }

    /// The selected graph, if the selected id is in the graph list
    pub fn selected_graph(&self) -> Option<&GraphOption> {
        self.selected_graph_id
            .as_ref()
            .and_then(|id| self.graph_list.iter().find(|g| &g.graph_id == id))
    }

    /// Start parameters for the current selection
    ///
    /// Returns `None` when no graph is selected.
    pub fn session_params(&self) -> Option<SessionParams> {
        self.selected_graph().map(|graph| SessionParams {
            channel: self.options.channel.clone(),
            user_id: self.options.user_id,
            graph_name: graph.name.clone(),
            language: self.language,
            voice_type: self.voice_type,
        })
    }
}
