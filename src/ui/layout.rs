// Main application layout
// Header, action bar, module panel and notification log

use crate::state::ViewState;
use crate::ui::components::*;
use companion_core::catalog::options::DESCRIPTION;
use companion_core::catalog::modules::modules_of_type;
use companion_core::catalog::{Language, ModuleType, VoiceType};
use companion_core::session::ConnectionState;
use companion_core::state::AppStore;
use eframe::egui;

/// User intent produced while rendering, applied by the app afterwards
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Connect/disconnect button clicked
    ToggleConnection,
    /// Channel field edited
    SetChannel(String),
    /// Channel field left or submitted
    ChannelCommitted,
    /// Graph picked
    SelectGraph(String),
    /// Language picked
    SelectLanguage(Language),
    /// Voice picked
    SelectVoice(VoiceType),
    /// Notification log cleared
    ClearNotifications,
}

/// Snapshot of everything the layout reads
pub struct LayoutInput<'a> {
    /// Store contents for this frame
    pub store: &'a AppStore,
    /// Controller lifecycle state
    pub connection: ConnectionState,
    /// Whether an action is in flight
    pub loading: bool,
}

/// Render the main application layout
/// Returns the events raised by the user this frame
pub fn render_app_layout(
    ctx: &egui::Context,
    input: &LayoutInput<'_>,
    view: &mut ViewState,
) -> Vec<UiEvent> {
    let mut events = Vec::new();

    render_header(ctx, input.connection);

    egui::TopBottomPanel::top("action_bar").show(ctx, |ui| {
        ui.add_space(8.0);
        action_bar_frame().show(ui, |ui| {
            render_action_bar(ui, input, view, &mut events);
        });
        ui.add_space(8.0);
    });

    if view.notifications_visible {
        egui::TopBottomPanel::bottom("notifications")
            .resizable(true)
            .default_height(160.0)
            .show(ctx, |ui| {
                if notification_log(ui, &input.store.notifications) {
                    events.push(UiEvent::ClearNotifications);
                }
            });
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        if view.modules_visible {
            render_module_panel(ui, view);
        }
    });

    events
}

/// Render the top header with the product name and connection badge
fn render_header(ctx: &egui::Context, connection: ConnectionState) {
    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("晓佑").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                status_badge(ui, connection);
            });
        });
    });
}

/// Render description, session selectors and the connect toggle
fn render_action_bar(
    ui: &mut egui::Ui,
    input: &LayoutInput<'_>,
    view: &mut ViewState,
    events: &mut Vec<UiEvent>,
) {
    let store = input.store;
    // settings are frozen while a session exists or an action is running
    let editable = input.connection == ConnectionState::Disconnected && !input.loading;

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("角色设定").strong());
        ui.label(egui::RichText::new(DESCRIPTION).weak().small());
    });
    ui.add_space(8.0);

    ui.horizontal_wrapped(|ui| {
        ui.add_enabled_ui(editable, |ui| {
            ui.label("频道");
            let response = ui.add(
                egui::TextEdit::singleline(&mut view.channel_input).desired_width(140.0),
            );
            if response.changed() {
                events.push(UiEvent::SetChannel(view.channel_input.trim().to_string()));
            }
            if response.lost_focus() {
                events.push(UiEvent::ChannelCommitted);
            }

            let graph_text = store
                .selected_graph()
                .map(|g| g.label.as_str())
                .unwrap_or("选择图谱");
            egui::ComboBox::from_id_source("graph_select")
                .selected_text(graph_text)
                .show_ui(ui, |ui| {
                    for graph in &store.graph_list {
                        let selected = store.selected_graph_id.as_deref() == Some(graph.graph_id.as_str());
                        if ui.selectable_label(selected, &graph.label).clicked() && !selected {
                            events.push(UiEvent::SelectGraph(graph.graph_id.clone()));
                        }
                    }
                });

            egui::ComboBox::from_id_source("language_select")
                .selected_text(store.language.label())
                .show_ui(ui, |ui| {
                    for language in Language::ALL {
                        let selected = store.language == language;
                        if ui.selectable_label(selected, language.label()).clicked() && !selected {
                            events.push(UiEvent::SelectLanguage(language));
                        }
                    }
                });

            egui::ComboBox::from_id_source("voice_select")
                .selected_text(store.voice_type.label())
                .show_ui(ui, |ui| {
                    for voice in VoiceType::ALL {
                        let selected = store.voice_type == voice;
                        if ui.selectable_label(selected, voice.label()).clicked() && !selected {
                            events.push(UiEvent::SelectVoice(voice));
                        }
                    }
                });
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let graph_selected = store.selected_graph().is_some();
            if connect_button(ui, input.connection, input.loading, graph_selected).clicked() {
                events.push(UiEvent::ToggleConnection);
            }
        });
    });
}

/// Render the module registry: model picker and its compatible tools
fn render_module_panel(ui: &mut egui::Ui, view: &mut ViewState) {
    ui.add_space(12.0);
    ui.heading("模块");
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            for module_type in [ModuleType::Llm, ModuleType::V2v] {
                if let Some(label) = module_type.label() {
                    ui.label(egui::RichText::new(label).strong());
                }
                for module in modules_of_type(module_type) {
                    let selected = view.selected_module == Some(module.name);
                    if ui.selectable_label(selected, module.label).clicked() {
                        view.select_module(module.name);
                    }
                }
                ui.add_space(8.0);
            }
        });

        ui.add_space(24.0);

        ui.vertical(|ui| {
            ui.label(egui::RichText::new("可用工具").strong());
            ui.add_space(4.0);
            let tools = view.selected_tools();
            if view.selected_module.is_none() {
                ui.label(egui::RichText::new("选择一个模型查看可用工具").weak());
            } else if tools.is_empty() {
                ui.label(egui::RichText::new("该模型不支持工具").weak());
            }
            for tool in tools {
                ui.horizontal(|ui| {
                    ui.label(tool.label);
                    ui.label(egui::RichText::new(tool.name).monospace().weak().small());
                });
            }
        });
    });
}
