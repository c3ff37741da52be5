// Reusable UI components
// Connection toggle, status badge and the notification log

use companion_core::session::ConnectionState;
use companion_core::state::{NotificationLevel, NotificationLog};
use eframe::egui;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0xe8, 0xda, 0xca);
const DESTRUCTIVE: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

/// Label for the connection toggle
/// Loading wins over the lifecycle state
pub fn connect_label(state: ConnectionState, loading: bool) -> &'static str {
    if loading {
        "连接中"
    } else if state == ConnectionState::Connected {
        "断开"
    } else {
        "连接"
    }
}

/// Whether the toggle accepts clicks
/// Disconnecting never needs a graph; connecting does
pub fn connect_enabled(state: ConnectionState, graph_selected: bool) -> bool {
    graph_selected || state == ConnectionState::Connected
}

/// Render the connect/disconnect toggle
pub fn connect_button(
    ui: &mut egui::Ui,
    state: ConnectionState,
    loading: bool,
    graph_selected: bool,
) -> egui::Response {
    let connected = state == ConnectionState::Connected;
    let mut text = egui::RichText::new(connect_label(state, loading)).strong();
    if connected && !loading {
        text = text.color(egui::Color32::WHITE);
    }
    let mut button = egui::Button::new(text).min_size(egui::vec2(96.0, 28.0));
    if connected {
        button = button.fill(DESTRUCTIVE);
    }

    ui.horizontal(|ui| {
        if loading {
            ui.spinner();
        }
        ui.add_enabled(connect_enabled(state, graph_selected), button)
    })
    .inner
}

/// Render a connection badge with colored text
pub fn status_badge(ui: &mut egui::Ui, state: ConnectionState) {
    let (text, text_color) = match state {
        ConnectionState::Disconnected => ("未连接", egui::Color32::GRAY),
        ConnectionState::Connecting => ("连接中", egui::Color32::from_rgb(220, 180, 0)),
        ConnectionState::Connected => ("已连接", egui::Color32::from_rgb(0, 200, 0)),
    };

    ui.colored_label(text_color, text);
}

/// Action bar background
pub fn action_bar_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(ACCENT)
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(egui::Margin::same(8.0))
}

/// Render the notification log, newest at the bottom
/// Returns true if the user asked to clear it
pub fn notification_log(ui: &mut egui::Ui, log: &NotificationLog) -> bool {
    let mut clear = false;

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.add_space(8.0);
        ui.label(egui::RichText::new("通知").heading());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add_space(8.0);
            if ui.button("清空").clicked() {
                clear = true;
            }
        });
    });
    ui.add_space(4.0);
    ui.separator();
    ui.add_space(4.0);

    egui::ScrollArea::vertical()
        .id_source("notification_scroll")
        .auto_shrink([false; 2])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            if log.is_empty() {
                ui.label(egui::RichText::new("暂无通知").italics().weak());
            }
            for entry in log.iter() {
                let color = match entry.level {
                    NotificationLevel::Success => egui::Color32::from_rgb(0, 160, 0),
                    NotificationLevel::Error => DESTRUCTIVE,
                };
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new(entry.at.format("%H:%M:%S").to_string())
                            .monospace()
                            .weak(),
                    );
                    ui.colored_label(color, &entry.message);
                });
            }
        });

    clear
}
