// Companion Playground - Main Entry Point
// Native desktop front-end for starting and stopping companion agent sessions

mod state;
mod ui;

use companion_core::session::ConnectionState;
use companion_core::state::{Notification, StoreAction};
use companion_core::{Companion, Config};
use eframe::egui;
use state::ViewState;
use std::time::Duration;
use tracing::{error, info, warn};
use ui::{render_app_layout, LayoutInput, UiEvent};

/// Env var pointing at a font file with CJK glyphs
const CJK_FONT_VAR: &str = "COMPANION_CJK_FONT";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let runtime = tokio::runtime::Runtime::new()?;
    let companion = Companion::from_config(&config)?;
    let view = ViewState::new(&config.session.channel);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("晓佑")
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Companion Playground",
        options,
        Box::new(move |cc| {
            if let Ok(path) = std::env::var(CJK_FONT_VAR) {
                if let Err(e) = install_cjk_font(&cc.egui_ctx, &path) {
                    warn!(path = %path, error = %e, "Failed to load CJK font");
                }
            }
            let app = CompanionApp::new(companion, runtime, view);
            app.resume_existing_session(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {}", e))
}

/// Add a CJK-capable font as fallback for every family
fn install_cjk_font(ctx: &egui::Context, path: &str) -> std::io::Result<()> {
    let bytes = std::fs::read(path)?;
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
    Ok(())
}

/// Main application struct
/// Bridges egui's frame loop to the async controller
struct CompanionApp {
    /// Store and controller
    companion: Companion,
    /// Runtime the controller's actions and probe run on
    runtime: tokio::runtime::Runtime,
    /// Window-local state
    view: ViewState,
}

impl CompanionApp {
    /// Create a new application instance
    fn new(companion: Companion, runtime: tokio::runtime::Runtime, view: ViewState) -> Self {
        Self {
            companion,
            runtime,
            view,
        }
    }

    /// Adopt a session already running for the store's channel
    fn resume_existing_session(&self, ctx: &egui::Context) {
        let controller = self.companion.controller.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            match controller.check_existing_session().await {
                Ok(true) => info!("Resumed running agent session"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Could not check for a running session"),
            }
            ctx.request_repaint();
        });
    }

    /// Look for a running session after the channel was edited
    fn recheck_channel(&self, ctx: &egui::Context) {
        if self.companion.controller.state() == ConnectionState::Disconnected {
            self.resume_existing_session(ctx);
        }
    }

    /// Run connect or disconnect in the background
    fn spawn_toggle(&self, ctx: &egui::Context) {
        let controller = self.companion.controller.clone();
        let store = self.companion.store.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            if let Err(e) = controller.toggle().await {
                // the controller already raised a toast for refusals
                if e.user_message().is_none() {
                    error!(error = %e, "Connection action failed");
                    store
                        .write()
                        .await
                        .dispatch(StoreAction::Notify(Notification::error(e.to_string())));
                }
            }
            ctx.request_repaint();
        });
    }

    /// Apply an event that only touches the store
    /// Returns false for events that need the controller
    fn apply_store_event(&self, event: UiEvent) -> bool {
        let action = match event {
            UiEvent::SetChannel(channel) => {
                let mut options = self.companion.store.blocking_read().options.clone();
                options.channel = channel;
                StoreAction::SetOptions(options)
            }
            UiEvent::SelectGraph(id) => StoreAction::SetSelectedGraphId(Some(id)),
            UiEvent::SelectLanguage(language) => StoreAction::SetLanguage(language),
            UiEvent::SelectVoice(voice) => StoreAction::SetVoiceType(voice),
            UiEvent::ClearNotifications => StoreAction::ClearNotifications,
            UiEvent::ToggleConnection | UiEvent::ChannelCommitted => return false,
        };
        self.companion.store.blocking_write().dispatch(action);
        true
    }
}

impl eframe::App for CompanionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let store = self.companion.store.blocking_read().clone();
        let controller = &self.companion.controller;
        let input = LayoutInput {
            store: &store,
            connection: controller.state(),
            loading: controller.is_loading(),
        };

        let events = render_app_layout(ctx, &input, &mut self.view);
        for event in events {
            match event {
                UiEvent::ToggleConnection => self.spawn_toggle(ctx),
                UiEvent::ChannelCommitted => self.recheck_channel(ctx),
                event => {
                    self.apply_store_event(event);
                }
            }
        }

        if input.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
