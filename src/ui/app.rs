//! Main application struct and eframe integration

use crate::ui::components::{ChatPanel, HumanizerPanel, ImagePanel, ImagePreview};
use crate::ui::state::{AppState, View};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use tracing::info;

pub struct StudioApp {
    state: AppState,
    theme: Theme,
    preview: ImagePreview,
}

impl StudioApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);
        Self::with_state(state, theme)
    }

    /// Build the app without an eframe context, e.g. inside a test harness.
    pub fn with_state(state: AppState, theme: Theme) -> Self {
        Self {
            state,
            theme,
            preview: ImagePreview::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Poll events and draw one frame.
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.state.poll_events();

        self.show_header(ctx);
        self.show_footer(ctx);
        self.show_content(ctx);

        if self.state.is_busy() {
            ctx.request_repaint();
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Muse")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.add_space(self.theme.spacing);

                    for view in View::ALL {
                        let selected = self.state.view == view;
                        let text = RichText::new(view.title()).color(if selected {
                            self.theme.primary
                        } else {
                            self.theme.text_secondary
                        });
                        let response = ui.selectable_label(selected, text);
                        response.widget_info(|| {
                            egui::WidgetInfo::selected(
                                egui::WidgetType::SelectableLabel,
                                true,
                                selected,
                                format!("{} tab", view.title()),
                            )
                        });
                        if response.clicked() {
                            self.state.set_view(view);
                        }
                    }

                    if !self.state.worker_running() {
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(RichText::new("Offline").color(self.theme.error));
                        });
                    }
                });
            });
    }

    fn show_footer(&self, ctx: &egui::Context) {
        TopBottomPanel::bottom("footer")
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(6.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("Powered by Google Gemini")
                            .size(11.0)
                            .color(self.theme.text_muted),
                    );
                });
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary).inner_margin(self.theme.spacing))
            .show(ctx, |ui| match self.state.view {
                View::Chat => ChatPanel::new(&mut self.state.chat, &self.theme).show(ui),
                View::Image => {
                    ImagePanel::new(&mut self.state.image, &mut self.preview, &self.theme).show(ui)
                }
                View::Humanizer => {
                    HumanizerPanel::new(&mut self.state.humanizer, &self.theme).show(ui)
                }
            });
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Muse shutting down");
        self.state.shutdown();
    }
}
