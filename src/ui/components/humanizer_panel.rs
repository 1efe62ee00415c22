//! Humanizer panel
//!
//! Rewrites pasted text in a chosen tone.

use crate::controllers::HumanizerController;
use crate::genai::Tone;
use crate::ui::theme::Theme;
use egui::{self, RichText};

pub struct HumanizerPanel<'a> {
    humanizer: &'a mut HumanizerController,
    theme: &'a Theme,
}

impl<'a> HumanizerPanel<'a> {
    pub fn new(humanizer: &'a mut HumanizerController, theme: &'a Theme) -> Self {
        Self { humanizer, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Paste AI-generated text to make it sound natural")
                .color(self.theme.text_secondary),
        );

        let is_loading = self.humanizer.is_loading();
        let input = egui::TextEdit::multiline(&mut self.humanizer.input)
            .hint_text("Paste text here...")
            .desired_rows(6)
            .desired_width(f32::INFINITY)
            .id(egui::Id::new("humanizer_input"));
        let response = ui.add_enabled(!is_loading, input);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, !is_loading, "Text to humanize")
        });

        ui.add_space(self.theme.spacing_sm);
        self.show_tone_picker(ui, is_loading);
        ui.add_space(self.theme.spacing_sm);

        let can_submit = self.humanizer.can_submit();
        let button = egui::Button::new(if is_loading { "Humanizing..." } else { "Humanize" })
            .rounding(self.theme.button_rounding)
            .fill(if can_submit { self.theme.primary } else { self.theme.bg_tertiary });
        let humanize = ui.add_enabled(can_submit, button);
        humanize.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_submit, "Humanize text")
        });
        if humanize.clicked() {
            self.humanizer.submit();
        }

        ui.add_space(self.theme.spacing);

        if is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Rewriting...").color(self.theme.text_muted));
            });
        }

        if let Some(error) = self.humanizer.error() {
            let response = ui.label(RichText::new(error).color(self.theme.error));
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Label, true, format!("Humanizer error: {}", error))
            });
        }

        if let Some(output) = self.humanizer.output() {
            egui::Frame::none()
                .fill(self.theme.bg_secondary)
                .rounding(self.theme.card_rounding)
                .inner_margin(self.theme.spacing)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("Result").strong().color(self.theme.text_primary));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let copy = ui.button("📋");
                            copy.widget_info(|| {
                                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Copy result")
                            });
                            if copy.on_hover_text("Copy to clipboard").clicked() {
                                ui.ctx().copy_text(output.to_string());
                            }
                        });
                    });
                    let response = ui.label(RichText::new(output).color(self.theme.text_primary));
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, format!("Humanized text: {}", output))
                    });
                });
        }
    }

    fn show_tone_picker(&mut self, ui: &mut egui::Ui, is_loading: bool) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Tone").color(self.theme.text_secondary));
            ui.add_enabled_ui(!is_loading, |ui| {
                for tone in Tone::ALL {
                    let selected = self.humanizer.tone == tone;
                    let response = ui.selectable_label(selected, tone.label());
                    response.widget_info(|| {
                        egui::WidgetInfo::selected(
                            egui::WidgetType::SelectableLabel,
                            !is_loading,
                            selected,
                            format!("Tone: {}", tone.label()),
                        )
                    });
                    if response.clicked() {
                        self.humanizer.tone = tone;
                    }
                }
            });
        });
    }
}
