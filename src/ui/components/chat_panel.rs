//! Chat panel
//!
//! Message list with per-message speech buttons, and the input row.

use crate::controllers::{ChatController, SlotState, WELCOME_MESSAGE};
use crate::messages::ChatMessage;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, Key, Layout, RichText, Vec2};

pub struct ChatPanel<'a> {
    chat: &'a mut ChatController,
    theme: &'a Theme,
}

impl<'a> ChatPanel<'a> {
    pub fn new(chat: &'a mut ChatController, theme: &'a Theme) -> Self {
        Self { chat, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::TopBottomPanel::bottom("chat_input")
            .frame(egui::Frame::none().inner_margin(self.theme.spacing_sm))
            .show_inside(ui, |ui| {
                self.show_input_row(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show_inside(ui, |ui| {
                self.show_messages(ui);
            });
    }

    fn show_messages(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("chat_messages")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing_sm);
                self.show_bubble(ui, &ChatMessage::model(WELCOME_MESSAGE), "Welcome message", None);

                let mut toggled = None;
                for (slot, message) in self.chat.messages().iter().enumerate() {
                    ui.add_space(self.theme.spacing_sm);
                    let label = if message.is_user() {
                        format!("User message: {}", message.content)
                    } else {
                        format!("Model response: {}", message.content)
                    };
                    let speech = (!message.is_user()).then(|| (slot, self.chat.slot_state(slot)));
                    if self.show_bubble(ui, message, &label, speech) {
                        toggled = Some(slot);
                    }
                }
                if let Some(slot) = toggled {
                    self.chat.toggle_speech(slot);
                }

                if self.chat.is_loading() {
                    ui.add_space(self.theme.spacing_sm);
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Thinking...").color(self.theme.text_muted));
                    });
                }

                if let Some(error) = self.chat.last_error() {
                    ui.add_space(self.theme.spacing_sm);
                    let response = ui.label(RichText::new(error).color(self.theme.error));
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, format!("Chat error: {}", error))
                    });
                }
                if self.chat.can_retry() {
                    let retry = ui.add(egui::Button::new("Retry").rounding(self.theme.button_rounding));
                    retry.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Retry reply")
                    });
                    if retry.clicked() {
                        self.chat.retry();
                    }
                }
                ui.add_space(self.theme.spacing);
            });
    }

    /// Draw one bubble. Returns true when its speech button was clicked.
    fn show_bubble(
        &self,
        ui: &mut egui::Ui,
        message: &ChatMessage,
        label: &str,
        speech: Option<(usize, SlotState)>,
    ) -> bool {
        let is_user = message.is_user();
        let (fill, text_color) = if is_user {
            (self.theme.user_bubble, Color32::WHITE)
        } else {
            (self.theme.model_bubble, self.theme.text_primary)
        };
        let layout = if is_user {
            Layout::right_to_left(Align::TOP)
        } else {
            Layout::left_to_right(Align::TOP)
        };
        let max_width = ui.available_width() * 0.75;

        let mut clicked = false;
        ui.with_layout(layout, |ui| {
            egui::Frame::none()
                .fill(fill)
                .rounding(self.theme.card_rounding)
                .inner_margin(Vec2::new(self.theme.spacing, self.theme.spacing_sm))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    let response = ui.label(RichText::new(&message.content).color(text_color));
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, label)
                    });
                });

            if let Some((slot, state)) = speech {
                clicked = self.show_speech_button(ui, slot, state);
            }
        });
        clicked
    }

    fn show_speech_button(&self, ui: &mut egui::Ui, slot: usize, state: SlotState) -> bool {
        let (icon, tooltip) = match state {
            SlotState::Idle => ("🔊", "Read aloud"),
            SlotState::Loading => ("⏳", "Preparing audio, click to cancel"),
            SlotState::Playing => ("⏹", "Stop"),
        };
        let button = egui::Button::new(RichText::new(icon).size(14.0))
            .min_size(Vec2::splat(28.0))
            .rounding(self.theme.button_rounding);

        let response = ui.add(button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, format!("Speech for message {}", slot))
        });
        if state == SlotState::Playing || state == SlotState::Loading {
            ui.ctx().request_repaint();
        }
        response.on_hover_text(tooltip).clicked()
    }

    fn show_input_row(&mut self, ui: &mut egui::Ui) {
        let is_loading = self.chat.is_loading();

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.chat.use_low_latency, "Low latency")
                .on_hover_text("Use the faster model");
        });

        ui.horizontal(|ui| {
            let available_width = ui.available_width() - 60.0;
            let text_edit = egui::TextEdit::singleline(&mut self.chat.input)
                .hint_text("Type a message...")
                .desired_width(available_width)
                .margin(egui::Margin::symmetric(12.0, 8.0))
                .id(egui::Id::new("chat_input_text"));

            let response = ui.add_enabled(!is_loading, text_edit);
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, !is_loading, "Message input")
            });

            let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if enter_pressed && self.chat.submit() {
                response.request_focus();
            }

            let can_send = self.chat.can_submit();
            let button = egui::Button::new(RichText::new("➤").size(18.0).color(Color32::WHITE))
                .min_size(Vec2::splat(40.0))
                .rounding(self.theme.button_rounding)
                .fill(if can_send { self.theme.primary } else { self.theme.text_muted });

            let send = ui.add_enabled(can_send, button);
            send.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
            });
            if send.on_hover_text("Send message (Enter)").clicked() {
                self.chat.submit();
            }
        });
    }
}
