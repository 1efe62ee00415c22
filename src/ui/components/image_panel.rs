//! Image generation panel

use crate::controllers::ImageController;
use crate::genai::data_url;
use crate::ui::theme::Theme;
use crate::{MuseError, Result};
use egui::{self, ColorImage, RichText, TextureHandle, TextureOptions};
use tracing::warn;

/// Decode a data URL holding a JPEG or PNG into pixels egui can upload.
pub fn decode_image(url: &str) -> Result<ColorImage> {
    let (_mime_type, bytes) = data_url::parse(url)?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| MuseError::Decode(format!("image: {}", e)))?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Texture for the image currently on screen, keyed by its data URL.
#[derive(Default)]
pub struct ImagePreview {
    source: Option<String>,
    texture: Option<TextureHandle>,
}

impl ImagePreview {
    fn texture_for(&mut self, ctx: &egui::Context, url: &str) -> Option<&TextureHandle> {
        if self.source.as_deref() != Some(url) {
            self.source = Some(url.to_string());
            self.texture = match decode_image(url) {
                Ok(pixels) => Some(ctx.load_texture("generated_image", pixels, TextureOptions::LINEAR)),
                Err(e) => {
                    warn!("Could not display generated image: {}", e);
                    None
                }
            };
        }
        self.texture.as_ref()
    }
}

pub struct ImagePanel<'a> {
    image: &'a mut ImageController,
    preview: &'a mut ImagePreview,
    theme: &'a Theme,
}

impl<'a> ImagePanel<'a> {
    pub fn new(image: &'a mut ImageController, preview: &'a mut ImagePreview, theme: &'a Theme) -> Self {
        Self { image, preview, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Describe the image you want to create")
                .color(self.theme.text_secondary),
        );

        let is_loading = self.image.is_loading();
        let prompt = egui::TextEdit::multiline(&mut self.image.prompt)
            .hint_text("A watercolor fox in a snowy forest...")
            .desired_rows(3)
            .desired_width(f32::INFINITY)
            .id(egui::Id::new("image_prompt"));
        let response = ui.add_enabled(!is_loading, prompt);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, !is_loading, "Image prompt")
        });

        ui.add_space(self.theme.spacing_sm);

        let can_submit = self.image.can_submit();
        let button = egui::Button::new(if is_loading { "Generating..." } else { "Generate" })
            .rounding(self.theme.button_rounding)
            .fill(if can_submit { self.theme.primary } else { self.theme.bg_tertiary });
        let generate = ui.add_enabled(can_submit, button);
        generate.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_submit, "Generate image")
        });
        if generate.clicked() {
            self.image.submit();
        }

        ui.add_space(self.theme.spacing);

        if is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Generating image...").color(self.theme.text_muted));
            });
        }

        if let Some(error) = self.image.error() {
            let response = ui.label(RichText::new(error).color(self.theme.error));
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Label, true, format!("Image error: {}", error))
            });
        }

        if let Some(url) = self.image.image_url() {
            match self.preview.texture_for(ui.ctx(), url) {
                Some(texture) => {
                    let max_width = ui.available_width().min(512.0);
                    let image = egui::Image::new(texture)
                        .max_width(max_width)
                        .rounding(self.theme.card_rounding);
                    let response = ui.add(image);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Other, true, "Generated image")
                    });
                }
                None => {
                    ui.label(
                        RichText::new("The generated image could not be displayed.")
                            .color(self.theme.error),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png_data_url() {
        let mut bytes = Vec::new();
        let pixels = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(pixels)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&data_url::encode("image/png", &bytes)).unwrap();
        assert_eq!(decoded.size, [2, 3]);
        assert_eq!(decoded.pixels[0], egui::Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let url = data_url::encode("image/jpeg", b"not an image");
        assert!(matches!(decode_image(&url), Err(MuseError::Decode(_))));
    }
}
