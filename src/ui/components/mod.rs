//! Panels of the studio

mod chat_panel;
mod humanizer_panel;
mod image_panel;

pub use chat_panel::ChatPanel;
pub use humanizer_panel::HumanizerPanel;
pub use image_panel::{decode_image, ImagePanel, ImagePreview};
