//! GUI implementation with egui/eframe
//!
//! One window with three panels (chat, image, humanizer) switched from the
//! header. Panels talk to the generation worker only through their
//! controllers.

mod app;
pub mod components;
mod state;
mod theme;

pub use app::StudioApp;
pub use state::{AppState, View};
pub use theme::Theme;

/// Run the studio window until it is closed
pub fn run(state: AppState) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([600.0, 420.0])
            .with_title("Muse"),
        ..Default::default()
    };

    eframe::run_native(
        "Muse",
        options,
        Box::new(move |cc| Ok(Box::new(StudioApp::new(cc, state)))),
    )
}
