mod app;
mod config;
mod context;
mod decode;
mod error;
mod histogram;
mod loader;
mod metadata;
mod scanner;
mod sort_order;
mod thumbs;
mod view;

use std::path::PathBuf;

use app::GlimpseApp;
use config::AppConfig;

const WINDOW_ICON_PNG: &[u8] = include_bytes!("../assets/glimpse-icon-128.png");

fn build_window_icon() -> egui::IconData {
    let icon = image::load_from_memory_with_format(WINDOW_ICON_PNG, image::ImageFormat::Png)
        .expect("embedded window icon should decode as PNG")
        .into_rgba8();
    let (width, height) = icon.dimensions();

    egui::IconData {
        rgba: icon.into_raw(),
        width,
        height,
    }
}

/// One optional positional argument: the file or directory to open.
fn parse_args() -> Option<PathBuf> {
    let mut args = pico_args::Arguments::from_env();
    args.opt_free_from_str().ok().flatten()
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let initial_path = parse_args();
    let config = AppConfig::load();

    let width = config.window_width.unwrap_or(1200.0);
    let height = config.window_height.unwrap_or(800.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("glimpse")
            .with_app_id("glimpse")
            .with_icon(build_window_icon())
            .with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "glimpse",
        native_options,
        Box::new(|cc| Ok(Box::new(GlimpseApp::new(cc, config, initial_path)))),
    )
}

#[cfg(test)]
mod tests {
    #[test]
    fn window_icon_buffer_matches_declared_dimensions() {
        let icon = super::build_window_icon();
        assert_eq!(icon.width, 128);
        assert_eq!(icon.height, 128);
        assert_eq!(icon.rgba.len(), (icon.width * icon.height * 4) as usize);
    }
}
