#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use egui::{vec2, ViewportBuilder};
use jarvis::audio::playback;
use jarvis::controller::SessionController;
use jarvis::mode::InputMode;
use jarvis::session::{socket, ConnectionConfig};
use jarvis::state::AppEvent;
use jarvis::{settings, ui};
use std::sync::Arc;

fn main() {
    env_logger::init();

    let settings = settings::load();
    let (event_tx, event_rx) = std::sync::mpsc::channel::<AppEvent>();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(e) => {
            eprintln!("[jarvis] failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let config = ConnectionConfig::from_settings(&settings);
    log::info!("[jarvis] assistant endpoint {}", config.url);
    runtime.spawn(socket::run_connection(config, event_tx.clone()));

    let sink = playback::open_sink(&settings.output_device, event_tx);

    let initial_mode = if settings.start_in_text_mode {
        InputMode::Text
    } else {
        InputMode::Voice
    };
    let controller = SessionController::new(initial_mode, sink);

    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Jarvis")
            .with_inner_size(vec2(420.0, 620.0))
            .with_min_inner_size(vec2(320.0, 360.0)),
        ..Default::default()
    };

    log::info!("[jarvis] starting eframe...");

    let result = eframe::run_native(
        "Jarvis",
        native_options,
        Box::new(move |cc| {
            if settings.theme == "light" {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            } else {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
            }
            Ok(Box::new(ui::JarvisApp::new(controller, event_rx, runtime)))
        }),
    );
    if let Err(e) = result {
        eprintln!("[jarvis] failed to start eframe: {}", e);
        std::process::exit(1);
    }
}
