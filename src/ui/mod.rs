pub mod theme;
pub mod widgets;

use crate::controller::{SessionController, SubmitOutcome};
use crate::protocol::StatusState;
use crate::state::AppEvent;
use eframe::egui;
use egui::{Key, RichText};
use std::sync::mpsc::Receiver as EventReceiver;
use std::sync::Arc;
use std::time::Duration;

use theme::*;
use widgets::*;

const INPUT_ID: &str = "jarvis-text-input";

/// Continuous repaint while the orb animates, otherwise ~30 fps for
/// incoming frames.
fn repaint_delay(status: StatusState) -> Option<Duration> {
    if status.is_busy() {
        None
    } else {
        Some(Duration::from_millis(33))
    }
}

/// Consumes an Enter press under whatever modifiers are held, except Shift,
/// so the editor never also sees it as a newline.
fn take_send_key(input: &mut egui::InputState) -> bool {
    let modifiers = input.modifiers;
    !modifiers.shift && input.consume_key(modifiers, Key::Enter)
}

pub struct JarvisApp {
    pub controller: SessionController,
    pub event_rx: EventReceiver<AppEvent>,
    /// Keeps the socket task alive for the lifetime of the window.
    pub runtime: Arc<tokio::runtime::Runtime>,
    pub input: String,
}

impl JarvisApp {
    pub fn new(
        controller: SessionController,
        event_rx: EventReceiver<AppEvent>,
        runtime: Arc<tokio::runtime::Runtime>,
    ) -> Self {
        Self {
            controller,
            event_rx,
            runtime,
            input: String::new(),
        }
    }

    /// Applies every pending event in arrival order before anything is drawn.
    fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.controller.handle_event(event);
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        let status = self.controller.view().status;
        ui.horizontal(|ui| {
            status_header(ui, status);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                activity_orb(ui, status);
            });
        });
    }

    fn render_transcript(&self, ui: &mut egui::Ui) {
        let view = self.controller.view();
        if view.transcript.show_welcome() {
            welcome(ui);
            return;
        }
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for entry in view.transcript.entries() {
                    transcript_entry(ui, entry);
                    ui.add_space(6.0);
                }
            });
    }

    fn render_voice_controls(&mut self, ui: &mut egui::Ui) {
        let mic = self.controller.view().mic.clone();
        let mut toggle = false;
        let mut to_text = false;
        ui.horizontal(|ui| {
            toggle = mic_toggle(ui, &mic).clicked();
            ui.label(
                RichText::new(mic.label)
                    .color(if mic.listening { ACCENT } else { TEXT_MUTED })
                    .monospace(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                to_text = pill_button(ui, "Type instead").clicked();
            });
        });
        if toggle {
            self.controller.toggle_mic();
        }
        if to_text {
            self.controller.switch_to_text();
        }
    }

    fn render_text_controls(&mut self, ui: &mut egui::Ui) {
        let id = egui::Id::new(INPUT_ID);
        // Enter sends; Shift+Enter falls through to the editor as a newline.
        let had_focus = ui.memory(|m| m.has_focus(id));
        let enter = had_focus && ui.input_mut(take_send_key);

        let mut send = enter;
        let mut to_voice = false;
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 130.0).max(120.0);
            let response = ui.add(
                egui::TextEdit::multiline(&mut self.input)
                    .id(id)
                    .desired_rows(2)
                    .desired_width(width)
                    .hint_text("Type a message..."),
            );
            if self.controller.take_focus_request() {
                response.request_focus();
            }
            ui.vertical(|ui| {
                send |= pill_button(ui, "Send").clicked();
                to_voice = pill_button(ui, "Voice").clicked();
            });
        });

        if send {
            match self.controller.submit_text(&self.input) {
                SubmitOutcome::Sent => self.input.clear(),
                SubmitOutcome::Empty => {}
                SubmitOutcome::Offline => {
                    log::info!("[ui] not connected, message kept in the input field")
                }
            }
        }
        if to_voice {
            self.controller.switch_to_voice();
        }
    }
}

impl eframe::App for JarvisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(PANEL_BG).inner_margin(10.0))
            .show(ctx, |ui| self.render_header(ui));

        let surface = self.controller.view().surface;
        egui::TopBottomPanel::bottom("controls")
            .frame(egui::Frame::none().fill(PANEL_BG).inner_margin(10.0))
            .show(ctx, |ui| {
                if surface.voice_controls_visible {
                    self.render_voice_controls(ui);
                } else {
                    self.render_text_controls(ui);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| self.render_transcript(ui));

        match repaint_delay(self.controller.view().status) {
            None => ctx.request_repaint(),
            Some(delay) => ctx.request_repaint_after(delay),
        }
    }
}
