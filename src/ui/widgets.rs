use eframe::egui;
use egui::{vec2, Color32, CursorIcon, FontId, Rect, RichText, Sense, Stroke};

use super::theme::*;
use crate::mode::MicIndicator;
use crate::protocol::StatusState;
use crate::transcript::TranscriptEntry;

pub fn status_header(ui: &mut egui::Ui, status: StatusState) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(10.0, 10.0), Sense::hover());
        ui.painter()
            .circle_filled(rect.center(), 4.0, status_color(status));
        let text_color = if status.is_active() { TEXT_COLOR } else { TEXT_MUTED };
        ui.label(
            RichText::new(status.label())
                .color(text_color)
                .font(FontId::monospace(12.0)),
        );
    });
}

/// Pulsing orb; only animates while listening, thinking or speaking. The
/// app keeps repainting continuously in those states.
pub fn activity_orb(ui: &mut egui::Ui, status: StatusState) {
    let size = 56.0;
    let (rect, _) = ui.allocate_exact_size(vec2(size, size), Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }
    let center = rect.center();
    let color = status_color(status);
    let base = size * 0.28;

    if status.is_busy() {
        let t = ui.input(|i| i.time) as f32;
        let speed = match status {
            StatusState::Speaking => 6.0,
            StatusState::Thinking => 4.0,
            _ => 2.5,
        };
        let pulse = (t * speed).sin() * 0.5 + 0.5;
        let halo = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 60);
        ui.painter()
            .circle_filled(center, base + 6.0 + pulse * 6.0, halo);
    }
    ui.painter()
        .circle_stroke(center, base + 3.0, Stroke::new(1.5, color));
    ui.painter().circle_filled(center, base, color.gamma_multiply(0.8));
}

pub fn welcome(ui: &mut egui::Ui) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(RichText::new("J.A.R.V.I.S").size(22.0).color(ACCENT));
        ui.label(
            RichText::new("Speak or switch to text to start a conversation.").color(TEXT_MUTED),
        );
    });
}

pub fn transcript_entry(ui: &mut egui::Ui, entry: &TranscriptEntry) {
    let palette = bubble_palette(entry.role);
    egui::Frame::none()
        .fill(palette.fill)
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(10.0, 6.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(entry.role.label())
                    .color(palette.label)
                    .font(FontId::monospace(11.0)),
            );
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(&entry.text).color(TEXT_COLOR));
                if entry.streaming {
                    streaming_cursor(ui);
                }
            });
        });
}

fn streaming_cursor(ui: &mut egui::Ui) {
    let (rect, _) = ui.allocate_exact_size(vec2(7.0, 14.0), Sense::hover());
    let visible = (ui.input(|i| i.time) * 2.0) as i64 % 2 == 0;
    if visible {
        ui.painter().rect_filled(rect, 1.0, ACCENT);
    }
    ui.ctx().request_repaint_after(std::time::Duration::from_millis(250));
}

/// Mic toggle drawn as a capsule glyph; paused adds a strike-through.
pub fn mic_toggle(ui: &mut egui::Ui, mic: &MicIndicator) -> egui::Response {
    let size = 44.0;
    let radius = size / 2.0;
    let (rect, response) = ui.allocate_exact_size(vec2(size, size), Sense::click());

    if ui.is_rect_visible(rect) {
        let center = rect.center();
        let hovered = response.hovered();
        let (fill, ring) = if mic.listening {
            (if hovered { ACCENT_HOVER } else { ACCENT }, ACCENT_RING)
        } else {
            let gray = Color32::from_rgb(0x3a, 0x3d, 0x45);
            let gray_hover = Color32::from_rgb(0x4a, 0x4d, 0x55);
            (if hovered { gray_hover } else { gray }, BTN_BORDER)
        };
        ui.painter()
            .circle_stroke(center, radius, Stroke::new(1.5, ring));
        ui.painter().circle_filled(center, radius - 2.5, fill);

        let icon = Color32::from_rgb(0xf3, 0xf4, 0xf6);
        let capsule = Rect::from_center_size(center + vec2(0.0, -3.0), vec2(8.0, 13.0));
        ui.painter().rect_filled(capsule, 4.0, icon);
        ui.painter().line_segment(
            [center + vec2(0.0, 4.0), center + vec2(0.0, 9.0)],
            Stroke::new(1.6, icon),
        );
        ui.painter().line_segment(
            [center + vec2(-4.5, 9.5), center + vec2(4.5, 9.5)],
            Stroke::new(1.6, icon),
        );
        if !mic.listening {
            ui.painter().line_segment(
                [center + vec2(-9.0, -9.0), center + vec2(9.0, 9.0)],
                Stroke::new(2.0, RED),
            );
        }
    }
    response.on_hover_cursor(CursorIcon::PointingHand)
}

pub fn pill_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.add(
        egui::Button::new(RichText::new(text).color(TEXT_COLOR))
            .fill(BTN_BG)
            .stroke(Stroke::new(1.0, BTN_BORDER))
            .rounding(12.0),
    )
    .on_hover_cursor(CursorIcon::PointingHand)
}
