use crate::protocol::StatusState;
use crate::transcript::Role;
use eframe::egui::Color32;

pub const TEXT_COLOR: Color32 = Color32::from_rgb(0xe6, 0xe6, 0xe6);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x9c, 0xa3, 0xaf);
pub const BTN_BG: Color32 = Color32::from_rgb(0x25, 0x28, 0x30);
pub const BTN_BORDER: Color32 = Color32::from_rgb(0x2c, 0x2f, 0x36);
pub const PANEL_BG: Color32 = Color32::from_rgb(0x0b, 0x10, 0x1a);
pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

pub const ACCENT: Color32 = Color32::from_rgb(0x00, 0xd4, 0xff);
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(0x33, 0xdd, 0xff);
pub const ACCENT_RING: Color32 = Color32::from_rgb(0x00, 0x8c, 0xa8);

pub const LISTENING: Color32 = Color32::from_rgb(0x4d, 0xb8, 0x8a);
pub const THINKING: Color32 = Color32::from_rgb(0xd4, 0x93, 0x45);
pub const SPEAKING: Color32 = Color32::from_rgb(0x9d, 0x6e, 0xc0);

#[derive(Clone, Copy)]
pub struct BubblePalette {
    pub fill: Color32,
    pub label: Color32,
}

pub fn status_color(state: StatusState) -> Color32 {
    match state {
        StatusState::Listening => LISTENING,
        StatusState::Thinking => THINKING,
        StatusState::Speaking => SPEAKING,
        StatusState::Error => RED,
        StatusState::Online => ACCENT,
    }
}

pub fn bubble_palette(role: Role) -> BubblePalette {
    match role {
        Role::User => BubblePalette {
            fill: Color32::from_rgb(0x1c, 0x2a, 0x3a),
            label: ACCENT,
        },
        Role::Assistant => BubblePalette {
            fill: Color32::from_rgb(0x16, 0x1b, 0x26),
            label: Color32::from_rgb(0x7d, 0xe3, 0xff),
        },
        Role::Tool => BubblePalette {
            fill: Color32::from_rgb(0x1f, 0x1d, 0x14),
            label: THINKING,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_status_dot_is_red() {
        assert_eq!(status_color(StatusState::Error), RED);
        assert_ne!(status_color(StatusState::Online), RED);
    }
}
