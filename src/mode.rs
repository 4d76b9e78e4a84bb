use crate::protocol::OutboundFrame;

pub const MIC_LABEL_LISTENING: &str = "LISTENING…";
pub const MIC_LABEL_PAUSED: &str = "PAUSED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Voice,
    Text,
}

/// Voice-capture intent. The server owns actual capture; this is what the
/// client last asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCapture {
    Enabled,
    Paused,
}

impl VoiceCapture {
    pub fn is_enabled(self) -> bool {
        self == VoiceCapture::Enabled
    }

    fn from_enabled(enabled: bool) -> Self {
        if enabled {
            VoiceCapture::Enabled
        } else {
            VoiceCapture::Paused
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicIndicator {
    /// Which icon is shown: mic-on when true, mic-off when false.
    pub listening: bool,
    pub label: &'static str,
}

/// Which control surface is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSurface {
    pub voice_controls_visible: bool,
    pub text_controls_active: bool,
}

#[derive(Debug)]
pub struct ModeController {
    input_mode: InputMode,
    voice: VoiceCapture,
    mic: MicIndicator,
    focus_text_input: bool,
}

impl ModeController {
    /// Voice mode starts with capture enabled; text mode starts paused.
    pub fn new(initial: InputMode) -> Self {
        let voice = match initial {
            InputMode::Voice => VoiceCapture::Enabled,
            InputMode::Text => VoiceCapture::Paused,
        };
        Self {
            input_mode: initial,
            voice,
            mic: mic_indicator(voice),
            focus_text_input: initial == InputMode::Text,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn voice(&self) -> VoiceCapture {
        self.voice
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice.is_enabled()
    }

    pub fn mic(&self) -> &MicIndicator {
        &self.mic
    }

    pub fn surface(&self) -> ControlSurface {
        ControlSurface {
            voice_controls_visible: self.input_mode == InputMode::Voice,
            text_controls_active: self.input_mode == InputMode::Text,
        }
    }

    /// Returns true once after switching to text mode so the renderer can
    /// focus the input field.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_text_input)
    }

    /// Frame that re-asserts the current capture intent after a reconnect.
    pub fn resync_frame(&self) -> OutboundFrame {
        OutboundFrame::VoiceToggle {
            enabled: self.voice_enabled(),
        }
    }

    /// Switches to typed input. Capture is forced off; a frame is returned
    /// only when that changed anything.
    pub fn switch_to_text(&mut self) -> Option<OutboundFrame> {
        self.input_mode = InputMode::Text;
        self.focus_text_input = true;
        if self.voice_enabled() {
            Some(self.set_voice(false))
        } else {
            None
        }
    }

    pub fn switch_to_voice(&mut self) -> Option<OutboundFrame> {
        self.input_mode = InputMode::Voice;
        self.focus_text_input = false;
        if self.voice_enabled() {
            None
        } else {
            Some(self.set_voice(true))
        }
    }

    /// Mic button. Only reachable from the voice controls, so it is refused in
    /// text mode to keep capture off there.
    pub fn toggle_voice(&mut self) -> Option<OutboundFrame> {
        if self.input_mode == InputMode::Text {
            return None;
        }
        let enabled = !self.voice_enabled();
        Some(self.set_voice(enabled))
    }

    /// A server `listening` status relabels the mic without touching the icon.
    pub fn reset_mic_label(&mut self) {
        self.mic.label = MIC_LABEL_LISTENING;
    }

    fn set_voice(&mut self, enabled: bool) -> OutboundFrame {
        self.voice = VoiceCapture::from_enabled(enabled);
        self.mic = mic_indicator(self.voice);
        OutboundFrame::VoiceToggle { enabled }
    }
}

fn mic_indicator(voice: VoiceCapture) -> MicIndicator {
    match voice {
        VoiceCapture::Enabled => MicIndicator {
            listening: true,
            label: MIC_LABEL_LISTENING,
        },
        VoiceCapture::Paused => MicIndicator {
            listening: false,
            label: MIC_LABEL_PAUSED,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle(enabled: bool) -> Option<OutboundFrame> {
        Some(OutboundFrame::VoiceToggle { enabled })
    }

    #[test]
    fn voice_text_voice_converges_with_two_toggles() {
        let mut mode = ModeController::new(InputMode::Voice);

        let first = mode.switch_to_text();
        assert_eq!(first, toggle(false));
        assert_eq!(mode.input_mode(), InputMode::Text);
        assert!(!mode.voice_enabled());

        let second = mode.switch_to_voice();
        assert_eq!(second, toggle(true));
        assert_eq!(mode.input_mode(), InputMode::Voice);
        assert!(mode.voice_enabled());
        assert_eq!(mode.mic().label, MIC_LABEL_LISTENING);
    }

    #[test]
    fn switching_to_text_when_already_paused_sends_nothing() {
        let mut mode = ModeController::new(InputMode::Voice);
        assert_eq!(mode.toggle_voice(), toggle(false));
        assert_eq!(mode.switch_to_text(), None);
        assert!(!mode.voice_enabled());

        // Returning to voice turns capture back on even though the user paused it.
        assert_eq!(mode.switch_to_voice(), toggle(true));
    }

    #[test]
    fn text_mode_never_holds_capture_enabled() {
        let mut mode = ModeController::new(InputMode::Voice);
        mode.switch_to_text();
        assert_eq!(mode.toggle_voice(), None);
        assert_eq!(mode.input_mode(), InputMode::Text);
        assert!(!mode.voice_enabled());
    }

    #[test]
    fn surfaces_follow_input_mode() {
        let mut mode = ModeController::new(InputMode::Voice);
        assert!(mode.surface().voice_controls_visible);
        assert!(!mode.take_focus_request());

        mode.switch_to_text();
        let surface = mode.surface();
        assert!(!surface.voice_controls_visible);
        assert!(surface.text_controls_active);
        assert!(mode.take_focus_request());
        assert!(!mode.take_focus_request());
    }

    #[test]
    fn mic_indicator_tracks_toggle() {
        let mut mode = ModeController::new(InputMode::Voice);
        mode.toggle_voice();
        assert_eq!(
            mode.mic(),
            &MicIndicator {
                listening: false,
                label: MIC_LABEL_PAUSED
            }
        );

        mode.reset_mic_label();
        assert!(!mode.mic().listening);
        assert_eq!(mode.mic().label, MIC_LABEL_LISTENING);
    }

    #[test]
    fn resync_reflects_current_intent() {
        let mut mode = ModeController::new(InputMode::Text);
        assert_eq!(mode.resync_frame(), OutboundFrame::VoiceToggle { enabled: false });
        mode.switch_to_voice();
        assert_eq!(mode.resync_frame(), OutboundFrame::VoiceToggle { enabled: true });
    }
}
