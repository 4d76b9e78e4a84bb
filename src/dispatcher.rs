use crate::controller::SessionController;
use crate::protocol::{decode_frame, InboundFrame, StatusState};
use crate::stream::StreamStep;
use crate::transcript::Role;

const PREVIEW_CHARS: usize = 80;

fn preview(raw: &str) -> String {
    let mut out: String = raw.chars().take(PREVIEW_CHARS).collect();
    if raw.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

impl SessionController {
    /// Decodes and applies one inbound text frame. Malformed frames are
    /// logged and dropped without touching any state.
    pub fn dispatch_raw(&mut self, raw: &str) {
        match decode_frame(raw) {
            Ok(frame) => self.dispatch(frame),
            Err(e) => log::warn!("[dispatch] dropping frame: {} ({})", e, preview(raw)),
        }
    }

    /// Routes a decoded frame to the subsystem that owns it. Each frame is
    /// fully applied before this returns.
    pub fn dispatch(&mut self, frame: InboundFrame) {
        log::trace!("[dispatch] {}", frame.kind());
        match frame {
            InboundFrame::VoiceInput { text } => {
                self.transcript.push(Role::User, text);
            }
            InboundFrame::Status { state } => {
                self.set_status(state);
                if state == StatusState::Listening {
                    self.mode.reset_mic_label();
                }
            }
            InboundFrame::StreamStart => {
                if let StreamStep::Started {
                    replaced: Some(entry),
                    ..
                } = self.stream.start(&mut self.transcript)
                {
                    log::warn!(
                        "[dispatch] stream_start while entry {} was live; finalized it in place",
                        entry
                    );
                }
                self.set_status(StatusState::Thinking);
            }
            InboundFrame::Token { text } => {
                if self.stream.push_token(&mut self.transcript, &text) == StreamStep::Ignored {
                    log::debug!("[dispatch] token with no live stream ignored");
                }
            }
            InboundFrame::StreamEnd => {
                if self.stream.finish(&mut self.transcript) == StreamStep::Ignored {
                    log::debug!("[dispatch] stream_end with no live stream ignored");
                }
            }
            InboundFrame::ToolResult { text } => {
                self.transcript.push(Role::Tool, text);
            }
            InboundFrame::Audio { data } => self.enqueue_audio(data),
            InboundFrame::Unknown => {
                log::debug!("[dispatch] ignoring frame of unknown type");
            }
        }
    }
}
