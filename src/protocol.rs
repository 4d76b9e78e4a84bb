use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Server-reported assistant state, also used as the status indicator.
///
/// Unrecognized states fall back to `Online`, which renders as "SYSTEM ONLINE".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Listening,
    Thinking,
    Speaking,
    Error,
    #[serde(other)]
    Online,
}

impl StatusState {
    pub fn label(self) -> &'static str {
        match self {
            StatusState::Online => "SYSTEM ONLINE",
            StatusState::Listening => "LISTENING…",
            StatusState::Thinking => "PROCESSING…",
            StatusState::Speaking => "SPEAKING…",
            StatusState::Error => "DISCONNECTED",
        }
    }

    /// The status dot and label are lit for everything except `Error`.
    pub fn is_active(self) -> bool {
        self != StatusState::Error
    }

    /// States that animate the activity orb.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            StatusState::Listening | StatusState::Thinking | StatusState::Speaking
        )
    }
}

/// Frames received from the assistant server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Server-side speech recognition produced user text.
    VoiceInput { text: String },
    Status { state: StatusState },
    StreamStart,
    Token { text: String },
    StreamEnd,
    ToolResult { text: String },
    /// Base64-encoded, self-describing audio (WAV).
    Audio { data: String },
    /// Any `type` this client does not understand.
    #[serde(other)]
    Unknown,
}

impl InboundFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundFrame::VoiceInput { .. } => "voice_input",
            InboundFrame::Status { .. } => "status",
            InboundFrame::StreamStart => "stream_start",
            InboundFrame::Token { .. } => "token",
            InboundFrame::StreamEnd => "stream_end",
            InboundFrame::ToolResult { .. } => "tool_result",
            InboundFrame::Audio { .. } => "audio",
            InboundFrame::Unknown => "unknown",
        }
    }
}

/// Frames sent to the assistant server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    UserText(String),
    VoiceToggle { enabled: bool },
}

impl OutboundFrame {
    pub fn to_value(&self) -> Value {
        match self {
            OutboundFrame::UserText(text) => json!({ "text": text }),
            OutboundFrame::VoiceToggle { enabled } => {
                json!({ "type": "voice_toggle", "enabled": enabled })
            }
        }
    }

    pub fn encode(&self) -> String {
        self.to_value().to_string()
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn decode_frame(raw: &str) -> Result<InboundFrame, FrameError> {
    Ok(serde_json::from_str(raw)?)
}
