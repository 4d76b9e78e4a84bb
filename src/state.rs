use crate::audio::PlaybackOutcome;
use crate::session::Link;

/// Events sent from the socket task and the playback thread to the UI thread.
#[derive(Debug)]
pub enum AppEvent {
    /// A new connection attempt started.
    Connecting { generation: u64 },
    /// The socket is open; outbound frames go through `Link` until the
    /// matching `Disconnected`.
    Connected(Link),
    /// The connection closed or the attempt failed; a retry is scheduled.
    Disconnected { generation: u64, reason: String },
    /// Raw text frame, decoded by the dispatcher.
    Frame(String),
    PlaybackFinished {
        unit_id: u64,
        outcome: PlaybackOutcome,
    },
}
