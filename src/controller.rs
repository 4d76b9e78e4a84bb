use crate::audio::{Advance, AudioSequencer, AudioSink, AudioState, AudioUnit, PlaybackOutcome};
use crate::mode::{ControlSurface, InputMode, MicIndicator, ModeController, VoiceCapture};
use crate::protocol::{OutboundFrame, StatusState};
use crate::session::{ConnectionState, Link};
use crate::state::AppEvent;
use crate::stream::{StreamAccumulator, StreamState};
use crate::transcript::{Role, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    /// Nothing left after trimming.
    Empty,
    /// The socket is not open; the text stays in the input field.
    Offline,
}

/// Read-only snapshot handed to the renderer.
#[derive(Debug)]
pub struct SessionView<'a> {
    pub connection: ConnectionState,
    pub status: StatusState,
    pub input_mode: InputMode,
    pub voice: VoiceCapture,
    pub mic: &'a MicIndicator,
    pub surface: ControlSurface,
    pub transcript: &'a Transcript,
    pub stream: StreamState,
    pub audio: AudioState,
    pub queued_audio: usize,
}

/// Sole owner of session state. Every mutation goes through these methods,
/// one event or user action at a time.
pub struct SessionController {
    pub(crate) connection: ConnectionState,
    pub(crate) link: Option<Link>,
    pub(crate) status: StatusState,
    pub(crate) mode: ModeController,
    pub(crate) transcript: Transcript,
    pub(crate) stream: StreamAccumulator,
    pub(crate) audio: AudioSequencer,
    sink: Box<dyn AudioSink>,
}

impl SessionController {
    pub fn new(initial_mode: InputMode, sink: Box<dyn AudioSink>) -> Self {
        Self {
            connection: ConnectionState::Connecting,
            link: None,
            status: StatusState::Online,
            mode: ModeController::new(initial_mode),
            transcript: Transcript::new(),
            stream: StreamAccumulator::new(),
            audio: AudioSequencer::new(),
            sink,
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            connection: self.connection,
            status: self.status,
            input_mode: self.mode.input_mode(),
            voice: self.mode.voice(),
            mic: self.mode.mic(),
            surface: self.mode.surface(),
            transcript: &self.transcript,
            stream: self.stream.state(),
            audio: self.audio.state(),
            queued_audio: self.audio.queued(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.connection == ConnectionState::Open && self.link.is_some()
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Connecting { generation } => self.on_connecting(generation),
            AppEvent::Connected(link) => self.on_connected(link),
            AppEvent::Disconnected { generation, reason } => {
                self.on_disconnected(generation, &reason)
            }
            AppEvent::Frame(raw) => self.dispatch_raw(&raw),
            AppEvent::PlaybackFinished { unit_id, outcome } => {
                self.on_playback_finished(unit_id, outcome)
            }
        }
    }

    /// Sends a frame on the live connection. Frames issued while closed are
    /// dropped, not queued, and are never replayed after a reconnect.
    pub fn send(&mut self, frame: OutboundFrame) -> bool {
        match &self.link {
            Some(link) if self.connection == ConnectionState::Open => {
                if link.send(frame) {
                    true
                } else {
                    log::debug!("[session] writer gone, frame dropped");
                    false
                }
            }
            _ => {
                log::debug!("[session] not connected, dropping {:?}", frame);
                false
            }
        }
    }

    /// Typed message from the text controls.
    pub fn submit_text(&mut self, raw: &str) -> SubmitOutcome {
        let text = raw.trim();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }
        if !self.is_open() {
            return SubmitOutcome::Offline;
        }
        if !self.send(OutboundFrame::UserText(text.to_string())) {
            return SubmitOutcome::Offline;
        }
        self.transcript.push(Role::User, text);
        SubmitOutcome::Sent
    }

    pub fn switch_to_text(&mut self) {
        if let Some(frame) = self.mode.switch_to_text() {
            self.send(frame);
        }
    }

    pub fn switch_to_voice(&mut self) {
        if let Some(frame) = self.mode.switch_to_voice() {
            self.send(frame);
        }
    }

    pub fn toggle_mic(&mut self) {
        match self.mode.toggle_voice() {
            Some(frame) => {
                self.send(frame);
            }
            None => log::debug!("[session] mic toggle ignored in text mode"),
        }
    }

    pub fn take_focus_request(&mut self) -> bool {
        self.mode.take_focus_request()
    }

    pub(crate) fn set_status(&mut self, status: StatusState) {
        self.status = status;
    }

    pub(crate) fn enqueue_audio(&mut self, payload: String) {
        if let Some(unit) = self.audio.enqueue(payload) {
            self.start_unit(unit);
        }
    }

    fn start_unit(&mut self, unit: AudioUnit) {
        log::debug!("[audio] playing unit {}", unit.id);
        self.set_status(StatusState::Speaking);
        self.sink.play(unit);
    }

    fn on_playback_finished(&mut self, unit_id: u64, outcome: PlaybackOutcome) {
        match self.audio.complete(unit_id, &outcome) {
            Advance::Next(unit) => self.start_unit(unit),
            Advance::Drained => self.set_status(StatusState::Online),
            Advance::Stale => log::debug!("[audio] stale completion for unit {}", unit_id),
        }
    }

    fn on_connecting(&mut self, generation: u64) {
        log::debug!("[session] connecting (generation {})", generation);
        if self.link.is_none() {
            self.connection = ConnectionState::Connecting;
        }
    }

    fn on_connected(&mut self, link: Link) {
        log::info!("[session] connected (generation {})", link.generation());
        self.link = Some(link);
        self.connection = ConnectionState::Open;
        self.set_status(StatusState::Online);
        // Capture intent is the one piece of state the server must be told
        // again after every reconnect.
        let resync = self.mode.resync_frame();
        self.send(resync);
    }

    fn on_disconnected(&mut self, generation: u64, reason: &str) {
        if let Some(link) = &self.link {
            if link.generation() != generation {
                log::debug!(
                    "[session] ignoring close for generation {} (live is {})",
                    generation,
                    link.generation()
                );
                return;
            }
        }
        log::info!("[session] disconnected: {}", reason);
        self.link = None;
        self.connection = ConnectionState::ClosedRetrying;
        self.set_status(StatusState::Error);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::audio::{AudioSink, AudioUnit};
    use crate::protocol::OutboundFrame;
    use crate::session::Link;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Records play requests; completions are fed back by the test.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub played: Arc<Mutex<Vec<AudioUnit>>>,
    }

    impl RecordingSink {
        pub fn payloads(&self) -> Vec<String> {
            self.played
                .lock()
                .unwrap()
                .iter()
                .map(|u| u.payload.clone())
                .collect()
        }

        pub fn last_id(&self) -> u64 {
            self.played.lock().unwrap().last().map(|u| u.id).unwrap()
        }
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, unit: AudioUnit) {
            self.played.lock().unwrap().push(unit);
        }
    }

    pub fn link(generation: u64) -> (Link, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Link::new(generation, tx), rx)
    }

    pub fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundFrame>) -> Vec<OutboundFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}
