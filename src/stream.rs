use crate::transcript::{Role, Transcript};

/// Lifecycle of the single token-streamed assistant response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Idle,
    /// `entry` is the transcript index being extended.
    Streaming { entry: usize },
}

/// Result of feeding one stream frame to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStep {
    Started {
        entry: usize,
        /// A previous stream that was still live and got finalized in place.
        replaced: Option<usize>,
    },
    Appended {
        entry: usize,
    },
    Finished {
        entry: usize,
    },
    /// `token` or `stream_end` with no live stream.
    Ignored,
}

#[derive(Debug, Default)]
pub struct StreamAccumulator {
    state: StreamState,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Opens a new assistant entry. A stream that is still live is closed
    /// first, keeping whatever text it had.
    pub fn start(&mut self, transcript: &mut Transcript) -> StreamStep {
        let replaced = match self.state {
            StreamState::Streaming { entry } => {
                transcript.finalize(entry);
                Some(entry)
            }
            StreamState::Idle => None,
        };
        let entry = transcript.push_streaming(Role::Assistant);
        self.state = StreamState::Streaming { entry };
        StreamStep::Started { entry, replaced }
    }

    pub fn push_token(&mut self, transcript: &mut Transcript, token: &str) -> StreamStep {
        match self.state {
            StreamState::Streaming { entry } => {
                transcript.append_text(entry, token);
                StreamStep::Appended { entry }
            }
            StreamState::Idle => StreamStep::Ignored,
        }
    }

    pub fn finish(&mut self, transcript: &mut Transcript) -> StreamStep {
        match self.state {
            StreamState::Streaming { entry } => {
                transcript.finalize(entry);
                self.state = StreamState::Idle;
                StreamStep::Finished { entry }
            }
            StreamState::Idle => StreamStep::Ignored,
        }
    }
}
