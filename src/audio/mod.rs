pub mod playback;

use std::collections::VecDeque;

/// One encoded audio payload as received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUnit {
    pub id: u64,
    /// Base64 WAV, kept opaque until the playback engine decodes it.
    pub payload: String,
}

/// How a unit's playback ended. Both variants advance the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Finished,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioState {
    #[default]
    Idle,
    Playing { unit_id: u64 },
}

/// What the sequencer wants after a completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Start this unit next.
    Next(AudioUnit),
    /// Nothing left; playback is idle again.
    Drained,
    /// Completion for a unit that is not the one playing.
    Stale,
}

/// Playback backend. `play` must eventually produce exactly one
/// `AppEvent::PlaybackFinished` for the unit, whether it played or not.
pub trait AudioSink {
    fn play(&mut self, unit: AudioUnit);
}

/// FIFO of audio units with a single playing slot.
#[derive(Debug, Default)]
pub struct AudioSequencer {
    queue: VecDeque<AudioUnit>,
    state: AudioState,
    next_id: u64,
}

impl AudioSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, AudioState::Playing { .. })
    }

    /// Units waiting behind the one playing.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Appends a payload. Returns the unit to start when playback was idle;
    /// a playing unit is never interrupted.
    pub fn enqueue(&mut self, payload: String) -> Option<AudioUnit> {
        self.next_id += 1;
        self.queue.push_back(AudioUnit {
            id: self.next_id,
            payload,
        });
        if self.is_playing() {
            None
        } else {
            self.start_next()
        }
    }

    pub fn complete(&mut self, unit_id: u64, outcome: &PlaybackOutcome) -> Advance {
        match self.state {
            AudioState::Playing { unit_id: current } if current == unit_id => {}
            _ => return Advance::Stale,
        }
        if let PlaybackOutcome::Failed(reason) = outcome {
            log::debug!("[audio] unit {} failed ({}), advancing", unit_id, reason);
        }
        match self.start_next() {
            Some(unit) => Advance::Next(unit),
            None => Advance::Drained,
        }
    }

    fn start_next(&mut self) -> Option<AudioUnit> {
        match self.queue.pop_front() {
            Some(unit) => {
                self.state = AudioState::Playing { unit_id: unit.id };
                Some(unit)
            }
            None => {
                self.state = AudioState::Idle;
                None
            }
        }
    }
}
