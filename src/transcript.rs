/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Jarvis",
            Role::Tool => "Tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    /// Still receiving tokens; rendered with a blinking cursor.
    pub streaming: bool,
}

/// Append-only conversation history.
///
/// Entries are immutable once appended, except for an entry still marked
/// `streaming`, which only the stream accumulator extends and finalizes.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) -> usize {
        self.entries.push(TranscriptEntry {
            role,
            text: text.into(),
            streaming: false,
        });
        self.entries.len() - 1
    }

    pub(crate) fn push_streaming(&mut self, role: Role) -> usize {
        self.entries.push(TranscriptEntry {
            role,
            text: String::new(),
            streaming: true,
        });
        self.entries.len() - 1
    }

    pub(crate) fn append_text(&mut self, index: usize, fragment: &str) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.streaming => {
                entry.text.push_str(fragment);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn finalize(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.streaming => {
                entry.streaming = false;
                true
            }
            _ => false,
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The welcome placeholder is shown until the first entry arrives.
    pub fn show_welcome(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_entries_reject_further_text() {
        let mut transcript = Transcript::new();
        let user = transcript.push(Role::User, "hello");
        assert!(!transcript.append_text(user, " there"));
        assert_eq!(transcript.entries()[0].text, "hello");

        let live = transcript.push_streaming(Role::Assistant);
        assert!(transcript.append_text(live, "Hi"));
        assert!(transcript.finalize(live));
        assert!(!transcript.append_text(live, "!"));
        assert!(!transcript.finalize(live));
        assert_eq!(transcript.get(live).map(|e| e.text.as_str()), Some("Hi"));
    }

    #[test]
    fn welcome_shows_only_while_empty() {
        let mut transcript = Transcript::new();
        assert!(transcript.show_welcome());
        transcript.push(Role::Tool, "done");
        assert!(!transcript.show_welcome());
        assert_eq!(transcript.last().map(|e| e.role.label()), Some("Tool"));
    }
}
