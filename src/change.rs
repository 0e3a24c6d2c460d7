//! Change events: descriptors of a single text mutation, before and after it is applied
//!
//! Counts are always derived from the actual text spans; a [`TextMutation`]
//! cannot be built from caller-supplied counts.

use serde::Serialize;

use crate::util::text::count_line_breaks;

/// Shape of one text replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextMutation {
    start: usize,
    replaced_char_count: usize,
    inserted_char_count: usize,
    replaced_line_count: usize,
    inserted_line_count: usize,
}

impl TextMutation {
    /// Describe replacing `replaced_text` at `start` with `inserted_text`
    pub fn new(start: usize, replaced_text: &str, inserted_text: &str) -> Self {
        Self {
            start,
            replaced_char_count: replaced_text.chars().count(),
            inserted_char_count: inserted_text.chars().count(),
            replaced_line_count: count_line_breaks(replaced_text),
            inserted_line_count: count_line_breaks(inserted_text),
        }
    }

    /// Character offset where the edit begins
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn replaced_char_count(&self) -> usize {
        self.replaced_char_count
    }

    pub fn inserted_char_count(&self) -> usize {
        self.inserted_char_count
    }

    /// Line breaks removed by the edit
    pub fn replaced_line_count(&self) -> usize {
        self.replaced_line_count
    }

    /// Line breaks added by the edit
    pub fn inserted_line_count(&self) -> usize {
        self.inserted_line_count
    }

    /// Offset one past the replaced span, in pre-change coordinates
    pub fn replaced_end(&self) -> usize {
        self.start + self.replaced_char_count
    }

    /// Offset one past the inserted text, in post-change coordinates
    pub fn inserted_end(&self) -> usize {
        self.start + self.inserted_char_count
    }

    /// Signed change of the document length
    pub fn char_delta(&self) -> isize {
        self.inserted_char_count as isize - self.replaced_char_count as isize
    }

    /// True if the edit neither removes nor inserts anything
    pub fn is_noop(&self) -> bool {
        self.replaced_char_count == 0 && self.inserted_char_count == 0
    }
}

/// Sent after validation, before the content mutates its storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChangingEvent {
    pub mutation: TextMutation,
    /// Text about to be inserted
    pub inserted_text: String,
}

/// Sent right after the mutation is applied and line offsets are current
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChangedEvent {
    pub mutation: TextMutation,
    pub inserted_text: String,
    /// Text that was removed
    pub replaced_text: String,
}

/// Sent when the whole document was replaced.
///
/// Receivers must treat everything as changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextSetEvent {
    pub char_count: usize,
    pub line_count: usize,
}

/// Proposed modification, sent by the view before it edits the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyTextEvent {
    /// Start offset of the range to replace
    pub start: usize,
    /// End offset (exclusive) of the range to replace
    pub end: usize,
    /// Text to insert
    pub text: String,
}

/// Answer of a verify listener
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextVerdict {
    #[default]
    Accept,
    Reject,
    /// Accept, inserting this text instead
    Replace(String),
}

/// Sent by the view after it modified the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedModifyEvent {
    /// Start offset of the new text
    pub start: usize,
    /// Length of the new text
    pub length: usize,
    /// Text that was replaced
    pub replaced_text: String,
}
