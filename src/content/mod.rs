//! The pluggable text storage contract
//!
//! The view reads characters and lines through [`TextRead`] and mutates
//! through [`StyledTextContent`]. A content instance announces every
//! mutation to its own text-change subscribers:
//!
//! ```text
//! replace_text_range: validate → textChanging → apply → textChanged
//! set_text:           apply → textSet
//! ```
//!
//! Mutation takes `&self`: implementations are shared (`Rc`) between the
//! view and whoever else observes them, and subscribers may read the content
//! while being notified.

mod rope;

use std::fmt;
use std::rc::Rc;

use crate::listener::TextChangeListener;

pub use rope::RopeContent;

/// Read access to a document. Offsets and lengths count `char`s.
///
/// A document always has at least one line. Lines are separated by LF, CR
/// or CRLF; a trailing delimiter starts a final empty line.
pub trait TextRead {
    /// Document length in characters
    fn char_count(&self) -> usize;

    /// Number of lines (always >= 1)
    fn line_count(&self) -> usize;

    /// `length` characters starting at `start`
    fn text_range(&self, start: usize, length: usize) -> Result<String, ContentError>;

    /// The whole document (may be expensive for large documents)
    fn text(&self) -> String;

    /// Text of one line, without its delimiter
    fn line(&self, line_index: usize) -> Result<String, ContentError>;

    /// Index of the line containing `offset`; `char_count()` maps to the last line
    fn line_at_offset(&self, offset: usize) -> Result<usize, ContentError>;

    /// Offset of the first character of a line
    fn offset_at_line(&self, line_index: usize) -> Result<usize, ContentError>;

    /// Delimiter the view inserts for new lines
    fn line_delimiter(&self) -> &str;

    /// Length of one line in characters, without its delimiter
    fn line_len(&self, line_index: usize) -> Result<usize, ContentError> {
        Ok(self.line(line_index)?.chars().count())
    }
}

/// Mutable text storage that announces its changes
pub trait StyledTextContent: TextRead {
    /// Replace `replace_length` characters at `start` with `text`.
    ///
    /// Fires `textChanging` before and `textChanged` after the edit. Fails
    /// without notifying anyone if the range is invalid or another mutation
    /// of this instance is still being announced.
    fn replace_text_range(
        &self,
        start: usize,
        replace_length: usize,
        text: &str,
    ) -> Result<(), ContentError>;

    /// Replace the whole document and fire `textSet`
    fn set_text(&self, text: &str) -> Result<(), ContentError>;

    /// Subscribe to change notifications. The content does not keep the
    /// listener alive.
    fn add_text_change_listener(&self, listener: Rc<dyn TextChangeListener>);

    /// Unsubscribe by identity. Returns false if it was not subscribed.
    fn remove_text_change_listener(&self, listener: &Rc<dyn TextChangeListener>) -> bool;

    /// This content as plain read access
    fn as_text_read(&self) -> &dyn TextRead;
}

/// A contract violation detected by the content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentError {
    OffsetOutOfBounds { offset: usize, char_count: usize },
    RangeOutOfBounds { start: usize, length: usize, char_count: usize },
    LineOutOfBounds { line: usize, line_count: usize },
    /// The offset falls between the CR and LF of one delimiter
    SplitsLineDelimiter { offset: usize },
    /// A mutation was requested while another one is being announced
    ReentrantMutation,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentError::OffsetOutOfBounds { offset, char_count } => {
                write!(f, "offset {} outside document of {} chars", offset, char_count)
            }
            ContentError::RangeOutOfBounds {
                start,
                length,
                char_count,
            } => write!(
                f,
                "range {}..{} outside document of {} chars",
                start,
                start + length,
                char_count
            ),
            ContentError::LineOutOfBounds { line, line_count } => {
                write!(f, "line {} outside document of {} lines", line, line_count)
            }
            ContentError::SplitsLineDelimiter { offset } => {
                write!(f, "offset {} splits a CRLF line delimiter", offset)
            }
            ContentError::ReentrantMutation => {
                write!(f, "mutation requested while a change is being announced")
            }
        }
    }
}

impl std::error::Error for ContentError {}
