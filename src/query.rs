//! Query requests the view raises while laying out, painting or navigating a line
//!
//! Every request is an immutable value borrowed by the listener for the
//! duration of one call; answers travel back as return values.

use serde::Serialize;

use crate::style::StyleRange;

/// One line of the document, as seen by style/background/segment/spacing queries.
///
/// Line-scoped: `line_text` excludes the line delimiter, so the next line
/// starts at `line_end()` plus the delimiter length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRequest<'a> {
    pub line_index: usize,
    /// Character offset of the line start
    pub line_offset: usize,
    pub line_text: &'a str,
}

impl<'a> LineRequest<'a> {
    pub fn new(line_index: usize, line_offset: usize, line_text: &'a str) -> Self {
        Self {
            line_index,
            line_offset,
            line_text,
        }
    }

    /// Line length in characters
    pub fn line_len(&self) -> usize {
        self.line_text.chars().count()
    }

    /// Absolute offset one past the last character of the line
    pub fn line_end(&self) -> usize {
        self.line_offset + self.line_len()
    }
}

/// Granularity of a caret movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    /// One character (a CRLF delimiter counts as one)
    Character,
    /// One grapheme cluster
    Cluster,
    WordStart,
    WordEnd,
}

/// Request for the next or previous caret stop from `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MovementRequest<'a> {
    /// Absolute offset the movement starts from
    pub offset: usize,
    pub movement: Movement,
    /// Line containing `offset`
    pub line: LineRequest<'a>,
    /// Document length in characters
    pub char_count: usize,
}

impl MovementRequest<'_> {
    /// Whether `answer` honours the movement contract: strictly inside the
    /// document and not behind (`forward`) or ahead of (`!forward`) the
    /// starting offset.
    pub fn accepts(&self, answer: usize, forward: bool) -> bool {
        if answer > self.char_count {
            return false;
        }
        if forward {
            answer >= self.offset
        } else {
            answer <= self.offset
        }
    }
}

/// Opaque handle to the drawing surface owned by the hosting toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceId(pub u64);

/// Paint one embedded object on a visible line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaintObjectRequest {
    pub surface: SurfaceId,
    pub line_index: usize,
    /// Pixel position of the object's left edge
    pub x: i32,
    /// Pixel position of the line's top edge
    pub y: i32,
    /// Line ascent in pixels
    pub ascent: u32,
    /// Line descent in pixels
    pub descent: u32,
    /// The style range that embeds the object
    pub style: StyleRange,
}

/// Sent after the caret offset actually changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaretEvent {
    pub old_offset: usize,
    pub new_offset: usize,
}

/// Answer of a verify-key listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyVerdict {
    #[default]
    Proceed,
    /// Skip all default handling of the key
    Veto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_request_end_counts_chars() {
        let line = LineRequest::new(2, 10, "héllo");
        assert_eq!(line.line_len(), 5);
        assert_eq!(line.line_end(), 15);
    }

    #[test]
    fn test_movement_contract() {
        let request = MovementRequest {
            offset: 4,
            movement: Movement::WordEnd,
            line: LineRequest::new(0, 0, "foo bar"),
            char_count: 7,
        };
        assert!(request.accepts(7, true));
        assert!(request.accepts(4, true));
        assert!(!request.accepts(3, true));
        assert!(!request.accepts(8, true));
        assert!(request.accepts(0, false));
        assert!(!request.accepts(5, false));
    }
}
