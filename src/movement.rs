//! Built-in caret stops, used when no movement listener answers
//!
//! Word rules know two classes of characters: letters/digits and everything
//! else except line breaks. Spaces separate words. A line break is always a
//! stop of its own.

use unicode_segmentation::UnicodeSegmentation;

use crate::content::{ContentError, TextRead};
use crate::query::Movement;
use crate::util::text::{char_type, is_space, CharType};

/// Options of the built-in rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementRules {
    /// Word-end movement also skips the spaces after the word
    pub word_end_skips_spaces: bool,
}

impl Default for MovementRules {
    fn default() -> Self {
        Self {
            word_end_skips_spaces: true,
        }
    }
}

/// The line holding an offset, as chars
struct LineAt {
    index: usize,
    offset: usize,
    chars: Vec<char>,
}

impl LineAt {
    fn of(content: &dyn TextRead, offset: usize) -> Result<Self, ContentError> {
        let index = content.line_at_offset(offset)?;
        Ok(Self {
            index,
            offset: content.offset_at_line(index)?,
            chars: content.line(index)?.chars().collect(),
        })
    }

    fn end(&self) -> usize {
        self.offset + self.chars.len()
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

fn is_word_char(ch: char) -> bool {
    char_type(ch) == CharType::WordChar
}

/// Next caret stop after `offset`
pub fn next_offset(
    content: &dyn TextRead,
    offset: usize,
    movement: Movement,
    rules: MovementRules,
) -> Result<usize, ContentError> {
    if offset >= content.char_count() {
        return Ok(offset);
    }
    let line = LineAt::of(content, offset)?;
    if offset >= line.end() {
        return content.offset_at_line(line.index + 1);
    }
    let column = offset - line.offset;
    let column = match movement {
        Movement::Character => column + 1,
        Movement::Cluster => next_cluster(&line.text(), column),
        Movement::WordStart => word_end(&line.chars, column, true),
        Movement::WordEnd => word_end(&line.chars, column, rules.word_end_skips_spaces),
    };
    Ok(line.offset + column)
}

/// Previous caret stop before `offset`
pub fn previous_offset(
    content: &dyn TextRead,
    offset: usize,
    movement: Movement,
) -> Result<usize, ContentError> {
    if offset == 0 {
        return Ok(0);
    }
    let line = LineAt::of(content, offset)?;
    if offset == line.offset {
        let previous = line.index - 1;
        return Ok(content.offset_at_line(previous)? + content.line_len(previous)?);
    }
    if offset > line.end() {
        // inside a CRLF
        return Ok(line.end());
    }
    let column = offset - line.offset;
    let column = match movement {
        Movement::Character => column - 1,
        Movement::Cluster => previous_cluster(&line.text(), column),
        Movement::WordStart | Movement::WordEnd => word_start(&line.chars, column),
    };
    Ok(line.offset + column)
}

fn next_cluster(line: &str, column: usize) -> usize {
    let mut boundary = 0;
    for grapheme in line.graphemes(true) {
        boundary += grapheme.chars().count();
        if boundary > column {
            return boundary;
        }
    }
    boundary
}

fn previous_cluster(line: &str, column: usize) -> usize {
    let mut previous = 0;
    let mut boundary = 0;
    for grapheme in line.graphemes(true) {
        boundary += grapheme.chars().count();
        if boundary >= column {
            break;
        }
        previous = boundary;
    }
    previous
}

/// Column after the word at `column`; `column` is inside the line.
///
/// With `skip_spaces`, spaces after the word are skipped too, landing on the
/// start of the next word.
fn word_end(chars: &[char], column: usize, skip_spaces: bool) -> usize {
    let len = chars.len();
    let word = is_word_char(chars[column]);
    let same_class = |ch: char| is_word_char(ch) == word && (skip_spaces || !is_space(ch));

    let mut i = column;
    while i < len && same_class(chars[i]) {
        i += 1;
    }
    if skip_spaces {
        while i < len && is_space(chars[i]) {
            i += 1;
        }
    }
    // A lone separator still moves by one
    i.max(column + 1)
}

/// Start of the word before `column`; `column` is inside the line and > 0
fn word_start(chars: &[char], column: usize) -> usize {
    let mut i = column;
    while i > 0 && is_space(chars[i - 1]) {
        i -= 1;
    }
    if i == 0 {
        return 0;
    }
    let word = is_word_char(chars[i - 1]);
    while i > 0 && is_word_char(chars[i - 1]) == word && !is_space(chars[i - 1]) {
        i -= 1;
    }
    i
}
