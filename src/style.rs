//! Visual attributes for styled text and the clipping applied to listener output
//!
//! Style ranges use absolute document offsets. Bidi segment boundaries are
//! relative to the start of their line. Both come from third-party listeners,
//! so the view passes them through [`clip_style_ranges`] and
//! [`normalize_segments`] before laying out a line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (alpha defaults to 255)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color from RGBA values
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse from "#RRGGBB" or "#RRGGBBAA" hex string
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            s.get(range)
                .ok_or_else(|| format!("Invalid color format: {}", s))
                .and_then(|hex| u8::from_str_radix(hex, 16).map_err(|e| e.to_string()))
        };
        match s.len() {
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(format!("Invalid color format: {}", s)),
        }
    }

    /// Format as "#RRGGBB", or "#RRGGBBAA" when not fully opaque
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Font style of a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

/// Visual attributes applied to a range of text.
///
/// `None` colors mean "use the widget default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub foreground: Option<Color>,
    #[serde(default)]
    pub background: Option<Color>,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikeout: bool,
}

impl TextStyle {
    pub fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }

    pub fn bold() -> Self {
        Self {
            font_style: FontStyle::Bold,
            ..Self::default()
        }
    }

    /// True if every attribute is the widget default
    pub fn is_unstyled(&self) -> bool {
        *self == TextStyle::default()
    }
}

/// Placement metrics of an embedded (non-text) object, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphMetrics {
    pub ascent: u32,
    pub descent: u32,
    pub width: u32,
}

/// A styled range of text.
///
/// A range carrying [`GlyphMetrics`] reserves space for an embedded object
/// that the view paints through a `PaintObjectListener`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRange {
    /// Absolute character offset
    pub start: usize,
    /// Length in characters
    pub length: usize,
    #[serde(flatten)]
    pub style: TextStyle,
    #[serde(default)]
    pub metrics: Option<GlyphMetrics>,
}

impl StyleRange {
    pub fn new(start: usize, length: usize, style: TextStyle) -> Self {
        Self {
            start,
            length,
            style,
            metrics: None,
        }
    }

    /// A range that embeds an object of the given size
    pub fn object(start: usize, length: usize, metrics: GlyphMetrics) -> Self {
        Self {
            start,
            length,
            style: TextStyle::default(),
            metrics: Some(metrics),
        }
    }

    /// Offset one past the last character, saturating at `usize::MAX`
    #[inline]
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Confine listener-supplied style ranges to one line.
///
/// The result is ordered by start offset and non-overlapping: ranges are
/// clipped to `[line_offset, line_offset + line_len]`, a range overlapping
/// its predecessor loses the overlapped prefix, and ranges left empty are
/// dropped. Returns the cleaned ranges and how many inputs were altered.
pub fn clip_style_ranges(
    line_offset: usize,
    line_len: usize,
    mut ranges: Vec<StyleRange>,
) -> (Vec<StyleRange>, usize) {
    let line_end = line_offset + line_len;
    let mut altered = 0;
    ranges.sort_by_key(|r| r.start);

    let mut result: Vec<StyleRange> = Vec::with_capacity(ranges.len());
    for mut range in ranges {
        let floor = result.last().map_or(line_offset, StyleRange::end);
        let start = range.start.max(floor);
        let end = range.end().min(line_end);
        if end <= start {
            altered += 1;
            continue;
        }
        if start != range.start || end != range.end() {
            altered += 1;
            range.start = start;
            range.length = end - start;
        }
        result.push(range);
    }
    (result, altered)
}

/// Canonicalize bidi segment boundaries for a line of `line_len` chars.
///
/// Keeps interior boundaries only (the line start and end are implicit),
/// strictly increasing. Returns the boundaries and how many inputs were
/// dropped.
pub fn normalize_segments(line_len: usize, offsets: &[usize]) -> (Vec<usize>, usize) {
    let mut result: Vec<usize> = Vec::with_capacity(offsets.len());
    let mut dropped = 0;
    for &offset in offsets {
        let implicit = offset == 0 || offset == line_len;
        let in_order = result.last().map_or(true, |&prev| offset > prev);
        if implicit {
            continue;
        }
        if offset > line_len || !in_order {
            dropped += 1;
            continue;
        }
        result.push(offset);
    }
    (result, dropped)
}
