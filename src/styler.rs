//! Style and background storage used when no style or background listener
//! is registered
//!
//! Ranges are kept sorted, non-overlapping and non-empty, in absolute
//! offsets. They follow the text: the view feeds every `textChanging`
//! through [`DefaultLineStyler::text_changing`] before the content applies
//! the edit.

use crate::change::TextMutation;
use crate::style::{Color, StyleRange};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultLineStyler {
    ranges: Vec<StyleRange>,
    /// Per-line backgrounds, indexed by line; shorter than the document
    /// when trailing lines have none
    backgrounds: Vec<Option<Color>>,
}

impl DefaultLineStyler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored ranges in offset order
    pub fn style_ranges(&self) -> &[StyleRange] {
        &self.ranges
    }

    /// The range covering `offset`, if any
    pub fn style_range_at_offset(&self, offset: usize) -> Option<&StyleRange> {
        let index = self.ranges.partition_point(|r| r.end() <= offset);
        self.ranges.get(index).filter(|r| r.start <= offset)
    }

    /// Stored ranges intersecting one line, clipped to it
    pub fn line_styles(&self, line_offset: usize, line_len: usize) -> Vec<StyleRange> {
        let line_end = line_offset + line_len;
        let first = self.ranges.partition_point(|r| r.end() <= line_offset);
        self.ranges[first..]
            .iter()
            .take_while(|r| r.start < line_end)
            .map(|r| {
                let start = r.start.max(line_offset);
                let end = r.end().min(line_end);
                StyleRange {
                    start,
                    length: end - start,
                    ..r.clone()
                }
            })
            .filter(|r| !r.is_empty())
            .collect()
    }

    pub fn line_background(&self, line_index: usize) -> Option<Color> {
        self.backgrounds.get(line_index).copied().flatten()
    }

    /// Apply `range`, replacing whatever it overlaps. A range with default
    /// attributes and no object clears its span.
    pub fn set_style_range(&mut self, range: StyleRange) {
        self.clear_span(range.start, range.end());
        if range.is_empty() || (range.style.is_unstyled() && range.metrics.is_none()) {
            return;
        }
        let index = self.ranges.partition_point(|r| r.start < range.start);
        self.ranges.insert(index, range);
    }

    /// Clear `[start, start + length)` and apply `ranges`, which must lie
    /// inside that span
    pub fn replace_style_ranges(&mut self, start: usize, length: usize, ranges: Vec<StyleRange>) {
        let end = start + length;
        self.clear_span(start, end);
        for range in ranges {
            if range.start < start || range.end() > end {
                tracing::warn!(
                    start = range.start,
                    length = range.length,
                    "style range outside replaced span ignored"
                );
                continue;
            }
            self.set_style_range(range);
        }
    }

    /// Set (or with `None` clear) the background of `count` lines
    pub fn set_line_background(&mut self, start_line: usize, count: usize, color: Option<Color>) {
        let end = start_line + count;
        if self.backgrounds.len() < end {
            if color.is_none() {
                // Missing entries already mean "no background"
                let stored = self.backgrounds.len().min(end);
                self.backgrounds
                    .iter_mut()
                    .take(stored)
                    .skip(start_line)
                    .for_each(|c| *c = None);
                return;
            }
            self.backgrounds.resize(end, None);
        }
        self.backgrounds[start_line..end].fill(color);
    }

    /// Move stored styles along with an edit that is about to happen.
    /// `start_line` is the line containing `mutation.start()` before the edit.
    pub fn text_changing(&mut self, mutation: &TextMutation, start_line: usize) {
        let start = mutation.start();
        let replaced_end = mutation.replaced_end();
        let inserted_end = mutation.inserted_end();
        let shift = |offset: usize| offset.saturating_add_signed(mutation.char_delta());

        let ranges = std::mem::take(&mut self.ranges);
        self.ranges = ranges
            .into_iter()
            .filter_map(|mut r| {
                let end = r.end();
                if end <= start {
                    // before the change
                } else if r.start >= replaced_end {
                    r.start = shift(r.start);
                } else if r.start < start && end > replaced_end {
                    // encloses the change
                    r.length = shift(end) - r.start;
                } else if r.start >= start && end > replaced_end {
                    // starts inside the replaced text
                    r.length = end - replaced_end;
                    r.start = inserted_end;
                } else if r.start < start {
                    // ends inside the replaced text
                    r.length = start - r.start;
                } else {
                    return None;
                }
                Some(r).filter(|r| !r.is_empty())
            })
            .collect();

        let first_removed = start_line + 1;
        if first_removed <= self.backgrounds.len() {
            let removed_end = (first_removed + mutation.replaced_line_count())
                .min(self.backgrounds.len());
            self.backgrounds.splice(
                first_removed..removed_end,
                std::iter::repeat(None).take(mutation.inserted_line_count()),
            );
        }
    }

    /// The whole document was replaced
    pub fn text_set(&mut self) {
        self.ranges.clear();
        self.backgrounds.clear();
    }

    /// Remove ranges overlapping `[start, end)`, keeping the parts outside it
    fn clear_span(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let ranges = std::mem::take(&mut self.ranges);
        let mut kept = Vec::with_capacity(ranges.len() + 1);
        for r in ranges {
            if r.end() <= start || r.start >= end {
                kept.push(r);
                continue;
            }
            if r.start < start {
                kept.push(StyleRange {
                    length: start - r.start,
                    ..r.clone()
                });
            }
            if r.end() > end {
                kept.push(StyleRange {
                    start: end,
                    length: r.end() - end,
                    ..r
                });
            }
        }
        self.ranges = kept;
    }
}
