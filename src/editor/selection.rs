//! Selection of the styled text view, in character offsets

use serde::Serialize;

/// A selection with anchor (start point) and caret (moving point).
/// The anchor stays fixed while the caret moves during selection extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the caret is (moving point)
    pub caret: usize,
}

impl Selection {
    pub fn new(anchor: usize, caret: usize) -> Self {
        Self { anchor, caret }
    }

    /// Create a collapsed selection (caret with no selection)
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            caret: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.caret
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.caret)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.caret)
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Where this selection ends up after `replaced` chars at `start` were
    /// replaced by `inserted` chars.
    ///
    /// A selection ending at or before the change is untouched, one after the
    /// replaced span shifts with it, and one overlapping the replaced span
    /// collapses behind the inserted text.
    pub fn after_replace(self, start: usize, replaced: usize, inserted: usize) -> Self {
        let replaced_end = start + replaced;
        if self.end() <= start {
            return self;
        }
        if self.start() >= replaced_end {
            let shift = |offset: usize| offset - replaced + inserted;
            return Self {
                anchor: shift(self.anchor),
                caret: shift(self.caret),
            };
        }
        Self::collapsed(start + inserted)
    }
}
