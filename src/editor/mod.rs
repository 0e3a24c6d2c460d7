//! Headless styled text view
//!
//! [`StyledText`] plays the view side of the protocol without drawing any
//! pixels. It owns the view's [`ListenerRegistry`], follows its content
//! through a change tracker and raises the line queries while laying out a
//! line, moving the caret or handling a key:
//!
//! ```text
//! KeyEvent → verifyKey → binding → Action ─┐
//!        └─────────────→ typed text ───────┴→ verify → content edit → extendedModify
//! line_layout(i) → lineGetStyle, lineGetBackground, lineGetSegments, getLineSpacing
//! ```
//!
//! Without a style (or background) listener, lines are styled from the
//! view's own [`DefaultLineStyler`](crate::styler::DefaultLineStyler), fed by
//! [`StyledText::set_style_range`] and friends.

mod clipboard;
mod selection;
mod tracker;

use std::rc::Rc;

use serde::Serialize;

#[cfg(feature = "system-clipboard")]
pub use clipboard::SystemClipboard;
pub use clipboard::{Clipboard, LocalClipboard};
pub use selection::Selection;

use crate::change::{ExtendedModifyEvent, TextVerdict, VerifyTextEvent};
use crate::config::{ConfigError, StyledTextConfig};
use crate::content::{ContentError, RopeContent, StyledTextContent};
use crate::keymap::{Action, KeyBindings, KeyEvent, Keystroke, Modifiers, Motion};
use crate::listener::TextChangeListener;
use crate::movement::{self, MovementRules};
use crate::query::{LineRequest, Movement, MovementRequest, PaintObjectRequest, SurfaceId};
use crate::registry::{ListenerRegistry, Notification};
use crate::style::{clip_style_ranges, normalize_segments, Color, StyleRange};
use crate::util::text::{char_col_to_visual_col, convert_line_delimiters, first_line};
use tracker::ChangeTracker;

/// What the view did with a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A verify-key listener cancelled default handling
    Vetoed,
    /// The key is bound; its action ran
    Action(Action),
    /// The key typed text
    Inserted,
    Ignored,
}

/// One line as the view lays it out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineLayout {
    pub line_index: usize,
    pub line_offset: usize,
    /// Line text without its delimiter
    pub text: String,
    /// Ordered, non-overlapping, confined to the line
    pub styles: Vec<StyleRange>,
    /// `None` for the widget default
    pub background: Option<Color>,
    /// Interior bidi boundaries, relative to the line start
    pub segments: Vec<usize>,
    /// Extra pixels below the line
    pub spacing: u32,
}

/// The view: caret, selection, key handling and line layout over a
/// pluggable content
pub struct StyledText {
    content: Rc<dyn StyledTextContent>,
    registry: Rc<ListenerRegistry>,
    tracker: Rc<ChangeTracker>,
    config: StyledTextConfig,
    key_bindings: KeyBindings,
    clipboard: Box<dyn Clipboard>,
    overwrite: bool,
    top_line: usize,
    visible_lines: usize,
    /// Column kept across vertical moves
    goal_column: Option<usize>,
}

impl StyledText {
    /// A view over `content` with the default configuration
    pub fn new(content: Rc<dyn StyledTextContent>) -> Self {
        Self::build(content, StyledTextConfig::default(), KeyBindings::default())
    }

    /// A view over a fresh [`RopeContent`] holding `text`
    pub fn with_text(text: &str) -> Self {
        Self::new(Rc::new(RopeContent::from_text(text)))
    }

    /// A view over `content` configured by `config`
    pub fn with_config(
        content: Rc<dyn StyledTextContent>,
        config: StyledTextConfig,
    ) -> Result<Self, ConfigError> {
        let key_bindings = config.key_bindings()?;
        Ok(Self::build(content, config, key_bindings))
    }

    fn build(
        content: Rc<dyn StyledTextContent>,
        config: StyledTextConfig,
        key_bindings: KeyBindings,
    ) -> Self {
        let registry = Rc::new(ListenerRegistry::new());
        let tracker = Rc::new(ChangeTracker::new(registry.clone()));
        content.add_text_change_listener(tracker.clone());
        Self {
            content,
            registry,
            tracker,
            overwrite: config.overwrite,
            config,
            key_bindings,
            clipboard: Box::new(LocalClipboard::new()),
            top_line: 0,
            visible_lines: 1,
            goal_column: None,
        }
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    pub fn content(&self) -> &Rc<dyn StyledTextContent> {
        &self.content
    }

    /// Display `content` instead of the current one.
    ///
    /// Caret, selection and default styles are reset.
    pub fn set_content(&mut self, content: Rc<dyn StyledTextContent>) {
        let listener: Rc<dyn TextChangeListener> = self.tracker.clone();
        self.content.remove_text_change_listener(&listener);
        content.add_text_change_listener(listener);
        self.content = content;
        self.tracker.reset();
        self.top_line = 0;
        self.goal_column = None;
        tracing::debug!(
            chars = self.char_count(),
            lines = self.line_count(),
            "content replaced"
        );
    }

    /// Replace the whole text. Caret, selection and default styles are reset.
    pub fn set_text(&mut self, text: &str) -> Result<(), ContentError> {
        self.goal_column = None;
        self.top_line = 0;
        self.content.set_text(text)
    }

    pub fn text(&self) -> String {
        self.content.text()
    }

    pub fn char_count(&self) -> usize {
        self.content.char_count()
    }

    pub fn line_count(&self) -> usize {
        self.content.line_count()
    }

    /// Line containing `offset`; offsets past the end map to the last line
    pub fn line_at_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.char_count());
        self.content
            .line_at_offset(offset)
            .unwrap_or_else(|_| self.last_line())
    }

    /// Start offset of `line_index`; lines past the end map to the document end
    pub fn offset_at_line(&self, line_index: usize) -> usize {
        self.content
            .offset_at_line(line_index)
            .unwrap_or_else(|_| self.char_count())
    }

    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    fn line_len(&self, line_index: usize) -> usize {
        self.content.line_len(line_index).unwrap_or(0)
    }

    fn line_end(&self, line_index: usize) -> usize {
        self.offset_at_line(line_index) + self.line_len(line_index)
    }

    /// Clamp `offset` into the document and out of any line delimiter
    fn snap(&self, offset: usize) -> usize {
        let offset = offset.min(self.char_count());
        offset.min(self.line_end(self.line_at_offset(offset)))
    }

    // -------------------------------------------------------------------------
    // Listeners, configuration, key bindings
    // -------------------------------------------------------------------------

    /// The view's listeners: register style, movement, caret, verify...
    /// listeners here
    pub fn registry(&self) -> &Rc<ListenerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &StyledTextConfig {
        &self.config
    }

    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    pub fn key_bindings(&self) -> &KeyBindings {
        &self.key_bindings
    }

    /// Bind `keystroke` to `action`, or unbind it with `None`
    pub fn set_key_binding(&mut self, keystroke: Keystroke, action: Option<Action>) {
        self.key_bindings.set_key_binding(keystroke, action);
    }

    /// The action bound to a numeric key code
    pub fn key_binding(&self, code: u32) -> Option<Action> {
        self.key_bindings.key_binding(code)
    }

    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    fn movement_rules(&self) -> MovementRules {
        MovementRules {
            word_end_skips_spaces: self.config.word_movement_skips_spaces,
        }
    }

    // -------------------------------------------------------------------------
    // Caret and selection
    // -------------------------------------------------------------------------

    pub fn caret_offset(&self) -> usize {
        self.tracker.selection().caret
    }

    pub fn selection(&self) -> Selection {
        self.tracker.selection()
    }

    pub fn selection_text(&self) -> String {
        let selection = self.selection();
        self.content
            .text_range(selection.start(), selection.len())
            .unwrap_or_default()
    }

    /// Collapse the selection at `offset` (clamped into the document)
    pub fn set_caret_offset(&mut self, offset: usize) {
        self.goal_column = None;
        self.tracker
            .set_selection(Selection::collapsed(self.snap(offset)));
        self.show_caret();
    }

    /// Select from `anchor` to `caret` (both clamped into the document)
    pub fn set_selection(&mut self, anchor: usize, caret: usize) {
        self.goal_column = None;
        self.tracker
            .set_selection(Selection::new(self.snap(anchor), self.snap(caret)));
        self.show_caret();
    }

    pub fn top_line(&self) -> usize {
        self.top_line
    }

    pub fn set_top_line(&mut self, line_index: usize) {
        self.top_line = line_index.min(self.last_line());
    }

    pub fn visible_line_count(&self) -> usize {
        self.visible_lines
    }

    /// Number of lines the host shows at once (page size)
    pub fn set_visible_lines(&mut self, count: usize) {
        self.visible_lines = count.max(1);
    }

    /// Scroll so the caret line is visible
    fn show_caret(&mut self) {
        let line = self.line_at_offset(self.caret_offset());
        if line < self.top_line {
            self.top_line = line;
        } else if line >= self.top_line + self.visible_lines {
            self.top_line = line + 1 - self.visible_lines;
        }
    }

    // -------------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------------

    /// Next caret stop after `offset`
    pub fn next_offset(&self, offset: usize, movement: Movement) -> usize {
        self.move_offset(offset, movement, true)
    }

    /// Previous caret stop before `offset`
    pub fn previous_offset(&self, offset: usize, movement: Movement) -> usize {
        self.move_offset(offset, movement, false)
    }

    /// Ask the movement listener, falling back to the built-in rules when
    /// there is none, it has no opinion or its answer breaks the contract
    fn move_offset(&self, offset: usize, movement: Movement, forward: bool) -> usize {
        let offset = offset.min(self.char_count());
        let line_index = self.line_at_offset(offset);
        let line_text = self.content.line(line_index).unwrap_or_default();
        let request = MovementRequest {
            offset,
            movement,
            line: LineRequest::new(line_index, self.offset_at_line(line_index), &line_text),
            char_count: self.char_count(),
        };
        if let Some(answer) = self.registry.movement_offset(&request, forward) {
            if request.accepts(answer, forward) {
                return answer;
            }
            tracing::warn!(
                offset,
                answer,
                forward,
                "movement listener answer out of range, using built-in rule"
            );
        }

        let content = self.content.as_text_read();
        let result = if forward {
            movement::next_offset(content, offset, movement, self.movement_rules())
        } else {
            movement::previous_offset(content, offset, movement)
        };
        result.unwrap_or_else(|e| {
            tracing::warn!("built-in movement failed: {}", e);
            offset
        })
    }

    // -------------------------------------------------------------------------
    // Layout and painting
    // -------------------------------------------------------------------------

    /// Lay out one line: styles, background, bidi segments and spacing,
    /// each from its listener if one is registered
    pub fn line_layout(&self, line_index: usize) -> Result<LineLayout, ContentError> {
        let text = self.content.line(line_index)?;
        let line_offset = self.content.offset_at_line(line_index)?;
        let request = LineRequest::new(line_index, line_offset, &text);
        let line_len = request.line_len();

        let styles = match self.registry.line_style(&request) {
            Some(styles) => {
                let (styles, altered) = clip_style_ranges(line_offset, line_len, styles);
                if altered > 0 {
                    tracing::warn!(line = line_index, altered, "style ranges clipped to line");
                }
                styles
            }
            None => self.tracker.styler().line_styles(line_offset, line_len),
        };

        let background = match self.registry.line_background(&request) {
            Some(color) => color,
            None => self.tracker.styler().line_background(line_index),
        };

        let (segments, dropped) =
            normalize_segments(line_len, &self.registry.line_segments(&request));
        if dropped > 0 {
            tracing::warn!(line = line_index, dropped, "invalid segment offsets dropped");
        }

        let spacing = self
            .registry
            .line_spacing(&request)
            .unwrap_or(self.config.line_spacing);

        tracing::trace!(
            line = line_index,
            styles = styles.len(),
            segments = segments.len(),
            "line laid out"
        );
        Ok(LineLayout {
            line_index,
            line_offset,
            text,
            styles,
            background,
            segments,
            spacing,
        })
    }

    /// Paint the embedded objects of one line whose top edge is at `y`.
    ///
    /// Text is laid out on a monospace grid of `char_width` cells; an object
    /// occupies its glyph width instead of its characters' cells. Returns the
    /// number of objects painted.
    pub fn paint_line(
        &self,
        line_index: usize,
        y: i32,
        surface: SurfaceId,
    ) -> Result<usize, ContentError> {
        let layout = self.line_layout(line_index)?;
        let objects: Vec<_> = layout
            .styles
            .iter()
            .filter_map(|range| range.metrics.map(|metrics| (range, metrics)))
            .collect();
        if objects.is_empty() {
            return Ok(0);
        }

        let base_descent = self.config.line_height / 4;
        let base_ascent = self.config.line_height - base_descent;
        let ascent = objects
            .iter()
            .map(|(_, m)| m.ascent)
            .fold(base_ascent, u32::max);
        let descent = objects
            .iter()
            .map(|(_, m)| m.descent)
            .fold(base_descent, u32::max);

        let char_width = i64::from(self.config.char_width);
        let mut extra = 0i64;
        for (range, metrics) in &objects {
            let column = range.start - layout.line_offset;
            let cells = char_col_to_visual_col(&layout.text, column, self.config.tab_width);
            let x = cells as i64 * char_width + extra;
            let request = PaintObjectRequest {
                surface,
                line_index,
                x: i32::try_from(x).unwrap_or(i32::MAX),
                y,
                ascent,
                descent,
                style: (*range).clone(),
            };
            self.registry.dispatch(Notification::PaintObject(&request));
            extra += i64::from(metrics.width) - range.length as i64 * char_width;
        }
        Ok(objects.len())
    }

    // -------------------------------------------------------------------------
    // Default styles
    // -------------------------------------------------------------------------

    fn check_range(&self, start: usize, length: usize) -> Result<(), ContentError> {
        let char_count = self.char_count();
        match start.checked_add(length) {
            Some(end) if end <= char_count => Ok(()),
            _ => Err(ContentError::RangeOutOfBounds {
                start,
                length,
                char_count,
            }),
        }
    }

    /// Style `range` in the default styler, replacing what it overlaps
    pub fn set_style_range(&mut self, range: StyleRange) -> Result<(), ContentError> {
        self.check_range(range.start, range.length)?;
        self.tracker.styler_mut().set_style_range(range);
        Ok(())
    }

    /// Clear `[start, start + length)` in the default styler and apply `ranges`
    pub fn replace_style_ranges(
        &mut self,
        start: usize,
        length: usize,
        ranges: Vec<StyleRange>,
    ) -> Result<(), ContentError> {
        self.check_range(start, length)?;
        self.tracker
            .styler_mut()
            .replace_style_ranges(start, length, ranges);
        Ok(())
    }

    pub fn style_ranges(&self) -> Vec<StyleRange> {
        self.tracker.styler().style_ranges().to_vec()
    }

    pub fn style_range_at_offset(&self, offset: usize) -> Option<StyleRange> {
        self.tracker.styler().style_range_at_offset(offset).cloned()
    }

    /// Set (or with `None` clear) the default background of `count` lines
    pub fn set_line_background(
        &mut self,
        start_line: usize,
        count: usize,
        color: Option<Color>,
    ) -> Result<(), ContentError> {
        let line_count = self.line_count();
        match start_line.checked_add(count) {
            Some(end) if end <= line_count => {}
            _ => {
                return Err(ContentError::LineOutOfBounds {
                    line: start_line.saturating_add(count.saturating_sub(1)),
                    line_count,
                })
            }
        }
        self.tracker
            .styler_mut()
            .set_line_background(start_line, count, color);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Replace `length` chars at `start` with `text`.
    ///
    /// Verify listeners may reject or rewrite the text first; extended-modify
    /// listeners hear about the applied edit. Returns false if rejected. The
    /// selection follows the edit: it shifts when after the change and
    /// collapses behind the new text when overlapping the replaced span.
    pub fn replace_text_range(
        &mut self,
        start: usize,
        length: usize,
        text: &str,
    ) -> Result<bool, ContentError> {
        Ok(self.modify(start, length, text)?.is_some())
    }

    /// Verify, apply and announce one modification. Returns the length of
    /// the inserted text, `None` if a verify listener rejected it.
    fn modify(
        &mut self,
        start: usize,
        length: usize,
        text: &str,
    ) -> Result<Option<usize>, ContentError> {
        let replaced_text = self.content.text_range(start, length)?;
        let event = VerifyTextEvent {
            start,
            end: start + length,
            text: text.to_string(),
        };
        let text = match self.registry.verify_text(&event) {
            TextVerdict::Accept => event.text,
            TextVerdict::Replace(text) => text,
            TextVerdict::Reject => {
                tracing::debug!(start, length, "modification rejected");
                return Ok(None);
            }
        };

        self.content.replace_text_range(start, length, &text)?;

        let inserted = text.chars().count();
        let modified = ExtendedModifyEvent {
            start,
            length: inserted,
            replaced_text,
        };
        self.registry
            .dispatch(Notification::ExtendedModify(&modified));
        Ok(Some(inserted))
    }

    /// A modification typed or pasted by the user: honours the text limit
    /// and leaves the caret behind the new text
    fn user_edit(&mut self, start: usize, end: usize, text: &str) -> bool {
        if let Some(limit) = self.config.text_limit {
            if self.char_count() - (end - start) + text.chars().count() > limit {
                tracing::debug!(limit, "edit exceeds text limit");
                return false;
            }
        }
        match self.modify(start, end - start, text) {
            Ok(Some(inserted)) => {
                self.set_caret_offset(start + inserted);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("edit failed: {}", e);
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Keys and actions
    // -------------------------------------------------------------------------

    /// Handle a key: verify-key listeners may veto it, a bound key runs its
    /// action, anything else that types text inserts it.
    pub fn handle_key(&mut self, event: KeyEvent) -> KeyOutcome {
        if !self.registry.verify_key(&event) {
            tracing::debug!(key = %event.key, mods = %event.mods, "key vetoed");
            return KeyOutcome::Vetoed;
        }
        if let Some(action) = self.key_bindings.lookup(&event.keystroke()) {
            self.invoke_action(action);
            return KeyOutcome::Action(action);
        }
        match event.character {
            Some(ch) if !is_shortcut(event.mods) && self.type_char(ch) => KeyOutcome::Inserted,
            _ => KeyOutcome::Ignored,
        }
    }

    fn type_char(&mut self, ch: char) -> bool {
        let is_break = matches!(ch, '\r' | '\n');
        let text = match ch {
            _ if is_break && self.config.single_line => return false,
            _ if is_break => self.content.line_delimiter().to_string(),
            '\t' => ch.to_string(),
            _ if ch.is_control() => return false,
            _ => ch.to_string(),
        };

        let selection = self.selection();
        let start = selection.start();
        let mut end = selection.end();
        if selection.is_empty() && self.overwrite && !is_break {
            let line_end = self.line_end(self.line_at_offset(start));
            if start < line_end {
                end = self.next_offset(start, Movement::Cluster);
            }
        }
        self.user_edit(start, end, &text)
    }

    /// Run `action` as if its key had been pressed
    pub fn invoke_action(&mut self, action: Action) {
        tracing::trace!(%action, "invoke action");
        match action {
            Action::Move(motion) => self.apply_motion(motion, false),
            Action::Select(motion) => self.apply_motion(motion, true),
            Action::Cut => {
                if self.copy_selection() {
                    self.delete_selection();
                }
            }
            Action::Copy => {
                self.copy_selection();
            }
            Action::Paste => self.paste(),
            Action::DeletePrevious => self.delete(false),
            Action::DeleteNext => self.delete(true),
            Action::ToggleOverwrite => {
                self.overwrite = !self.overwrite;
                tracing::debug!(overwrite = self.overwrite, "overwrite toggled");
            }
        }
    }

    fn apply_motion(&mut self, motion: Motion, extend: bool) {
        let selection = self.selection();
        let caret = selection.caret;
        let caret_line = self.line_at_offset(caret);
        let column = self
            .goal_column
            .unwrap_or_else(|| caret - self.offset_at_line(caret_line));
        let page = self.visible_lines as isize;

        let target = match motion {
            Motion::ColumnPrevious if !extend && !selection.is_empty() => selection.start(),
            Motion::ColumnNext if !extend && !selection.is_empty() => selection.end(),
            Motion::ColumnPrevious => self.previous_offset(caret, Movement::Cluster),
            Motion::ColumnNext => self.next_offset(caret, Movement::Cluster),
            Motion::WordPrevious => self.previous_offset(caret, Movement::WordStart),
            Motion::WordNext => self.next_offset(caret, Movement::WordEnd),
            Motion::LineStart => self.offset_at_line(caret_line),
            Motion::LineEnd => self.line_end(caret_line),
            Motion::LineUp => self.vertical_target(caret_line, -1, column),
            Motion::LineDown => self.vertical_target(caret_line, 1, column),
            Motion::PageUp => self.vertical_target(caret_line, -page, column),
            Motion::PageDown => self.vertical_target(caret_line, page, column),
            Motion::TextStart => 0,
            Motion::TextEnd => self.char_count(),
            Motion::WindowStart => self.offset_at_line(self.top_line.min(self.last_line())),
            Motion::WindowEnd => {
                let last_visible = self.top_line + self.visible_lines - 1;
                self.line_end(last_visible.min(self.last_line()))
            }
        };

        let selection = if extend {
            Selection::new(selection.anchor, target)
        } else {
            Selection::collapsed(target)
        };
        self.tracker.set_selection(selection);
        self.show_caret();
        let vertical = matches!(
            motion,
            Motion::LineUp | Motion::LineDown | Motion::PageUp | Motion::PageDown
        );
        self.goal_column = vertical.then_some(column);
    }

    fn vertical_target(&self, line_index: usize, delta: isize, column: usize) -> usize {
        let target = line_index
            .saturating_add_signed(delta)
            .min(self.last_line());
        self.offset_at_line(target) + column.min(self.line_len(target))
    }

    /// Copy the selection to the clipboard; false if nothing is selected
    fn copy_selection(&mut self) -> bool {
        if self.selection().is_empty() {
            return false;
        }
        let text = self.selection_text();
        self.clipboard.set_text(&text);
        true
    }

    fn delete_selection(&mut self) {
        let selection = self.selection();
        self.user_edit(selection.start(), selection.end(), "");
    }

    /// Backspace removes one character, delete one cluster; either removes
    /// a whole line delimiter at a line boundary
    fn delete(&mut self, forward: bool) {
        if !self.selection().is_empty() {
            self.delete_selection();
            return;
        }
        let caret = self.caret_offset();
        let (start, end) = if forward {
            (caret, self.next_offset(caret, Movement::Cluster))
        } else {
            (self.previous_offset(caret, Movement::Character), caret)
        };
        if start < end {
            self.user_edit(start, end, "");
        }
    }

    fn paste(&mut self) {
        let Some(text) = self.clipboard.get_text() else {
            return;
        };
        let text = if self.config.single_line {
            first_line(&text).to_string()
        } else {
            convert_line_delimiters(&text, self.content.line_delimiter())
        };
        if text.is_empty() {
            return;
        }
        let selection = self.selection();
        self.user_edit(selection.start(), selection.end(), &text);
    }
}

/// Ctrl, Alt or Meta chords don't type. Ctrl+Alt is AltGr and does.
fn is_shortcut(mods: Modifiers) -> bool {
    mods.meta() || mods.ctrl() != mods.alt()
}
