//! Listener interfaces, one per callback kind
//!
//! Every callback returns [`anyhow::Result`]. An `Err` is a listener fault:
//! the registry reports it and treats the call as "no opinion".
//!
//! Callbacks take `&self`; listeners that record state use interior
//! mutability. Single-method traits are implemented for matching closures.

use anyhow::Result;

use crate::change::{
    ExtendedModifyEvent, TextChangedEvent, TextChangingEvent, TextSetEvent, TextVerdict,
    VerifyTextEvent,
};
use crate::content::TextRead;
use crate::keymap::KeyEvent;
use crate::query::{
    CaretEvent, KeyVerdict, LineRequest, MovementRequest, PaintObjectRequest,
};
use crate::style::{Color, StyleRange};

/// Observer of content mutations
pub trait TextChangeListener {
    /// Before the mutation; `content` still holds the old text
    fn text_changing(&self, _event: &TextChangingEvent, _content: &dyn TextRead) -> Result<()> {
        Ok(())
    }

    /// After the mutation; `content` already holds the new text
    fn text_changed(&self, _event: &TextChangedEvent, _content: &dyn TextRead) -> Result<()> {
        Ok(())
    }

    /// The whole document was replaced
    fn text_set(&self, _event: &TextSetEvent, _content: &dyn TextRead) -> Result<()> {
        Ok(())
    }
}

/// Supplies style ranges for a line. Ranges use absolute offsets.
pub trait LineStyleListener {
    fn line_style(&self, request: &LineRequest<'_>) -> Result<Vec<StyleRange>>;
}

/// Supplies a background color for a whole line
pub trait LineBackgroundListener {
    fn line_background(&self, request: &LineRequest<'_>) -> Result<Option<Color>>;
}

/// Supplies bidi segment boundaries, relative to the line start
pub trait BidiSegmentListener {
    fn line_segments(&self, request: &LineRequest<'_>) -> Result<Vec<usize>>;
}

/// Overrides caret stops. `Ok(None)` defers to the built-in rule.
pub trait MovementListener {
    fn next_offset(&self, request: &MovementRequest<'_>) -> Result<Option<usize>>;
    fn previous_offset(&self, request: &MovementRequest<'_>) -> Result<Option<usize>>;
}

/// Per-line spacing override in pixels
pub trait LineSpacingProvider {
    fn line_spacing(&self, request: &LineRequest<'_>) -> Result<Option<u32>>;
}

/// Paints embedded objects
pub trait PaintObjectListener {
    fn paint_object(&self, request: &PaintObjectRequest) -> Result<()>;
}

pub trait CaretListener {
    fn caret_moved(&self, event: &CaretEvent) -> Result<()>;
}

/// Decides whether a key's default handling runs
pub trait VerifyKeyListener {
    fn verify_key(&self, event: &KeyEvent) -> Result<KeyVerdict>;
}

/// Accepts, rejects or rewrites a modification before the view applies it
pub trait VerifyListener {
    fn verify_text(&self, event: &VerifyTextEvent) -> Result<TextVerdict>;
}

/// Observer of modifications applied by the view
pub trait ExtendedModifyListener {
    fn modify_text(&self, event: &ExtendedModifyEvent) -> Result<()>;
}

impl<F> LineStyleListener for F
where
    F: Fn(&LineRequest<'_>) -> Result<Vec<StyleRange>>,
{
    fn line_style(&self, request: &LineRequest<'_>) -> Result<Vec<StyleRange>> {
        self(request)
    }
}

impl<F> LineBackgroundListener for F
where
    F: Fn(&LineRequest<'_>) -> Result<Option<Color>>,
{
    fn line_background(&self, request: &LineRequest<'_>) -> Result<Option<Color>> {
        self(request)
    }
}

impl<F> BidiSegmentListener for F
where
    F: Fn(&LineRequest<'_>) -> Result<Vec<usize>>,
{
    fn line_segments(&self, request: &LineRequest<'_>) -> Result<Vec<usize>> {
        self(request)
    }
}

impl<F> LineSpacingProvider for F
where
    F: Fn(&LineRequest<'_>) -> Result<Option<u32>>,
{
    fn line_spacing(&self, request: &LineRequest<'_>) -> Result<Option<u32>> {
        self(request)
    }
}

impl<F> PaintObjectListener for F
where
    F: Fn(&PaintObjectRequest) -> Result<()>,
{
    fn paint_object(&self, request: &PaintObjectRequest) -> Result<()> {
        self(request)
    }
}

impl<F> CaretListener for F
where
    F: Fn(&CaretEvent) -> Result<()>,
{
    fn caret_moved(&self, event: &CaretEvent) -> Result<()> {
        self(event)
    }
}

impl<F> VerifyKeyListener for F
where
    F: Fn(&KeyEvent) -> Result<KeyVerdict>,
{
    fn verify_key(&self, event: &KeyEvent) -> Result<KeyVerdict> {
        self(event)
    }
}

impl<F> VerifyListener for F
where
    F: Fn(&VerifyTextEvent) -> Result<TextVerdict>,
{
    fn verify_text(&self, event: &VerifyTextEvent) -> Result<TextVerdict> {
        self(event)
    }
}

impl<F> ExtendedModifyListener for F
where
    F: Fn(&ExtendedModifyEvent) -> Result<()>,
{
    fn modify_text(&self, event: &ExtendedModifyEvent) -> Result<()> {
        self(event)
    }
}
