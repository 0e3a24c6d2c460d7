//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};
use styledtext::keymap::{KeyCode, KeyEvent, Modifiers};
use styledtext::listener::{
    CaretListener, ExtendedModifyListener, LineStyleListener, TextChangeListener,
};
use styledtext::{
    CaretEvent, ExtendedModifyEvent, LineDelimiter, LineRequest, ListenerFault, ListenerRegistry,
    RopeContent, StyleRange, StyledText, TextChangedEvent, TextChangingEvent, TextRead,
    TextSetEvent,
};

/// LF-delimited content holding `text`
pub fn content(text: &str) -> Rc<RopeContent> {
    Rc::new(RopeContent::from_text(text).with_delimiter(LineDelimiter::Lf))
}

/// A view over LF-delimited content holding `text`
pub fn view(text: &str) -> StyledText {
    StyledText::new(content(text))
}

/// `"line 0\nline 1\n..."` with `count` lines and no trailing delimiter
pub fn numbered_lines(count: usize) -> String {
    (0..count)
        .map(|i| format!("line {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn press(view: &mut StyledText, key: KeyCode, mods: Modifiers) {
    view.handle_key(KeyEvent::key(key, mods));
}

pub fn type_text(view: &mut StyledText, text: &str) {
    for ch in text.chars() {
        view.handle_key(KeyEvent::typed(ch));
    }
}

// ========================================================================
// Recording listeners
// ========================================================================

/// One change notification, with the document text the listener saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Changing(TextChangingEvent, String),
    Changed(TextChangedEvent, String),
    Set(TextSetEvent, String),
}

impl Recorded {
    pub fn name(&self) -> &'static str {
        match self {
            Recorded::Changing(..) => "changing",
            Recorded::Changed(..) => "changed",
            Recorded::Set(..) => "set",
        }
    }

    /// Document text at the time of the notification
    pub fn text(&self) -> &str {
        match self {
            Recorded::Changing(_, text) | Recorded::Changed(_, text) | Recorded::Set(_, text) => {
                text
            }
        }
    }
}

/// Records every change notification it receives
#[derive(Default)]
pub struct ChangeRecorder {
    pub events: RefCell<Vec<Recorded>>,
}

impl ChangeRecorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(Recorded::name).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl TextChangeListener for ChangeRecorder {
    fn text_changing(&self, event: &TextChangingEvent, content: &dyn TextRead) -> Result<()> {
        self.events
            .borrow_mut()
            .push(Recorded::Changing(event.clone(), content.text()));
        Ok(())
    }

    fn text_changed(&self, event: &TextChangedEvent, content: &dyn TextRead) -> Result<()> {
        self.events
            .borrow_mut()
            .push(Recorded::Changed(event.clone(), content.text()));
        Ok(())
    }

    fn text_set(&self, event: &TextSetEvent, content: &dyn TextRead) -> Result<()> {
        self.events
            .borrow_mut()
            .push(Recorded::Set(*event, content.text()));
        Ok(())
    }
}

/// Records caret moves
#[derive(Default)]
pub struct CaretRecorder {
    pub moves: RefCell<Vec<CaretEvent>>,
}

impl CaretRecorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn offsets(&self) -> Vec<(usize, usize)> {
        self.moves
            .borrow()
            .iter()
            .map(|m| (m.old_offset, m.new_offset))
            .collect()
    }
}

impl CaretListener for CaretRecorder {
    fn caret_moved(&self, event: &CaretEvent) -> Result<()> {
        self.moves.borrow_mut().push(*event);
        Ok(())
    }
}

/// Records modifications applied by the view
#[derive(Default)]
pub struct ModifyRecorder {
    pub events: RefCell<Vec<ExtendedModifyEvent>>,
}

impl ModifyRecorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }
}

impl ExtendedModifyListener for ModifyRecorder {
    fn modify_text(&self, event: &ExtendedModifyEvent) -> Result<()> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Answers every line with the same ranges
pub struct FixedStyles(pub Vec<StyleRange>);

impl LineStyleListener for FixedStyles {
    fn line_style(&self, _request: &LineRequest<'_>) -> Result<Vec<StyleRange>> {
        Ok(self.0.clone())
    }
}

/// Fails on every line
pub struct BrokenStyles;

impl LineStyleListener for BrokenStyles {
    fn line_style(&self, request: &LineRequest<'_>) -> Result<Vec<StyleRange>> {
        bail!("no styles for line {}", request.line_index)
    }
}

/// Install a fault handler on `registry` and return what it collects
pub fn collect_faults(registry: &ListenerRegistry) -> Rc<RefCell<Vec<ListenerFault>>> {
    let faults = Rc::new(RefCell::new(Vec::new()));
    let sink = faults.clone();
    registry.set_fault_handler(Some(Rc::new(move |fault: &ListenerFault| {
        sink.borrow_mut().push(fault.clone());
    })));
    faults
}
