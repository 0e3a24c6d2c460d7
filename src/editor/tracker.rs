//! Keeps view state in step with the content it displays
//!
//! The tracker is the view's subscription on its content. Before an edit it
//! moves the default styler's ranges and backgrounds along; after it, the
//! selection. Every notification is then forwarded to the text-change
//! listeners registered on the view itself.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use anyhow::Result;

use super::selection::Selection;
use crate::change::{TextChangedEvent, TextChangingEvent, TextSetEvent};
use crate::content::TextRead;
use crate::listener::TextChangeListener;
use crate::query::CaretEvent;
use crate::registry::{ListenerRegistry, Notification};
use crate::styler::DefaultLineStyler;

pub(crate) struct ChangeTracker {
    view: Rc<ListenerRegistry>,
    styler: RefCell<DefaultLineStyler>,
    selection: Cell<Selection>,
}

impl ChangeTracker {
    pub(crate) fn new(view: Rc<ListenerRegistry>) -> Self {
        Self {
            view,
            styler: RefCell::new(DefaultLineStyler::new()),
            selection: Cell::new(Selection::default()),
        }
    }

    pub(crate) fn selection(&self) -> Selection {
        self.selection.get()
    }

    /// Replace the selection; `caretMoved` fires only if the caret moved
    pub(crate) fn set_selection(&self, selection: Selection) {
        let old = self.selection.replace(selection);
        if old.caret == selection.caret {
            return;
        }
        let event = CaretEvent {
            old_offset: old.caret,
            new_offset: selection.caret,
        };
        tracing::trace!(from = old.caret, to = selection.caret, "caret moved");
        self.view.dispatch(Notification::CaretMoved(&event));
    }

    pub(crate) fn styler(&self) -> Ref<'_, DefaultLineStyler> {
        self.styler.borrow()
    }

    pub(crate) fn styler_mut(&self) -> RefMut<'_, DefaultLineStyler> {
        self.styler.borrow_mut()
    }

    /// Forget everything tied to the old text
    pub(crate) fn reset(&self) {
        self.styler.borrow_mut().text_set();
        self.set_selection(Selection::collapsed(0));
    }
}

impl TextChangeListener for ChangeTracker {
    fn text_changing(&self, event: &TextChangingEvent, content: &dyn TextRead) -> Result<()> {
        let start_line = content.line_at_offset(event.mutation.start())?;
        self.styler
            .borrow_mut()
            .text_changing(&event.mutation, start_line);
        self.view
            .dispatch(Notification::TextChanging(event, content));
        Ok(())
    }

    fn text_changed(&self, event: &TextChangedEvent, content: &dyn TextRead) -> Result<()> {
        let mutation = &event.mutation;
        let selection = self.selection.get().after_replace(
            mutation.start(),
            mutation.replaced_char_count(),
            mutation.inserted_char_count(),
        );
        self.set_selection(selection);
        self.view.dispatch(Notification::TextChanged(event, content));
        Ok(())
    }

    fn text_set(&self, event: &TextSetEvent, content: &dyn TextRead) -> Result<()> {
        self.reset();
        self.view.dispatch(Notification::TextSet(event, content));
        Ok(())
    }
}
