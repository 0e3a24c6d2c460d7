//! Change notification tests
//!
//! textChanging → apply → textChanged ordering, mutation descriptors,
//! textSet, subscription management and re-entrancy.

mod common;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::{bail, Result};
use common::{content, view, ChangeRecorder, Recorded};
use styledtext::listener::TextChangeListener;
use styledtext::{
    ContentError, RopeContent, StyledTextContent, TextChangedEvent, TextChangingEvent, TextRead,
};

// ========================================================================
// Mutation descriptors
// ========================================================================

#[test]
fn test_insert_line_break_scenario() {
    let content = content("ab\ncd");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    content.replace_text_range(1, 0, "X\n").unwrap();

    assert_eq!(content.text(), "aX\nb\ncd");
    let events = recorder.events.borrow();
    assert_eq!(events.len(), 2);

    let Recorded::Changing(changing, before) = &events[0] else {
        panic!("expected textChanging first, got {:?}", events[0]);
    };
    assert_eq!(before, "ab\ncd");
    assert_eq!(changing.inserted_text, "X\n");
    let mutation = changing.mutation;
    assert_eq!(mutation.start(), 1);
    assert_eq!(mutation.replaced_char_count(), 0);
    assert_eq!(mutation.inserted_char_count(), 2);
    assert_eq!(mutation.replaced_line_count(), 0);
    assert_eq!(mutation.inserted_line_count(), 1);

    let Recorded::Changed(changed, after) = &events[1] else {
        panic!("expected textChanged second, got {:?}", events[1]);
    };
    assert_eq!(after, "aX\nb\ncd");
    assert_eq!(changed.mutation, mutation);
    assert_eq!(changed.replaced_text, "");
}

#[test]
fn test_line_counts_follow_removed_and_inserted_text() {
    let content = content("one\ntwo\nthree");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    // removes "e\ntwo\n"
    content.replace_text_range(2, 6, "x\r\ny\nz").unwrap();

    assert_eq!(content.text(), "onx\r\ny\nzthree");
    assert_eq!(content.line_count(), 3);
    let events = recorder.events.borrow();
    let Recorded::Changed(changed, _) = &events[1] else {
        panic!("expected textChanged");
    };
    assert_eq!(changed.replaced_text, "e\ntwo\n");
    assert_eq!(changed.mutation.replaced_char_count(), 6);
    assert_eq!(changed.mutation.replaced_line_count(), 2);
    assert_eq!(changed.mutation.inserted_char_count(), 6);
    assert_eq!(changed.mutation.inserted_line_count(), 2);
}

#[test]
fn test_delete_across_lines() {
    let content = content("a\nb\nc");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    // removes "\nb\n"
    content.replace_text_range(1, 3, "").unwrap();

    assert_eq!(content.text(), "ac");
    let events = recorder.events.borrow();
    let Recorded::Changing(changing, _) = &events[0] else {
        panic!("expected textChanging");
    };
    assert_eq!(changing.mutation.replaced_line_count(), 2);
    assert_eq!(changing.mutation.inserted_line_count(), 0);
    assert_eq!(changing.mutation.char_delta(), -3);
}

// ========================================================================
// Ordering
// ========================================================================

#[test]
fn test_changing_always_precedes_changed() {
    let content = content("");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    content.replace_text_range(0, 0, "hello").unwrap();
    content.replace_text_range(5, 0, "\nworld").unwrap();
    content.replace_text_range(0, 1, "H").unwrap();

    assert_eq!(
        recorder.names(),
        vec!["changing", "changed", "changing", "changed", "changing", "changed"]
    );
    assert_eq!(content.text(), "Hello\nworld");
}

/// Appends its name to a shared log
struct Tagged {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl TextChangeListener for Tagged {
    fn text_changing(&self, _event: &TextChangingEvent, _content: &dyn TextRead) -> Result<()> {
        self.log.borrow_mut().push(format!("{} changing", self.name));
        Ok(())
    }

    fn text_changed(&self, _event: &TextChangedEvent, _content: &dyn TextRead) -> Result<()> {
        self.log.borrow_mut().push(format!("{} changed", self.name));
        Ok(())
    }
}

#[test]
fn test_subscribers_notified_in_registration_order() {
    let content = content("x");
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::new(Tagged {
        name: "first",
        log: log.clone(),
    });
    let second = Rc::new(Tagged {
        name: "second",
        log: log.clone(),
    });
    content.add_text_change_listener(first.clone());
    content.add_text_change_listener(second.clone());

    content.replace_text_range(1, 0, "y").unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "first changing",
            "second changing",
            "first changed",
            "second changed"
        ]
    );
}

// ========================================================================
// textSet
// ========================================================================

#[test]
fn test_set_text_fires_text_set_only() {
    let content = content("old");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    content.set_text("new\ntext").unwrap();

    let events = recorder.events.borrow();
    assert_eq!(events.len(), 1);
    let Recorded::Set(event, text) = &events[0] else {
        panic!("expected textSet, got {:?}", events[0]);
    };
    assert_eq!(event.char_count, 8);
    assert_eq!(event.line_count, 2);
    assert_eq!(text, "new\ntext");
}

#[test]
fn test_set_same_text_twice_notifies_twice() {
    let content = content("same");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    content.set_text("same").unwrap();
    let between = content.text();
    content.set_text("same").unwrap();

    assert_eq!(recorder.names(), vec!["set", "set"]);
    assert_eq!(between, "same");
    assert_eq!(content.text(), "same");
}

// ========================================================================
// Validation
// ========================================================================

#[test]
fn test_invalid_ranges_notify_nobody() {
    let content = content("abc");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    assert_eq!(
        content.replace_text_range(10, 0, "x"),
        Err(ContentError::OffsetOutOfBounds {
            offset: 10,
            char_count: 3
        })
    );
    assert_eq!(
        content.replace_text_range(2, 5, ""),
        Err(ContentError::RangeOutOfBounds {
            start: 2,
            length: 5,
            char_count: 3
        })
    );
    assert_eq!(recorder.len(), 0);
    assert_eq!(content.text(), "abc");
}

#[test]
fn test_edit_inside_crlf_is_rejected() {
    let content = content("a\r\nb");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());

    assert_eq!(
        content.replace_text_range(2, 0, "x"),
        Err(ContentError::SplitsLineDelimiter { offset: 2 })
    );
    assert_eq!(
        content.replace_text_range(0, 2, ""),
        Err(ContentError::SplitsLineDelimiter { offset: 2 })
    );
    assert_eq!(recorder.len(), 0);

    // removing the whole delimiter is fine
    content.replace_text_range(1, 2, "").unwrap();
    assert_eq!(content.text(), "ab");
}

// ========================================================================
// Subscription management
// ========================================================================

#[test]
fn test_removed_subscriber_is_not_notified() {
    let content = content("abc");
    let recorder = ChangeRecorder::new();
    let handle: Rc<dyn TextChangeListener> = recorder.clone();
    content.add_text_change_listener(handle.clone());

    assert!(content.remove_text_change_listener(&handle));
    assert!(!content.remove_text_change_listener(&handle));
    content.replace_text_range(0, 1, "").unwrap();

    assert_eq!(recorder.len(), 0);
}

#[test]
fn test_dropped_subscriber_is_skipped() {
    let content = content("abc");
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(recorder.clone());
    assert_eq!(content.registry().text_change.len(), 1);

    drop(recorder);
    content.replace_text_range(0, 0, "x").unwrap();

    assert_eq!(content.text(), "xabc");
    assert!(content.registry().text_change.is_empty());
}

// ========================================================================
// Faults and re-entrancy
// ========================================================================

struct FailsBeforeChange;

impl TextChangeListener for FailsBeforeChange {
    fn text_changing(&self, _event: &TextChangingEvent, _content: &dyn TextRead) -> Result<()> {
        bail!("cannot prepare")
    }
}

#[test]
fn test_failing_subscriber_does_not_abort_the_edit() {
    let content = content("abc");
    let failing = Rc::new(FailsBeforeChange);
    let recorder = ChangeRecorder::new();
    content.add_text_change_listener(failing.clone());
    content.add_text_change_listener(recorder.clone());
    let faults = common::collect_faults(content.registry());

    content.replace_text_range(3, 0, "d").unwrap();

    assert_eq!(content.text(), "abcd");
    assert_eq!(recorder.names(), vec!["changing", "changed"]);
    assert_eq!(content.registry().fault_count(), 1);
    assert!(faults.borrow()[0].message.contains("cannot prepare"));
}

/// Tries to edit the content it is subscribed to
struct EditsWhileNotified {
    content: Weak<RopeContent>,
    outcome: RefCell<Option<Result<(), ContentError>>>,
}

impl TextChangeListener for EditsWhileNotified {
    fn text_changed(&self, _event: &TextChangedEvent, _content: &dyn TextRead) -> Result<()> {
        if let Some(content) = self.content.upgrade() {
            let outcome = content.replace_text_range(0, 0, "!");
            self.outcome.replace(Some(outcome));
        }
        Ok(())
    }
}

#[test]
fn test_nested_mutation_fails_explicitly() {
    let content = content("abc");
    let nested = Rc::new(EditsWhileNotified {
        content: Rc::downgrade(&content),
        outcome: RefCell::new(None),
    });
    content.add_text_change_listener(nested.clone());

    content.replace_text_range(3, 0, "d").unwrap();

    assert_eq!(
        *nested.outcome.borrow(),
        Some(Err(ContentError::ReentrantMutation))
    );
    assert_eq!(content.text(), "abcd");

    // The guard is released once the announcement is over
    let handle: Rc<dyn TextChangeListener> = nested.clone();
    content.remove_text_change_listener(&handle);
    content.replace_text_range(0, 0, "!").unwrap();
    assert_eq!(content.text(), "!abcd");
}

#[test]
fn test_set_text_while_notified_fails() {
    struct SetsWhileNotified(Weak<RopeContent>, RefCell<Option<Result<(), ContentError>>>);

    impl TextChangeListener for SetsWhileNotified {
        fn text_changing(&self, _event: &TextChangingEvent, _content: &dyn TextRead) -> Result<()> {
            if let Some(content) = self.0.upgrade() {
                self.1.replace(Some(content.set_text("")));
            }
            Ok(())
        }
    }

    let content = content("abc");
    let listener = Rc::new(SetsWhileNotified(Rc::downgrade(&content), RefCell::new(None)));
    content.add_text_change_listener(listener.clone());

    content.replace_text_range(0, 1, "").unwrap();

    assert_eq!(*listener.1.borrow(), Some(Err(ContentError::ReentrantMutation)));
    assert_eq!(content.text(), "bc");
}

// ========================================================================
// View forwarding
// ========================================================================

#[test]
fn test_view_forwards_content_notifications() {
    let content = content("hello");
    let view = styledtext::StyledText::new(content.clone());
    let recorder = ChangeRecorder::new();
    view.registry().text_change.add(recorder.clone());

    content.replace_text_range(5, 0, " world").unwrap();
    content.set_text("reset").unwrap();

    assert_eq!(recorder.names(), vec!["changing", "changed", "set"]);
    assert_eq!(view.text(), "reset");
}

#[test]
fn test_selection_follows_direct_content_edits() {
    let content = content("abc def");
    let mut view = styledtext::StyledText::new(content.clone());

    view.set_selection(4, 7);
    content.replace_text_range(0, 0, "xx").unwrap();
    assert_eq!(view.selection().start(), 6);
    assert_eq!(view.selection().end(), 9);

    // an edit overlapping the selection collapses it behind the new text
    content.replace_text_range(7, 1, "EE").unwrap();
    assert!(view.selection().is_empty());
    assert_eq!(view.caret_offset(), 9);
}

#[test]
fn test_set_text_resets_view_state() {
    let mut view = view("some text");
    view.set_caret_offset(4);

    view.set_text("other").unwrap();

    assert_eq!(view.caret_offset(), 0);
    assert_eq!(view.text(), "other");
}
