//! Default content backed by a `ropey::Rope`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ropey::Rope;

use super::{ContentError, StyledTextContent, TextRead};
use crate::change::{TextChangedEvent, TextChangingEvent, TextMutation, TextSetEvent};
use crate::config::LineDelimiter;
use crate::listener::TextChangeListener;
use crate::registry::{ListenerRegistry, Notification};
use crate::util::text::{CR, LF};

/// Rope-backed [`StyledTextContent`]
pub struct RopeContent {
    rope: RefCell<Rope>,
    delimiter: LineDelimiter,
    listeners: ListenerRegistry,
    /// Set while a mutation is being announced
    mutating: Cell<bool>,
}

struct MutationGuard<'a>(&'a Cell<bool>);

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl RopeContent {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: RefCell::new(Rope::from_str(text)),
            delimiter: LineDelimiter::default(),
            listeners: ListenerRegistry::new(),
            mutating: Cell::new(false),
        }
    }

    /// Use `delimiter` for lines inserted by the view
    pub fn with_delimiter(mut self, delimiter: LineDelimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Registry delivering this content's change notifications; install a
    /// fault handler here to observe failing subscribers
    pub fn registry(&self) -> &ListenerRegistry {
        &self.listeners
    }

    fn begin_mutation(&self) -> Result<MutationGuard<'_>, ContentError> {
        if self.mutating.replace(true) {
            tracing::warn!("rejected mutation while a change is being announced");
            return Err(ContentError::ReentrantMutation);
        }
        Ok(MutationGuard(&self.mutating))
    }

    /// True if `offset` lies between the CR and LF of one delimiter
    fn splits_crlf(rope: &Rope, offset: usize) -> bool {
        offset > 0
            && offset < rope.len_chars()
            && rope.char(offset - 1) == CR
            && rope.char(offset) == LF
    }

    fn validate_replace(&self, start: usize, replace_length: usize) -> Result<(), ContentError> {
        let rope = self.rope.borrow();
        let char_count = rope.len_chars();
        if start > char_count {
            return Err(ContentError::OffsetOutOfBounds {
                offset: start,
                char_count,
            });
        }
        let end = start
            .checked_add(replace_length)
            .filter(|&end| end <= char_count)
            .ok_or(ContentError::RangeOutOfBounds {
                start,
                length: replace_length,
                char_count,
            })?;
        for offset in [start, end] {
            if Self::splits_crlf(&rope, offset) {
                return Err(ContentError::SplitsLineDelimiter { offset });
            }
        }
        Ok(())
    }
}

impl Default for RopeContent {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRead for RopeContent {
    fn char_count(&self) -> usize {
        self.rope.borrow().len_chars()
    }

    fn line_count(&self) -> usize {
        self.rope.borrow().len_lines().max(1)
    }

    fn text_range(&self, start: usize, length: usize) -> Result<String, ContentError> {
        let rope = self.rope.borrow();
        let char_count = rope.len_chars();
        let end = start
            .checked_add(length)
            .filter(|&end| end <= char_count)
            .ok_or(ContentError::RangeOutOfBounds {
                start,
                length,
                char_count,
            })?;
        Ok(rope.slice(start..end).to_string())
    }

    fn text(&self) -> String {
        self.rope.borrow().to_string()
    }

    fn line(&self, line_index: usize) -> Result<String, ContentError> {
        let rope = self.rope.borrow();
        if line_index >= rope.len_lines() {
            return Err(ContentError::LineOutOfBounds {
                line: line_index,
                line_count: rope.len_lines(),
            });
        }
        let line = rope.line(line_index);
        let len = line.len_chars();
        let before_last = len.checked_sub(2).map(|i| line.char(i));
        let last = len.checked_sub(1).map(|i| line.char(i));
        let delimiter_len = match (before_last, last) {
            (Some(CR), Some(LF)) => 2,
            (_, Some(CR | LF)) => 1,
            _ => 0,
        };
        Ok(line.slice(..len - delimiter_len).to_string())
    }

    fn line_at_offset(&self, offset: usize) -> Result<usize, ContentError> {
        let rope = self.rope.borrow();
        if offset > rope.len_chars() {
            return Err(ContentError::OffsetOutOfBounds {
                offset,
                char_count: rope.len_chars(),
            });
        }
        Ok(rope.char_to_line(offset))
    }

    fn offset_at_line(&self, line_index: usize) -> Result<usize, ContentError> {
        let rope = self.rope.borrow();
        if line_index >= rope.len_lines() {
            return Err(ContentError::LineOutOfBounds {
                line: line_index,
                line_count: rope.len_lines(),
            });
        }
        Ok(rope.line_to_char(line_index))
    }

    fn line_delimiter(&self) -> &str {
        self.delimiter.as_str()
    }
}

impl StyledTextContent for RopeContent {
    fn replace_text_range(
        &self,
        start: usize,
        replace_length: usize,
        text: &str,
    ) -> Result<(), ContentError> {
        let _guard = self.begin_mutation()?;
        self.validate_replace(start, replace_length)?;

        let replaced_text = self.text_range(start, replace_length)?;
        let mutation = TextMutation::new(start, &replaced_text, text);
        let changing = TextChangingEvent {
            mutation,
            inserted_text: text.to_string(),
        };
        self.listeners
            .dispatch(Notification::TextChanging(&changing, self));

        {
            let mut rope = self.rope.borrow_mut();
            rope.remove(start..start + replace_length);
            rope.insert(start, text);
        }
        tracing::debug!(
            start,
            replaced = mutation.replaced_char_count(),
            inserted = mutation.inserted_char_count(),
            replaced_lines = mutation.replaced_line_count(),
            inserted_lines = mutation.inserted_line_count(),
            "content replaced"
        );

        let changed = TextChangedEvent {
            mutation,
            inserted_text: changing.inserted_text,
            replaced_text,
        };
        self.listeners
            .dispatch(Notification::TextChanged(&changed, self));
        Ok(())
    }

    fn set_text(&self, text: &str) -> Result<(), ContentError> {
        let _guard = self.begin_mutation()?;
        self.rope.replace(Rope::from_str(text));

        let event = TextSetEvent {
            char_count: self.char_count(),
            line_count: self.line_count(),
        };
        tracing::debug!(
            chars = event.char_count,
            lines = event.line_count,
            "content set"
        );
        self.listeners.dispatch(Notification::TextSet(&event, self));
        Ok(())
    }

    fn add_text_change_listener(&self, listener: Rc<dyn TextChangeListener>) {
        self.listeners.text_change.add(listener);
    }

    fn remove_text_change_listener(&self, listener: &Rc<dyn TextChangeListener>) -> bool {
        self.listeners.text_change.remove(listener)
    }

    fn as_text_read(&self) -> &dyn TextRead {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::TextSetEvent;

    #[derive(Default)]
    struct Recorder {
        log: RefCell<Vec<String>>,
    }

    impl TextChangeListener for Recorder {
        fn text_changing(
            &self,
            event: &TextChangingEvent,
            content: &dyn TextRead,
        ) -> anyhow::Result<()> {
            self.log.borrow_mut().push(format!(
                "changing@{} {:?}",
                event.mutation.start(),
                content.text()
            ));
            Ok(())
        }

        fn text_changed(
            &self,
            event: &TextChangedEvent,
            content: &dyn TextRead,
        ) -> anyhow::Result<()> {
            self.log.borrow_mut().push(format!(
                "changed {:?} -> {:?}",
                event.replaced_text,
                content.text()
            ));
            Ok(())
        }

        fn text_set(&self, event: &TextSetEvent, _content: &dyn TextRead) -> anyhow::Result<()> {
            self.log
                .borrow_mut()
                .push(format!("set {} {}", event.char_count, event.line_count));
            Ok(())
        }
    }

    #[test]
    fn test_lines_and_offsets() {
        let content = RopeContent::from_text("ab\ncd\r\nef\rgh\n");
        assert_eq!(content.line_count(), 5);
        assert_eq!(content.line(0).unwrap(), "ab");
        assert_eq!(content.line(1).unwrap(), "cd");
        assert_eq!(content.line(2).unwrap(), "ef");
        assert_eq!(content.line(3).unwrap(), "gh");
        assert_eq!(content.line(4).unwrap(), "");
        assert_eq!(content.offset_at_line(2).unwrap(), 7);
        assert_eq!(content.line_at_offset(7).unwrap(), 2);
        assert_eq!(content.line_at_offset(content.char_count()).unwrap(), 4);
        assert_eq!(
            content.line(5),
            Err(ContentError::LineOutOfBounds {
                line: 5,
                line_count: 5
            })
        );
    }

    #[test]
    fn test_empty_document_has_one_line() {
        let content = RopeContent::new();
        assert_eq!(content.line_count(), 1);
        assert_eq!(content.line(0).unwrap(), "");
        assert_eq!(content.offset_at_line(0).unwrap(), 0);
        assert_eq!(content.line_at_offset(0).unwrap(), 0);
    }

    #[test]
    fn test_replace_removes_and_inserts() {
        let content = RopeContent::from_text("ab\ncd");
        content.replace_text_range(1, 1, "X\n").unwrap();
        assert_eq!(content.text(), "aX\n\ncd");
        assert_eq!(content.line_count(), 3);
        assert_eq!(content.text_range(2, 3).unwrap(), "\n\nc");
    }

    #[test]
    fn test_listener_sees_old_then_new_text() {
        let content = RopeContent::from_text("ab\ncd");
        let recorder = Rc::new(Recorder::default());
        content.add_text_change_listener(recorder.clone());

        content.replace_text_range(1, 0, "X\n").unwrap();
        assert_eq!(
            *recorder.log.borrow(),
            vec![
                "changing@1 \"ab\\ncd\"".to_string(),
                "changed \"\" -> \"aX\\nb\\ncd\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_ranges_rejected_before_notification() {
        let content = RopeContent::from_text("a\r\nb");
        let recorder = Rc::new(Recorder::default());
        content.add_text_change_listener(recorder.clone());

        assert_eq!(
            content.replace_text_range(5, 0, "x"),
            Err(ContentError::OffsetOutOfBounds {
                offset: 5,
                char_count: 4
            })
        );
        assert_eq!(
            content.replace_text_range(3, 2, ""),
            Err(ContentError::RangeOutOfBounds {
                start: 3,
                length: 2,
                char_count: 4
            })
        );
        assert_eq!(
            content.replace_text_range(2, 0, "x"),
            Err(ContentError::SplitsLineDelimiter { offset: 2 })
        );
        assert_eq!(
            content.replace_text_range(0, 2, ""),
            Err(ContentError::SplitsLineDelimiter { offset: 2 })
        );
        assert!(recorder.log.borrow().is_empty());
        assert_eq!(content.text(), "a\r\nb");

        // Replacing the whole delimiter is fine
        content.replace_text_range(1, 2, " ").unwrap();
        assert_eq!(content.text(), "a b");
    }

    #[test]
    fn test_set_text_fires_text_set() {
        let content = RopeContent::from_text("old");
        let recorder = Rc::new(Recorder::default());
        content.add_text_change_listener(recorder.clone());

        content.set_text("one\ntwo").unwrap();
        assert_eq!(content.text(), "one\ntwo");
        assert_eq!(*recorder.log.borrow(), vec!["set 7 2".to_string()]);
    }

    #[test]
    fn test_nested_mutation_is_refused() {
        struct Nested {
            content: Rc<RopeContent>,
            result: RefCell<Option<Result<(), ContentError>>>,
        }
        impl TextChangeListener for Nested {
            fn text_changing(
                &self,
                _event: &TextChangingEvent,
                _content: &dyn TextRead,
            ) -> anyhow::Result<()> {
                let result = self.content.replace_text_range(0, 0, "nested");
                self.result.replace(Some(result));
                Ok(())
            }
        }

        let content = Rc::new(RopeContent::from_text("abc"));
        let nested = Rc::new(Nested {
            content: content.clone(),
            result: RefCell::new(None),
        });
        content.add_text_change_listener(nested.clone());

        content.replace_text_range(3, 0, "d").unwrap();
        assert_eq!(content.text(), "abcd");
        assert_eq!(
            *nested.result.borrow(),
            Some(Err(ContentError::ReentrantMutation))
        );

        // The guard is released afterwards
        content.remove_text_change_listener(&(nested.clone() as Rc<dyn TextChangeListener>));
        content.replace_text_range(0, 1, "").unwrap();
        assert_eq!(content.text(), "bcd");
    }

    #[test]
    fn test_delimiter_configuration() {
        let content = RopeContent::from_text("").with_delimiter(LineDelimiter::CrLf);
        assert_eq!(content.line_delimiter(), "\r\n");
    }
}
