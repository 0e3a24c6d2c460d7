//! Listener registry and dispatch
//!
//! A [`Notification`] is a tagged union of everything the content or the view
//! can announce or ask. [`ListenerRegistry::dispatch`] matches on it, calls
//! the typed listener(s) registered for that kind and folds their answers
//! into a [`Reply`].
//!
//! Two registration shapes exist:
//! - [`ListenerSlot`] holds at most one listener; setting replaces.
//! - [`ListenerList`] holds listeners in registration order; dispatch walks a
//!   snapshot, so (un)registering from inside a callback only affects later
//!   dispatches.
//!
//! The registry keeps weak references only. Whoever registers a listener
//! owns it; once the last `Rc` is dropped the listener silently stops
//! receiving calls.
//!
//! Listener faults (`Err` returns, or re-entering a listener that is still
//! running) never escape `dispatch`. They are logged, counted and forwarded
//! to the fault handler, and the call degrades to "no opinion".

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::change::{
    ExtendedModifyEvent, TextChangedEvent, TextChangingEvent, TextSetEvent, TextVerdict,
    VerifyTextEvent,
};
use crate::content::TextRead;
use crate::keymap::KeyEvent;
use crate::listener::{
    BidiSegmentListener, CaretListener, ExtendedModifyListener, LineBackgroundListener,
    LineSpacingProvider, LineStyleListener, MovementListener, PaintObjectListener,
    TextChangeListener, VerifyKeyListener, VerifyListener,
};
use crate::query::{CaretEvent, KeyVerdict, LineRequest, MovementRequest, PaintObjectRequest};
use crate::style::{Color, StyleRange};

// =============================================================================
// Registration shapes
// =============================================================================

/// A registered listener plus its "currently running" flag
struct Subscriber<L: ?Sized> {
    listener: Weak<L>,
    running: Cell<bool>,
}

/// Outcome of calling one subscriber
enum Invocation<T> {
    Done(T),
    /// The listener was dropped by its owner
    Gone,
    /// The listener is already running further up the stack
    Busy,
    Failed(anyhow::Error),
}

struct RunningGuard<'a>(&'a Cell<bool>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<L: ?Sized> Subscriber<L> {
    fn new(listener: &Rc<L>) -> Rc<Self> {
        Rc::new(Self {
            listener: Rc::downgrade(listener),
            running: Cell::new(false),
        })
    }

    fn is_alive(&self) -> bool {
        self.listener.strong_count() > 0
    }

    fn is<T: ?Sized>(&self, other: &Rc<T>) -> bool {
        std::ptr::addr_eq(self.listener.as_ptr(), Rc::as_ptr(other))
    }

    fn invoke<T>(&self, call: impl FnOnce(&L) -> anyhow::Result<T>) -> Invocation<T> {
        let Some(listener) = self.listener.upgrade() else {
            return Invocation::Gone;
        };
        if self.running.replace(true) {
            return Invocation::Busy;
        }
        let _guard = RunningGuard(&self.running);
        match call(&listener) {
            Ok(value) => Invocation::Done(value),
            Err(err) => Invocation::Failed(err),
        }
    }
}

/// Single-slot registration: at most one listener, last registration wins
pub struct ListenerSlot<L: ?Sized> {
    current: RefCell<Option<Rc<Subscriber<L>>>>,
}

impl<L: ?Sized> ListenerSlot<L> {
    pub fn new() -> Self {
        Self {
            current: RefCell::new(None),
        }
    }

    /// Register `listener`, replacing any previous one. Returns true if a
    /// live listener was replaced.
    pub fn set(&self, listener: Rc<L>) -> bool {
        let previous = self.current.replace(Some(Subscriber::new(&listener)));
        previous.is_some_and(|p| p.is_alive())
    }

    /// Unregister `listener` if it is the one in the slot
    pub fn remove<T: ?Sized>(&self, listener: &Rc<T>) -> bool {
        let mut current = self.current.borrow_mut();
        if current.as_ref().is_some_and(|s| s.is(listener)) {
            *current = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        self.current.replace(None);
    }

    /// True if a listener is registered and still alive
    pub fn is_set(&self) -> bool {
        self.current.borrow().as_ref().is_some_and(|s| s.is_alive())
    }

    fn get(&self) -> Option<Rc<Subscriber<L>>> {
        let mut current = self.current.borrow_mut();
        if current.as_ref().is_some_and(|s| !s.is_alive()) {
            tracing::trace!("dropping dead listener from slot");
            *current = None;
        }
        current.clone()
    }
}

impl<L: ?Sized> Default for ListenerSlot<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Multi-subscriber registration, invoked in registration order
pub struct ListenerList<L: ?Sized> {
    entries: RefCell<Vec<Rc<Subscriber<L>>>>,
}

impl<L: ?Sized> ListenerList<L> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Rc<L>) {
        self.entries.borrow_mut().push(Subscriber::new(&listener));
    }

    /// Unregister the first registration of `listener`, by identity
    pub fn remove<T: ?Sized>(&self, listener: &Rc<T>) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|s| s.is(listener)) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.entries.borrow().iter().filter(|s| s.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Stable copy of the live entries for one dispatch
    fn snapshot(&self) -> Vec<Rc<Subscriber<L>>> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|s| s.is_alive());
        entries.clone()
    }
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Everything that can be dispatched, with its payload
pub enum Notification<'a> {
    TextChanging(&'a TextChangingEvent, &'a dyn TextRead),
    TextChanged(&'a TextChangedEvent, &'a dyn TextRead),
    TextSet(&'a TextSetEvent, &'a dyn TextRead),
    LineGetStyle(&'a LineRequest<'a>),
    LineGetBackground(&'a LineRequest<'a>),
    LineGetSegments(&'a LineRequest<'a>),
    NextOffset(&'a MovementRequest<'a>),
    PreviousOffset(&'a MovementRequest<'a>),
    LineSpacing(&'a LineRequest<'a>),
    PaintObject(&'a PaintObjectRequest),
    CaretMoved(&'a CaretEvent),
    VerifyKey(&'a KeyEvent),
    Verify(&'a VerifyTextEvent),
    ExtendedModify(&'a ExtendedModifyEvent),
}

/// Payload-free tag of a [`Notification`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    TextChanging,
    TextChanged,
    TextSet,
    LineGetStyle,
    LineGetBackground,
    LineGetSegments,
    NextOffset,
    PreviousOffset,
    LineSpacing,
    PaintObject,
    CaretMoved,
    VerifyKey,
    Verify,
    ExtendedModify,
}

impl Notification<'_> {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::TextChanging(..) => NotificationKind::TextChanging,
            Notification::TextChanged(..) => NotificationKind::TextChanged,
            Notification::TextSet(..) => NotificationKind::TextSet,
            Notification::LineGetStyle(_) => NotificationKind::LineGetStyle,
            Notification::LineGetBackground(_) => NotificationKind::LineGetBackground,
            Notification::LineGetSegments(_) => NotificationKind::LineGetSegments,
            Notification::NextOffset(_) => NotificationKind::NextOffset,
            Notification::PreviousOffset(_) => NotificationKind::PreviousOffset,
            Notification::LineSpacing(_) => NotificationKind::LineSpacing,
            Notification::PaintObject(_) => NotificationKind::PaintObject,
            Notification::CaretMoved(_) => NotificationKind::CaretMoved,
            Notification::VerifyKey(_) => NotificationKind::VerifyKey,
            Notification::Verify(_) => NotificationKind::Verify,
            Notification::ExtendedModify(_) => NotificationKind::ExtendedModify,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::TextChanging => "textChanging",
            NotificationKind::TextChanged => "textChanged",
            NotificationKind::TextSet => "textSet",
            NotificationKind::LineGetStyle => "lineGetStyle",
            NotificationKind::LineGetBackground => "lineGetBackground",
            NotificationKind::LineGetSegments => "lineGetSegments",
            NotificationKind::NextOffset => "getNextOffset",
            NotificationKind::PreviousOffset => "getPreviousOffset",
            NotificationKind::LineSpacing => "getLineSpacing",
            NotificationKind::PaintObject => "paintObject",
            NotificationKind::CaretMoved => "caretMoved",
            NotificationKind::VerifyKey => "verifyKey",
            NotificationKind::Verify => "verify",
            NotificationKind::ExtendedModify => "extendedModify",
        };
        f.write_str(name)
    }
}

/// Answer folded from the listener(s) of one dispatch.
///
/// A faulting query listener yields the "no opinion" value of its kind
/// (empty styles/segments, `None` background/offset/spacing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nobody is registered for this kind
    Unhandled,
    /// Observers were notified
    Delivered,
    Styles(Vec<StyleRange>),
    Background(Option<Color>),
    Segments(Vec<usize>),
    Offset(Option<usize>),
    Spacing(Option<u32>),
    /// Accumulated verify-key flag
    Proceed(bool),
    Verdict(TextVerdict),
}

/// A listener fault as reported to the fault handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFault {
    pub kind: NotificationKind,
    pub message: String,
}

impl fmt::Display for ListenerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener failed: {}", self.kind, self.message)
    }
}

/// Application hook receiving listener faults
pub type FaultHandler = Rc<dyn Fn(&ListenerFault)>;

// =============================================================================
// Registry
// =============================================================================

/// Typed callback table for one content instance or one view
#[derive(Default)]
pub struct ListenerRegistry {
    pub line_style: ListenerSlot<dyn LineStyleListener>,
    pub line_background: ListenerSlot<dyn LineBackgroundListener>,
    pub segments: ListenerSlot<dyn BidiSegmentListener>,
    pub movement: ListenerSlot<dyn MovementListener>,
    pub spacing: ListenerSlot<dyn LineSpacingProvider>,
    pub text_change: ListenerList<dyn TextChangeListener>,
    pub caret: ListenerList<dyn CaretListener>,
    pub paint_object: ListenerList<dyn PaintObjectListener>,
    pub verify_key: ListenerList<dyn VerifyKeyListener>,
    pub verify: ListenerList<dyn VerifyListener>,
    pub extended_modify: ListenerList<dyn ExtendedModifyListener>,
    fault_handler: RefCell<Option<FaultHandler>>,
    fault_count: Cell<usize>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the hook that receives listener faults
    pub fn set_fault_handler(&self, handler: Option<FaultHandler>) {
        self.fault_handler.replace(handler);
    }

    /// Number of faults reported so far
    pub fn fault_count(&self) -> usize {
        self.fault_count.get()
    }

    /// Deliver `notification` to the listener(s) registered for its kind
    pub fn dispatch(&self, notification: Notification<'_>) -> Reply {
        let kind = notification.kind();
        match notification {
            Notification::TextChanging(event, content) => {
                self.notify_all(kind, &self.text_change, |l| l.text_changing(event, content))
            }
            Notification::TextChanged(event, content) => {
                self.notify_all(kind, &self.text_change, |l| l.text_changed(event, content))
            }
            Notification::TextSet(event, content) => {
                self.notify_all(kind, &self.text_change, |l| l.text_set(event, content))
            }
            Notification::LineGetStyle(request) => self
                .ask(kind, &self.line_style, |l| l.line_style(request))
                .map_or(Reply::Unhandled, |styles| Reply::Styles(styles.unwrap_or_default())),
            Notification::LineGetBackground(request) => self
                .ask(kind, &self.line_background, |l| l.line_background(request))
                .map_or(Reply::Unhandled, |color| Reply::Background(color.flatten())),
            Notification::LineGetSegments(request) => self
                .ask(kind, &self.segments, |l| l.line_segments(request))
                .map_or(Reply::Unhandled, |segments| {
                    Reply::Segments(segments.unwrap_or_default())
                }),
            Notification::NextOffset(request) => self
                .ask(kind, &self.movement, |l| l.next_offset(request))
                .map_or(Reply::Unhandled, |offset| Reply::Offset(offset.flatten())),
            Notification::PreviousOffset(request) => self
                .ask(kind, &self.movement, |l| l.previous_offset(request))
                .map_or(Reply::Unhandled, |offset| Reply::Offset(offset.flatten())),
            Notification::LineSpacing(request) => self
                .ask(kind, &self.spacing, |l| l.line_spacing(request))
                .map_or(Reply::Unhandled, |spacing| Reply::Spacing(spacing.flatten())),
            Notification::PaintObject(request) => {
                self.notify_all(kind, &self.paint_object, |l| l.paint_object(request))
            }
            Notification::CaretMoved(event) => {
                self.notify_all(kind, &self.caret, |l| l.caret_moved(event))
            }
            Notification::VerifyKey(event) => self.verify_key_all(kind, event),
            Notification::Verify(event) => self.verify_all(kind, event),
            Notification::ExtendedModify(event) => {
                self.notify_all(kind, &self.extended_modify, |l| l.modify_text(event))
            }
        }
    }

    /// Ask the single listener in `slot`.
    ///
    /// `None` if the slot is empty, `Some(None)` if the listener faulted.
    fn ask<L: ?Sized, T>(
        &self,
        kind: NotificationKind,
        slot: &ListenerSlot<L>,
        call: impl FnOnce(&L) -> anyhow::Result<T>,
    ) -> Option<Option<T>> {
        let subscriber = slot.get()?;
        match subscriber.invoke(call) {
            Invocation::Done(value) => Some(Some(value)),
            Invocation::Gone => None,
            Invocation::Busy => {
                self.report_reentry(kind);
                Some(None)
            }
            Invocation::Failed(err) => {
                self.report_fault(kind, &err);
                Some(None)
            }
        }
    }

    /// Call every listener in `list` for its side effects
    fn notify_all<L: ?Sized>(
        &self,
        kind: NotificationKind,
        list: &ListenerList<L>,
        mut call: impl FnMut(&L) -> anyhow::Result<()>,
    ) -> Reply {
        let snapshot = list.snapshot();
        if snapshot.is_empty() {
            return Reply::Unhandled;
        }
        for subscriber in &snapshot {
            self.settle(kind, subscriber.invoke(&mut call));
        }
        Reply::Delivered
    }

    /// Every listener runs; any veto wins
    fn verify_key_all(&self, kind: NotificationKind, event: &KeyEvent) -> Reply {
        let snapshot = self.verify_key.snapshot();
        if snapshot.is_empty() {
            return Reply::Unhandled;
        }
        let mut proceed = true;
        for subscriber in &snapshot {
            let verdict = self.settle(kind, subscriber.invoke(|l| l.verify_key(event)));
            if let Some(KeyVerdict::Veto) = verdict {
                proceed = false;
            }
        }
        tracing::trace!(key = %event.key, proceed, "verify key dispatched");
        Reply::Proceed(proceed)
    }

    /// Every listener runs and sees the text as rewritten by the ones before
    /// it. Any rejection wins; otherwise the last rewrite is the answer.
    fn verify_all(&self, kind: NotificationKind, event: &VerifyTextEvent) -> Reply {
        let snapshot = self.verify.snapshot();
        if snapshot.is_empty() {
            return Reply::Unhandled;
        }
        let mut current = event.clone();
        let mut rejected = false;
        let mut rewritten = false;
        for subscriber in &snapshot {
            match self.settle(kind, subscriber.invoke(|l| l.verify_text(&current))) {
                Some(TextVerdict::Reject) => rejected = true,
                Some(TextVerdict::Replace(text)) => {
                    current.text = text;
                    rewritten = true;
                }
                Some(TextVerdict::Accept) | None => {}
            }
        }
        let verdict = if rejected {
            TextVerdict::Reject
        } else if rewritten {
            TextVerdict::Replace(current.text)
        } else {
            TextVerdict::Accept
        };
        Reply::Verdict(verdict)
    }

    fn settle<T>(&self, kind: NotificationKind, invocation: Invocation<T>) -> Option<T> {
        match invocation {
            Invocation::Done(value) => Some(value),
            Invocation::Gone => None,
            Invocation::Busy => {
                self.report_reentry(kind);
                None
            }
            Invocation::Failed(err) => {
                self.report_fault(kind, &err);
                None
            }
        }
    }

    fn report_reentry(&self, kind: NotificationKind) {
        self.report(ListenerFault {
            kind,
            message: "listener re-entered while still running".to_string(),
        });
    }

    fn report_fault(&self, kind: NotificationKind, err: &anyhow::Error) {
        self.report(ListenerFault {
            kind,
            message: format!("{:#}", err),
        });
    }

    fn report(&self, fault: ListenerFault) {
        tracing::warn!(kind = %fault.kind, "{}", fault);
        self.fault_count.set(self.fault_count.get() + 1);
        let handler = self.fault_handler.borrow().clone();
        if let Some(handler) = handler {
            handler(&fault);
        }
    }

    // -------------------------------------------------------------------------
    // Typed front-ends over `dispatch`
    // -------------------------------------------------------------------------

    /// Style ranges from the style listener, `None` if none is registered
    pub fn line_style(&self, request: &LineRequest<'_>) -> Option<Vec<StyleRange>> {
        match self.dispatch(Notification::LineGetStyle(request)) {
            Reply::Styles(styles) => Some(styles),
            _ => None,
        }
    }

    /// Background from the background listener, `None` if none is
    /// registered, `Some(None)` for "widget default"
    pub fn line_background(&self, request: &LineRequest<'_>) -> Option<Option<Color>> {
        match self.dispatch(Notification::LineGetBackground(request)) {
            Reply::Background(color) => Some(color),
            _ => None,
        }
    }

    /// Raw segment boundaries from the bidi listener (empty if none)
    pub fn line_segments(&self, request: &LineRequest<'_>) -> Vec<usize> {
        match self.dispatch(Notification::LineGetSegments(request)) {
            Reply::Segments(segments) => segments,
            _ => Vec::new(),
        }
    }

    /// Listener answer for a movement, `None` to use the built-in rule
    pub fn movement_offset(&self, request: &MovementRequest<'_>, forward: bool) -> Option<usize> {
        let notification = if forward {
            Notification::NextOffset(request)
        } else {
            Notification::PreviousOffset(request)
        };
        match self.dispatch(notification) {
            Reply::Offset(offset) => offset,
            _ => None,
        }
    }

    pub fn line_spacing(&self, request: &LineRequest<'_>) -> Option<u32> {
        match self.dispatch(Notification::LineSpacing(request)) {
            Reply::Spacing(spacing) => spacing,
            _ => None,
        }
    }

    /// Accumulated verify-key flag; true when nobody objects
    pub fn verify_key(&self, event: &KeyEvent) -> bool {
        match self.dispatch(Notification::VerifyKey(event)) {
            Reply::Proceed(proceed) => proceed,
            _ => true,
        }
    }

    pub fn verify_text(&self, event: &VerifyTextEvent) -> TextVerdict {
        match self.dispatch(Notification::Verify(event)) {
            Reply::Verdict(verdict) => verdict,
            _ => TextVerdict::Accept,
        }
    }
}
