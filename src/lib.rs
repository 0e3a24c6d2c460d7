//! styledtext - the change-notification and on-demand styling protocol of a
//! styled, bidirectional text view
//!
//! The view never stores styling for the whole document. It asks listeners
//! for each line as it lays the line out, and it stays in step with a
//! pluggable text store through change notifications:
//!
//! ```text
//! StyledTextContent ──textChanging/textChanged/textSet──▶ ListenerRegistry ──▶ listeners
//! StyledText (view) ──lineGetStyle/lineGetBackground/…──▶ ListenerRegistry ──▶ listeners
//! ```

pub mod change;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod content;
pub mod editor;
pub mod keymap;
pub mod listener;
pub mod movement;
pub mod query;
pub mod registry;
pub mod style;
pub mod styler;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use change::{
    ExtendedModifyEvent, TextChangedEvent, TextChangingEvent, TextMutation, TextSetEvent,
    TextVerdict, VerifyTextEvent,
};
pub use config::{ConfigError, LineDelimiter, StyledTextConfig};
pub use content::{ContentError, RopeContent, StyledTextContent, TextRead};
pub use editor::{KeyOutcome, LineLayout, Selection, StyledText};
pub use query::{
    CaretEvent, KeyVerdict, LineRequest, Movement, MovementRequest, PaintObjectRequest, SurfaceId,
};
pub use registry::{ListenerFault, ListenerRegistry, Notification, NotificationKind, Reply};
pub use style::{Color, FontStyle, GlyphMetrics, StyleRange, TextStyle};
