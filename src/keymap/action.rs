//! Actions a key binding can trigger
//!
//! Every action has a numeric code: the key constant of its canonical
//! keystroke OR'd with modifier bits, so `Select(m)` is `Move(m) | SHIFT`.

use std::fmt;
use std::str::FromStr;

use super::types::{codes, Modifiers};

/// Caret motions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    LineUp,
    LineDown,
    LineStart,
    LineEnd,
    ColumnPrevious,
    ColumnNext,
    PageUp,
    PageDown,
    WordPrevious,
    WordNext,
    TextStart,
    TextEnd,
    /// First visible line
    WindowStart,
    /// Last visible line
    WindowEnd,
}

impl Motion {
    pub const ALL: [Motion; 14] = [
        Motion::LineUp,
        Motion::LineDown,
        Motion::LineStart,
        Motion::LineEnd,
        Motion::ColumnPrevious,
        Motion::ColumnNext,
        Motion::PageUp,
        Motion::PageDown,
        Motion::WordPrevious,
        Motion::WordNext,
        Motion::TextStart,
        Motion::TextEnd,
        Motion::WindowStart,
        Motion::WindowEnd,
    ];

    /// Code of the plain motion
    pub const fn code(self) -> u32 {
        match self {
            Motion::LineUp => codes::ARROW_UP,
            Motion::LineDown => codes::ARROW_DOWN,
            Motion::LineStart => codes::HOME,
            Motion::LineEnd => codes::END,
            Motion::ColumnPrevious => codes::ARROW_LEFT,
            Motion::ColumnNext => codes::ARROW_RIGHT,
            Motion::PageUp => codes::PAGE_UP,
            Motion::PageDown => codes::PAGE_DOWN,
            Motion::WordPrevious => codes::ARROW_LEFT | codes::CTRL,
            Motion::WordNext => codes::ARROW_RIGHT | codes::CTRL,
            Motion::TextStart => codes::HOME | codes::CTRL,
            Motion::TextEnd => codes::END | codes::CTRL,
            Motion::WindowStart => codes::PAGE_UP | codes::CTRL,
            Motion::WindowEnd => codes::PAGE_DOWN | codes::CTRL,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Motion::LineUp => "line_up",
            Motion::LineDown => "line_down",
            Motion::LineStart => "line_start",
            Motion::LineEnd => "line_end",
            Motion::ColumnPrevious => "column_previous",
            Motion::ColumnNext => "column_next",
            Motion::PageUp => "page_up",
            Motion::PageDown => "page_down",
            Motion::WordPrevious => "word_previous",
            Motion::WordNext => "word_next",
            Motion::TextStart => "text_start",
            Motion::TextEnd => "text_end",
            Motion::WindowStart => "window_start",
            Motion::WindowEnd => "window_end",
        }
    }
}

/// All actions that can be bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move the caret, collapsing the selection
    Move(Motion),
    /// Move the caret, extending the selection
    Select(Motion),
    Cut,
    Copy,
    Paste,
    DeletePrevious,
    DeleteNext,
    ToggleOverwrite,
}

/// The action for `motion` under `mods`: shift extends the selection
pub fn compose_action(motion: Motion, mods: Modifiers) -> Action {
    if mods.shift() {
        Action::Select(motion)
    } else {
        Action::Move(motion)
    }
}

impl Action {
    pub const fn code(self) -> u32 {
        match self {
            Action::Move(motion) => motion.code(),
            Action::Select(motion) => motion.code() | codes::SHIFT,
            Action::Cut => codes::DEL | codes::SHIFT,
            Action::Copy => codes::INSERT | codes::CTRL,
            Action::Paste => codes::INSERT | codes::SHIFT,
            Action::DeletePrevious => codes::BS,
            Action::DeleteNext => codes::DEL,
            Action::ToggleOverwrite => codes::INSERT,
        }
    }

    /// Inverse of [`Action::code`]
    pub fn from_code(code: u32) -> Option<Action> {
        match code {
            c if c == Action::Cut.code() => return Some(Action::Cut),
            c if c == Action::Copy.code() => return Some(Action::Copy),
            c if c == Action::Paste.code() => return Some(Action::Paste),
            codes::BS => return Some(Action::DeletePrevious),
            codes::DEL => return Some(Action::DeleteNext),
            codes::INSERT => return Some(Action::ToggleOverwrite),
            _ => {}
        }
        Motion::ALL.iter().find_map(|&motion| {
            if motion.code() == code {
                Some(Action::Move(motion))
            } else if motion.code() | codes::SHIFT == code {
                Some(Action::Select(motion))
            } else {
                None
            }
        })
    }

    /// The motion moved along, for caret actions
    pub fn motion(self) -> Option<Motion> {
        match self {
            Action::Move(motion) | Action::Select(motion) => Some(motion),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(motion) => f.write_str(motion.name()),
            Action::Select(motion) => write!(f, "select_{}", motion.name()),
            Action::Cut => f.write_str("cut"),
            Action::Copy => f.write_str("copy"),
            Action::Paste => f.write_str("paste"),
            Action::DeletePrevious => f.write_str("delete_previous"),
            Action::DeleteNext => f.write_str("delete_next"),
            Action::ToggleOverwrite => f.write_str("toggle_overwrite"),
        }
    }
}

impl FromStr for Action {
    type Err = ();

    /// Parse the snake_case name printed by `Display`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        let simple = match name.as_str() {
            "cut" => Some(Action::Cut),
            "copy" => Some(Action::Copy),
            "paste" => Some(Action::Paste),
            "delete_previous" => Some(Action::DeletePrevious),
            "delete_next" => Some(Action::DeleteNext),
            "toggle_overwrite" => Some(Action::ToggleOverwrite),
            _ => None,
        };
        if let Some(action) = simple {
            return Ok(action);
        }
        let (select, motion_name) = match name.strip_prefix("select_") {
            Some(rest) => (true, rest),
            None => (false, name.as_str()),
        };
        let motion = Motion::ALL
            .iter()
            .copied()
            .find(|m| m.name() == motion_name)
            .ok_or(())?;
        Ok(if select {
            Action::Select(motion)
        } else {
            Action::Move(motion)
        })
    }
}
