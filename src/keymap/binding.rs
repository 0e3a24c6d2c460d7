//! Keybinding struct representing a mapping from a keystroke to an action

use super::action::Action;
use super::types::Keystroke;

/// A single keybinding. `action: None` removes any binding for the keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keybinding {
    pub keystroke: Keystroke,
    pub action: Option<Action>,
}

impl Keybinding {
    pub fn new(keystroke: Keystroke, action: Action) -> Self {
        Self {
            keystroke,
            action: Some(action),
        }
    }

    /// A binding that unbinds `keystroke`
    pub fn unbind(keystroke: Keystroke) -> Self {
        Self {
            keystroke,
            action: None,
        }
    }

    /// Numeric key code of the bound keystroke
    pub fn key_code(&self) -> u32 {
        self.keystroke.code()
    }
}
