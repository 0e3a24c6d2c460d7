//! Key binding table: keystroke → action

use std::collections::HashMap;

use super::action::Action;
use super::binding::Keybinding;
use super::defaults::default_bindings;
use super::types::Keystroke;

/// The key binding table of one widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    table: HashMap<Keystroke, Action>,
}

impl KeyBindings {
    /// Create a table with no bindings
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Create a table from `bindings`; later entries override earlier ones
    pub fn with_bindings(bindings: impl IntoIterator<Item = Keybinding>) -> Self {
        let mut table = Self::empty();
        for binding in bindings {
            table.apply(binding);
        }
        table
    }

    /// Bind `keystroke` to `action`, or unbind it with `None`
    pub fn set_key_binding(&mut self, keystroke: Keystroke, action: Option<Action>) {
        match action {
            Some(action) => {
                tracing::debug!(%keystroke, %action, "key bound");
                self.table.insert(keystroke, action);
            }
            None => {
                tracing::debug!(%keystroke, "key unbound");
                self.table.remove(&keystroke);
            }
        }
    }

    pub fn apply(&mut self, binding: Keybinding) {
        self.set_key_binding(binding.keystroke, binding.action);
    }

    /// The action bound to `keystroke`
    pub fn lookup(&self, keystroke: &Keystroke) -> Option<Action> {
        self.table.get(keystroke).copied()
    }

    /// Look up a keystroke by its numeric code
    pub fn key_binding(&self, code: u32) -> Option<Action> {
        Keystroke::from_code(code).and_then(|k| self.lookup(&k))
    }

    /// All keystrokes bound to `action`
    pub fn keys_for(&self, action: Action) -> Vec<Keystroke> {
        let mut keys: Vec<Keystroke> = self
            .table
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(Keystroke::code);
        keys
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::with_bindings(default_bindings())
    }
}
