//! Default key bindings of the widget
//!
//! The table mirrors the classic platform text widget: arrow/home/end/page
//! keys move (Ctrl for word, text and window motions), Shift extends the
//! selection, plus the clipboard and deletion keys.

use super::action::{compose_action, Action, Motion};
use super::binding::Keybinding;
use super::config::load_keymap_file;
use super::types::{KeyCode, Keystroke, Modifiers};

/// Keys of the plain motions, and the Ctrl variant of the same key
const MOTION_KEYS: [(KeyCode, Motion, Option<Motion>); 8] = [
    (KeyCode::Up, Motion::LineUp, None),
    (KeyCode::Down, Motion::LineDown, None),
    (KeyCode::Home, Motion::LineStart, Some(Motion::TextStart)),
    (KeyCode::End, Motion::LineEnd, Some(Motion::TextEnd)),
    (KeyCode::Left, Motion::ColumnPrevious, Some(Motion::WordPrevious)),
    (KeyCode::Right, Motion::ColumnNext, Some(Motion::WordNext)),
    (KeyCode::PageUp, Motion::PageUp, Some(Motion::WindowStart)),
    (KeyCode::PageDown, Motion::PageDown, Some(Motion::WindowEnd)),
];

/// Generate the default key bindings
pub fn default_bindings() -> Vec<Keybinding> {
    let ctrl = Modifiers::CTRL;
    let shift = Modifiers::SHIFT;
    let none = Modifiers::NONE;

    let mut bindings = Vec::with_capacity(40);

    // Navigation, with and without selection
    for (key, motion, ctrl_motion) in MOTION_KEYS {
        for mods in [none, shift] {
            bindings.push(bind(key, mods, compose_action(motion, mods)));
            if let Some(ctrl_motion) = ctrl_motion {
                bindings.push(bind(key, ctrl | mods, compose_action(ctrl_motion, mods)));
            }
        }
    }

    bindings.extend([
        // Clipboard
        bind(KeyCode::Char('x'), ctrl, Action::Cut),
        bind(KeyCode::Char('c'), ctrl, Action::Copy),
        bind(KeyCode::Char('v'), ctrl, Action::Paste),
        bind(KeyCode::Delete, shift, Action::Cut),
        bind(KeyCode::Insert, ctrl, Action::Copy),
        bind(KeyCode::Insert, shift, Action::Paste),
        // Deletion
        bind(KeyCode::Backspace, none, Action::DeletePrevious),
        bind(KeyCode::Delete, none, Action::DeleteNext),
        // Modes
        bind(KeyCode::Insert, none, Action::ToggleOverwrite),
    ]);

    bindings
}

/// Merge override bindings into base bindings
///
/// - An override for an already bound keystroke replaces it
/// - An override with no action removes the keystroke's binding
/// - Otherwise the override is added
pub fn merge_bindings(base: Vec<Keybinding>, overrides: Vec<Keybinding>) -> Vec<Keybinding> {
    let mut result = base;

    for binding in overrides {
        if binding.action.is_none() {
            result.retain(|b| b.keystroke != binding.keystroke);
            continue;
        }

        match result.iter().position(|b| b.keystroke == binding.keystroke) {
            Some(idx) => result[idx] = binding,
            None => result.push(binding),
        }
    }

    result
}

/// Defaults merged with the user's `keymap.yaml`, if there is one
pub fn load_default_keymap() -> Vec<Keybinding> {
    let bindings = default_bindings();

    let Some(user_path) = crate::config_paths::keymap_file() else {
        return bindings;
    };
    if !user_path.exists() {
        return bindings;
    }

    match load_keymap_file(&user_path) {
        Ok(user_bindings) => {
            tracing::info!(
                "Merging user keymap from {} ({} bindings)",
                user_path.display(),
                user_bindings.len()
            );
            merge_bindings(bindings, user_bindings)
        }
        Err(e) => {
            tracing::warn!("Failed to load user keymap from {}: {}", user_path.display(), e);
            bindings
        }
    }
}

fn bind(key: KeyCode, mods: Modifiers, action: Action) -> Keybinding {
    Keybinding::new(Keystroke::new(key, mods), action)
}
