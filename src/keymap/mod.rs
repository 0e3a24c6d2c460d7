//! Configurable key bindings
//!
//! This module provides the data-driven binding table of the widget:
//! - Maps keystrokes to widget actions
//! - Encodes keystrokes and actions as numeric codes (key constant | modifier bits)
//! - Enables user customization via YAML
//!
//! # Architecture
//!
//! ```text
//! KeyEvent → verify-key listeners → Keystroke → KeyBindings::lookup() → Action
//! ```

mod action;
mod binding;
mod config;
mod defaults;
#[allow(clippy::module_inception)]
mod keymap;
mod types;

pub use action::{compose_action, Action, Motion};
pub use binding::Keybinding;
pub use config::{
    load_keymap_file, parse_bindings, parse_key_string, parse_keymap_yaml, BindingConfig,
    KeymapError,
};
pub use defaults::{default_bindings, load_default_keymap, merge_bindings};
pub use keymap::KeyBindings;
pub use types::{codes, KeyCode, KeyEvent, Keystroke, Modifiers};

#[cfg(test)]
mod tests;
