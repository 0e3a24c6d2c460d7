//! YAML configuration parsing for key bindings
//!
//! Overrides are a list of `{ key, action }` entries, either inline in the
//! widget config or in a standalone `bindings:` file. `action: none`
//! removes the binding.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::binding::Keybinding;
use super::types::{KeyCode, Keystroke, Modifiers};

/// Root structure of a standalone keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Load keybindings from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<Vec<Keybinding>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse keybindings from YAML string
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<Keybinding>, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    parse_bindings(&config.bindings)
}

/// Convert binding entries, skipping those meant for another platform
pub fn parse_bindings(entries: &[BindingConfig]) -> Result<Vec<Keybinding>, KeymapError> {
    let current_platform = get_current_platform();
    let mut bindings = Vec::with_capacity(entries.len());

    for entry in entries {
        if let Some(ref platform) = entry.platform {
            if platform != current_platform {
                continue;
            }
        }

        let keystroke = parse_key_string(&entry.key)?;
        let binding = match parse_action(&entry.action)? {
            Some(action) => Keybinding::new(keystroke, action),
            None => Keybinding::unbind(keystroke),
        };
        bindings.push(binding);
    }

    Ok(bindings)
}

/// Parse a key string like "ctrl+shift+left" into a Keystroke
pub fn parse_key_string(key_str: &str) -> Result<Keystroke, KeymapError> {
    let mut mods = Modifiers::NONE;
    let mut key_part = None;

    for part in key_str.split('+') {
        let part_lower = part.trim().to_lowercase();
        match part_lower.as_str() {
            "cmd" => {
                mods = mods | Modifiers::cmd();
            }
            "ctrl" | "control" => {
                mods = mods | Modifiers::CTRL;
            }
            "shift" => {
                mods = mods | Modifiers::SHIFT;
            }
            "alt" | "option" | "opt" => {
                mods = mods | Modifiers::ALT;
            }
            "meta" | "super" | "win" => {
                mods = mods | Modifiers::META;
            }
            _ => {
                if key_part.is_some() {
                    return Err(KeymapError::InvalidKey(format!(
                        "Multiple keys in binding: {}",
                        key_str
                    )));
                }
                key_part = Some(parse_key_code(&part_lower)?);
            }
        }
    }

    let key = key_part
        .ok_or_else(|| KeymapError::InvalidKey(format!("No key found in binding: {}", key_str)))?;

    Ok(Keystroke::new(key, mods))
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<KeyCode, KeymapError> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }

    match key {
        "enter" | "return" => Ok(KeyCode::Enter),
        "escape" | "esc" => Ok(KeyCode::Escape),
        "tab" => Ok(KeyCode::Tab),
        "backspace" | "back" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "space" => Ok(KeyCode::Space),

        "up" | "arrowup" => Ok(KeyCode::Up),
        "down" | "arrowdown" => Ok(KeyCode::Down),
        "left" | "arrowleft" => Ok(KeyCode::Left),
        "right" | "arrowright" => Ok(KeyCode::Right),

        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdown" | "pgdn" => Ok(KeyCode::PageDown),
        "insert" | "ins" => Ok(KeyCode::Insert),

        f if f.starts_with('f') => f[1..]
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=24).contains(n))
            .map(KeyCode::F)
            .ok_or_else(|| KeymapError::InvalidKey(format!("Unknown key: {}", key))),

        _ => Err(KeymapError::InvalidKey(format!("Unknown key: {}", key))),
    }
}

/// Parse an action name; `none` means "unbind"
fn parse_action(name: &str) -> Result<Option<Action>, KeymapError> {
    if name.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    name.parse::<Action>()
        .map(Some)
        .map_err(|_| KeymapError::InvalidAction(name.to_string()))
}

/// Get the current platform identifier
fn get_current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Errors that can occur when parsing keymaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidKey(String),
    InvalidAction(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidKey(k) => write!(f, "Invalid key: {}", k),
            KeymapError::InvalidAction(a) => write!(f, "Invalid action: {}", a),
        }
    }
}

impl std::error::Error for KeymapError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::action::Motion;

    #[test]
    fn test_parse_simple_key() {
        let stroke = parse_key_string("a").unwrap();
        assert_eq!(stroke.key, KeyCode::Char('a'));
        assert!(stroke.mods.is_empty());
    }

    #[test]
    fn test_parse_key_with_multiple_modifiers() {
        let stroke = parse_key_string("ctrl+shift+left").unwrap();
        assert_eq!(stroke.key, KeyCode::Left);
        assert!(stroke.mods.ctrl());
        assert!(stroke.mods.shift());
    }

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(parse_key_string("f5").unwrap().key, KeyCode::F(5));
        assert!(parse_key_string("f25").is_err());
        assert!(parse_key_string("foo").is_err());
    }

    #[test]
    fn test_parse_rejects_two_keys() {
        assert!(matches!(
            parse_key_string("a+b"),
            Err(KeymapError::InvalidKey(_))
        ));
        assert!(matches!(
            parse_key_string("ctrl+shift"),
            Err(KeymapError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
bindings:
  - key: "ctrl+e"
    action: line_end
  - key: "insert"
    action: none
"#;

        let bindings = parse_keymap_yaml(yaml).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].action, Some(Action::Move(Motion::LineEnd)));
        assert_eq!(bindings[1].action, None);
    }

    #[test]
    fn test_parse_yaml_with_platform() {
        let yaml = r#"
bindings:
  - key: "ctrl+a"
    action: line_start
  - key: "meta+left"
    action: line_start
    platform: macos
"#;

        let bindings = parse_keymap_yaml(yaml).unwrap();

        #[cfg(target_os = "macos")]
        assert_eq!(bindings.len(), 2);

        #[cfg(not(target_os = "macos"))]
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_parse_yaml_unknown_action() {
        let yaml = r#"
bindings:
  - key: "ctrl+z"
    action: undo
"#;
        assert_eq!(
            parse_keymap_yaml(yaml),
            Err(KeymapError::InvalidAction("undo".to_string()))
        );
    }
}
