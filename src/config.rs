//! Widget configuration
//!
//! Stored as YAML in `~/.config/styledtext/config.yaml`. Every field has a
//! default, so a partial (or empty) file is valid.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::keymap::{
    default_bindings, load_default_keymap, merge_bindings, parse_bindings, BindingConfig,
    KeyBindings,
};

/// The delimiter inserted for new lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDelimiter {
    Lf,
    CrLf,
    Cr,
    /// CRLF on Windows, LF elsewhere
    #[default]
    Platform,
}

impl LineDelimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            LineDelimiter::Lf => "\n",
            LineDelimiter::CrLf => "\r\n",
            LineDelimiter::Cr => "\r",
            LineDelimiter::Platform => {
                if cfg!(target_os = "windows") {
                    "\r\n"
                } else {
                    "\n"
                }
            }
        }
    }
}

/// Configuration of one styled text widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyledTextConfig {
    /// Columns per tab stop
    pub tab_width: usize,
    /// Maximum document length in characters, `None` for unlimited
    pub text_limit: Option<usize>,
    /// Single-line widgets never insert line delimiters
    pub single_line: bool,
    pub line_delimiter: LineDelimiter,
    /// Extra pixels between lines unless a spacing provider answers
    pub line_spacing: u32,
    /// Line height in pixels (ascent + descent)
    pub line_height: u32,
    /// Advance of one character cell in pixels
    pub char_width: u32,
    /// Start in overwrite mode
    pub overwrite: bool,
    /// Word-next stops after the trailing spaces of a word (true) or right
    /// at its end (false)
    pub word_movement_skips_spaces: bool,
    /// Merge the user's `keymap.yaml` into the defaults before applying
    /// `key_bindings`
    pub user_keymap: bool,
    /// Overrides applied on top of the default key bindings
    pub key_bindings: Vec<BindingConfig>,
}

impl Default for StyledTextConfig {
    fn default() -> Self {
        Self {
            tab_width: crate::util::text::TABULATOR_WIDTH,
            text_limit: None,
            single_line: false,
            line_delimiter: LineDelimiter::Platform,
            line_spacing: 0,
            line_height: 16,
            char_width: 8,
            overwrite: false,
            word_movement_skips_spaces: true,
            user_keymap: false,
            key_bindings: Vec::new(),
        }
    }
}

impl StyledTextConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load the user's config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`, creating its parent directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |e: std::io::Error| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(io_error)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default bindings with this config's overrides applied
    pub fn key_bindings(&self) -> Result<KeyBindings, ConfigError> {
        let overrides =
            parse_bindings(&self.key_bindings).map_err(|e| ConfigError::KeyBinding(e.to_string()))?;
        let base = if self.user_keymap {
            load_default_keymap()
        } else {
            default_bindings()
        };
        Ok(KeyBindings::with_bindings(merge_bindings(base, overrides)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::Invalid("tab_width must be at least 1".to_string()));
        }
        if self.line_height == 0 {
            return Err(ConfigError::Invalid("line_height must be at least 1".to_string()));
        }
        parse_bindings(&self.key_bindings).map_err(|e| ConfigError::KeyBinding(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur when loading a config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse(String),
    Invalid(String),
    KeyBinding(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "IO error on {}: {}", path, message),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
            ConfigError::KeyBinding(e) => write!(f, "Invalid key binding: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{Action, KeyCode, Keystroke, Modifiers, Motion};

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = StyledTextConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, StyledTextConfig::default());
        assert_eq!(config.tab_width, 4);
        assert!(config.word_movement_skips_spaces);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
tab_width: 8
single_line: true
line_delimiter: cr_lf
text_limit: 80
"#;
        let config = StyledTextConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.tab_width, 8);
        assert!(config.single_line);
        assert_eq!(config.line_delimiter.as_str(), "\r\n");
        assert_eq!(config.text_limit, Some(80));
        assert_eq!(config.line_height, 16);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            StyledTextConfig::from_yaml_str("tab_width: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            StyledTextConfig::from_yaml_str("tab_width: [1]"),
            Err(ConfigError::Parse(_))
        ));
        let yaml = r#"
key_bindings:
  - key: "hyper+q"
    action: cut
"#;
        assert!(matches!(
            StyledTextConfig::from_yaml_str(yaml),
            Err(ConfigError::KeyBinding(_))
        ));
    }

    #[test]
    fn test_key_binding_overrides() {
        let yaml = r#"
key_bindings:
  - key: "ctrl+e"
    action: select_line_end
  - key: "insert"
    action: none
"#;
        let bindings = StyledTextConfig::from_yaml_str(yaml)
            .unwrap()
            .key_bindings()
            .unwrap();
        assert_eq!(
            bindings.lookup(&Keystroke::char_with_mods('e', Modifiers::CTRL)),
            Some(Action::Select(Motion::LineEnd))
        );
        assert_eq!(bindings.lookup(&Keystroke::key(KeyCode::Insert)), None);
    }
}
