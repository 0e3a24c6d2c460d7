//! Core types for the keymap system: Keystroke, Modifiers, KeyCode, KeyEvent
//!
//! Keystrokes also have a numeric form (`Keystroke::code`): a key constant
//! OR'd with modifier bit flags, the encoding used by action codes.

use std::fmt;

use serde::Serialize;

/// Bit flags of the numeric keystroke encoding
pub mod codes {
    pub const ALT: u32 = 1 << 16;
    pub const SHIFT: u32 = 1 << 17;
    pub const CTRL: u32 = 1 << 18;
    pub const META: u32 = 1 << 22;
    pub const MODIFIER_MASK: u32 = ALT | SHIFT | CTRL | META;

    /// Marks non-character keys
    pub const KEYCODE_BIT: u32 = 1 << 24;
    pub const ARROW_UP: u32 = KEYCODE_BIT + 1;
    pub const ARROW_DOWN: u32 = KEYCODE_BIT + 2;
    pub const ARROW_LEFT: u32 = KEYCODE_BIT + 3;
    pub const ARROW_RIGHT: u32 = KEYCODE_BIT + 4;
    pub const PAGE_UP: u32 = KEYCODE_BIT + 5;
    pub const PAGE_DOWN: u32 = KEYCODE_BIT + 6;
    pub const HOME: u32 = KEYCODE_BIT + 7;
    pub const END: u32 = KEYCODE_BIT + 8;
    pub const INSERT: u32 = KEYCODE_BIT + 9;
    pub const F1: u32 = KEYCODE_BIT + 10;

    pub const BS: u32 = 8;
    pub const TAB: u32 = 9;
    pub const LF: u32 = 10;
    pub const CR: u32 = 13;
    pub const ESC: u32 = 27;
    pub const SPACE: u32 = 32;
    pub const DEL: u32 = 127;
}

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Get the platform-specific "command" modifier (Cmd on macOS, Ctrl elsewhere)
    pub fn cmd() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::META
        } else {
            Modifiers::CTRL
        }
    }

    /// Bit flags of the numeric encoding
    pub const fn code(self) -> u32 {
        let mut bits = 0;
        if self.ctrl() {
            bits |= codes::CTRL;
        }
        if self.shift() {
            bits |= codes::SHIFT;
        }
        if self.alt() {
            bits |= codes::ALT;
        }
        if self.meta() {
            bits |= codes::META;
        }
        bits
    }

    pub const fn from_code(code: u32) -> Modifiers {
        Modifiers::new(
            code & codes::CTRL != 0,
            code & codes::SHIFT != 0,
            code & codes::ALT != 0,
            code & codes::META != 0,
        )
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push("Alt");
        }
        if self.meta() {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code representing a physical or logical key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (normalized to lowercase)
    Char(char),

    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    Up,
    Down,
    Left,
    Right,

    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    F(u8), // F1-F24
}

impl KeyCode {
    /// Key constant of the numeric encoding
    pub fn code(self) -> u32 {
        match self {
            KeyCode::Char(c) => c.to_ascii_lowercase() as u32,
            KeyCode::Enter => codes::CR,
            KeyCode::Escape => codes::ESC,
            KeyCode::Tab => codes::TAB,
            KeyCode::Backspace => codes::BS,
            KeyCode::Delete => codes::DEL,
            KeyCode::Space => codes::SPACE,
            KeyCode::Up => codes::ARROW_UP,
            KeyCode::Down => codes::ARROW_DOWN,
            KeyCode::Left => codes::ARROW_LEFT,
            KeyCode::Right => codes::ARROW_RIGHT,
            KeyCode::Home => codes::HOME,
            KeyCode::End => codes::END,
            KeyCode::PageUp => codes::PAGE_UP,
            KeyCode::PageDown => codes::PAGE_DOWN,
            KeyCode::Insert => codes::INSERT,
            KeyCode::F(n) => codes::F1 + u32::from(n.max(1)) - 1,
        }
    }

    /// Inverse of [`KeyCode::code`], ignoring modifier bits
    pub fn from_code(code: u32) -> Option<KeyCode> {
        let key = code & !codes::MODIFIER_MASK;
        let named = match key {
            codes::CR | codes::LF => KeyCode::Enter,
            codes::ESC => KeyCode::Escape,
            codes::TAB => KeyCode::Tab,
            codes::BS => KeyCode::Backspace,
            codes::DEL => KeyCode::Delete,
            codes::SPACE => KeyCode::Space,
            codes::ARROW_UP => KeyCode::Up,
            codes::ARROW_DOWN => KeyCode::Down,
            codes::ARROW_LEFT => KeyCode::Left,
            codes::ARROW_RIGHT => KeyCode::Right,
            codes::HOME => KeyCode::Home,
            codes::END => KeyCode::End,
            codes::PAGE_UP => KeyCode::PageUp,
            codes::PAGE_DOWN => KeyCode::PageDown,
            codes::INSERT => KeyCode::Insert,
            k if (codes::F1..codes::F1 + 24).contains(&k) => KeyCode::F((k - codes::F1 + 1) as u8),
            k if k < codes::KEYCODE_BIT => {
                let c = char::from_u32(k)?;
                if c.is_control() {
                    return None;
                }
                KeyCode::Char(c.to_ascii_lowercase())
            }
            _ => return None,
        };
        Some(named)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Up => write!(f, "Up"),
            KeyCode::Down => write!(f, "Down"),
            KeyCode::Left => write!(f, "Left"),
            KeyCode::Right => write!(f, "Right"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::F(n) => write!(f, "F{}", n),
        }
    }
}

/// A single keystroke: a key with modifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Keystroke {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl Keystroke {
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// Create a keystroke with no modifiers
    pub const fn key(key: KeyCode) -> Self {
        Self {
            key,
            mods: Modifiers::NONE,
        }
    }

    /// Create a keystroke with a character and modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self {
            key: KeyCode::Char(c.to_ascii_lowercase()),
            mods,
        }
    }

    /// Numeric form: key constant | modifier bits
    pub fn code(&self) -> u32 {
        self.key.code() | self.mods.code()
    }

    pub fn from_code(code: u32) -> Option<Keystroke> {
        Some(Keystroke::new(
            KeyCode::from_code(code)?,
            Modifiers::from_code(code),
        ))
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.mods.is_empty() {
            write!(f, "{}+{}", self.mods, self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}

/// A raw key event as delivered by the host, before any default handling.
///
/// `character` is the text the key would type (None for navigation and
/// function keys); `key` and `mods` identify the keystroke for bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct KeyEvent {
    pub character: Option<char>,
    #[serde(serialize_with = "serialize_display")]
    pub key: KeyCode,
    #[serde(serialize_with = "serialize_display")]
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(key: KeyCode, mods: Modifiers, character: Option<char>) -> Self {
        Self {
            character,
            key,
            mods,
        }
    }

    /// A key that types `c` with no modifiers
    pub fn typed(c: char) -> Self {
        let key = match c {
            '\r' | '\n' => KeyCode::Enter,
            '\t' => KeyCode::Tab,
            ' ' => KeyCode::Space,
            '\u{8}' => KeyCode::Backspace,
            '\u{7f}' => KeyCode::Delete,
            c => KeyCode::Char(c.to_ascii_lowercase()),
        };
        let mods = if c.is_uppercase() {
            Modifiers::SHIFT
        } else {
            Modifiers::NONE
        };
        Self::new(key, mods, Some(c))
    }

    /// A non-typing key such as an arrow
    pub fn key(key: KeyCode, mods: Modifiers) -> Self {
        let character = match key {
            KeyCode::Backspace => Some('\u{8}'),
            KeyCode::Delete => Some('\u{7f}'),
            KeyCode::Enter => Some('\r'),
            KeyCode::Tab => Some('\t'),
            _ => None,
        };
        Self::new(key, mods, character)
    }

    pub fn keystroke(&self) -> Keystroke {
        Keystroke::new(self.key, self.mods)
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_empty() {
        let mods = Modifiers::NONE;
        assert!(mods.is_empty());
        assert!(!mods.ctrl());
        assert!(!mods.shift());
        assert!(!mods.alt());
        assert!(!mods.meta());
    }

    #[test]
    fn test_modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(mods.ctrl());
        assert!(mods.shift());
        assert!(!mods.alt());
    }

    #[test]
    fn test_keystroke_codes() {
        assert_eq!(Keystroke::key(KeyCode::Up).code(), 16777217);
        assert_eq!(Keystroke::key(KeyCode::Delete).code(), 127);
        assert_eq!(
            Keystroke::new(KeyCode::Delete, Modifiers::SHIFT).code(),
            131199
        );
        assert_eq!(
            Keystroke::new(KeyCode::Right, Modifiers::CTRL).code(),
            codes::ARROW_RIGHT | codes::CTRL
        );
        assert_eq!(KeyCode::F(1).code(), codes::F1);
    }

    #[test]
    fn test_keystroke_from_code() {
        let stroke = Keystroke::new(KeyCode::End, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(Keystroke::from_code(stroke.code()), Some(stroke));
        assert_eq!(
            Keystroke::from_code('x' as u32 | codes::CTRL),
            Some(Keystroke::char_with_mods('x', Modifiers::CTRL))
        );
        assert_eq!(KeyCode::from_code(codes::F1 + 11), Some(KeyCode::F(12)));
        assert_eq!(KeyCode::from_code(0x18), None);
    }

    #[test]
    fn test_key_event_typed() {
        let event = KeyEvent::typed('A');
        assert_eq!(event.key, KeyCode::Char('a'));
        assert!(event.mods.shift());
        assert_eq!(event.character, Some('A'));

        let event = KeyEvent::key(KeyCode::Delete, Modifiers::NONE);
        assert_eq!(event.character, Some('\u{7f}'));
    }

    #[test]
    fn test_keystroke_display() {
        let stroke = Keystroke::new(KeyCode::Char('s'), Modifiers::CTRL);
        assert_eq!(stroke.to_string(), "Ctrl+S");
    }
}
