//! Character classification and line-break counting

/// Carriage return
pub const CR: char = '\r';
/// Line feed
pub const LF: char = '\n';

/// Check if a character is a line delimiter (CR or LF)
#[inline]
pub fn is_line_delimiter(ch: char) -> bool {
    ch == CR || ch == LF
}

/// Count line breaks in `text`. CR, LF and CRLF each count as one break.
pub fn count_line_breaks(text: &str) -> usize {
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            CR => {
                if chars.peek() == Some(&LF) {
                    chars.next();
                }
                count += 1;
            }
            LF => count += 1,
            _ => {}
        }
    }
    count
}

/// Replace every CR, LF or CRLF in `text` with `delimiter`
pub fn convert_line_delimiters(text: &str, delimiter: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            CR => {
                if chars.peek() == Some(&LF) {
                    chars.next();
                }
                result.push_str(delimiter);
            }
            LF => result.push_str(delimiter),
            ch => result.push(ch),
        }
    }
    result
}

/// Text up to the first line delimiter
pub fn first_line(text: &str) -> &str {
    text.split(is_line_delimiter).next().unwrap_or_default()
}

/// Character class for the built-in word movement rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharType {
    /// Space characters (not line delimiters)
    Whitespace,
    /// Letters and digits
    WordChar,
    /// Everything else except line breaks
    Other,
}

/// Get the character type for word navigation
pub fn char_type(ch: char) -> CharType {
    if is_space(ch) {
        CharType::Whitespace
    } else if ch.is_alphanumeric() {
        CharType::WordChar
    } else {
        CharType::Other
    }
}

/// Whitespace that is not a line delimiter
#[inline]
pub fn is_space(ch: char) -> bool {
    ch.is_whitespace() && !is_line_delimiter(ch)
}

/// Tab width used when no configuration is supplied
pub const TABULATOR_WIDTH: usize = 4;

/// Convert a character column to visual column (screen position).
/// Accounts for tab expansion when converting character index to screen position.
pub fn char_col_to_visual_col(text: &str, char_col: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut visual_col = 0;

    for (i, ch) in text.chars().enumerate() {
        if i >= char_col {
            break;
        }

        if ch == '\t' {
            visual_col += tab_width - (visual_col % tab_width);
        } else {
            visual_col += 1;
        }
    }

    visual_col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_line_breaks_mixed_delimiters() {
        assert_eq!(count_line_breaks(""), 0);
        assert_eq!(count_line_breaks("abc"), 0);
        assert_eq!(count_line_breaks("a\nb"), 1);
        assert_eq!(count_line_breaks("a\r\nb"), 1);
        assert_eq!(count_line_breaks("a\rb"), 1);
        assert_eq!(count_line_breaks("\n\n"), 2);
        assert_eq!(count_line_breaks("\r\r\n\n"), 3);
    }

    #[test]
    fn test_convert_line_delimiters() {
        assert_eq!(convert_line_delimiters("a\r\nb\rc\nd", "\n"), "a\nb\nc\nd");
        assert_eq!(convert_line_delimiters("a\n\nb", "\r\n"), "a\r\n\r\nb");
        assert_eq!(convert_line_delimiters("plain", "\r\n"), "plain");
        assert_eq!(first_line("one\r\ntwo"), "one");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_char_type() {
        assert_eq!(char_type('a'), CharType::WordChar);
        assert_eq!(char_type('7'), CharType::WordChar);
        assert_eq!(char_type('é'), CharType::WordChar);
        assert_eq!(char_type(' '), CharType::Whitespace);
        assert_eq!(char_type('\t'), CharType::Whitespace);
        assert_eq!(char_type('.'), CharType::Other);
        assert_eq!(char_type('\n'), CharType::Other);
    }

    #[test]
    fn test_visual_col_with_tabs() {
        assert_eq!(char_col_to_visual_col("\tab", 1, 4), 4);
        assert_eq!(char_col_to_visual_col("a\tb", 2, 4), 4);
        assert_eq!(char_col_to_visual_col("abc", 2, 4), 2);
    }
}
