//! Utility modules

pub mod text;

pub use text::{char_type, count_line_breaks, is_line_delimiter, CharType};
