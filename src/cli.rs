//! Command-line argument parsing for `stx`
//!
//! Supports:
//! - Dumping line layouts as the view computes them
//! - Applying one edit and tracing its notifications
//! - Listing the key bindings in effect

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Drive a headless styled text view from the command line
#[derive(Parser, Debug)]
#[command(name = "stx", version, about = "Drive a headless styled text view")]
pub struct CliArgs {
    /// Config file to use instead of the user's config.yaml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print every line as laid out through the listener protocol
    Layout {
        file: PathBuf,

        /// Style every occurrence of WORD through a style listener
        #[arg(long, value_name = "WORD")]
        highlight: Option<String>,

        /// One JSON object per line instead of text
        #[arg(long)]
        json: bool,
    },

    /// Apply one edit and print the notifications it causes
    Edit {
        file: PathBuf,

        /// Character offset of the edit
        #[arg(long, value_name = "N")]
        at: usize,

        /// Number of characters to remove
        #[arg(long, value_name = "LEN", default_value_t = 0)]
        delete: usize,

        /// Text to insert
        #[arg(long, value_name = "TEXT", default_value = "")]
        insert: String,

        /// Write the result back to the file
        #[arg(short = 'w', long)]
        write: bool,
    },

    /// List the key bindings in effect
    Keys,
}

impl Command {
    /// The document the command works on, if any
    pub fn file(&self) -> Option<&Path> {
        match self {
            Command::Layout { file, .. } | Command::Edit { file, .. } => Some(file),
            Command::Keys => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_layout_args() {
        let args = parse(&["stx", "layout", "notes.txt", "--highlight", "todo", "--json"]);
        assert_eq!(
            args.command,
            Command::Layout {
                file: PathBuf::from("notes.txt"),
                highlight: Some("todo".to_string()),
                json: true,
            }
        );
        assert_eq!(args.command.file(), Some(Path::new("notes.txt")));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_edit_defaults() {
        let args = parse(&["stx", "edit", "a.txt", "--at", "3"]);
        assert_eq!(
            args.command,
            Command::Edit {
                file: PathBuf::from("a.txt"),
                at: 3,
                delete: 0,
                insert: String::new(),
                write: false,
            }
        );
    }

    #[test]
    fn test_global_config_flag() {
        let args = parse(&["stx", "keys", "--config", "/tmp/c.yaml"]);
        assert_eq!(args.command, Command::Keys);
        assert_eq!(args.command.file(), None);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.yaml")));
    }

    #[test]
    fn test_edit_requires_offset() {
        assert!(CliArgs::try_parse_from(["stx", "edit", "a.txt"]).is_err());
        assert!(CliArgs::try_parse_from(["stx"]).is_err());
    }
}
