//! stx - drive a headless styled text view from the command line

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use styledtext::cli::{CliArgs, Command};
use styledtext::keymap::{Action, Motion};
use styledtext::listener::{
    CaretListener, ExtendedModifyListener, LineStyleListener, TextChangeListener, VerifyListener,
};
use styledtext::tracing::CaretSnapshot;
use styledtext::{
    CaretEvent, Color, ExtendedModifyEvent, FontStyle, LineLayout, LineRequest, ListenerFault,
    NotificationKind, RopeContent, StyleRange, StyledText, StyledTextConfig, TextChangedEvent,
    TextChangingEvent, TextRead, TextSetEvent, TextStyle, TextVerdict, VerifyTextEvent,
};

fn main() -> Result<()> {
    styledtext::tracing::init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => StyledTextConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StyledTextConfig::load(),
    };

    match args.command {
        Command::Layout {
            file,
            highlight,
            json,
        } => layout(&file, highlight, json, config),
        Command::Edit {
            file,
            at,
            delete,
            insert,
            write,
        } => edit(&file, at, delete, &insert, write, config),
        Command::Keys => keys(&config),
    }
}

fn open_view(path: &Path, config: StyledTextConfig) -> Result<StyledText> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let content = RopeContent::from_text(&text).with_delimiter(config.line_delimiter);
    let view = StyledText::with_config(Rc::new(content), config)
        .context("Invalid configuration")?;
    view.registry()
        .set_fault_handler(Some(Rc::new(|fault: &ListenerFault| {
            eprintln!("warning: {}", fault);
        })));
    Ok(view)
}

// =============================================================================
// layout
// =============================================================================

/// Styles every occurrence of a word
struct Highlighter {
    word: String,
    style: TextStyle,
}

impl LineStyleListener for Highlighter {
    fn line_style(&self, request: &LineRequest<'_>) -> Result<Vec<StyleRange>> {
        if self.word.is_empty() {
            return Ok(Vec::new());
        }
        let length = self.word.chars().count();
        Ok(request
            .line_text
            .match_indices(self.word.as_str())
            .map(|(byte, _)| {
                let column = request.line_text[..byte].chars().count();
                StyleRange::new(request.line_offset + column, length, self.style)
            })
            .collect())
    }
}

fn layout(
    path: &Path,
    highlight: Option<String>,
    json: bool,
    config: StyledTextConfig,
) -> Result<()> {
    let view = open_view(path, config)?;

    // Kept alive for the whole dump; the registry only holds it weakly
    let highlighter: Option<Rc<dyn LineStyleListener>> = highlight.map(|word| {
        Rc::new(Highlighter {
            word,
            style: TextStyle {
                foreground: Some(Color::rgb(0xd0, 0x30, 0x30)),
                font_style: FontStyle::Bold,
                ..TextStyle::default()
            },
        }) as Rc<dyn LineStyleListener>
    });
    if let Some(highlighter) = &highlighter {
        view.registry().line_style.set(highlighter.clone());
    }

    for line_index in 0..view.line_count() {
        let layout = view.line_layout(line_index)?;
        if json {
            println!("{}", serde_json::to_string(&layout)?);
        } else {
            println!("{}", render_line(&layout));
        }
    }
    Ok(())
}

/// `  12     80 some [styled] text  bg=#ffeeee`
fn render_line(layout: &LineLayout) -> String {
    fn marks(styles: &[StyleRange], offset: usize, out: &mut String) {
        for range in styles.iter().filter(|r| r.end() == offset) {
            out.push(if range.metrics.is_some() { '}' } else { ']' });
        }
        for range in styles.iter().filter(|r| r.start == offset) {
            out.push(if range.metrics.is_some() { '{' } else { '[' });
        }
    }

    let mut out = format!("{:>4} {:>6} ", layout.line_index + 1, layout.line_offset);
    for (column, ch) in layout.text.chars().enumerate() {
        marks(&layout.styles, layout.line_offset + column, &mut out);
        out.push(ch);
    }
    marks(
        &layout.styles,
        layout.line_offset + layout.text.chars().count(),
        &mut out,
    );

    if let Some(background) = layout.background {
        out.push_str(&format!("  bg={}", background));
    }
    if !layout.segments.is_empty() {
        out.push_str(&format!("  segments={:?}", layout.segments));
    }
    if layout.spacing > 0 {
        out.push_str(&format!("  spacing={}", layout.spacing));
    }
    out
}

// =============================================================================
// edit
// =============================================================================

/// Prints every notification it receives as one JSON line
struct EventPrinter;

fn print_event<T: Serialize>(kind: NotificationKind, event: &T) -> Result<()> {
    println!("{:<16} {}", kind.to_string(), serde_json::to_string(event)?);
    Ok(())
}

impl TextChangeListener for EventPrinter {
    fn text_changing(&self, event: &TextChangingEvent, _content: &dyn TextRead) -> Result<()> {
        print_event(NotificationKind::TextChanging, event)
    }

    fn text_changed(&self, event: &TextChangedEvent, _content: &dyn TextRead) -> Result<()> {
        print_event(NotificationKind::TextChanged, event)
    }

    fn text_set(&self, event: &TextSetEvent, _content: &dyn TextRead) -> Result<()> {
        print_event(NotificationKind::TextSet, event)
    }
}

impl VerifyListener for EventPrinter {
    fn verify_text(&self, event: &VerifyTextEvent) -> Result<TextVerdict> {
        print_event(NotificationKind::Verify, event)?;
        Ok(TextVerdict::Accept)
    }
}

impl ExtendedModifyListener for EventPrinter {
    fn modify_text(&self, event: &ExtendedModifyEvent) -> Result<()> {
        print_event(NotificationKind::ExtendedModify, event)
    }
}

impl CaretListener for EventPrinter {
    fn caret_moved(&self, event: &CaretEvent) -> Result<()> {
        print_event(NotificationKind::CaretMoved, event)
    }
}

fn edit(
    path: &Path,
    at: usize,
    delete: usize,
    insert: &str,
    write: bool,
    config: StyledTextConfig,
) -> Result<()> {
    let mut view = open_view(path, config)?;
    view.set_selection(at, at + delete);

    let printer = Rc::new(EventPrinter);
    let registry = view.registry().clone();
    registry.text_change.add(printer.clone());
    registry.verify.add(printer.clone());
    registry.extended_modify.add(printer.clone());
    registry.caret.add(printer.clone());

    let before = CaretSnapshot::from_view(&view);
    let applied = view
        .replace_text_range(at, delete, insert)
        .with_context(|| format!("Cannot replace {} chars at offset {}", delete, at))?;
    if !applied {
        println!("edit rejected");
        return Ok(());
    }
    if let Some(diff) = before.diff(&CaretSnapshot::from_view(&view)) {
        println!("{:<16} {}", "view", diff);
    }

    if write {
        std::fs::write(path, view.text())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

// =============================================================================
// keys
// =============================================================================

fn keys(config: &StyledTextConfig) -> Result<()> {
    let bindings = config.key_bindings().context("Invalid key bindings")?;

    let mut actions: Vec<Action> = Motion::ALL
        .iter()
        .flat_map(|&motion| [Action::Move(motion), Action::Select(motion)])
        .collect();
    actions.extend([
        Action::Cut,
        Action::Copy,
        Action::Paste,
        Action::DeletePrevious,
        Action::DeleteNext,
        Action::ToggleOverwrite,
    ]);

    for action in actions {
        let keys: Vec<String> = bindings
            .keys_for(action)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{:<26} {:>9}  {}", action.to_string(), action.code(), keys.join(", "));
    }
    Ok(())
}
