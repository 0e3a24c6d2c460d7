//! Clipboard seam used by cut, copy and paste

/// Text clipboard of the hosting application
pub trait Clipboard {
    fn get_text(&mut self) -> Option<String>;
    fn set_text(&mut self, text: &str);
}

/// In-memory clipboard, private to one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalClipboard {
    text: Option<String>,
}

impl LocalClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for LocalClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }
}

/// The OS clipboard. Failures to reach it are logged and ignored.
#[cfg(feature = "system-clipboard")]
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("clipboard read failed: {}", e);
                None
            }
        }
    }

    fn set_text(&mut self, text: &str) {
        let written =
            arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        if let Err(e) = written {
            tracing::warn!("clipboard write failed: {}", e);
        }
    }
}
