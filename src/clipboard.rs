use arboard::{Clipboard, ImageData};
use std::borrow::Cow;

/// Snapshot of clipboard content before a run overwrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardSnapshot {
    Text(String),
    Image { width: usize, height: usize, bytes: Vec<u8> },
    Empty,
}

pub trait ClipboardAccess {
    fn snapshot(&mut self) -> Result<ClipboardSnapshot, String>;
    fn restore(&mut self, snapshot: &ClipboardSnapshot) -> Result<(), String>;
    /// Current text, or an empty string when the clipboard holds no text.
    fn get_text(&mut self) -> Result<String, String>;
    fn set_text(&mut self, text: &str) -> Result<(), String>;
    fn clear(&mut self) -> Result<(), String>;
}

/// OS clipboard through arboard.
pub struct SystemClipboard {
    inner: Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, String> {
        let inner = Clipboard::new().map_err(|e| e.to_string())?;
        Ok(Self { inner })
    }
}

impl ClipboardAccess for SystemClipboard {
    fn snapshot(&mut self) -> Result<ClipboardSnapshot, String> {
        match self.inner.get_text() {
            Ok(t) => return Ok(ClipboardSnapshot::Text(t)),
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => return Err(e.to_string()),
        }
        match self.inner.get_image() {
            Ok(img) => Ok(ClipboardSnapshot::Image {
                width: img.width,
                height: img.height,
                bytes: img.bytes.into_owned(),
            }),
            Err(arboard::Error::ContentNotAvailable) => Ok(ClipboardSnapshot::Empty),
            Err(e) => Err(e.to_string()),
        }
    }

    fn restore(&mut self, snapshot: &ClipboardSnapshot) -> Result<(), String> {
        match snapshot {
            ClipboardSnapshot::Text(t) => self.inner.set_text(t.as_str()),
            ClipboardSnapshot::Image { width, height, bytes } => self.inner.set_image(ImageData {
                width: *width,
                height: *height,
                bytes: Cow::Borrowed(bytes.as_slice()),
            }),
            ClipboardSnapshot::Empty => self.inner.clear(),
        }
        .map_err(|e| e.to_string())
    }

    fn get_text(&mut self) -> Result<String, String> {
        match self.inner.get_text() {
            Ok(t) => Ok(t),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn set_text(&mut self, text: &str) -> Result<(), String> {
        self.inner.set_text(text).map_err(|e| e.to_string())
    }

    fn clear(&mut self) -> Result<(), String> {
        self.inner.clear().map_err(|e| e.to_string())
    }
}
