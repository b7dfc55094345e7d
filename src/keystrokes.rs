use enigo::{Enigo, Key, KeyboardControllable};

/// Emits the copy/paste shortcuts to the focused application.
pub trait KeySender {
    fn copy(&mut self) -> Result<(), String>;
    fn paste(&mut self) -> Result<(), String>;
}

pub struct EnigoKeys {
    enigo: Enigo,
}

impl EnigoKeys {
    pub fn new() -> Self {
        Self {
            enigo: Enigo::new(),
        }
    }

    fn chord(&mut self, letter: char) {
        self.enigo.key_down(shortcut_modifier());
        self.enigo.key_click(Key::Layout(letter));
        self.enigo.key_up(shortcut_modifier());
    }
}

fn shortcut_modifier() -> Key {
    if cfg!(target_os = "macos") {
        Key::Meta
    } else {
        Key::Control
    }
}

impl Default for EnigoKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySender for EnigoKeys {
    fn copy(&mut self) -> Result<(), String> {
        self.chord('c');
        Ok(())
    }

    fn paste(&mut self) -> Result<(), String> {
        self.chord('v');
        Ok(())
    }
}
