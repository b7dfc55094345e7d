use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::clipboard::ClipboardAccess;
use crate::constants::CAPTURE_POLL_INTERVAL_MS;
use crate::keystrokes::KeySender;
use crate::state::Settings;
use crate::workflow::WorkflowError;

/// How long to wait for the OS to publish the copied selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTiming {
    pub delay: Duration,
    pub poll_interval: Duration,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self::from_delay_ms(crate::constants::CAPTURE_DELAY_MS_DEFAULT)
    }
}

impl CaptureTiming {
    pub fn from_delay_ms(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            poll_interval: Duration::from_millis(CAPTURE_POLL_INTERVAL_MS.min(delay_ms.max(1))),
        }
    }

    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self::from_delay_ms(settings.capture_delay_ms)
    }
}

/// Clears the clipboard, simulates copy and polls until text shows up or
/// `timing.delay` has elapsed. Returns an empty string when nothing was copied.
pub fn capture_selection(
    clipboard: &mut dyn ClipboardAccess,
    keys: &mut dyn KeySender,
    timing: &CaptureTiming,
) -> Result<String, WorkflowError> {
    clipboard.clear().map_err(WorkflowError::Clipboard)?;
    keys.copy().map_err(WorkflowError::Input)?;

    let started = Instant::now();
    loop {
        let remaining = timing.delay.saturating_sub(started.elapsed());
        thread::sleep(timing.poll_interval.min(remaining));

        let text = clipboard.get_text().map_err(WorkflowError::Clipboard)?;
        if !text.is_empty() {
            debug!("Selection captured after {:?}", started.elapsed());
            return Ok(text);
        }
        if started.elapsed() >= timing.delay {
            debug!("No selection after {:?}", timing.delay);
            return Ok(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fakes::{FakeClipboard, FakeKeys};

    fn quick() -> CaptureTiming {
        CaptureTiming {
            delay: Duration::from_millis(30),
            poll_interval: Duration::from_millis(5),
        }
    }

    #[test]
    fn timing_uses_reference_delay_by_default() {
        let timing = CaptureTiming::default();
        assert_eq!(timing.delay, Duration::from_millis(100));
        assert!(timing.poll_interval <= timing.delay);
    }

    #[test]
    fn captures_text_published_by_copy() {
        let mut clipboard = FakeClipboard::with_text("old");
        let mut keys = FakeKeys::copying(&clipboard, "selected words");

        let text = capture_selection(&mut clipboard, &mut keys, &quick()).unwrap();

        assert_eq!(text, "selected words");
        assert_eq!(keys.copies(), 1);
        assert_eq!(clipboard.clears(), 1);
    }

    #[test]
    fn returns_empty_when_nothing_selected() {
        let mut clipboard = FakeClipboard::with_text("old");
        let mut keys = FakeKeys::default();

        let started = Instant::now();
        let text = capture_selection(&mut clipboard, &mut keys, &quick()).unwrap();

        assert_eq!(text, "");
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn clipboard_failure_is_reported() {
        let mut clipboard = FakeClipboard::with_text("old");
        clipboard.fail_reads();
        let mut keys = FakeKeys::default();

        let result = capture_selection(&mut clipboard, &mut keys, &quick());

        assert!(matches!(result, Err(WorkflowError::Clipboard(_))));
    }
}
