use std::fmt;

use crate::workflow::WorkflowError;

/// Application-wide error types with categories for dialogs and logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Global shortcut registration/validation errors
    Hotkey(String),

    /// Clipboard could not be read, written or restored
    Clipboard(String),

    /// Simulated copy/paste keystrokes failed
    Input(String),

    /// Inference endpoint unreachable or returned unusable output
    Translation(String),

    /// Dialog window management errors
    Window(String),

    /// Settings file errors
    Storage(String),

    /// Generic errors that don't fit other categories
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Hotkey(msg) => write!(f, "Hotkey Error: {}", msg),
            AppError::Clipboard(msg) => write!(f, "Clipboard Error: {}", msg),
            AppError::Input(msg) => write!(f, "Input Error: {}", msg),
            AppError::Translation(msg) => write!(f, "Translation Error: {}", msg),
            AppError::Window(msg) => write!(f, "Window Error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Returns a user-friendly title for the error
    pub fn title(&self) -> &str {
        match self {
            AppError::Hotkey(_) => "Hotkey Problem",
            AppError::Clipboard(_) => "Clipboard Problem",
            AppError::Input(_) => "Keyboard Simulation Failed",
            AppError::Translation(_) => "Translation Error",
            AppError::Window(_) => "Window Error",
            AppError::Storage(_) => "Settings Error",
            AppError::Other(_) => "Error",
        }
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        match self {
            AppError::Hotkey(msg)
            | AppError::Clipboard(msg)
            | AppError::Input(msg)
            | AppError::Translation(msg)
            | AppError::Window(msg)
            | AppError::Storage(msg)
            | AppError::Other(msg) => msg,
        }
    }

    /// Returns a suggested action for the user
    pub fn suggested_action(&self) -> Option<&str> {
        match self {
            AppError::Hotkey(_) => Some("Choose a different hotkey combination in settings.json"),
            AppError::Clipboard(_) => Some("Close other clipboard managers and try again"),
            AppError::Input(_) => Some("Grant accessibility/input permissions and try again"),
            AppError::Translation(_) => Some("Check that Ollama is running and the model is pulled"),
            AppError::Window(_) => Some("Try restarting the application"),
            AppError::Storage(_) => Some("Check permissions of the config directory"),
            AppError::Other(_) => None,
        }
    }

    /// Message body for an error dialog, with the suggested action appended
    pub fn dialog_text(&self) -> String {
        match self.suggested_action() {
            Some(action) => format!("{}\n\n{}", self.message(), action),
            None => self.message().to_string(),
        }
    }
}

impl From<&WorkflowError> for AppError {
    fn from(error: &WorkflowError) -> Self {
        match error {
            WorkflowError::Clipboard(msg) => AppError::Clipboard(msg.clone()),
            WorkflowError::Input(msg) => AppError::Input(msg.clone()),
            WorkflowError::UnreachableEndpoint(msg) | WorkflowError::TranslationFailed(msg) => {
                AppError::Translation(msg.clone())
            }
            other => AppError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Clipboard("Clipboard is busy".to_string());
        assert_eq!(err.to_string(), "Clipboard Error: Clipboard is busy");
    }

    #[test]
    fn test_error_title() {
        let err = AppError::Translation("Ollama is down".to_string());
        assert_eq!(err.title(), "Translation Error");
    }

    #[test]
    fn test_dialog_text_appends_action() {
        let err = AppError::Hotkey("Ctrl+Minus is taken".to_string());
        let text = err.dialog_text();
        assert!(text.starts_with("Ctrl+Minus is taken"));
        assert!(text.contains("different hotkey"));
    }

    #[test]
    fn test_dialog_text_without_action() {
        let err = AppError::Other("boom".to_string());
        assert_eq!(err.dialog_text(), "boom");
    }

    #[test]
    fn workflow_errors_keep_their_category() {
        let err = AppError::from(&WorkflowError::Input("blocked".to_string()));
        assert_eq!(err, AppError::Input("blocked".to_string()));

        let err = AppError::from(&WorkflowError::Interrupted("boom".to_string()));
        assert_eq!(err.title(), "Error");
        assert!(err.message().contains("boom"));
    }
}
