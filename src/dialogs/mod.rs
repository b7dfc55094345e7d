//! Task and review dialogs as blocking calls.
//!
//! The workflow only sees [`TaskPicker`] and [`Reviewer`]; the webview
//! implementation in [`webview`] binds them to Tauri windows.

pub(crate) mod webview;

use crate::translation::{Task, TranslationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Accepted { text: String },
    Declined,
}

pub trait TaskPicker {
    /// Blocks until one of the three tasks is picked; `None` when dismissed.
    fn choose_task(&self) -> Option<Task>;
}

pub trait Reviewer {
    /// Shows `original` read-only and `suggestion` editable. Accept returns the
    /// field content at the moment of acceptance.
    fn review(&self, original: &str, suggestion: &str) -> ReviewDecision;

    /// Surfaces a failed translation. No accept option is offered.
    fn show_error(&self, error: &TranslationError);
}

pub fn review_suggestion(
    reviewer: &dyn Reviewer,
    original: &str,
    suggestion: &Result<String, TranslationError>,
) -> ReviewDecision {
    match suggestion {
        Ok(text) => reviewer.review(original, text),
        Err(error) => {
            reviewer.show_error(error);
            ReviewDecision::Declined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fakes::FakeReviewer;

    #[test]
    fn error_suggestion_is_shown_and_declined() {
        let reviewer = FakeReviewer::accepting(None);
        let error = TranslationError::UnreachableEndpoint("Could not connect".to_string());

        let decision = review_suggestion(&reviewer, "hello", &Err(error.clone()));

        assert_eq!(decision, ReviewDecision::Declined);
        assert_eq!(reviewer.shown_errors(), vec![error]);
        assert!(reviewer.reviewed().is_empty(), "accept must not be offered");
    }

    #[test]
    fn accepted_edit_is_returned() {
        let reviewer = FakeReviewer::accepting(Some("Hi, how are you?"));

        let decision = review_suggestion(&reviewer, "नमस्ते", &Ok("Hello".to_string()));

        assert_eq!(
            decision,
            ReviewDecision::Accepted {
                text: "Hi, how are you?".to_string()
            }
        );
        assert_eq!(
            reviewer.reviewed(),
            vec![("नमस्ते".to_string(), "Hello".to_string())]
        );
    }

    #[test]
    fn decline_passes_through() {
        let reviewer = FakeReviewer::declining();

        let decision = review_suggestion(&reviewer, "hello", &Ok("नमस्ते".to_string()));

        assert_eq!(decision, ReviewDecision::Declined);
        assert!(reviewer.shown_errors().is_empty());
    }
}
