//! One translation run: capture, choose, translate, review, then commit or
//! roll back.
//!
//! The orchestrator is the only writer of the clipboard during a run. Every
//! path that does not end in a paste restores the snapshot taken on entry.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, info, warn};

use crate::clipboard::{ClipboardAccess, ClipboardSnapshot};
use crate::dialogs::{review_suggestion, ReviewDecision, Reviewer, TaskPicker};
use crate::keystrokes::KeySender;
use crate::selection::{capture_selection, CaptureTiming};
use crate::translation::{TranslationError, Translator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Capturing,
    ChoosingTask,
    Translating,
    Reviewing,
    Committing,
    RollingBack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    EmptySelection,
    UserDismissed,
    UnreachableEndpoint(String),
    TranslationFailed(String),
    Clipboard(String),
    Input(String),
    /// A collaborator panicked mid-run
    Interrupted(String),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::EmptySelection => write!(f, "No text was selected"),
            WorkflowError::UserDismissed => write!(f, "Dismissed by user"),
            WorkflowError::UnreachableEndpoint(msg) => write!(f, "{}", msg),
            WorkflowError::TranslationFailed(msg) => write!(f, "{}", msg),
            WorkflowError::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            WorkflowError::Input(msg) => write!(f, "Keyboard simulation error: {}", msg),
            WorkflowError::Interrupted(msg) => write!(f, "Run interrupted: {}", msg),
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<TranslationError> for WorkflowError {
    fn from(error: TranslationError) -> Self {
        if error.is_unreachable() {
            WorkflowError::UnreachableEndpoint(error.to_string())
        } else {
            WorkflowError::TranslationFailed(error.to_string())
        }
    }
}

impl WorkflowError {
    /// Errors the user has not seen yet when the run ends. Empty selections
    /// and dismissals stay silent; translation errors went through review.
    pub fn needs_notice(&self) -> bool {
        matches!(
            self,
            WorkflowError::Clipboard(_) | WorkflowError::Input(_) | WorkflowError::Interrupted(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Committed { text: String },
    RolledBack { reason: WorkflowError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub phases: Vec<RunPhase>,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn committed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Committed { .. })
    }

    pub fn needs_notice(&self) -> bool {
        match &self.outcome {
            RunOutcome::RolledBack { reason } => reason.needs_notice(),
            RunOutcome::Committed { .. } => false,
        }
    }
}

#[derive(Default)]
struct PhaseTrace {
    phases: Vec<RunPhase>,
}

impl PhaseTrace {
    fn enter(&mut self, phase: RunPhase) {
        info!("Run phase -> {:?}", phase);
        self.phases.push(phase);
    }
}

pub struct Workflow<'a> {
    clipboard: &'a mut dyn ClipboardAccess,
    keys: &'a mut dyn KeySender,
    picker: &'a dyn TaskPicker,
    reviewer: &'a dyn Reviewer,
    translator: &'a dyn Translator,
    timing: CaptureTiming,
}

impl<'a> Workflow<'a> {
    pub fn new(
        clipboard: &'a mut dyn ClipboardAccess,
        keys: &'a mut dyn KeySender,
        picker: &'a dyn TaskPicker,
        reviewer: &'a dyn Reviewer,
        translator: &'a dyn Translator,
        timing: CaptureTiming,
    ) -> Self {
        Self {
            clipboard,
            keys,
            picker,
            reviewer,
            translator,
            timing,
        }
    }

    /// Executes one run to completion. Never panics and never leaves the
    /// clipboard without either the accepted text or the original content.
    pub fn run(&mut self) -> RunReport {
        let mut trace = PhaseTrace::default();
        trace.enter(RunPhase::Capturing);

        let snapshot = match self.clipboard.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Nothing was touched yet, so there is nothing to roll back.
                warn!("Could not snapshot clipboard, aborting: {}", e);
                trace.enter(RunPhase::Idle);
                return RunReport {
                    phases: trace.phases,
                    outcome: RunOutcome::RolledBack {
                        reason: WorkflowError::Clipboard(e),
                    },
                };
            }
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.drive(&mut trace)))
            .unwrap_or_else(|payload| Err(WorkflowError::Interrupted(panic_message(payload))));

        let outcome = match result {
            Ok(text) => {
                info!("Committed translation ({} chars)", text.chars().count());
                RunOutcome::Committed { text }
            }
            Err(reason) => {
                trace.enter(RunPhase::RollingBack);
                self.roll_back(&snapshot);
                match &reason {
                    WorkflowError::EmptySelection | WorkflowError::UserDismissed => {
                        info!("Run aborted: {}", reason)
                    }
                    _ => warn!("Run aborted: {}", reason),
                }
                RunOutcome::RolledBack { reason }
            }
        };

        trace.enter(RunPhase::Idle);
        RunReport {
            phases: trace.phases,
            outcome,
        }
    }

    fn drive(&mut self, trace: &mut PhaseTrace) -> Result<String, WorkflowError> {
        let selection = capture_selection(&mut *self.clipboard, &mut *self.keys, &self.timing)?;
        if selection.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }

        trace.enter(RunPhase::ChoosingTask);
        let task = self
            .picker
            .choose_task()
            .ok_or(WorkflowError::UserDismissed)?;

        trace.enter(RunPhase::Translating);
        info!("Translating {} chars with task {}", selection.chars().count(), task);
        let suggestion = self.translator.translate(&selection, task);

        trace.enter(RunPhase::Reviewing);
        let text = match review_suggestion(self.reviewer, &selection, &suggestion) {
            ReviewDecision::Accepted { text } => text,
            ReviewDecision::Declined => {
                return Err(match suggestion {
                    Err(error) => error.into(),
                    Ok(_) => WorkflowError::UserDismissed,
                })
            }
        };

        trace.enter(RunPhase::Committing);
        self.clipboard
            .set_text(&text)
            .map_err(WorkflowError::Clipboard)?;
        self.keys.paste().map_err(WorkflowError::Input)?;
        Ok(text)
    }

    fn roll_back(&mut self, snapshot: &ClipboardSnapshot) {
        if let Err(e) = self.clipboard.restore(snapshot) {
            error!("Failed to restore clipboard: {}", e);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
