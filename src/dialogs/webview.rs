use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;
use tauri::{
    AppHandle, Manager, State, WebviewUrl, WebviewWindow, WebviewWindowBuilder, WindowEvent,
};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tracing::{debug, error, warn};

use super::{ReviewDecision, Reviewer, TaskPicker};
use crate::constants::DIALOG_CLOSE_TIMEOUT_MS;
use crate::errors::AppError;
use crate::state::AppState;
use crate::translation::{Task, TranslationError};

pub(crate) const CHOOSE_TASK_LABEL: &str = "choose-task";
pub(crate) const REVIEW_LABEL: &str = "review";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DialogReply {
    Task(Task),
    Accept(String),
    Dismissed,
}

/// Hands replies from dialog windows to the worker blocked on them.
/// One pending sender per window label.
#[derive(Default)]
pub(crate) struct DialogBridge {
    pending: Mutex<HashMap<String, Sender<DialogReply>>>,
}

impl DialogBridge {
    pub(crate) fn open(&self, label: &str) -> Receiver<DialogReply> {
        let (tx, rx) = mpsc::channel();
        match self.pending.lock() {
            Ok(mut pending) => {
                pending.insert(label.to_string(), tx);
            }
            Err(_) => warn!("Dialog bridge poisoned; '{}' will resolve as dismissed", label),
        }
        rx
    }

    /// Delivers the first reply for `label`. Later replies are dropped.
    pub(crate) fn resolve(&self, label: &str, reply: DialogReply) -> bool {
        let sender = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(label));
        match sender {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}

/// Destroyed-window handler: resolves a still-pending dialog as dismissed and
/// signals that the window is gone.
fn dialog_destroyed(bridge: &DialogBridge, label: &str, closed: &Sender<()>) {
    if bridge.resolve(label, DialogReply::Dismissed) {
        debug!("Dialog '{}' closed without an answer", label);
    }
    let _ = closed.send(());
}

/// Waits for the window to be torn down so focus is back on the target
/// application before anything is pasted.
fn wait_for_close(closed: &Receiver<()>, timeout: Duration) -> bool {
    closed.recv_timeout(timeout).is_ok()
}

#[derive(Serialize)]
struct TaskOption {
    id: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct ReviewPayload<'a> {
    original: &'a str,
    suggestion: &'a str,
}

fn tasks_script() -> String {
    let options: Vec<TaskOption> = Task::ALL
        .iter()
        .map(|task| TaskOption {
            id: task.id(),
            label: task.label(),
        })
        .collect();
    let json = serde_json::to_string(&options).unwrap_or_else(|_| "[]".to_string());
    format!("window.__BHASHA_TASKS__ = {};", json)
}

fn review_script(original: &str, suggestion: &str) -> String {
    let json = serde_json::to_string(&ReviewPayload {
        original,
        suggestion,
    })
    .unwrap_or_else(|_| "null".to_string());
    format!("window.__BHASHA_REVIEW__ = {};", json)
}

struct DialogWindow<'a> {
    label: &'a str,
    page: &'a str,
    title: &'a str,
    size: (f64, f64),
    init_script: String,
}

fn build_dialog_window(app: &AppHandle, dialog: &DialogWindow<'_>) -> Result<WebviewWindow, String> {
    WebviewWindowBuilder::new(app, dialog.label, WebviewUrl::App(dialog.page.into()))
        .title(dialog.title)
        .inner_size(dialog.size.0, dialog.size.1)
        .resizable(false)
        .always_on_top(true)
        .center()
        .focused(true)
        .initialization_script(&dialog.init_script)
        .build()
        .map_err(|e| format!("Failed to create {} window: {}", dialog.label, e))
}

/// Task and review dialogs rendered as small always-on-top webview windows.
pub(crate) struct WebviewDialogs {
    app: AppHandle,
}

impl WebviewDialogs {
    pub(crate) fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn open_and_wait(&self, dialog: DialogWindow<'_>) -> Result<DialogReply, String> {
        let state = self.app.state::<AppState>();
        let rx = state.dialogs.open(dialog.label);

        let window = match build_dialog_window(&self.app, &dialog) {
            Ok(window) => window,
            Err(e) => {
                state.dialogs.resolve(dialog.label, DialogReply::Dismissed);
                return Err(e);
            }
        };

        let (closed_tx, closed_rx) = mpsc::channel();
        let app = self.app.clone();
        let label = dialog.label.to_string();
        window.on_window_event(move |event| {
            if let WindowEvent::Destroyed = event {
                dialog_destroyed(&app.state::<AppState>().dialogs, &label, &closed_tx);
            }
        });

        let reply = rx.recv().unwrap_or(DialogReply::Dismissed);
        debug!("Dialog '{}' answered: {:?}", dialog.label, reply);

        if let Err(e) = window.destroy() {
            warn!("Failed to close '{}': {}", dialog.label, e);
        }
        if !wait_for_close(&closed_rx, Duration::from_millis(DIALOG_CLOSE_TIMEOUT_MS)) {
            warn!(
                "'{}' still open after {} ms, continuing",
                dialog.label, DIALOG_CLOSE_TIMEOUT_MS
            );
        }
        Ok(reply)
    }

    fn window_failed(&self, message: String) {
        error!("{}", message);
        show_error_dialog(&self.app, &AppError::Window(message), true);
    }
}

impl TaskPicker for WebviewDialogs {
    fn choose_task(&self) -> Option<Task> {
        let dialog = DialogWindow {
            label: CHOOSE_TASK_LABEL,
            page: "choose.html",
            title: "Choose Action",
            size: (360.0, 210.0),
            init_script: tasks_script(),
        };
        match self.open_and_wait(dialog) {
            Ok(DialogReply::Task(task)) => Some(task),
            Ok(_) => None,
            Err(e) => {
                self.window_failed(e);
                None
            }
        }
    }
}

impl Reviewer for WebviewDialogs {
    fn review(&self, original: &str, suggestion: &str) -> ReviewDecision {
        let dialog = DialogWindow {
            label: REVIEW_LABEL,
            page: "review.html",
            title: "Translation Suggestion",
            size: (600.0, 400.0),
            init_script: review_script(original, suggestion),
        };
        match self.open_and_wait(dialog) {
            Ok(DialogReply::Accept(text)) => ReviewDecision::Accepted { text },
            Ok(_) => ReviewDecision::Declined,
            Err(e) => {
                self.window_failed(e);
                ReviewDecision::Declined
            }
        }
    }

    fn show_error(&self, error: &TranslationError) {
        show_error_dialog(&self.app, &AppError::Translation(error.to_string()), true);
    }
}

/// Error message box. `wait` blocks the calling thread until it is closed,
/// so it must only be set off the main thread.
pub(crate) fn show_error_dialog(app: &AppHandle, error: &AppError, wait: bool) {
    let dialog = app
        .dialog()
        .message(error.dialog_text())
        .title(error.title())
        .kind(MessageDialogKind::Error)
        .buttons(MessageDialogButtons::Ok);
    if wait {
        let _ = dialog.blocking_show();
    } else {
        dialog.show(|_| {});
    }
}

#[tauri::command]
pub(crate) fn submit_task(
    window: WebviewWindow,
    state: State<'_, AppState>,
    task: String,
) -> Result<(), String> {
    let task: Task = task.parse().map_err(|e: TranslationError| {
        warn!("Rejected task from '{}': {}", window.label(), e);
        e.to_string()
    })?;
    state.dialogs.resolve(window.label(), DialogReply::Task(task));
    Ok(())
}

#[tauri::command]
pub(crate) fn submit_review(window: WebviewWindow, state: State<'_, AppState>, text: String) {
    state.dialogs.resolve(window.label(), DialogReply::Accept(text));
}

#[tauri::command]
pub(crate) fn dismiss_dialog(window: WebviewWindow, state: State<'_, AppState>) {
    state.dialogs.resolve(window.label(), DialogReply::Dismissed);
}
