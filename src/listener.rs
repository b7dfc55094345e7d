use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tauri::{AppHandle, Manager};
use tracing::{debug, error, info};

use crate::clipboard::SystemClipboard;
use crate::dialogs::webview::{show_error_dialog, WebviewDialogs};
use crate::errors::AppError;
use crate::keystrokes::EnigoKeys;
use crate::selection::CaptureTiming;
use crate::state::AppState;
use crate::translation::OllamaClient;
use crate::workflow::{RunOutcome, Workflow};

const RUN_THREAD_NAME: &str = "translation-run";

/// Admits at most one run at a time.
#[derive(Clone, Default)]
pub(crate) struct RunGate {
    active: Arc<AtomicBool>,
}

/// Held for the lifetime of a run; releases the gate on drop, including
/// during unwinding.
pub(crate) struct RunPermit {
    active: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

impl RunGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn try_acquire(&self) -> Option<RunPermit> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                active: Arc::clone(&self.active),
            })
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Starts `job` on a worker thread if no run is active. Returns `None` when
/// the activation was ignored.
pub(crate) fn spawn_run<F>(gate: &RunGate, job: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let permit = gate.try_acquire()?;
    let spawned = thread::Builder::new()
        .name(RUN_THREAD_NAME.to_string())
        .spawn(move || {
            let _permit = permit;
            job();
        });
    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Failed to start translation run: {}", e);
            None
        }
    }
}

/// Hotkey callback. Runs on the event loop thread, so it never waits for the run.
pub(crate) fn handle_activation(app: &AppHandle) {
    let state = app.state::<AppState>();
    let handle = app.clone();
    if spawn_run(&state.runs, move || run_once(&handle)).is_some() {
        debug!("Translation run started");
    } else {
        info!("Hotkey ignored: a translation run is already in progress");
    }
}

fn run_once(app: &AppHandle) {
    let settings = app.state::<AppState>().settings.clone();

    let mut clipboard = match SystemClipboard::new() {
        Ok(clipboard) => clipboard,
        Err(e) => {
            error!("Clipboard unavailable: {}", e);
            show_error_dialog(app, &AppError::Clipboard(e), true);
            return;
        }
    };
    let mut keys = EnigoKeys::new();
    let dialogs = WebviewDialogs::new(app.clone());
    let translator = OllamaClient::from_settings(&settings);

    let report = Workflow::new(
        &mut clipboard,
        &mut keys,
        &dialogs,
        &dialogs,
        &translator,
        CaptureTiming::from_settings(&settings),
    )
    .run();

    debug!("Run phases: {:?}", report.phases);
    if let RunOutcome::RolledBack { reason } = &report.outcome {
        if reason.needs_notice() {
            show_error_dialog(app, &AppError::from(reason), true);
        }
    }
}
