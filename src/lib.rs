// Bhasha Assist - hotkey translation runtime

mod clipboard;
mod constants;
mod dialogs;
mod errors;
mod hotkeys;
mod keystrokes;
mod listener;
mod paths;
mod selection;
mod state;
mod translation;
mod workflow;

use std::path::Path;
use tauri::{AppHandle, Manager, RunEvent, Wry};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::constants::LOG_FILE_PREFIX;
use crate::dialogs::webview::{dismiss_dialog, show_error_dialog, submit_review, submit_task};
use crate::errors::AppError;
use crate::hotkeys::register_run_hotkey;
use crate::paths::resolve_log_dir;
use crate::state::{load_settings, AppState};

/// Keeps the non-blocking file writer flushing until the app exits.
struct LogGuard(#[allow(dead_code)] WorkerGuard);

fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(file_writer),
        )
        .try_init();

    match installed {
        Ok(()) => {
            info!("Bhasha Assist starting up (logs in {})", log_dir.display());
            Some(guard)
        }
        Err(_) => None,
    }
}

/// Logs the error and shows it without blocking the caller.
pub(crate) fn emit_error(app: &AppHandle, error: AppError, context: Option<&str>) {
    match context {
        Some(ctx) => error!("{} ({}): {}", error.title(), ctx, error.message()),
        None => error!("{}: {}", error.title(), error.message()),
    }
    show_error_dialog(app, &error, false);
}

fn with_dialog_plugin(builder: tauri::Builder<Wry>) -> tauri::Builder<Wry> {
    #[cfg(test)]
    {
        builder
    }

    #[cfg(not(test))]
    {
        builder.plugin(tauri_plugin_dialog::init())
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    dotenvy::dotenv().ok();

    let builder = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|_app, argv, _cwd| {
            warn!("Second launch ignored ({:?}); already listening for the hotkey", argv);
        }))
        .plugin(tauri_plugin_global_shortcut::Builder::new().build());

    let app = with_dialog_plugin(builder)
        .setup(|app| {
            let handle = app.handle();
            if let Some(guard) = init_logging(&resolve_log_dir(handle)) {
                app.manage(LogGuard(guard));
            }

            let settings = load_settings(handle);
            info!(
                "Using model '{}' at {} (timeout {}s)",
                settings.model, settings.endpoint, settings.request_timeout_secs
            );
            let hotkey = settings.hotkey.clone();
            app.manage(AppState::new(settings));

            match register_run_hotkey(handle, &hotkey) {
                Ok(()) => info!("Select text and press {} to translate.", hotkey),
                Err(e) => emit_error(handle, AppError::Hotkey(e), Some("startup")),
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            submit_task,
            submit_review,
            dismiss_dialog,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|_app, event| {
        // Dialog windows come and go; only an explicit exit code stops the listener.
        if let RunEvent::ExitRequested { api, code, .. } = event {
            if code.is_none() {
                api.prevent_exit();
            }
        }
    });
}
