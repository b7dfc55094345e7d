use std::fs;
use std::path::PathBuf;
use tauri::{AppHandle, Manager};

pub(crate) fn resolve_config_path(app: &AppHandle, filename: &str) -> PathBuf {
  let base = app
    .path()
    .app_config_dir()
    .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
  let _ = fs::create_dir_all(&base);
  base.join(filename)
}

pub(crate) fn resolve_log_dir(app: &AppHandle) -> PathBuf {
  let dir = app.path().app_log_dir().unwrap_or_else(|_| {
    std::env::current_dir()
      .unwrap_or_else(|_| PathBuf::from("."))
      .join("logs")
  });
  let _ = fs::create_dir_all(&dir);
  dir
}
