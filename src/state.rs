use crate::constants::{
  CAPTURE_DELAY_MS_DEFAULT,
  CAPTURE_DELAY_MS_MAX,
  CAPTURE_DELAY_MS_MIN,
  DEFAULT_ENDPOINT,
  DEFAULT_HOTKEY,
  DEFAULT_MODEL,
  ENV_ENDPOINT,
  ENV_HOTKEY,
  ENV_MODEL,
  REQUEST_TIMEOUT_SECS_DEFAULT,
  REQUEST_TIMEOUT_SECS_MAX,
  REQUEST_TIMEOUT_SECS_MIN,
  SETTINGS_FILE,
};
use crate::dialogs::webview::DialogBridge;
use crate::errors::AppError;
use crate::hotkeys::validate_hotkey_format;
use crate::listener::RunGate;
use crate::paths::resolve_config_path;
use serde::{Deserialize, Serialize};
use std::fs;
use tauri::AppHandle;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
  pub(crate) endpoint: String,
  pub(crate) model: String,
  pub(crate) hotkey: String,
  pub(crate) request_timeout_secs: u64,
  pub(crate) capture_delay_ms: u64,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.to_string(),
      model: DEFAULT_MODEL.to_string(),
      hotkey: DEFAULT_HOTKEY.to_string(),
      request_timeout_secs: REQUEST_TIMEOUT_SECS_DEFAULT,
      capture_delay_ms: CAPTURE_DELAY_MS_DEFAULT,
    }
  }
}

impl Settings {
  /// Applies `BHASHA_*` overrides; blank values are ignored.
  pub(crate) fn apply_overrides<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(endpoint) = non_blank(ENV_ENDPOINT) {
      self.endpoint = endpoint.trim().to_string();
    }
    if let Some(model) = non_blank(ENV_MODEL) {
      self.model = model.trim().to_string();
    }
    if let Some(hotkey) = non_blank(ENV_HOTKEY) {
      self.hotkey = hotkey.trim().to_string();
    }
  }

  pub(crate) fn normalize(&mut self) {
    let defaults = Settings::default();

    let endpoint_ok = Url::parse(self.endpoint.trim())
      .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
      .unwrap_or(false);
    if endpoint_ok {
      self.endpoint = self.endpoint.trim().to_string();
    } else {
      warn!("Invalid endpoint '{}', using {}", self.endpoint, defaults.endpoint);
      self.endpoint = defaults.endpoint.clone();
    }

    if self.model.trim().is_empty() {
      self.model = defaults.model.clone();
    } else {
      self.model = self.model.trim().to_string();
    }

    let validation = validate_hotkey_format(&self.hotkey);
    match validation.formatted {
      Some(formatted) if validation.valid => self.hotkey = formatted,
      _ => {
        warn!(
          "Invalid hotkey '{}' ({}), using {}",
          self.hotkey,
          validation.error.unwrap_or_default(),
          defaults.hotkey
        );
        self.hotkey = defaults.hotkey.clone();
      }
    }

    self.request_timeout_secs = self
      .request_timeout_secs
      .clamp(REQUEST_TIMEOUT_SECS_MIN, REQUEST_TIMEOUT_SECS_MAX);
    self.capture_delay_ms = self
      .capture_delay_ms
      .clamp(CAPTURE_DELAY_MS_MIN, CAPTURE_DELAY_MS_MAX);
  }
}

pub(crate) struct AppState {
  pub(crate) settings: Settings,
  pub(crate) runs: RunGate,
  pub(crate) dialogs: DialogBridge,
}

impl AppState {
  pub(crate) fn new(settings: Settings) -> Self {
    Self {
      settings,
      runs: RunGate::new(),
      dialogs: DialogBridge::default(),
    }
  }
}

/// Reads `settings.json`, applies environment overrides and normalizes.
/// Writes the defaults out on first launch so there is a file to edit.
pub(crate) fn load_settings(app: &AppHandle) -> Settings {
  let path = resolve_config_path(app, SETTINGS_FILE);
  let mut settings = match fs::read_to_string(&path) {
    Ok(raw) => serde_json::from_str::<Settings>(&raw).unwrap_or_else(|e| {
      crate::emit_error(
        app,
        AppError::Storage(format!("Ignoring malformed {}: {}", path.display(), e)),
        Some("load_settings"),
      );
      Settings::default()
    }),
    Err(_) => {
      let defaults = Settings::default();
      match save_settings_file(app, &defaults) {
        Ok(()) => info!("Wrote default settings to {}", path.display()),
        Err(e) => crate::emit_error(
          app,
          AppError::Storage(format!("Could not write default settings: {}", e)),
          Some("load_settings"),
        ),
      }
      defaults
    }
  };
  settings.apply_overrides(|key| std::env::var(key).ok());
  settings.normalize();
  settings
}

pub(crate) fn save_settings_file(app: &AppHandle, settings: &Settings) -> Result<(), String> {
  let path = resolve_config_path(app, SETTINGS_FILE);
  let raw = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
  fs::write(path, raw).map_err(|e| e.to_string())?;
  Ok(())
}
