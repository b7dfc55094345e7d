pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434/api/generate";
pub const DEFAULT_MODEL: &str = "gemma:2b";
pub const DEFAULT_HOTKEY: &str = "Ctrl+Minus";

pub const REQUEST_TIMEOUT_SECS_DEFAULT: u64 = 30;
pub const REQUEST_TIMEOUT_SECS_MIN: u64 = 5;
pub const REQUEST_TIMEOUT_SECS_MAX: u64 = 120;
pub const CONNECT_TIMEOUT_SECS: u64 = 3;

pub const CAPTURE_DELAY_MS_DEFAULT: u64 = 100;
pub const CAPTURE_DELAY_MS_MIN: u64 = 50;
pub const CAPTURE_DELAY_MS_MAX: u64 = 1000;
pub const CAPTURE_POLL_INTERVAL_MS: u64 = 20;

pub const DIALOG_CLOSE_TIMEOUT_MS: u64 = 500;

pub const ENV_ENDPOINT: &str = "BHASHA_OLLAMA_URL";
pub const ENV_MODEL: &str = "BHASHA_MODEL";
pub const ENV_HOTKEY: &str = "BHASHA_HOTKEY";

pub const SETTINGS_FILE: &str = "settings.json";
pub const LOG_FILE_PREFIX: &str = "bhasha-assist.log";
