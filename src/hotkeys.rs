use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
    pub formatted: Option<String>,
}

const VALID_MODIFIERS: [&str; 12] = [
    "CommandOrControl", "CmdOrCtrl", "Command", "Cmd", "Control", "Ctrl",
    "Alt", "Option", "AltGr", "Shift", "Super", "Meta",
];

/// Validates a hotkey string format
pub fn validate_hotkey_format(key: &str) -> ValidationResult {
    let key = key.trim();

    if key.is_empty() {
        return ValidationResult {
            valid: false,
            error: Some("Hotkey cannot be empty".to_string()),
            formatted: None,
        };
    }

    let parts = split_parts(key);

    if parts.len() < 2 {
        return ValidationResult {
            valid: false,
            error: Some("Hotkey must include at least one modifier (e.g., Ctrl, Shift, Alt)".to_string()),
            formatted: None,
        };
    }

    let (key_part, modifier_parts) = match parts.split_last() {
        Some(split) => split,
        None => {
            return ValidationResult {
                valid: false,
                error: Some("Hotkey cannot be empty".to_string()),
                formatted: None,
            }
        }
    };

    for modifier in modifier_parts {
        if !VALID_MODIFIERS.iter().any(|m| m.eq_ignore_ascii_case(modifier)) {
            return ValidationResult {
                valid: false,
                error: Some(format!("Invalid modifier: '{}'. Valid modifiers: Ctrl, Shift, Alt, Command, etc.", modifier)),
                formatted: None,
            };
        }
    }

    if key_part.is_empty() {
        return ValidationResult {
            valid: false,
            error: Some("Missing key after modifiers".to_string()),
            formatted: None,
        };
    }

    ValidationResult {
        valid: true,
        error: None,
        formatted: Some(format_hotkey(key)),
    }
}

/// Splits on `+` and drops pynput-style angle brackets (`<ctrl>+-`).
fn split_parts(key: &str) -> Vec<&str> {
    key.split('+')
        .map(|s| s.trim().trim_start_matches('<').trim_end_matches('>'))
        .collect()
}

/// Formats a hotkey string into an accelerator the shortcut plugin accepts
fn format_hotkey(key: &str) -> String {
    let formatted_parts: Vec<String> = split_parts(key).iter().map(|part| {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => "Ctrl".to_string(),
            "cmdorctrl" | "commandorcontrol" => "CommandOrControl".to_string(),
            "cmd" | "command" => "Command".to_string(),
            "alt" | "option" => "Alt".to_string(),
            "shift" => "Shift".to_string(),
            "meta" | "super" => "Meta".to_string(),
            "-" => "Minus".to_string(),
            "=" => "Equal".to_string(),
            "," => "Comma".to_string(),
            "." => "Period".to_string(),
            "/" => "Slash".to_string(),
            ";" => "Semicolon".to_string(),
            "`" => "Backquote".to_string(),
            _ => {
                let mut chars = part.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                }
            }
        }
    }).collect();

    formatted_parts.join("+")
}

/// Registers the single translation hotkey, replacing any previous binding.
pub(crate) fn register_run_hotkey(app: &AppHandle, hotkey: &str) -> Result<(), String> {
    let manager = app.global_shortcut();

    if let Err(e) = manager.unregister_all() {
        warn!("Failed to unregister hotkeys (may be OK if none registered): {}", e);
    }

    info!("Registering translation hotkey: {}", hotkey);
    manager
        .on_shortcut(hotkey, |app, _shortcut, event| {
            if event.state == ShortcutState::Pressed {
                crate::listener::handle_activation(app);
            }
        })
        .map_err(|e| {
            format!(
                "Hotkey '{}' may conflict with another application ({})",
                hotkey, e
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty() {
        let result = validate_hotkey_format("");
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_validate_no_modifier() {
        let result = validate_hotkey_format("Minus");
        assert!(!result.valid);
    }

    #[test]
    fn test_validate_unknown_modifier() {
        let result = validate_hotkey_format("Hyper+Minus");
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("Hyper"));
    }

    #[test]
    fn test_validate_missing_key() {
        let result = validate_hotkey_format("Ctrl+");
        assert!(!result.valid);
    }

    #[test]
    fn test_validate_reference_hotkey() {
        let result = validate_hotkey_format("Ctrl+-");
        assert!(result.valid);
        assert!(result.error.is_none());
        assert_eq!(result.formatted.as_deref(), Some("Ctrl+Minus"));
    }

    #[test]
    fn test_format_hotkey() {
        assert_eq!(format_hotkey("ctrl+shift+space"), "Ctrl+Shift+Space");
        assert_eq!(format_hotkey("control+minus"), "Ctrl+Minus");
    }

    #[test]
    fn test_format_pynput_style() {
        assert_eq!(format_hotkey("<ctrl>+-"), "Ctrl+Minus");
    }

    #[test]
    fn test_format_is_stable() {
        let once = format_hotkey("alt+=");
        assert_eq!(format_hotkey(&once), once);
    }
}
