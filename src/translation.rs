use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::CONNECT_TIMEOUT_SECS;
use crate::state::Settings;

/// Translation directions offered by the task dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    ToEnglish,
    ToHindi,
    ToTamil,
}

impl Task {
    pub const ALL: [Task; 3] = [Task::ToEnglish, Task::ToHindi, Task::ToTamil];

    /// Stable identifier used across the dialog IPC boundary.
    pub fn id(self) -> &'static str {
        match self {
            Task::ToEnglish => "to_english",
            Task::ToHindi => "to_hindi",
            Task::ToTamil => "to_tamil",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Task::ToEnglish => "Translate to English",
            Task::ToHindi => "Translate to Hindi (हिन्दी)",
            Task::ToTamil => "Translate to Tamil (தமிழ்)",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Task {
    type Err = TranslationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Task::ALL
            .into_iter()
            .find(|task| task.id().eq_ignore_ascii_case(raw))
            .ok_or_else(|| TranslationError::InvalidTask(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Connection refused, DNS failure or timeout
    UnreachableEndpoint(String),
    /// Endpoint answered but produced no usable translation
    TranslationFailed(String),
    /// Task id outside the known set
    InvalidTask(String),
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::UnreachableEndpoint(msg) => write!(f, "{}", msg),
            TranslationError::TranslationFailed(msg) => write!(f, "Translation failed: {}", msg),
            TranslationError::InvalidTask(task) => write!(f, "Invalid task selected: '{}'", task),
        }
    }
}

impl std::error::Error for TranslationError {}

impl TranslationError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TranslationError::UnreachableEndpoint(_))
    }
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, task: Task) -> Result<String, TranslationError>;
}

pub fn build_prompt(text: &str, task: Task) -> String {
    match task {
        Task::ToEnglish => format!(
            "You are an expert linguist. The following text is either in Hindi or Tamil. \
             Detect the language and translate it to modern, fluent English. \
             Provide ONLY the English translation.\n\nText: \"{}\"\n\nEnglish Translation:",
            text
        ),
        Task::ToHindi => format!(
            "You are an expert English-to-Hindi translator. Translate the following English text \
             into Hindi using the Devanagari script. Provide ONLY the Hindi translation.\n\n\
             English Text: \"{}\"\n\nHindi Translation:",
            text
        ),
        Task::ToTamil => format!(
            "You are an expert English-to-Tamil translator. Translate the following English text \
             into Tamil using the Tamil script. Provide ONLY the Tamil translation.\n\n\
             English Text: \"{}\"\n\nTamil Translation:",
            text
        ),
    }
}

/// Removes one pair of `"` when the text both starts and ends with one.
pub fn strip_surrounding_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// Trims, then strips one quote layer. Whitespace inside the quotes is kept.
pub fn clean_response(raw: &str) -> String {
    strip_surrounding_quotes(raw.trim()).to_string()
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Single-shot client for Ollama's `/api/generate`.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            timeout,
        }
    }

    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.endpoint.clone(),
            settings.model.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn agent(&self) -> ureq::Agent {
        ureq::builder()
            .timeout_connect(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(self.timeout))
            .timeout(self.timeout)
            .build()
    }
}

impl Translator for OllamaClient {
    fn translate(&self, text: &str, task: Task) -> Result<String, TranslationError> {
        let prompt = build_prompt(text, task);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
        };
        debug!(
            "Requesting {} from {} (model {}, {} chars)",
            task,
            self.endpoint,
            self.model,
            text.chars().count()
        );

        let resp = self
            .agent()
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Status(404, _) => TranslationError::TranslationFailed(format!(
                    "Model '{}' not found in Ollama. Pull it first with: ollama pull {}",
                    self.model, self.model
                )),
                ureq::Error::Status(code, resp) => {
                    let body = resp.into_string().unwrap_or_default();
                    TranslationError::TranslationFailed(format!(
                        "Ollama returned HTTP {}: {}",
                        code,
                        body.trim()
                    ))
                }
                ureq::Error::Transport(t) => {
                    warn!("Ollama transport error: {}", t);
                    TranslationError::UnreachableEndpoint(format!(
                        "Could not connect to Ollama at {}. Is it running? ({})",
                        self.endpoint, t
                    ))
                }
            })?;

        let parsed: GenerateResponse = resp.into_json().map_err(|e| {
            TranslationError::TranslationFailed(format!("Failed to parse Ollama response: {}", e))
        })?;

        let suggestion = clean_response(&parsed.response);
        if suggestion.trim().is_empty() {
            return Err(TranslationError::TranslationFailed(
                "Ollama returned an empty translation".to_string(),
            ));
        }
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const HINDI_GREETING: &str = "नमस्ते, आप कैसे हैं?";

    fn client_for(server: &mockito::Server) -> OllamaClient {
        OllamaClient::new(
            format!("{}/api/generate", server.url()),
            "gemma:2b",
            Duration::from_secs(5),
        )
    }

    #[test]
    fn task_ids_round_trip_through_from_str() {
        for task in Task::ALL {
            assert_eq!(task.id().parse::<Task>(), Ok(task));
        }
    }

    #[test]
    fn unknown_task_id_is_invalid_task() {
        let err = "to_klingon".parse::<Task>().unwrap_err();
        assert_eq!(err, TranslationError::InvalidTask("to_klingon".to_string()));
        assert!(!err.is_unreachable());
    }

    #[test]
    fn prompt_is_deterministic_per_task() {
        for task in Task::ALL {
            assert_eq!(build_prompt("hello", task), build_prompt("hello", task));
        }
    }

    #[test]
    fn prompts_differ_across_tasks_and_embed_text() {
        let prompts: Vec<String> = Task::ALL.iter().map(|t| build_prompt("hello", *t)).collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert_ne!(prompts[0], prompts[2]);
        assert!(prompts.iter().all(|p| p.contains("\"hello\"")));
        assert!(prompts[0].ends_with("English Translation:"));
        assert!(prompts[1].ends_with("Hindi Translation:"));
        assert!(prompts[2].ends_with("Tamil Translation:"));
    }

    #[test]
    fn strip_quotes_without_quotes_is_noop() {
        assert_eq!(strip_surrounding_quotes("Hello"), "Hello");
        assert_eq!(strip_surrounding_quotes("\"Hello"), "\"Hello");
        assert_eq!(strip_surrounding_quotes(""), "");
    }

    #[test]
    fn strip_quotes_removes_single_pair() {
        assert_eq!(strip_surrounding_quotes("\"Hello\""), "Hello");
    }

    #[test]
    fn strip_quotes_only_removes_outermost_layer() {
        assert_eq!(strip_surrounding_quotes("\"\"Hello\"\""), "\"Hello\"");
    }

    #[test]
    fn strip_quotes_leaves_lone_quote() {
        assert_eq!(strip_surrounding_quotes("\""), "\"");
    }

    #[test]
    fn clean_response_trims_then_strips_one_layer() {
        assert_eq!(clean_response("  \"Hello, how are you?\"\n"), "Hello, how are you?");
        assert_eq!(clean_response("\" Hello \""), " Hello ");
    }

    #[test]
    fn translate_posts_prompt_and_cleans_response() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/generate")
            .match_header("content-type", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "gemma:2b",
                    "prompt": build_prompt(HINDI_GREETING, Task::ToEnglish),
                    "stream": false
                })),
                Matcher::Regex("English Translation:".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"gemma:2b","response":"  \"Hello, how are you?\"  ","done":true}"#)
            .expect(1)
            .create();

        let result = client_for(&server).translate(HINDI_GREETING, Task::ToEnglish);

        assert_eq!(result, Ok("Hello, how are you?".to_string()));
        mock.assert();
    }

    #[test]
    fn translate_reports_unreachable_endpoint() {
        let client = OllamaClient::new(
            "http://127.0.0.1:19999/api/generate",
            "gemma:2b",
            Duration::from_secs(2),
        );
        let result = client.translate("hello", Task::ToHindi);
        assert!(
            matches!(result, Err(TranslationError::UnreachableEndpoint(_))),
            "expected UnreachableEndpoint for unbound port, got: {:?}",
            result
        );
    }

    #[test]
    fn translate_treats_timeout_as_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            // Accept and hold the connection without ever answering.
            if let Ok((stream, _)) = listener.accept() {
                std::thread::sleep(Duration::from_secs(5));
                drop(stream);
            }
        });
        let client = OllamaClient::new(
            format!("http://{}/api/generate", addr),
            "gemma:2b",
            Duration::from_secs(1),
        );

        let started = std::time::Instant::now();
        let result = client.translate("hello", Task::ToEnglish);

        assert!(
            matches!(result, Err(TranslationError::UnreachableEndpoint(_))),
            "expected UnreachableEndpoint on timeout, got: {:?}",
            result
        );
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn translate_maps_server_error_to_failure() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model crashed")
            .expect(1)
            .create();

        let result = client_for(&server).translate("hello", Task::ToTamil);

        match result {
            Err(TranslationError::TranslationFailed(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("model crashed"));
            }
            other => panic!("expected TranslationFailed, got {:?}", other),
        }
        mock.assert();
    }

    #[test]
    fn translate_hints_pull_on_missing_model() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/api/generate").with_status(404).create();

        let result = client_for(&server).translate("hello", Task::ToHindi);

        match result {
            Err(TranslationError::TranslationFailed(msg)) => {
                assert!(msg.contains("ollama pull gemma:2b"))
            }
            other => panic!("expected TranslationFailed, got {:?}", other),
        }
    }

    #[test]
    fn translate_rejects_unexpected_shape() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":{"content":"Hello"}}"#)
            .create();

        let result = client_for(&server).translate("hello", Task::ToEnglish);

        assert!(matches!(result, Err(TranslationError::TranslationFailed(_))));
    }

    #[test]
    fn translate_rejects_blank_response() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response":"  \"\"  "}"#)
            .create();

        let result = client_for(&server).translate("hello", Task::ToEnglish);

        assert!(matches!(result, Err(TranslationError::TranslationFailed(_))));
    }
}
