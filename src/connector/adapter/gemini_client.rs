use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ChatModel;
use crate::domain::{PersonaConfig, ReplyError, Turn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_VERSION_PATH: &str = "/v1beta/models";
const GENERATE_METHOD: &str = "generateContent";
const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Finish reasons for which the SDK refuses to hand back candidate text.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "LANGUAGE"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

/// Subset of the `generateContent` response we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Google error envelope: `{"error": {"code": 400, "message": "...", "status": "..."}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// The persona (system instruction and generation parameters) is bound at
/// construction time and sent with every request; each call carries the full
/// history, so no session state lives in the client.
///
/// Configuration from the environment:
///
/// | Variable          | Default                                     |
/// |-------------------|---------------------------------------------|
/// | `GEMINI_API_KEY`  | `""` (empty, requests fail authentication)  |
/// | `GEMINI_MODEL`    | `gemini-2.5-flash`                          |
/// | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com` |
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + version path + model + method).
    url: String,
    persona: Arc<PersonaConfig>,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        persona: Arc<PersonaConfig>,
    ) -> Self {
        let api_key: String = api_key.into();
        let model: String = model.into();
        let base: String = base_url.into();
        let url = Self::endpoint_url(&base, &model);

        if api_key.is_empty() {
            warn!("GeminiClient: GEMINI_API_KEY is empty; requests to {model} will fail auth");
        }

        Self {
            client: reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            model,
            url,
            persona,
        }
    }

    /// Construct from `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_BASE_URL`.
    ///
    /// A missing key does not fail construction.
    pub fn from_env(persona: Arc<PersonaConfig>) -> Self {
        let key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(key, model, base, persona)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn endpoint_url(base_url: &str, model: &str) -> String {
        format!(
            "{}{API_VERSION_PATH}/{model}:{GENERATE_METHOD}",
            base_url.trim_end_matches('/')
        )
    }

    /// A chat session must open with a user turn; anything else is rejected
    /// before a request is made.
    fn validate_history(history: &[Turn]) -> Result<(), ReplyError> {
        match history.first() {
            Some(first) if !first.is_user() => Err(ReplyError::invalid_history(format!(
                "first turn must have role 'user', got '{}'",
                first.role().as_str()
            ))),
            _ => Ok(()),
        }
    }

    fn build_request<'a>(
        persona: &'a PersonaConfig,
        history: &'a [Turn],
        message: &'a str,
    ) -> GenerateContentRequest<'a> {
        let mut contents: Vec<Content<'a>> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role().as_str()),
                parts: vec![Part { text: turn.text() }],
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part { text: message }],
        });

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: persona.system_instruction(),
                }],
            },
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: persona.max_output_tokens(),
                temperature: persona.temperature(),
            },
        }
    }

    /// Pull the reply text out of a response the way the SDK's `text()` does.
    fn extract_text(response: GenerateContentResponse) -> Result<String, ReplyError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            return match response.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(ReplyError::invalid_response(format!(
                    "prompt blocked: {reason}"
                ))),
                None => Err(ReplyError::invalid_response("empty response: no candidates")),
            };
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if BLOCKING_FINISH_REASONS.contains(&reason) {
                return Err(ReplyError::invalid_response(format!(
                    "candidate stopped: {reason}"
                )));
            }
        }

        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> ReplyError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status.as_u16() {
            401 | 403 => ReplyError::authentication(message),
            code => ReplyError::remote(code, message),
        }
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn send_message(&self, history: &[Turn], message: &str) -> Result<String, ReplyError> {
        Self::validate_history(history)?;
        let request = Self::build_request(&self.persona, history, message);
        debug!(
            "GeminiClient: POST {} ({} contents)",
            self.url,
            request.contents.len()
        );

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReplyError::transport(format!("GeminiClient: request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiClient: API returned {status}: {body}");
            return Err(Self::classify_status(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReplyError::transport(format!("GeminiClient: failed to read body: {e}")))?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            ReplyError::invalid_response(format!("GeminiClient: failed to parse response: {e}"))
        })?;

        Self::extract_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
