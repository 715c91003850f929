//! GeminiDialogueService - Direct REST API implementation of the
//! dialogue-service abstraction.
//!
//! The `generateContent` endpoint is stateless, so the conversation
//! handle keeps the full content history client-side and replays it on
//! every turn. Configuration is loaded from secret.json.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use luanque_core::dialogue::{
    DialogueConversation, DialogueError, DialogueService, TurnContent,
};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Dialogue service backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiDialogueService {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiDialogueService {
    /// Creates a new service with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Loads configuration from secret.json
    ///
    /// Model name defaults to `gemini-2.5-flash` if not specified.
    pub fn try_from_config() -> luanque_core::Result<Self> {
        let secret_config = config::load_secret_config()?;

        let gemini_config = secret_config.gemini.ok_or_else(|| {
            luanque_core::LuanqueError::config("Gemini configuration not found in secret.json")
        })?;

        let model = gemini_config
            .model_name
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self::new(gemini_config.api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl DialogueService for GeminiDialogueService {
    async fn open(
        &self,
        system_instruction: &str,
    ) -> Result<Box<dyn DialogueConversation>, DialogueError> {
        Ok(Box::new(GeminiConversation {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            system_instruction: system_instruction.to_string(),
            history: Vec::new(),
        }))
    }
}

/// An open multi-turn conversation against the Gemini API.
///
/// The system instruction is fixed at open time. A failed turn commits
/// nothing to the history, so the conversation stays usable.
pub struct GeminiConversation {
    client: Client,
    api_key: String,
    model: String,
    system_instruction: String,
    history: Vec<Content>,
}

#[async_trait]
impl DialogueConversation for GeminiConversation {
    async fn send(&mut self, turn: TurnContent) -> Result<String, DialogueError> {
        let user_content = Content {
            role: "user".to_string(),
            parts: build_parts(&turn)?,
        };
        self.history.push(user_content);

        let outcome = {
            let request = GenerateContentRequest {
                contents: &self.history,
                system_instruction: Some(Content {
                    role: "system".to_string(),
                    parts: vec![Part::Text {
                        text: self.system_instruction.clone(),
                    }],
                }),
            };
            self.send_request(&request).await
        };

        match outcome {
            Ok(text) => {
                self.history.push(Content {
                    role: "model".to_string(),
                    parts: vec![Part::Text { text: text.clone() }],
                });
                Ok(text)
            }
            Err(err) => {
                // Roll back the uncommitted user turn
                self.history.pop();
                Err(err)
            }
        }
    }
}

impl GeminiConversation {
    async fn send_request(
        &self,
        body: &GenerateContentRequest<'_>,
    ) -> Result<String, DialogueError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| DialogueError::Process {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
                retry_after: None,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| DialogueError::Other(format!("Failed to parse Gemini response: {err}")))?;

        extract_text_response(parsed)
    }
}

fn build_parts(turn: &TurnContent) -> Result<Vec<Part>, DialogueError> {
    let mut parts = Vec::new();
    if !turn.text.trim().is_empty() {
        parts.push(Part::Text {
            text: turn.text.clone(),
        });
    }

    if let Some(attachment) = &turn.attachment {
        parts.push(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: attachment.mime_type.clone(),
                data: BASE64_STANDARD.encode(&attachment.data),
            },
        });
    }

    if parts.is_empty() {
        return Err(DialogueError::InvalidPayload(
            "Gemini turn must include text or an attachment".into(),
        ));
    }

    Ok(parts)
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Clone, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Clone, Serialize, Debug)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, DialogueError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            DialogueError::Other("Gemini API returned no text in the response candidates".into())
        })
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> DialogueError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    DialogueError::Process {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}
