//! Claude API integration for the study planner.
//!
//! Turns free-form syllabus text into an ordered list of study topics with
//! hour estimates and complexity scores, ready for scheduling.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const TOPIC_EXTRACTION_MAX_TOKENS: u32 = 4096;
const TOPIC_EXTRACTION_TEMPERATURE: f32 = 0.2;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// There was no syllabus text to analyze.
    #[error("syllabus text is empty")]
    EmptySyllabus,
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Claude API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(LlmError::ClientBuild)?;

        Ok(Self { http, api_key })
    }

    /// Extracts study topics from syllabus text.
    ///
    /// Topics come back in the order the model listed them, which becomes
    /// the study order.
    pub async fn extract_topics(
        &self,
        model: &str,
        syllabus: &str,
    ) -> Result<Vec<ExtractedTopic>, LlmError> {
        if syllabus.trim().is_empty() {
            return Err(LlmError::EmptySyllabus);
        }

        let request = MessageRequest {
            model: model.to_string(),
            max_tokens: TOPIC_EXTRACTION_MAX_TOKENS,
            temperature: TOPIC_EXTRACTION_TEMPERATURE,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: build_topic_prompt(syllabus),
            }],
        };

        tracing::debug!(model, chars = syllabus.len(), "requesting topic extraction");
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| LlmError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: MessageResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        let text = extract_text(payload.content)?;
        let topics = parse_topics(&text)?;
        tracing::debug!(topics = topics.len(), "extracted topics");
        Ok(topics)
    }
}

/// A topic as proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedTopic {
    pub topic_name: String,
    pub subtopics: Vec<String>,
    /// Non-negative; unparseable estimates become 0.
    pub estimated_hours: f64,
    /// Clamped to 1-5 when present.
    pub complexity: Option<u8>,
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts study topics from syllabi and estimates their complexity and time requirements.";

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: &'static str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

fn extract_text(blocks: Vec<ContentBlock>) -> Result<String, LlmError> {
    let mut pieces = Vec::new();
    for block in blocks {
        let ContentBlock::Text { text } = block;
        pieces.push(text);
    }
    if pieces.is_empty() {
        return Err(LlmError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<LlmError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| LlmError::Api {
            message: payload.error.message,
        })
}

fn build_topic_prompt(syllabus: &str) -> String {
    let mut lines = Vec::new();
    lines.push(
        "Analyze the following syllabus or study material and extract the main topics and subtopics."
            .to_string(),
    );
    lines.push(
        "Return strict JSON: an object with a \"topics\" key containing an array. Each item has:"
            .to_string(),
    );
    lines.push("- topic_name: string (the main topic)".to_string());
    lines.push("- subtopics: array of strings (subtopics under this main topic)".to_string());
    lines.push("- estimated_hours: number (hours needed to study this topic)".to_string());
    lines.push("- complexity: number (1-5, where 1 is easiest and 5 is hardest)".to_string());
    lines.push("List topics in the order they should be studied.".to_string());
    lines.push(String::new());
    lines.push("Syllabus content:".to_string());
    lines.push(syllabus.trim().to_string());
    lines.join("\n")
}

/// Parses the model's JSON answer, tolerating a surrounding code fence.
fn parse_topics(text: &str) -> Result<Vec<ExtractedTopic>, LlmError> {
    #[derive(Deserialize)]
    struct Payload {
        topics: Option<Vec<RawTopic>>,
    }

    #[derive(Deserialize)]
    struct RawTopic {
        topic_name: String,
        #[serde(default)]
        subtopics: Vec<String>,
        #[serde(default)]
        estimated_hours: Value,
        #[serde(default)]
        complexity: Value,
    }

    let json = strip_code_fence(text);
    let payload: Payload =
        serde_json::from_str(json).map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
    let Some(topics) = payload.topics else {
        return Err(LlmError::InvalidResponse(
            "no topics array found".to_string(),
        ));
    };

    Ok(topics
        .into_iter()
        .map(|raw| ExtractedTopic {
            topic_name: raw.topic_name.trim().to_string(),
            subtopics: raw
                .subtopics
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            estimated_hours: value_as_f64(&raw.estimated_hours)
                .filter(|h| h.is_finite() && *h >= 0.0)
                .unwrap_or(0.0),
            complexity: value_as_f64(&raw.complexity)
                .filter(|c| c.is_finite() && *c > 0.0)
                .map(clamp_complexity),
        })
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_complexity(value: f64) -> u8 {
    value.round().clamp(1.0, 5.0) as u8
}
