use async_trait::async_trait;
use log::{debug, warn};

/// Every summarizer failure renders with this prefix.
pub const FAILURE_MARKER: &str = "Failed to generate summary:";

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Failed to generate summary: GOOGLE_API_KEY is not set")]
    MissingApiKey,

    #[error("Failed to generate summary: API call error - {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to generate summary: API call error - {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Failed to generate summary: Unexpected API response.")]
    UnexpectedResponse,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize already-trimmed transcript text
    async fn summarize(&self, transcript: &str) -> Result<String, SummaryError>;
}

/// Cut `text` to at most `max_chars` characters. Not word-aware.
pub fn trim_to_char_limit(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(transcript: &str) -> String {
    format!(
        "You are a helpful assistant that summarizes YouTube transcripts.\n\n\
         Transcript:\n\
         {transcript}\n\n\
         Provide a concise summary and then 3\u{2013}5 bullet\u{2011}point key points."
    )
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, endpoint: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, transcript: &str) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;

        debug!("Summarizing via Gemini API with model {}", self.model);

        let body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": build_prompt(transcript) }]
                }
            ]
        });

        let resp = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Gemini API returned {status}: {body}");
            return Err(SummaryError::Status { status, body });
        }

        let json: serde_json::Value = resp.json().await?;
        extract_gemini_text(&json).ok_or_else(|| {
            warn!("Unexpected response structure from Gemini API: {json}");
            SummaryError::UnexpectedResponse
        })
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> Option<String> {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
}
