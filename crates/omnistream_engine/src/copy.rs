use async_trait::async_trait;
use omnistream_core::{Platform, VideoMetadata};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::http::endpoint;
use crate::{CopySettings, HttpSettings};

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("API key missing (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("copy service unreachable: {0}")]
    Transport(String),
    #[error("copy service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("empty response from copy service")]
    EmptyResponse,
    #[error("copy service returned invalid copy: {0}")]
    InvalidCopy(String),
}

/// Writes title, description and tags for a video before a run starts.
#[async_trait]
pub trait CopyGenerator: Send + Sync {
    async fn generate(&self, topic: &str, platform: Platform) -> Result<VideoMetadata, CopyError>;
}

/// Copy generation through the Gemini `generateContent` endpoint with a JSON response schema.
#[derive(Debug, Clone)]
pub struct GeminiCopyGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    settings: CopySettings,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedCopy {
    title: String,
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

impl GeminiCopyGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: CopySettings,
        http: &HttpSettings,
    ) -> Result<Self, CopyError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CopyError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(http.connect_timeout())
            .timeout(http.request_timeout())
            .build()
            .map_err(|err| CopyError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            settings,
        })
    }

    /// Reads the key from `GEMINI_API_KEY`, then `API_KEY`.
    pub fn from_env(
        base_url: impl Into<String>,
        settings: CopySettings,
        http: &HttpSettings,
    ) -> Result<Self, CopyError> {
        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
            .ok_or(CopyError::MissingApiKey)?;
        Self::new(base_url, api_key, settings, http)
    }

    fn prompt(&self, topic: &str, platform: Platform) -> String {
        format!(
            "You are a professional social media manager.\n\
             Write a viral video title, description, and tags for a video about: \"{topic}\".\n\
             Target Platform: {}.\n\
             Tone: {}.\n\
             Language: {}.\n\
             Return JSON format.",
            platform.info().display_name,
            self.settings.tone,
            self.settings.language,
        )
    }
}

#[async_trait]
impl CopyGenerator for GeminiCopyGenerator {
    async fn generate(&self, topic: &str, platform: Platform) -> Result<VideoMetadata, CopyError> {
        let path = format!("/v1beta/models/{}:generateContent", self.settings.model);
        let url = endpoint(&self.base_url, &path, &[])
            .map_err(|err| CopyError::Transport(err.to_string()))?;
        let body = json!({
            "contents": [{ "parts": [{ "text": self.prompt(topic, platform) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                    },
                    "required": ["title", "description", "tags"],
                },
            },
        });

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| CopyError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CopyError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| CopyError::InvalidCopy(err.to_string()))?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CopyError::EmptyResponse)?;

        let copy: GeneratedCopy =
            serde_json::from_str(&text).map_err(|err| CopyError::InvalidCopy(err.to_string()))?;
        Ok(VideoMetadata::new(copy.title, copy.description, copy.tags))
    }
}
