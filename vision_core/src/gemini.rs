use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::VisionModel;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Structure for the Gemini `generateContent` request
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

/// Structure for the Gemini `generateContent` response
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Blocking client for the Gemini vision-language API.
pub struct GeminiClient {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client. A blank key is rejected up front so the server
    /// refuses to start instead of failing on the first upload.
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("Gemini API key is empty");
        }
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client for Gemini")?;
        Ok(Self {
            api_key: api_key.trim().to_string(),
            client,
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl VisionModel for GeminiClient {
    fn describe(&self, image_jpeg: &[u8], prompt: &str) -> Result<String> {
        info!("Describing image via Gemini {}", self.model);
        let body = build_request(image_jpeg, prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .context("Gemini request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            bail!("Gemini API error ({status}): {text}");
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .context("Gemini returned an unexpected response body")?;
        first_candidate_text(parsed)
    }
}

fn build_request<'a>(image_jpeg: &[u8], prompt: &'a str) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text(prompt),
                Part::InlineData(InlineData {
                    mime_type: "image/jpeg",
                    data: general_purpose::STANDARD.encode(image_jpeg),
                }),
            ],
        }],
    }
}

fn first_candidate_text(response: GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(anyhow!("Gemini returned no description: {reason}"));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    Ok(text)
}
