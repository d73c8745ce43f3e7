use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::credentials::TokenSource;
use crate::{AudioBuffer, AudioEncoding, ServiceAccount, SpeechSynthesizer};

const DEFAULT_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Language and named voice used for every utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub language_code: String,
    pub name: String,
}

impl Default for VoiceSelection {
    fn default() -> Self {
        Self {
            language_code: "pt-BR".to_string(),
            name: "pt-BR-Wavenet-A".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceParams<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Google Cloud Text-to-Speech over REST, authenticated as a service account.
pub struct GoogleTtsClient {
    tokens: TokenSource,
    client: Client,
    voice: VoiceSelection,
    encoding: AudioEncoding,
    endpoint: String,
}

impl GoogleTtsClient {
    pub fn new(account: ServiceAccount, voice: VoiceSelection) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client for Text-to-Speech")?;
        Ok(Self {
            tokens: TokenSource::new(account, client.clone()),
            client,
            voice,
            encoding: AudioEncoding::Mp3,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Load the key file and build a client; any problem here is a startup error.
    pub fn from_credentials_file<P: AsRef<Path>>(path: P, voice: VoiceSelection) -> Result<Self> {
        let account = ServiceAccount::from_file(path)?;
        info!("Text-to-Speech credentials loaded for {}", account.client_email());
        Self::new(account, voice)
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn voice(&self) -> &VoiceSelection {
        &self.voice
    }

    fn request<'a>(&'a self, text: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceParams {
                language_code: &self.voice.language_code,
                name: &self.voice.name,
            },
            audio_config: AudioConfig { audio_encoding: self.encoding.api_name() },
        }
    }
}

impl SpeechSynthesizer for GoogleTtsClient {
    fn synthesize(&self, text: &str) -> Result<AudioBuffer> {
        let token = self.tokens.access_token()?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&self.request(text))
            .send()
            .context("Text-to-Speech request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("Text-to-Speech API error ({status}): {body}");
        }

        let parsed: SynthesizeResponse =
            response.json().context("Malformed Text-to-Speech response")?;
        decode_audio(&parsed.audio_content, self.encoding)
    }
}

fn decode_audio(audio_content: &str, encoding: AudioEncoding) -> Result<AudioBuffer> {
    let bytes = general_purpose::STANDARD
        .decode(audio_content)
        .context("audioContent is not valid base64")?;
    if bytes.is_empty() {
        bail!("Text-to-Speech returned no audio");
    }
    Ok(AudioBuffer { bytes, encoding })
}
