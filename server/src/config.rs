// Configuration for the server, read once at startup.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tts_core::VoiceSelection;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_DIR: &str = "uploads_web";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TTS_LANGUAGE: &str = "pt-BR";
const DEFAULT_TTS_VOICE: &str = "pt-BR-Wavenet-A";
const DEFAULT_AUDIO_PLAYER: &str = "mpg123";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub audio_temp_dir: PathBuf,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub credentials_path: PathBuf,
    pub tts_language: String,
    pub tts_voice: String,
    pub audio_player: String,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upload_dir", &self.upload_dir)
            .field("audio_temp_dir", &self.audio_temp_dir)
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("credentials_path", &self.credentials_path)
            .field("tts_language", &self.tts_language)
            .field("tts_voice", &self.tts_voice)
            .field("audio_player", &self.audio_player)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `GEMINI_KEY` and
    /// `GOOGLE_APPLICATION_CREDENTIALS` are required; everything else
    /// falls back to a default.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let Some(gemini_api_key) = non_blank("GEMINI_KEY") else {
            bail!("GEMINI_KEY was not found in the environment or .env file");
        };
        let Some(credentials_path) = non_blank("GOOGLE_APPLICATION_CREDENTIALS") else {
            bail!("GOOGLE_APPLICATION_CREDENTIALS must point to a service-account JSON file");
        };

        let port = get("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_upload_bytes = get("MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let audio_temp_dir = non_blank("AUDIO_TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            host: non_blank("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            upload_dir: PathBuf::from(non_blank("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into())),
            audio_temp_dir,
            gemini_api_key: gemini_api_key.trim().to_string(),
            gemini_model: non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            credentials_path: PathBuf::from(credentials_path),
            tts_language: non_blank("TTS_LANGUAGE").unwrap_or_else(|| DEFAULT_TTS_LANGUAGE.into()),
            tts_voice: non_blank("TTS_VOICE").unwrap_or_else(|| DEFAULT_TTS_VOICE.into()),
            audio_player: non_blank("AUDIO_PLAYER").unwrap_or_else(|| DEFAULT_AUDIO_PLAYER.into()),
            max_upload_bytes,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn voice(&self) -> VoiceSelection {
        VoiceSelection {
            language_code: self.tts_language.clone(),
            name: self.tts_voice.clone(),
        }
    }
}
