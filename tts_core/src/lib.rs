//! Speech output: turn a caption into MP3 bytes with Google Cloud
//! Text-to-Speech and play them through a local command-line player.
//!
//! Nothing in this crate is allowed to fail a request. Synthesis errors
//! collapse to `None` in [`synthesize_best_effort`] and playback errors to
//! [`PlaybackOutcome::Failed`].

mod credentials;
mod google;
mod player;
#[cfg(test)]
mod test_http;

use tracing::error;

pub use credentials::ServiceAccount;
pub use google::{GoogleTtsClient, VoiceSelection};
pub use player::{AudioPlayer, CommandPlayback, PlaybackBackend, PlaybackOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    Mp3,
}

impl AudioEncoding {
    /// Value of `audioConfig.audioEncoding` in the synthesis request.
    pub fn api_name(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
        }
    }
}

/// Encoded audio, ready to be handed to a player.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub bytes: Vec<u8>,
    pub encoding: AudioEncoding,
}

pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> anyhow::Result<AudioBuffer>;
}

/// Synthesize `text`, logging and swallowing any failure.
pub fn synthesize_best_effort(synth: &dyn SpeechSynthesizer, text: &str) -> Option<AudioBuffer> {
    match synth.synthesize(text) {
        Ok(audio) => Some(audio),
        Err(e) => {
            error!("Speech synthesis failed, skipping playback: {e:#}");
            None
        }
    }
}
