//! One upload, start to finish: save, normalize, caption, speak, clean up.

use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Context;
use axum::body::Bytes;
use tracing::info;
use tts_core::{synthesize_best_effort, AudioPlayer, PlaybackOutcome, SpeechSynthesizer};
use uuid::Uuid;
use vision_core::{generate_caption, normalize_image, Caption, VisionModel};

use crate::transient::TransientFile;

/// The file part of a validated upload.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Bytes,
}

pub struct Pipeline {
    vision: Arc<dyn VisionModel>,
    speech: Arc<dyn SpeechSynthesizer>,
    player: AudioPlayer,
    upload_dir: PathBuf,
    // Uploads are processed one at a time, playback included.
    gate: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        vision: Arc<dyn VisionModel>,
        speech: Arc<dyn SpeechSynthesizer>,
        player: AudioPlayer,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            vision,
            speech,
            player,
            upload_dir,
            gate: Mutex::new(()),
        }
    }

    /// Run the whole request. Blocks on network calls and on playback, so
    /// call it from a blocking thread.
    ///
    /// Only saving, normalizing and captioning can fail; speech problems are
    /// logged and the caption is still returned.
    pub fn process(&self, upload: UploadedImage) -> anyhow::Result<Caption> {
        let _turn = self.gate.lock().unwrap_or_else(PoisonError::into_inner);

        let raw = TransientFile::new(self.upload_dir.join(format!("raw_{}", Uuid::new_v4())));
        fs::write(raw.path(), &upload.bytes)
            .with_context(|| format!("Failed to save upload to {}", raw.path().display()))?;
        info!(
            "Received image: {} ({}, {} bytes)",
            raw.path().display(),
            upload.file_name,
            upload.bytes.len()
        );

        let normalized = normalize_image(raw.path(), &self.upload_dir)?;
        let _normalized_file = TransientFile::new(normalized.path.clone());

        let caption = generate_caption(self.vision.as_ref(), &normalized)?;
        info!("Description: {}", caption);

        self.speak(&caption);
        Ok(caption)
    }

    fn speak(&self, caption: &Caption) {
        let Some(audio) = synthesize_best_effort(self.speech.as_ref(), caption.as_str()) else {
            return;
        };
        if self.player.play(&audio) == PlaybackOutcome::Played {
            info!("Playback finished");
        }
    }
}
