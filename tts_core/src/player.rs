use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::AudioBuffer;

/// Something that can play an encoded audio file to completion.
pub trait PlaybackBackend: Send + Sync {
    fn play_file(&self, path: &Path) -> Result<()>;
}

/// Runs an external player, e.g. `mpg123 -q <file>`, and waits for it.
#[derive(Debug, Clone)]
pub struct CommandPlayback {
    program: String,
    args: Vec<String>,
}

impl CommandPlayback {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Quiet mode is requested with `-q`, which mpg123 and most of its
    /// look-alikes understand.
    pub fn quiet(program: &str) -> Self {
        Self::new(program, &["-q"])
    }
}

impl PlaybackBackend for CommandPlayback {
    fn play_file(&self, path: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to launch {}", self.program))?;
        if !status.success() {
            bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Played,
    Failed,
}

/// Writes audio to a uniquely named file, plays it, and removes the file.
pub struct AudioPlayer {
    backend: Box<dyn PlaybackBackend>,
    temp_dir: PathBuf,
}

impl AudioPlayer {
    pub fn new(backend: Box<dyn PlaybackBackend>, temp_dir: PathBuf) -> Self {
        Self { backend, temp_dir }
    }

    /// Blocks until the backend returns. Never fails the caller: every
    /// problem is logged and reported as [`PlaybackOutcome::Failed`].
    pub fn play(&self, audio: &AudioBuffer) -> PlaybackOutcome {
        let path = self
            .temp_dir
            .join(format!("tts_{}.{}", Uuid::new_v4(), audio.encoding.extension()));

        let result = fs::write(&path, &audio.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))
            .and_then(|_| {
                info!("Playing audio...");
                self.backend.play_file(&path)
            });

        remove_audio_file(&path);

        match result {
            Ok(()) => PlaybackOutcome::Played,
            Err(e) => {
                warn!("Error while playing audio: {e:#}");
                PlaybackOutcome::Failed
            }
        }
    }
}

fn remove_audio_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {e}", path.display()),
    }
}
