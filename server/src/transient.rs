use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::warn;

/// A per-request file that is deleted when the guard goes out of scope,
/// whichever way the request ends.
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
}

impl TransientFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        remove_quietly(&self.path);
    }
}

/// Delete `path`. Missing files count as deleted; anything else is logged.
pub fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove transient file {}: {e}", path.display()),
    }
}
