use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use image::{io::Reader as ImageReader, ImageFormat};
use tracing::debug;
use uuid::Uuid;

/// A re-encoded, single-frame RGB JPEG on disk.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl NormalizedImage {
    pub fn read_bytes(&self) -> anyhow::Result<Vec<u8>> {
        fs::read(&self.path)
            .with_context(|| format!("Failed to read normalized image {}", self.path.display()))
    }
}

/// Decode `input` (format sniffed from its bytes), drop alpha and extra
/// frames, and write the result as `upload_<uuid>.jpg` under `output_dir`.
///
/// The input file is left in place.
pub fn normalize_image(input: &Path, output_dir: &Path) -> anyhow::Result<NormalizedImage> {
    let decoded = ImageReader::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to sniff image format of {}", input.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image {}", input.display()))?;

    // Multi-frame containers decode to their primary frame; to_rgb8 drops alpha.
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let path = output_dir.join(format!("upload_{}.jpg", Uuid::new_v4()));
    if let Err(e) = rgb.save_with_format(&path, ImageFormat::Jpeg) {
        let _ = fs::remove_file(&path);
        return Err(anyhow::Error::new(e)
            .context(format!("Failed to write normalized image {}", path.display())));
    }
    debug!("Normalized {} -> {} ({}x{})", input.display(), path.display(), width, height);

    Ok(NormalizedImage { path, width, height })
}
