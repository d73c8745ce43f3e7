use std::fmt;

use anyhow::anyhow;
use tracing::info;

use crate::NormalizedImage;

/// Instruction sent with every image. Answers are read aloud in Brazilian
/// Portuguese, so the prompt is written in it too.
pub const DESCRIPTION_PROMPT: &str = "Descreva esta imagem em uma frase curta para um deficiente visual. \
Caso seja uma página de livro, só me responda a transcrição do conteúdo aparente, nada além disso, \
se o conteúdo não estiver totalmente visível, avise de forma breve e não faça a transcrição. \
Se for uma placa, identifique o direcionamento. \
Se for uma estação de metrô ou trem, tente identificar o nome da estação também";

/// Anything that can look at a JPEG and answer a prompt about it.
pub trait VisionModel: Send + Sync {
    fn describe(&self, image_jpeg: &[u8], prompt: &str) -> anyhow::Result<String>;
}

/// Non-empty description with surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption(String);

impl Caption {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Send the normalized image with [`DESCRIPTION_PROMPT`] and return the answer.
///
/// Errors from the model are passed through untouched; the text itself is
/// never inspected beyond trimming.
pub fn generate_caption(
    model: &dyn VisionModel,
    image: &NormalizedImage,
) -> anyhow::Result<Caption> {
    let bytes = image.read_bytes()?;
    let raw = model.describe(&bytes, DESCRIPTION_PROMPT)?;
    let caption = Caption::new(&raw)
        .ok_or_else(|| anyhow!("Vision model returned an empty description"))?;
    info!("Caption generated ({} chars)", caption.as_str().len());
    Ok(caption)
}
