//! Image preparation and captioning for the describe-and-speak server.
//!
//! [`normalize_image`] turns whatever the browser uploaded into a single
//! RGB JPEG, and [`generate_caption`] asks a [`VisionModel`] for a short
//! description of it.

mod caption;
mod gemini;
mod normalize;

pub use caption::{generate_caption, Caption, VisionModel, DESCRIPTION_PROMPT};
pub use gemini::GeminiClient;
pub use normalize::{normalize_image, NormalizedImage};
