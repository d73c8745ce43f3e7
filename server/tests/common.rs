//! Common utilities for integration tests: fake capabilities, a router
//! wired to them, and multipart request builders.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::{body::Body, http::Request, Router};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

use server::pipeline::Pipeline;
use server::{build_router, AppState};
use tts_core::{AudioBuffer, AudioEncoding, AudioPlayer, PlaybackBackend, SpeechSynthesizer};
use vision_core::VisionModel;

pub const BOUNDARY: &str = "----describe-test-boundary";

#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FakeVision {
    reply: Result<String, String>,
    calls: Calls,
    images: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl VisionModel for FakeVision {
    fn describe(&self, image_jpeg: &[u8], _prompt: &str) -> anyhow::Result<String> {
        self.calls.bump();
        self.images.lock().unwrap().push(image_jpeg.to_vec());
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

pub struct FakeSpeech {
    fail: bool,
    calls: Calls,
}

impl SpeechSynthesizer for FakeSpeech {
    fn synthesize(&self, text: &str) -> anyhow::Result<AudioBuffer> {
        self.calls.bump();
        if self.fail {
            anyhow::bail!("voice pt-BR-Wavenet-A unavailable");
        }
        Ok(AudioBuffer { bytes: text.as_bytes().to_vec(), encoding: AudioEncoding::Mp3 })
    }
}

pub struct FakePlayback {
    fail: bool,
    calls: Calls,
}

impl PlaybackBackend for FakePlayback {
    fn play_file(&self, path: &Path) -> anyhow::Result<()> {
        self.calls.bump();
        assert!(path.exists(), "audio file should exist while playing");
        if self.fail {
            anyhow::bail!("mpg123 exited with status 1");
        }
        Ok(())
    }
}

/// Knobs for the fakes behind a test app.
pub struct Behaviour {
    pub caption: Result<String, String>,
    pub speech_fails: bool,
    pub playback_fails: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            caption: Ok("  Um gato dormindo sobre um sofá azul.\n".to_string()),
            speech_fails: false,
            playback_fails: false,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub upload_dir: TempDir,
    pub audio_dir: TempDir,
    pub vision_calls: Calls,
    pub speech_calls: Calls,
    pub playback_calls: Calls,
    pub images_sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl TestApp {
    pub fn upload_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.upload_dir.path()).unwrap().next().is_none()
    }

    pub fn audio_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.audio_dir.path()).unwrap().next().is_none()
    }
}

/// Create a test app instance backed by fakes and temporary directories
pub fn create_test_app(behaviour: Behaviour) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let audio_dir = tempfile::tempdir().unwrap();
    let vision_calls = Calls::default();
    let speech_calls = Calls::default();
    let playback_calls = Calls::default();
    let images_sent = Arc::new(Mutex::new(Vec::new()));

    let vision = FakeVision {
        reply: behaviour.caption,
        calls: vision_calls.clone(),
        images: images_sent.clone(),
    };
    let speech = FakeSpeech { fail: behaviour.speech_fails, calls: speech_calls.clone() };
    let player = AudioPlayer::new(
        Box::new(FakePlayback { fail: behaviour.playback_fails, calls: playback_calls.clone() }),
        audio_dir.path().to_path_buf(),
    );

    let pipeline = Pipeline::new(
        Arc::new(vision),
        Arc::new(speech),
        player,
        upload_dir.path().to_path_buf(),
    );
    let router = build_router(AppState {
        pipeline: Arc::new(pipeline),
        max_upload_bytes: 5 * 1024 * 1024,
    });

    TestApp {
        router,
        upload_dir,
        audio_dir,
        vision_calls,
        speech_calls,
        playback_calls,
        images_sent,
    }
}

/// Build a `multipart/form-data` POST to `/` with a single file part.
pub fn multipart_upload(field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

/// A multipart POST whose only part is a plain text field.
pub fn multipart_without_image() -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    RgbImage::from_pixel(16, 12, Rgb([120, 80, 40]))
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .unwrap();
    out
}

pub fn rgba_png_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    RgbaImage::from_pixel(10, 10, Rgba([0, 128, 255, 40]))
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn animated_gif_bytes() -> Vec<u8> {
    use image::{codecs::gif::GifEncoder, Frame};

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder
            .encode_frames(vec![
                Frame::new(RgbaImage::from_pixel(6, 4, Rgba([255, 255, 0, 255]))),
                Frame::new(RgbaImage::from_pixel(6, 4, Rgba([0, 0, 0, 0]))),
                Frame::new(RgbaImage::from_pixel(6, 4, Rgba([9, 9, 9, 255]))),
            ])
            .unwrap();
    }
    out
}
