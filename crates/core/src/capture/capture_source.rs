use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::capture::domain::camera::{Camera, StreamConstraints, VideoStream};
use crate::shared::captured_image::{CapturedImage, JPEG_MIME};
use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Unable to access camera. Please check permissions. ({0})")]
    Acquire(String),
    #[error("no stream available")]
    NoStream,
    #[error("failed to grab frame: {0}")]
    Grab(String),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// Wraps a live video stream and turns the current frame into a
/// [`CapturedImage`] on demand.
///
/// Each successful capture gets the next generation number, starting at 1.
pub struct CaptureSource {
    stream: Option<Box<dyn VideoStream>>,
    quality: u8,
    generation: u64,
}

impl CaptureSource {
    pub fn new(quality: u8) -> Self {
        Self {
            stream: None,
            quality: quality.clamp(1, 100),
            generation: 0,
        }
    }

    pub fn with_stream(stream: Box<dyn VideoStream>, quality: u8) -> Self {
        Self {
            stream: Some(stream),
            ..Self::new(quality)
        }
    }

    /// Acquires a stream from `camera`. Not retried on failure.
    pub fn start(
        &mut self,
        camera: &mut dyn Camera,
        constraints: &StreamConstraints,
    ) -> Result<(), CaptureError> {
        let stream = camera
            .acquire(constraints)
            .map_err(|e| CaptureError::Acquire(e.to_string()))?;
        self.stop();
        self.stream = Some(stream);
        log::info!("Camera initialized successfully");
        Ok(())
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Takes a still of the current frame, encoded as JPEG.
    pub fn capture(&mut self) -> Result<CapturedImage, CaptureError> {
        let stream = self.stream.as_mut().ok_or(CaptureError::NoStream)?;
        let frame = stream
            .grab()
            .map_err(|e| CaptureError::Grab(e.to_string()))?;
        let payload = encode_jpeg(&frame, self.quality)?;

        self.generation += 1;
        log::info!(
            "Photo captured successfully ({}x{}, {} bytes, generation {})",
            frame.width(),
            frame.height(),
            payload.len(),
            self.generation
        );
        Ok(CapturedImage::new(
            payload,
            JPEG_MIME,
            frame.width(),
            frame.height(),
            self.generation,
        ))
    }

    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl Default for CaptureSource {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).write_image(
        frame.data(),
        frame.width(),
        frame.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
