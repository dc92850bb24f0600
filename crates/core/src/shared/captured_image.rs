use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum DataUrlError {
    #[error("not a data URL")]
    MissingPrefix,
    #[error("data URL payload is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// An encoded still image produced by one capture action.
///
/// The payload is immutable and reference counted so in-flight analysis
/// requests can hold the image while a newer capture replaces it. The
/// `generation` identifies which capture produced it.
#[derive(Clone, Debug)]
pub struct CapturedImage {
    payload: Arc<[u8]>,
    mime_type: String,
    width: u32,
    height: u32,
    generation: u64,
}

impl CapturedImage {
    pub fn new(
        payload: Vec<u8>,
        mime_type: impl Into<String>,
        width: u32,
        height: u32,
        generation: u64,
    ) -> Self {
        Self {
            payload: payload.into(),
            mime_type: mime_type.into(),
            width,
            height,
            generation,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// `data:<mime>;base64,<payload>`, the form the analysis service accepts.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(&self.payload)
        )
    }
}

/// Splits a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::MissingPrefix)?;
    let (header, data) = rest.split_once(',').ok_or(DataUrlError::MissingPrefix)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotBase64)?;
    let bytes = STANDARD.decode(data)?;
    Ok((mime.to_string(), bytes))
}
