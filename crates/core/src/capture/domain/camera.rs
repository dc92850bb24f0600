use crate::shared::constants::{DEFAULT_CAMERA_HEIGHT, DEFAULT_CAMERA_WIDTH};
use crate::shared::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

/// Capabilities requested when acquiring a stream. Treated as ideal values:
/// a camera may deliver something smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAMERA_WIDTH,
            height: DEFAULT_CAMERA_HEIGHT,
            facing: FacingMode::User,
        }
    }
}

/// A live source of frames.
pub trait VideoStream: Send {
    /// Grabs the frame currently showing on the stream.
    fn grab(&mut self) -> Result<Frame, Box<dyn std::error::Error>>;

    /// Releases the underlying device. Default: no-op.
    fn stop(&mut self) {}
}

/// Grants video streams for a set of capability constraints.
pub trait Camera {
    fn acquire(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error>>;
}
