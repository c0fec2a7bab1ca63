use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture device {0} could not be opened")]
    DeviceUnavailable(u32),
    #[error("capture driver error: {0}")]
    Driver(String),
}

/// A live frame source, typically a camera.
///
/// Opening is the implementation's constructor. Frames are pulled one at a
/// time; `capture_frame` blocks until the next frame is available and so
/// paces the pipeline.
pub trait CaptureSource: Send {
    /// Best-effort resolution request. The device may deliver another size,
    /// which is only observable from the frames it returns.
    fn request_resolution(&mut self, width: u32, height: u32) -> Result<(), CaptureError>;

    /// Returns the next frame, or `None` once the stream has ended.
    fn capture_frame(&mut self) -> Result<Option<Frame>, CaptureError>;
}
