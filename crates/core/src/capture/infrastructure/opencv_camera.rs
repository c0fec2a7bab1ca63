use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::capture::domain::capture_source::{CaptureError, CaptureSource};
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::mat_to_frame;

/// Camera capture through OpenCV's `videoio` backends (V4L2, AVFoundation,
/// Media Foundation, ...).
///
/// Each read lands in a reused `Mat` and is then copied into an owned
/// [`Frame`].
pub struct OpenCvCamera {
    capture: VideoCapture,
    device_index: u32,
    scratch: Mat,
    frames_read: usize,
}

impl OpenCvCamera {
    pub fn open(device_index: u32) -> Result<Self, CaptureError> {
        let capture = VideoCapture::new(device_index as i32, videoio::CAP_ANY)
            .map_err(|_| CaptureError::DeviceUnavailable(device_index))?;
        let opened = capture
            .is_opened()
            .map_err(|_| CaptureError::DeviceUnavailable(device_index))?;
        if !opened {
            return Err(CaptureError::DeviceUnavailable(device_index));
        }
        log::info!("Opened capture device {device_index}");

        Ok(Self {
            capture,
            device_index,
            scratch: Mat::default(),
            frames_read: 0,
        })
    }
}

impl CaptureSource for OpenCvCamera {
    fn request_resolution(&mut self, width: u32, height: u32) -> Result<(), CaptureError> {
        let props = [
            (videoio::CAP_PROP_FRAME_WIDTH, width),
            (videoio::CAP_PROP_FRAME_HEIGHT, height),
        ];
        for (prop, value) in props {
            let accepted = self
                .capture
                .set(prop, value as f64)
                .map_err(|e| CaptureError::Driver(e.to_string()))?;
            if !accepted {
                log::warn!(
                    "Device {} ignored resolution request {width}x{height}",
                    self.device_index
                );
                break;
            }
        }
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let grabbed = self
            .capture
            .read(&mut self.scratch)
            .map_err(|e| CaptureError::Driver(e.to_string()))?;
        if !grabbed || self.scratch.empty() {
            return Ok(None);
        }

        let frame = mat_to_frame(&self.scratch, self.frames_read)
            .map_err(|e| CaptureError::Driver(e.to_string()))?;
        self.frames_read += 1;
        Ok(Some(frame))
    }
}
