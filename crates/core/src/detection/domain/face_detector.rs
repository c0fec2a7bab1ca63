use std::path::PathBuf;

use thiserror::Error;

use crate::detection::domain::face_candidate::DetectionResult;
use crate::shared::gray_frame::GrayFrame;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("failed to load cascade model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("face detection failed: {0}")]
    Detect(String),
}

/// Domain interface for face detection on a preprocessed grayscale frame.
///
/// Loading is the implementation's constructor; `&mut self` lets
/// implementations reuse scratch buffers between calls.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &GrayFrame) -> Result<DetectionResult, DetectionError>;
}
