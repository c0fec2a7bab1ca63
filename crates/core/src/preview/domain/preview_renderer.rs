use thiserror::Error;

use crate::detection::domain::face_candidate::FaceCandidate;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("preview window error: {0}")]
    Window(String),
}

/// Circle overlay for one emitted face, in mirrored-frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceMarker {
    pub center: (i32, i32),
    pub radius: i32,
}

impl FaceMarker {
    pub fn from_candidate(candidate: &FaceCandidate) -> Self {
        Self {
            center: candidate.center(),
            radius: candidate.marker_radius(),
        }
    }
}

/// Live preview surface.
pub trait PreviewRenderer: Send {
    /// Draws `markers` over `frame` and presents it.
    fn render(&mut self, frame: &Frame, markers: &[FaceMarker]) -> Result<(), RenderError>;

    /// Pumps windowing events, blocking for up to `wait_ms` milliseconds.
    fn pump_events(&mut self, wait_ms: u32) -> Result<(), RenderError>;
}
