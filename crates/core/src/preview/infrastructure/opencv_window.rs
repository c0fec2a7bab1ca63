use opencv::core::{Mat, Point, Scalar};
use opencv::highgui;
use opencv::imgproc;

use crate::preview::domain::preview_renderer::{FaceMarker, PreviewRenderer, RenderError};
use crate::shared::constants::{PREVIEW_MARKER_COLOR, PREVIEW_MARKER_THICKNESS};
use crate::shared::frame::Frame;
use crate::shared::mat_conversion::frame_into_mat;

/// HighGUI window showing the mirrored camera image with face circles.
pub struct OpenCvWindow {
    name: String,
    canvas: Mat,
}

impl OpenCvWindow {
    pub fn open(name: &str) -> Result<Self, RenderError> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE).map_err(window_err)?;
        Ok(Self {
            name: name.to_string(),
            canvas: Mat::default(),
        })
    }
}

impl PreviewRenderer for OpenCvWindow {
    fn render(&mut self, frame: &Frame, markers: &[FaceMarker]) -> Result<(), RenderError> {
        frame_into_mat(frame, &mut self.canvas).map_err(window_err)?;

        let (b, g, r) = PREVIEW_MARKER_COLOR;
        let color = Scalar::new(b as f64, g as f64, r as f64, 0.0);
        for marker in markers {
            imgproc::circle(
                &mut self.canvas,
                Point::new(marker.center.0, marker.center.1),
                marker.radius,
                color,
                PREVIEW_MARKER_THICKNESS,
                imgproc::LINE_8,
                0,
            )
            .map_err(window_err)?;
        }

        highgui::imshow(&self.name, &self.canvas).map_err(window_err)
    }

    fn pump_events(&mut self, wait_ms: u32) -> Result<(), RenderError> {
        highgui::wait_key(wait_ms as i32).map_err(window_err)?;
        Ok(())
    }
}

impl Drop for OpenCvWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.name);
    }
}

fn window_err(e: opencv::Error) -> RenderError {
    RenderError::Window(e.to_string())
}
