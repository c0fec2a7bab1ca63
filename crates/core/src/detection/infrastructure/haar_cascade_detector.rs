use std::path::Path;

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::{self, CascadeClassifier};
use opencv::prelude::*;

use crate::detection::domain::face_candidate::{DetectionResult, FaceCandidate};
use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::constants::{DETECT_MIN_NEIGHBORS, DETECT_SCALE_FACTOR};
use crate::shared::gray_frame::GrayFrame;
use crate::shared::mat_conversion::gray_into_mat;

/// Viola-Jones face detector backed by an OpenCV cascade classifier.
///
/// Uses `detectMultiScale2` so each box carries the number of raw hits
/// merged into it; that count becomes [`FaceCandidate::neighbors`].
pub struct HaarCascadeDetector {
    classifier: CascadeClassifier,
    input: Mat,
    boxes: Vector<Rect>,
    neighbors: Vector<i32>,
}

impl HaarCascadeDetector {
    /// Loads a cascade XML file. An unreadable or empty cascade is an error.
    pub fn load(model_path: &Path) -> Result<Self, DetectionError> {
        let load_err = |reason: String| DetectionError::ModelLoad {
            path: model_path.to_path_buf(),
            reason,
        };

        if !model_path.is_file() {
            return Err(load_err("file does not exist".to_string()));
        }
        let path_str = model_path
            .to_str()
            .ok_or_else(|| load_err("path is not valid UTF-8".to_string()))?;

        let classifier = CascadeClassifier::new(path_str).map_err(|e| load_err(e.to_string()))?;
        if classifier.empty().map_err(|e| load_err(e.to_string()))? {
            return Err(load_err("file is not a valid cascade".to_string()));
        }
        log::info!("Loaded cascade model {}", model_path.display());

        Ok(Self {
            classifier,
            input: Mat::default(),
            boxes: Vector::new(),
            neighbors: Vector::new(),
        })
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&mut self, frame: &GrayFrame) -> Result<DetectionResult, DetectionError> {
        let detect_err = |e: opencv::Error| DetectionError::Detect(e.to_string());

        gray_into_mat(frame, &mut self.input).map_err(detect_err)?;
        self.boxes.clear();
        self.neighbors.clear();

        // Canny pruning only skips flat regions; it does not change which
        // faces are found.
        self.classifier
            .detect_multi_scale2(
                &self.input,
                &mut self.boxes,
                &mut self.neighbors,
                DETECT_SCALE_FACTOR,
                DETECT_MIN_NEIGHBORS,
                objdetect::CASCADE_DO_CANNY_PRUNING,
                Size::new(0, 0),
                Size::new(0, 0),
            )
            .map_err(detect_err)?;

        Ok(self
            .boxes
            .iter()
            .zip(self.neighbors.iter())
            .map(|(r, n)| FaceCandidate::new(r.x, r.y, r.width, r.height, n.max(0) as u32))
            .collect())
    }
}
