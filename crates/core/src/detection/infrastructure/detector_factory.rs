use std::path::Path;

use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::constants::{CASCADE_MODEL_NAME, CASCADE_MODEL_URL};

use super::haar_cascade_detector::HaarCascadeDetector;
use super::model_resolver::{self, ProgressFn};

/// Resolves `model_path` (fetching the stock cascade when the default name
/// is not present locally) and loads it.
///
/// Resolution failures surface as [`DetectionError::ModelLoad`] so callers
/// see a single fatal model error.
pub fn load_face_detector(
    model_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<Box<dyn FaceDetector>, DetectionError> {
    let resolved =
        model_resolver::resolve(model_path, CASCADE_MODEL_NAME, CASCADE_MODEL_URL, progress)
            .map_err(|e| DetectionError::ModelLoad {
                path: model_path.to_path_buf(),
                reason: e.to_string(),
            })?;
    log::info!("Using cascade model {}", resolved.display());
    Ok(Box::new(HaarCascadeDetector::load(&resolved)?))
}
