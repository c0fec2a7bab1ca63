pub mod detector_factory;
pub mod haar_cascade_detector;
pub mod model_resolver;
