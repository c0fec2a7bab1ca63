use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::capture::domain::capture_source::{CaptureError, CaptureSource};
use crate::detection::domain::face_candidate::FaceCandidate;
use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::emission::domain::emitter::Emitter;
use crate::emission::domain::packet::Packet;
use crate::pipeline::candidate_filter::filter_candidates;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::preprocessor::preprocess;
use crate::preview::domain::preview_renderer::{FaceMarker, PreviewRenderer, RenderError};
use crate::shared::config::Config;
use crate::shared::constants::{EMIT_MIN_NEIGHBORS, PREVIEW_WAIT_MS};
use crate::shared::gray_frame::GrayFrame;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("capture source ended before delivering a first frame")]
    NoInitialFrame,
    #[error("frame {frame} size changed from {expected:?} to {actual:?}")]
    FrameSizeChanged {
        frame: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Running,
    Terminated,
}

/// Counters for a finished (or in-progress) run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub packets_sent: usize,
    pub send_failures: usize,
}

/// Single-threaded capture → preprocess → detect → filter → emit → render
/// loop.
///
/// Built by [`DetectionPipeline::init`] and driven with [`step`] or [`run`].
/// Once terminated it stays terminated; a new run needs a new pipeline.
///
/// [`step`]: DetectionPipeline::step
/// [`run`]: DetectionPipeline::run
pub struct DetectionPipeline {
    capture: Box<dyn CaptureSource>,
    detector: Box<dyn FaceDetector>,
    emitter: Box<dyn Emitter>,
    renderer: Option<Box<dyn PreviewRenderer>>,
    logger: Box<dyn PipelineLogger>,
    grayscale: GrayFrame,
    state: PipelineState,
    summary: RunSummary,
}

impl DetectionPipeline {
    /// Requests the configured resolution, reads one frame to learn the
    /// real frame size, allocates the grayscale buffer, then loads the
    /// detector from `config.model_path`.
    ///
    /// The sizing frame is not run through detection. `renderer` is only
    /// kept when `config.preview` is set.
    pub fn init<L>(
        config: Config,
        mut capture: Box<dyn CaptureSource>,
        load_detector: L,
        emitter: Box<dyn Emitter>,
        renderer: Option<Box<dyn PreviewRenderer>>,
        mut logger: Box<dyn PipelineLogger>,
    ) -> Result<Self, PipelineError>
    where
        L: FnOnce(&Path) -> Result<Box<dyn FaceDetector>, DetectionError>,
    {
        let requested = config.frame_size;
        capture.request_resolution(requested.width, requested.height)?;

        let first = capture
            .capture_frame()?
            .ok_or(PipelineError::NoInitialFrame)?;
        let (width, height) = first.size();
        logger.info(&format!(
            "Capturing at {width}x{height} (requested {requested})"
        ));
        let grayscale = GrayFrame::new(width, height);

        let detector = load_detector(config.model_path.as_path())?;
        let renderer = if config.preview { renderer } else { None };

        Ok(Self {
            capture,
            detector,
            emitter,
            renderer,
            logger,
            grayscale,
            state: PipelineState::Running,
            summary: RunSummary::default(),
        })
    }

    /// Working frame size, fixed from the first captured frame.
    pub fn frame_size(&self) -> (u32, u32) {
        self.grayscale.size()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Runs one full cycle. Returns `Terminated` at end of stream, and on
    /// every call after that without touching the capture source.
    ///
    /// Any error also terminates the pipeline.
    pub fn step(&mut self) -> Result<PipelineState, PipelineError> {
        if self.state == PipelineState::Terminated {
            return Ok(self.state);
        }
        match self.cycle() {
            Ok(state) => {
                self.state = state;
                if state == PipelineState::Terminated {
                    self.logger.info(&format!(
                        "Capture stream ended after {} frames",
                        self.summary.frames
                    ));
                    self.logger.summary();
                }
                Ok(state)
            }
            Err(e) => {
                self.state = PipelineState::Terminated;
                Err(e)
            }
        }
    }

    /// Loops until the capture source ends its stream.
    pub fn run(mut self) -> Result<RunSummary, PipelineError> {
        while self.step()? == PipelineState::Running {}
        Ok(self.summary)
    }

    fn cycle(&mut self) -> Result<PipelineState, PipelineError> {
        let started = Instant::now();
        let Some(mut frame) = self.capture.capture_frame()? else {
            return Ok(PipelineState::Terminated);
        };
        self.logger.timing("capture", elapsed_ms(started));

        if frame.size() != self.grayscale.size() {
            return Err(PipelineError::FrameSizeChanged {
                frame: frame.index(),
                expected: self.grayscale.size(),
                actual: frame.size(),
            });
        }

        let started = Instant::now();
        preprocess(&mut frame, &mut self.grayscale);
        self.logger.timing("preprocess", elapsed_ms(started));

        let started = Instant::now();
        let candidates = self.detector.detect(&self.grayscale)?;
        self.logger.timing("detect", elapsed_ms(started));
        self.logger.metric("candidates", candidates.len() as f64);

        let started = Instant::now();
        let faces = filter_candidates(&candidates, EMIT_MIN_NEIGHBORS);
        self.emit(&faces);
        self.logger.timing("emit", elapsed_ms(started));
        self.logger.metric("faces", faces.len() as f64);

        if let Some(renderer) = self.renderer.as_mut() {
            let started = Instant::now();
            let markers: Vec<FaceMarker> = faces.iter().map(FaceMarker::from_candidate).collect();
            renderer.render(&frame, &markers)?;
            renderer.pump_events(PREVIEW_WAIT_MS)?;
            self.logger.timing("render", elapsed_ms(started));
        }

        self.summary.frames += 1;
        self.logger.progress(self.summary.frames);
        Ok(PipelineState::Running)
    }

    /// One datagram per face. A failed send is logged and dropped.
    fn emit(&mut self, faces: &[FaceCandidate]) {
        for face in faces {
            match self.emitter.send(&Packet::from_candidate(face)) {
                Ok(()) => self.summary.packets_sent += 1,
                Err(e) => {
                    self.logger.warn(&e.to_string());
                    self.summary.send_failures += 1;
                }
            }
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_candidate::DetectionResult;
    use crate::emission::domain::emitter::EmitError;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::config::FrameSize;
    use crate::shared::frame::Frame;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubCapture {
        frames: VecDeque<Frame>,
        requested: Arc<Mutex<Option<(u32, u32)>>>,
        reads: Arc<Mutex<usize>>,
    }

    impl StubCapture {
        fn new(frames: Vec<Frame>) -> Self {
            Self {
                frames: frames.into(),
                requested: Arc::new(Mutex::new(None)),
                reads: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl CaptureSource for StubCapture {
        fn request_resolution(&mut self, width: u32, height: u32) -> Result<(), CaptureError> {
            *self.requested.lock().unwrap() = Some((width, height));
            Ok(())
        }

        fn capture_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
            *self.reads.lock().unwrap() += 1;
            Ok(self.frames.pop_front())
        }
    }

    struct StubDetector {
        results: VecDeque<DetectionResult>,
        seen: Arc<Mutex<Vec<GrayFrame>>>,
    }

    impl StubDetector {
        fn new(results: Vec<DetectionResult>) -> Self {
            Self {
                results: results.into(),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, frame: &GrayFrame) -> Result<DetectionResult, DetectionError> {
            self.seen.lock().unwrap().push(frame.clone());
            Ok(self.results.pop_front().unwrap_or_default())
        }
    }

    struct RecordingEmitter {
        sent: Arc<Mutex<Vec<String>>>,
        failures_left: usize,
    }

    impl RecordingEmitter {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                failures_left: 0,
            }
        }

        fn failing(times: usize) -> Self {
            Self {
                failures_left: times,
                ..Self::new()
            }
        }
    }

    impl Emitter for RecordingEmitter {
        fn send(&mut self, packet: &Packet) -> Result<(), EmitError> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(EmitError::Send {
                    destination: "127.0.0.1:45454".parse().unwrap(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "network down"),
                });
            }
            self.sent.lock().unwrap().push(packet.to_wire());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        rendered: Arc<Mutex<Vec<(Vec<u8>, Vec<FaceMarker>)>>>,
        waits: Arc<Mutex<Vec<u32>>>,
    }

    impl PreviewRenderer for RecordingRenderer {
        fn render(&mut self, frame: &Frame, markers: &[FaceMarker]) -> Result<(), RenderError> {
            self.rendered
                .lock()
                .unwrap()
                .push((frame.data().to_vec(), markers.to_vec()));
            Ok(())
        }

        fn pump_events(&mut self, wait_ms: u32) -> Result<(), RenderError> {
            self.waits.lock().unwrap().push(wait_ms);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        warnings: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, _frames: usize) {}
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
        fn warn(&mut self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }
    }

    // --- Helpers ---

    fn frame(width: u32, height: u32, index: usize) -> Frame {
        Frame::new(
            vec![0u8; (width * height * 3) as usize],
            width,
            height,
            3,
            index,
        )
    }

    /// Sizing frame plus `n` loop frames, all `width`x`height`.
    fn frames(n: usize, width: u32, height: u32) -> Vec<Frame> {
        (0..=n).map(|i| frame(width, height, i)).collect()
    }

    fn face(x: i32, y: i32, w: i32, h: i32, neighbors: u32) -> FaceCandidate {
        FaceCandidate::new(x, y, w, h, neighbors)
    }

    fn boxed(
        detector: StubDetector,
    ) -> impl FnOnce(&Path) -> Result<Box<dyn FaceDetector>, DetectionError> {
        move |_| Ok(Box::new(detector) as Box<dyn FaceDetector>)
    }

    fn pipeline(
        capture: StubCapture,
        detector: StubDetector,
        emitter: RecordingEmitter,
    ) -> DetectionPipeline {
        DetectionPipeline::init(
            Config::default(),
            Box::new(capture),
            boxed(detector),
            Box::new(emitter),
            None,
            Box::new(NullPipelineLogger),
        )
        .unwrap()
    }

    fn run_and_collect(results: Vec<DetectionResult>) -> Vec<String> {
        let n = results.len();
        let emitter = RecordingEmitter::new();
        let sent = emitter.sent.clone();
        pipeline(
            StubCapture::new(frames(n, 32, 24)),
            StubDetector::new(results),
            emitter,
        )
        .run()
        .unwrap();
        let packets = sent.lock().unwrap().clone();
        packets
    }

    // --- INIT ---

    #[test]
    fn test_init_fixes_buffer_to_actual_first_frame_size() {
        let capture = StubCapture::new(frames(0, 64, 48));
        let requested = capture.requested.clone();
        let config = Config {
            frame_size: FrameSize::new(640, 480),
            ..Config::default()
        };

        let pipeline = DetectionPipeline::init(
            config,
            Box::new(capture),
            boxed(StubDetector::new(vec![])),
            Box::new(RecordingEmitter::new()),
            None,
            Box::new(NullPipelineLogger),
        )
        .unwrap();

        assert_eq!(*requested.lock().unwrap(), Some((640, 480)));
        assert_eq!(pipeline.frame_size(), (64, 48));
        assert_eq!(pipeline.state(), PipelineState::Running);
    }

    #[test]
    fn test_init_without_any_frame_fails() {
        let result = DetectionPipeline::init(
            Config::default(),
            Box::new(StubCapture::new(vec![])),
            boxed(StubDetector::new(vec![])),
            Box::new(RecordingEmitter::new()),
            None,
            Box::new(NullPipelineLogger),
        );
        assert!(matches!(result, Err(PipelineError::NoInitialFrame)));
    }

    #[test]
    fn test_init_loads_detector_from_config_path() {
        let config = Config {
            model_path: PathBuf::from("/models/custom.xml"),
            ..Config::default()
        };
        let loaded_from = Arc::new(Mutex::new(None));
        let record = loaded_from.clone();

        let result = DetectionPipeline::init(
            config,
            Box::new(StubCapture::new(frames(0, 8, 8))),
            move |path: &Path| {
                *record.lock().unwrap() = Some(path.to_path_buf());
                Err(DetectionError::ModelLoad {
                    path: path.to_path_buf(),
                    reason: "file does not exist".to_string(),
                })
            },
            Box::new(RecordingEmitter::new()),
            None,
            Box::new(NullPipelineLogger),
        );

        assert!(matches!(
            result,
            Err(PipelineError::Detection(DetectionError::ModelLoad { .. }))
        ));
        assert_eq!(
            *loaded_from.lock().unwrap(),
            Some(PathBuf::from("/models/custom.xml"))
        );
    }

    #[test]
    fn test_sizing_frame_is_not_detected() {
        let detector = StubDetector::new(vec![]);
        let seen = detector.seen.clone();
        pipeline(
            StubCapture::new(frames(1, 8, 8)),
            detector,
            RecordingEmitter::new(),
        )
        .run()
        .unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    // --- FILTER_EMIT ---

    #[test]
    fn test_no_candidates_emits_nothing() {
        assert!(run_and_collect(vec![vec![]]).is_empty());
    }

    #[test]
    fn test_neighbor_threshold_is_strict() {
        let sent = run_and_collect(vec![vec![
            face(0, 0, 10, 10, 10),
            face(50, 50, 10, 10, 11),
        ]]);
        assert_eq!(sent, vec!["55 55 10 10"]);
    }

    #[test]
    fn test_reference_box_packet() {
        let sent = run_and_collect(vec![vec![face(10, 10, 20, 30, 11)]]);
        assert_eq!(sent, vec!["20 25 20 30"]);
    }

    #[test]
    fn test_multiple_faces_are_separate_packets_in_detector_order() {
        let sent = run_and_collect(vec![vec![
            face(100, 0, 20, 20, 30),
            face(0, 0, 40, 40, 12),
        ]]);
        assert_eq!(sent, vec!["110 10 20 20", "20 20 40 40"]);
    }

    #[test]
    fn test_no_state_carries_between_frames() {
        let sent = run_and_collect(vec![
            vec![face(10, 10, 20, 30, 11)],
            vec![],
            vec![face(0, 0, 4, 4, 20)],
        ]);
        assert_eq!(sent, vec!["20 25 20 30", "2 2 4 4"]);
    }

    #[test]
    fn test_send_failure_is_not_fatal() {
        let emitter = RecordingEmitter::failing(1);
        let sent = emitter.sent.clone();
        let summary = pipeline(
            StubCapture::new(frames(2, 8, 8)),
            StubDetector::new(vec![
                vec![face(0, 0, 2, 2, 11), face(4, 4, 2, 2, 11)],
                vec![face(2, 2, 2, 2, 11)],
            ]),
            emitter,
        )
        .run()
        .unwrap();

        assert_eq!(*sent.lock().unwrap(), vec!["5 5 2 2", "3 3 2 2"]);
        assert_eq!(
            summary,
            RunSummary {
                frames: 2,
                packets_sent: 2,
                send_failures: 1,
            }
        );
    }

    #[test]
    fn test_send_failure_is_reported_through_logger() {
        let logger = RecordingLogger::default();
        let warnings = logger.warnings.clone();

        DetectionPipeline::init(
            Config::default(),
            Box::new(StubCapture::new(frames(1, 8, 8))),
            boxed(StubDetector::new(vec![vec![
                face(0, 0, 2, 2, 11),
                face(4, 4, 2, 2, 11),
            ]])),
            Box::new(RecordingEmitter::failing(1)),
            None,
            Box::new(logger),
        )
        .unwrap()
        .run()
        .unwrap();

        let warnings = warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("network down"));
    }

    // --- PREPROCESS ---

    #[test]
    fn test_detector_sees_mirrored_equalized_grayscale() {
        let sizing = frame(2, 1, 0);
        let mut data = vec![0u8; 6];
        data[3..].copy_from_slice(&[255, 255, 255]); // right pixel white
        let live = Frame::new(data, 2, 1, 3, 1);

        let detector = StubDetector::new(vec![]);
        let seen = detector.seen.clone();
        pipeline(
            StubCapture::new(vec![sizing, live]),
            detector,
            RecordingEmitter::new(),
        )
        .run()
        .unwrap();

        assert_eq!(seen.lock().unwrap()[0].data(), &[255, 0]);
    }

    #[test]
    fn test_frame_size_change_is_fatal() {
        let mut pipeline = pipeline(
            StubCapture::new(vec![frame(8, 8, 0), frame(16, 8, 1)]),
            StubDetector::new(vec![]),
            RecordingEmitter::new(),
        );
        let err = pipeline.step().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FrameSizeChanged {
                frame: 1,
                expected: (8, 8),
                actual: (16, 8),
            }
        ));
        assert_eq!(pipeline.state(), PipelineState::Terminated);
    }

    // --- RENDER ---

    #[test]
    fn test_preview_draws_markers_and_pumps_events() {
        let renderer = RecordingRenderer::default();
        let rendered = renderer.rendered.clone();
        let waits = renderer.waits.clone();
        let config = Config {
            preview: true,
            ..Config::default()
        };

        DetectionPipeline::init(
            config,
            Box::new(StubCapture::new(frames(1, 8, 8))),
            boxed(StubDetector::new(vec![vec![
                face(10, 10, 20, 30, 11),
                face(0, 0, 8, 8, 3),
            ]])),
            Box::new(RecordingEmitter::new()),
            Some(Box::new(renderer)),
            Box::new(NullPipelineLogger),
        )
        .unwrap()
        .run()
        .unwrap();

        let rendered = rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(
            rendered[0].1,
            vec![FaceMarker {
                center: (20, 25),
                radius: 12,
            }]
        );
        assert_eq!(*waits.lock().unwrap(), vec![10]);
    }

    #[test]
    fn test_renderer_unused_when_preview_disabled() {
        let renderer = RecordingRenderer::default();
        let rendered = renderer.rendered.clone();

        DetectionPipeline::init(
            Config::default(),
            Box::new(StubCapture::new(frames(2, 8, 8))),
            boxed(StubDetector::new(vec![])),
            Box::new(RecordingEmitter::new()),
            Some(Box::new(renderer)),
            Box::new(NullPipelineLogger),
        )
        .unwrap()
        .run()
        .unwrap();

        assert!(rendered.lock().unwrap().is_empty());
    }

    // --- Termination ---

    #[test]
    fn test_end_of_stream_terminates_on_first_missing_frame() {
        let capture = StubCapture::new(frames(0, 8, 8));
        let reads = capture.reads.clone();
        let mut pipeline = pipeline(capture, StubDetector::new(vec![]), RecordingEmitter::new());

        assert_eq!(pipeline.step().unwrap(), PipelineState::Terminated);
        assert_eq!(pipeline.summary().frames, 0);
        let reads_at_end = *reads.lock().unwrap();

        assert_eq!(pipeline.step().unwrap(), PipelineState::Terminated);
        assert_eq!(*reads.lock().unwrap(), reads_at_end);
    }

    #[test]
    fn test_run_counts_processed_frames() {
        let summary = pipeline(
            StubCapture::new(frames(3, 8, 8)),
            StubDetector::new(vec![]),
            RecordingEmitter::new(),
        )
        .run()
        .unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.packets_sent, 0);
    }
}
