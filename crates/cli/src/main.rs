use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facestream_core::capture::infrastructure::opencv_camera::OpenCvCamera;
use facestream_core::detection::infrastructure::detector_factory::load_face_detector;
use facestream_core::emission::infrastructure::udp_emitter::UdpEmitter;
use facestream_core::pipeline::detection_pipeline::{DetectionPipeline, RunSummary};
use facestream_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facestream_core::preview::domain::preview_renderer::PreviewRenderer;
use facestream_core::preview::infrastructure::opencv_window::OpenCvWindow;
use facestream_core::shared::config::{Config, FrameSize};
use facestream_core::shared::constants::{
    CASCADE_MODEL_NAME, DEFAULT_DESTINATION_IP, DEFAULT_DESTINATION_PORT, DEFAULT_DEVICE_INDEX,
    PREVIEW_WINDOW_NAME,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// Detects faces on a camera feed and sends their position and size as
/// UDP packets ("<center_x> <center_y> <width> <height>").
#[derive(Parser, Debug)]
#[command(name = "facestream", version)]
struct Cli {
    /// Open a window with the mirrored video preview.
    #[arg(short = 'v', long = "video", visible_alias = "view")]
    video: bool,

    /// Destination address for face packets.
    #[arg(short = 'o', long = "ip", default_value = DEFAULT_DESTINATION_IP)]
    ip: String,

    /// Destination UDP port.
    #[arg(short = 'p', long, default_value_t = DEFAULT_DESTINATION_PORT)]
    port: u16,

    /// Requested capture size as WIDTHxHEIGHT (the camera may pick another).
    #[arg(short = 's', long, default_value = "320x200")]
    size: FrameSize,

    /// Haar cascade file. The default is downloaded to the user cache if absent.
    #[arg(short = 'f', long = "file", default_value = CASCADE_MODEL_NAME)]
    file: PathBuf,

    /// Camera device index.
    #[arg(short = 'd', long, default_value_t = DEFAULT_DEVICE_INDEX)]
    device: u32,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            destination_ip: self.ip,
            destination_port: self.port,
            preview: self.video,
            frame_size: self.size,
            model_path: self.file,
            device_index: self.device,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            process::exit(EXIT_USAGE);
        }
        // --help / --version
        Err(e) => e.exit(),
    };

    let result = run(cli.into_config());
    match &result {
        Ok(summary) => log::info!(
            "Sent {} packets over {} frames ({} send failures)",
            summary.packets_sent,
            summary.frames,
            summary.send_failures
        ),
        Err(e) => eprintln!("Error: {e}"),
    }
    process::exit(exit_code(&result));
}

/// Any error that reaches `main` is fatal; usage errors never get this far.
fn exit_code<T>(result: &Result<T, Box<dyn Error>>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}

fn run(config: Config) -> Result<RunSummary, Box<dyn Error>> {
    let capture = OpenCvCamera::open(config.device_index)?;
    let emitter = UdpEmitter::connect(&config.destination())?;
    let renderer: Option<Box<dyn PreviewRenderer>> = if config.preview {
        Some(Box::new(OpenCvWindow::open(PREVIEW_WINDOW_NAME)?))
    } else {
        None
    };

    let pipeline = DetectionPipeline::init(
        config,
        Box::new(capture),
        |path: &Path| load_face_detector(path, Some(Box::new(download_progress))),
        Box::new(emitter),
        renderer,
        Box::new(StdoutPipelineLogger::default()),
    )?;
    Ok(pipeline.run()?)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading cascade model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading cascade model... {downloaded} bytes");
    }
}
