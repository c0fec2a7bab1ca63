pub const CASCADE_MODEL_NAME: &str = "haarcascade_frontalface_alt.xml";
pub const CASCADE_MODEL_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_alt.xml";

pub const DEFAULT_DESTINATION_IP: &str = "127.0.0.1";
pub const DEFAULT_DESTINATION_PORT: u16 = 45454;
pub const DEFAULT_FRAME_WIDTH: u32 = 320;
pub const DEFAULT_FRAME_HEIGHT: u32 = 200;
pub const DEFAULT_DEVICE_INDEX: u32 = 0;

/// Image pyramid step used by the cascade search.
pub const DETECT_SCALE_FACTOR: f64 = 1.2;
/// Neighbor pruning applied inside the cascade search.
pub const DETECT_MIN_NEIGHBORS: i32 = 2;

/// Candidates must have strictly more neighbors than this to be emitted.
pub const EMIT_MIN_NEIGHBORS: u32 = 10;

pub const PREVIEW_WINDOW_NAME: &str = "facestream";
/// UI event pump wait; doubles as the preview frame-rate limiter.
pub const PREVIEW_WAIT_MS: u32 = 10;
/// Overlay circle color in BGR order.
pub const PREVIEW_MARKER_COLOR: (u8, u8, u8) = (128, 255, 128);
pub const PREVIEW_MARKER_THICKNESS: i32 = 2;
