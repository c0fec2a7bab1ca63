use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::shared::constants::{
    CASCADE_MODEL_NAME, DEFAULT_DESTINATION_IP, DEFAULT_DESTINATION_PORT, DEFAULT_DEVICE_INDEX,
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid frame size '{0}', expected WIDTHxHEIGHT (e.g. 640x480)")]
    InvalidSize(String),
}

/// Requested capture resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
    }
}

impl FromStr for FrameSize {
    type Err = ConfigError;

    /// Parses `"WxH"`. Both sides must be positive integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidSize(s.to_string());
        let (w, h) = s.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.parse().map_err(|_| invalid())?;
        let height: u32 = h.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self::new(width, height))
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Immutable run parameters, built once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub destination_ip: String,
    pub destination_port: u16,
    pub preview: bool,
    pub frame_size: FrameSize,
    pub model_path: PathBuf,
    pub device_index: u32,
}

impl Config {
    /// `host:port` form used for address resolution and logging.
    pub fn destination(&self) -> String {
        if self.destination_ip.contains(':') {
            format!("[{}]:{}", self.destination_ip, self.destination_port)
        } else {
            format!("{}:{}", self.destination_ip, self.destination_port)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_ip: DEFAULT_DESTINATION_IP.to_string(),
            destination_port: DEFAULT_DESTINATION_PORT,
            preview: false,
            frame_size: FrameSize::default(),
            model_path: PathBuf::from(CASCADE_MODEL_NAME),
            device_index: DEFAULT_DEVICE_INDEX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_size() {
        assert_eq!("640x480".parse::<FrameSize>(), Ok(FrameSize::new(640, 480)));
    }

    #[rstest]
    #[case::missing_separator("640")]
    #[case::empty("")]
    #[case::missing_height("640x")]
    #[case::missing_width("x480")]
    #[case::three_parts("640x480x2")]
    #[case::non_numeric("wide x tall")]
    #[case::negative("-640x480")]
    #[case::zero_width("0x480")]
    #[case::zero_height("640x0")]
    #[case::wrong_separator("640*480")]
    fn test_parse_size_rejects_malformed(#[case] input: &str) {
        assert_eq!(
            input.parse::<FrameSize>(),
            Err(ConfigError::InvalidSize(input.to_string()))
        );
    }

    #[test]
    fn test_size_display_uses_cli_format() {
        let size = FrameSize::new(1280, 720);
        assert_eq!(size.to_string(), "1280x720");
        assert_eq!(size.to_string().parse::<FrameSize>(), Ok(size));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.destination_ip, "127.0.0.1");
        assert_eq!(config.destination_port, 45454);
        assert!(!config.preview);
        assert_eq!(config.frame_size, FrameSize::new(320, 200));
        assert_eq!(config.model_path, PathBuf::from("haarcascade_frontalface_alt.xml"));
        assert_eq!(config.device_index, 0);
    }

    #[rstest]
    #[case::ipv4("10.0.0.2", 9000, "10.0.0.2:9000")]
    #[case::hostname("localhost", 45454, "localhost:45454")]
    #[case::ipv6("::1", 45454, "[::1]:45454")]
    fn test_destination_formatting(#[case] ip: &str, #[case] port: u16, #[case] expected: &str) {
        let config = Config {
            destination_ip: ip.to_string(),
            destination_port: port,
            ..Config::default()
        };
        assert_eq!(config.destination(), expected);
    }
}
