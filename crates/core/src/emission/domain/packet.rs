use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::detection::domain::face_candidate::FaceCandidate;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PacketParseError {
    #[error("expected 4 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid integer field '{0}'")]
    InvalidField(String),
}

/// One face on the wire: `"<center_x> <center_y> <width> <height>"`.
///
/// One datagram carries exactly one packet. There is no framing, version
/// or sequence number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packet {
    pub center_x: i32,
    pub center_y: i32,
    pub width: i32,
    pub height: i32,
}

impl Packet {
    pub fn from_candidate(candidate: &FaceCandidate) -> Self {
        let (center_x, center_y) = candidate.center();
        Self {
            center_x,
            center_y,
            width: candidate.width,
            height: candidate.height,
        }
    }

    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.center_x, self.center_y, self.width, self.height
        )
    }
}

impl FromStr for Packet {
    type Err = PacketParseError;

    /// Receiver-side parsing: any whitespace between exactly four integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(PacketParseError::FieldCount(fields.len()));
        }
        let mut values = [0i32; 4];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .map_err(|_| PacketParseError::InvalidField(field.to_string()))?;
        }
        let [center_x, center_y, width, height] = values;
        Ok(Self {
            center_x,
            center_y,
            width,
            height,
        })
    }
}
