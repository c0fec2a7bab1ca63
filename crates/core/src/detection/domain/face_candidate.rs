/// A face region reported by the detector for one frame.
///
/// `neighbors` is the number of raw detections the detector merged into
/// this box; it is the only confidence signal available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceCandidate {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub neighbors: u32,
}

impl FaceCandidate {
    pub fn new(x: i32, y: i32, width: i32, height: i32, neighbors: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            neighbors,
        }
    }

    /// Broadcast center: `((2x + w) / 2, (2y + h) / 2)` in integer math.
    ///
    /// This is deliberately not `x + w / 2`; receivers expect the
    /// doubled-origin form on the wire.
    pub fn center(&self) -> (i32, i32) {
        (
            (2 * self.x + self.width) / 2,
            (2 * self.y + self.height) / 2,
        )
    }

    /// Preview overlay radius, `(w + h) / 4`.
    pub fn marker_radius(&self) -> i32 {
        (self.width + self.height) / 4
    }
}

/// Ordered candidates for one frame, in detector order.
pub type DetectionResult = Vec<FaceCandidate>;
