use ndarray::{Axis, Zip};

use crate::shared::frame::Frame;
use crate::shared::gray_frame::GrayFrame;

// BT.601 luma weights in 14-bit fixed point; they sum to 1 << 14.
const LUMA_B: u32 = 1868;
const LUMA_G: u32 = 9617;
const LUMA_R: u32 = 4899;
const LUMA_SHIFT: u32 = 14;

/// Full preprocessing for one frame: mirror in place, then grayscale and
/// equalize into the reused `gray` buffer.
///
/// `gray` must already have the frame's dimensions.
pub fn preprocess(frame: &mut Frame, gray: &mut GrayFrame) {
    mirror_horizontal(frame);
    to_grayscale(frame, gray);
    equalize_histogram(gray);
}

/// Flips the frame left-to-right so the preview behaves like a mirror.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width() as usize;
    let channels = frame.channels() as usize;
    if width < 2 {
        return;
    }
    for row in frame.data_mut().chunks_exact_mut(width * channels) {
        for x in 0..width / 2 {
            let left = x * channels;
            let right = (width - 1 - x) * channels;
            for c in 0..channels {
                row.swap(left + c, right + c);
            }
        }
    }
}

/// Writes the luma of a BGR frame into `gray`, overwriting every pixel.
pub fn to_grayscale(frame: &Frame, gray: &mut GrayFrame) {
    debug_assert_eq!(frame.size(), gray.size(), "gray buffer size mismatch");
    debug_assert_eq!(frame.channels(), 3, "expected a BGR frame");

    Zip::from(gray.as_ndarray_mut())
        .and(frame.as_ndarray().lanes(Axis(2)))
        .for_each(|out, px| {
            let luma = px[0] as u32 * LUMA_B
                + px[1] as u32 * LUMA_G
                + px[2] as u32 * LUMA_R
                + (1 << (LUMA_SHIFT - 1));
            *out = (luma >> LUMA_SHIFT) as u8;
        });
}

/// Spreads the intensity histogram across 0..=255 in place.
///
/// The darkest occupied level maps to 0 and the cumulative count drives the
/// rest. A single-level image is left unchanged.
pub fn equalize_histogram(gray: &mut GrayFrame) {
    let data = gray.data_mut();
    let total = data.len() as u32;

    let mut hist = [0u32; 256];
    for &v in data.iter() {
        hist[v as usize] += 1;
    }

    let Some(first) = hist.iter().position(|&count| count > 0) else {
        return;
    };
    if hist[first] == total {
        return;
    }

    let scale = 255.0 / (total - hist[first]) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0u32;
    for level in first + 1..256 {
        sum += hist[level];
        lut[level] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }

    for v in data.iter_mut() {
        *v = lut[*v as usize];
    }
}
