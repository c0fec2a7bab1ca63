//! Copies between OpenCV `Mat` buffers and the crate's owned frame types.
//!
//! Only infrastructure adapters touch `Mat`; everything above them works on
//! [`Frame`] and [`GrayFrame`].

use opencv::core::{Mat, Scalar, CV_8U, CV_8UC1, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

use crate::shared::frame::Frame;
use crate::shared::gray_frame::GrayFrame;

/// Copies a captured 8-bit image into a BGR [`Frame`].
///
/// Gray and BGRA captures are expanded/dropped to three channels so the
/// pipeline always sees BGR.
pub fn mat_to_frame(mat: &Mat, index: usize) -> opencv::Result<Frame> {
    if mat.depth() != CV_8U {
        return Err(opencv::Error::new(
            opencv::core::StsUnsupportedFormat,
            format!("expected 8-bit capture, got depth {}", mat.depth()),
        ));
    }

    let bgr = match mat.channels() {
        3 => None,
        1 => Some(convert(mat, imgproc::COLOR_GRAY2BGR)?),
        4 => Some(convert(mat, imgproc::COLOR_BGRA2BGR)?),
        n => {
            return Err(opencv::Error::new(
                opencv::core::StsUnsupportedFormat,
                format!("unsupported channel count {n}"),
            ))
        }
    };
    let src = bgr.as_ref().unwrap_or(mat);

    let owned;
    let src = if src.is_continuous() {
        src
    } else {
        owned = src.try_clone()?;
        &owned
    };

    Ok(Frame::new(
        src.data_bytes()?.to_vec(),
        src.cols() as u32,
        src.rows() as u32,
        3,
        index,
    ))
}

/// Writes `frame` into `mat`, reallocating only when the shape changed.
pub fn frame_into_mat(frame: &Frame, mat: &mut Mat) -> opencv::Result<()> {
    copy_into_mat(frame.data(), frame.height(), frame.width(), CV_8UC3, mat)
}

/// Writes `gray` into `mat`, reallocating only when the shape changed.
pub fn gray_into_mat(gray: &GrayFrame, mat: &mut Mat) -> opencv::Result<()> {
    copy_into_mat(gray.data(), gray.height(), gray.width(), CV_8UC1, mat)
}

fn copy_into_mat(data: &[u8], rows: u32, cols: u32, typ: i32, mat: &mut Mat) -> opencv::Result<()> {
    let (rows, cols) = (rows as i32, cols as i32);
    if mat.rows() != rows || mat.cols() != cols || mat.typ() != typ {
        *mat = Mat::new_rows_cols_with_default(rows, cols, typ, Scalar::all(0.0))?;
    }
    mat.data_bytes_mut()?.copy_from_slice(data);
    Ok(())
}

fn convert(mat: &Mat, code: i32) -> opencv::Result<Mat> {
    let mut out = Mat::default();
    imgproc::cvt_color(mat, &mut out, code, 0)?;
    Ok(out)
}
