use ndarray::{ArrayView2, ArrayViewMut2};

/// Single-channel 8-bit working image fed to the detector.
///
/// Allocated once from the first captured frame and overwritten in place
/// every cycle; its dimensions never change after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayFrame {
    /// Zero-filled buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn from_data(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize,
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_ndarray(&self) -> ArrayView2<'_, u8> {
        ArrayView2::from_shape(self.shape(), &self.data)
            .expect("GrayFrame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut2<'_, u8> {
        ArrayViewMut2::from_shape(self.shape(), &mut self.data)
            .expect("GrayFrame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed_with_requested_size() {
        let gray = GrayFrame::new(4, 3);
        assert_eq!(gray.size(), (4, 3));
        assert_eq!(gray.data().len(), 12);
        assert!(gray.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_as_ndarray_is_row_major() {
        let gray = GrayFrame::from_data((0..6).collect(), 3, 2);
        let arr = gray.as_ndarray();
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 0]], 3);
        assert_eq!(arr[[0, 2]], 2);
    }
}
