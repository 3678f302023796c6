//! # Pixel Accumulation
//!
//! Every visible light adds its color to the physical pixels it covers;
//! finalizing averages each pixel over its contributors and clears the
//! sums for the next frame.

use lightpath_shared::ColorRGB;

/// Per-pixel color sums plus the finalized frame.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    red: Vec<u32>,
    green: Vec<u32>,
    blue: Vec<u32>,
    div: Vec<u16>,
    frame: Vec<ColorRGB>,
}

impl PixelBuffer {
    /// Creates a black buffer of `len` physical pixels.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            red: vec![0; len],
            green: vec![0; len],
            blue: vec![0; len],
            div: vec![0; len],
            frame: vec![ColorRGB::BLACK; len],
        }
    }

    /// Number of physical pixels.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Whether the buffer has no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Adds one contribution; out-of-range pixels are ignored.
    pub fn add(&mut self, pixel: usize, color: ColorRGB) {
        if pixel >= self.frame.len() {
            return;
        }
        self.red[pixel] += u32::from(color.r);
        self.green[pixel] += u32::from(color.g);
        self.blue[pixel] += u32::from(color.b);
        self.div[pixel] = self.div[pixel].saturating_add(1);
    }

    /// Averages the sums into the frame and resets them.
    pub fn finalize(&mut self) {
        for pixel in 0..self.frame.len() {
            let div = u32::from(self.div[pixel]);
            self.frame[pixel] = if div == 0 {
                ColorRGB::BLACK
            } else {
                ColorRGB::new(
                    (self.red[pixel] / div).min(255) as u8,
                    (self.green[pixel] / div).min(255) as u8,
                    (self.blue[pixel] / div).min(255) as u8,
                )
            };
            self.red[pixel] = 0;
            self.green[pixel] = 0;
            self.blue[pixel] = 0;
            self.div[pixel] = 0;
        }
    }

    /// Finalized color of a physical pixel.
    #[must_use]
    pub fn get(&self, pixel: usize) -> Option<ColorRGB> {
        self.frame.get(pixel).copied()
    }

    /// The finalized frame.
    #[must_use]
    pub fn frame(&self) -> &[ColorRGB] {
        &self.frame
    }

    /// The finalized frame as packed RGB bytes.
    #[must_use]
    pub fn frame_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_contributors() {
        let mut buffer = PixelBuffer::new(4);
        buffer.add(1, ColorRGB::new(100, 0, 0));
        buffer.add(1, ColorRGB::new(200, 50, 0));
        buffer.add(9, ColorRGB::WHITE);
        buffer.finalize();

        assert_eq!(buffer.get(1), Some(ColorRGB::new(150, 25, 0)));
        assert_eq!(buffer.get(0), Some(ColorRGB::BLACK));
        assert_eq!(buffer.get(9), None);
    }

    #[test]
    fn test_finalize_resets_sums() {
        let mut buffer = PixelBuffer::new(2);
        buffer.add(0, ColorRGB::WHITE);
        buffer.finalize();
        buffer.finalize();
        assert_eq!(buffer.get(0), Some(ColorRGB::BLACK));
    }

    #[test]
    fn test_frame_bytes_are_packed_rgb() {
        let mut buffer = PixelBuffer::new(2);
        buffer.add(1, ColorRGB::new(1, 2, 3));
        buffer.finalize();
        assert_eq!(buffer.frame_bytes(), &[0, 0, 0, 1, 2, 3]);
    }
}
