//! The pixel-addressable image the codec reads from and writes into.

use crate::color::Rgb;

/// Anything the codec can read pixels from or write pixels to.
///
/// Coordinates are always within `0..width()` and `0..height()`.
pub trait PixelImage {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn get_pixel(&self, x: u32, y: u32) -> Rgb;

    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb);
}

/// An in-memory 24-bit RGB image, rows stored top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        }
    }

    /// Create an image filled with a single color.
    pub fn filled(width: u32, height: u32, pixel: Rgb) -> Self {
        let data = [pixel.r, pixel.g, pixel.b].repeat(width as usize * height as usize);

        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap packed RGB8 data. Returns `None` if the length does not match
    /// the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 3 {
            return None;
        }

        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Packed RGB8 data.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside of {}×{} image",
            self.width,
            self.height
        );

        (y as usize * self.width as usize + x as usize) * 3
    }
}

impl PixelImage for Bitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        let i = self.offset(x, y);
        Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    fn set_pixel(&mut self, x: u32, y: u32, pixel: Rgb) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&[pixel.r, pixel.g, pixel.b]);
    }
}
