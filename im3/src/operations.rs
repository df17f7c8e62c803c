//! Cosmetic per-pixel operations, applied before compression.

use crate::{
    color::{
        hsv_to_normalized_rgb, normalized_rgb_to_hsv, normalized_rgb_to_pixel,
        normalized_rgb_to_yuv, pixel_to_normalized_rgb, yuv_to_normalized_rgb, Rgb,
    },
    image::PixelImage,
};

/// Ordered dither threshold matrix, indexed `[y % 4][x % 4]`.
const DITHER_MATRIX: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelOperation {
    /// Scale the HSV value of each pixel by a factor, clamped to `[0, 1]`.
    Brighten(f64),

    /// Keep only the luma of each pixel.
    Grayscale,

    /// Reduce a grayscale image to black and white with a 4×4 ordered
    /// dither. Only the red channel is considered.
    OrderedDither,
}

impl PixelOperation {
    pub fn apply(&self, pixel: Rgb, x: u32, y: u32) -> Rgb {
        match *self {
            PixelOperation::Brighten(factor) => {
                let mut hsv = normalized_rgb_to_hsv(pixel_to_normalized_rgb(pixel));
                hsv.v = (hsv.v * factor).clamp(0.0, 1.0);

                normalized_rgb_to_pixel(hsv_to_normalized_rgb(hsv))
            }
            PixelOperation::Grayscale => {
                let mut yuv = normalized_rgb_to_yuv(pixel_to_normalized_rgb(pixel));
                yuv.u = 0.0;
                yuv.v = 0.0;

                normalized_rgb_to_pixel(yuv_to_normalized_rgb(yuv))
            }
            PixelOperation::OrderedDither => {
                let level = (pixel.r as f64 * 17.0 / 256.0) as u8;
                let threshold = DITHER_MATRIX[y as usize % 4][x as usize % 4];

                if level < threshold {
                    Rgb::new(0, 0, 0)
                } else {
                    Rgb::new(255, 255, 255)
                }
            }
        }
    }

    /// Apply the operation to every pixel of an image.
    pub fn apply_to<P: PixelImage + ?Sized>(&self, image: &mut P) {
        for y in 0..image.height() {
            for x in 0..image.width() {
                let pixel = image.get_pixel(x, y);
                image.set_pixel(x, y, self.apply(pixel, x, y));
            }
        }
    }
}
