//! IM3 is a small lossy image format. Images are converted to YUV, split
//! into 8×8 blocks, transformed with the DCT, quantized, run-length coded in
//! zigzag order and finally compressed with canonical Huffman codes.
//!
//! The format is fixed: one quantization matrix, no chroma subsampling, and
//! image dimensions that must be multiples of 8 up to 2040 pixels.
//!
//! # Example
//! ## Compressing an image and writing it out
//! ```no_run
//! use im3::{Bitmap, PixelImage, Rgb};
//!
//! let mut image = Bitmap::new(16, 16);
//! image.set_pixel(3, 4, Rgb::new(255, 0, 0));
//!
//! // Run the whole pipeline. Nothing is written yet.
//! let container = im3::compress(&image).expect("Image dimensions are valid");
//!
//! container.save("my_image.im3").expect("Could not save the image");
//! ```
//!
//! ## Reading an IM3 file
//! ```no_run
//! use std::fs::File;
//! use im3::Container;
//!
//! // Load it directly with the `open` function...
//! let container = im3::open("my_image.im3").expect("Could not open file");
//! let image = im3::decompress(&container).expect("Could not decode image");
//!
//! // ...or from something implementing Read.
//! let input_file = File::open("my_image.im3").expect("Could not open image file");
//! let container2 = Container::decode(&input_file);
//! ```

pub mod compression {
    pub mod coefficient;
    pub mod dct;
    pub mod huffman;
}
mod binio;

pub mod codec;
pub mod color;
pub mod container;
pub mod error;
pub mod header;
pub mod image;
pub mod operations;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use codec::{compress, decompress, decompress_into};

#[doc(inline)]
pub use container::{open, Container};

#[doc(inline)]
pub use color::Rgb;

#[doc(inline)]
pub use image::{Bitmap, PixelImage};

#[doc(inline)]
pub use operations::PixelOperation;

#[doc(inline)]
pub use error::{Error, Result};
