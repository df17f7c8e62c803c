//! The compression pipeline, from pixels to a [`Container`] and back.

use std::io::Cursor;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

use crate::{
    binio::BitReader,
    color::{pixel_to_residuals, residuals_to_pixel},
    compression::{
        coefficient::{self, AcPair},
        dct::{dct, dequantize, idct, quantize, Block, BLOCK_DIM, BLOCK_LEN},
        huffman::{self, CodeTable},
    },
    container::{Container, PlaneData},
    error::{Error, Result},
    header::{AcSizes, Header, PlaneHeader, PLANE_COUNT, PLANE_NAMES},
    image::{Bitmap, PixelImage},
};

/// Residual samples of every block of a plane, in row-major block order.
type Plane = Vec<Block<i8>>;

/// Compress an image into an IM3 container.
///
/// Width and height must be multiples of 8, and at most 255 blocks each.
pub fn compress<P: PixelImage + ?Sized>(image: &P) -> Result<Container> {
    let (blocks_wide, blocks_high) = block_dimensions(image.width(), image.height())?;

    let planes = to_planes(image, blocks_wide as usize, blocks_high as usize);
    debug!(blocks_wide, blocks_high, "split image into planes");

    let mut header = Header {
        blocks_wide,
        blocks_high,
        ..Default::default()
    };
    let mut plane_headers = [PlaneHeader::default(); PLANE_COUNT];
    let mut plane_data: [PlaneData; PLANE_COUNT] = Default::default();

    for (i, plane) in planes.iter().enumerate() {
        // Blocks are independent until the DC differences are taken
        let quantized: Plane = plane
            .par_iter()
            .map(|block| {
                let coefficients: Block<i16> = dct(block);
                quantize(&coefficients)
            })
            .collect();

        let coded = coefficient::encode_plane(&quantized);

        let data = &mut plane_data[i];
        let (dc_lengths, dc_size) = huffman::encode(&coded.dc, &mut data.dc)?;
        let (run_lengths, run_size) = huffman::encode(&coded.runs, &mut data.runs)?;
        let (value_lengths, value_size) = huffman::encode(&coded.values, &mut data.values)?;

        plane_headers[i] = PlaneHeader {
            dc_lengths,
            run_lengths,
            value_lengths,
        };

        header.ac_sizes[i] = AcSizes {
            runs: segment_size(i, run_size)?,
            values: segment_size(i, value_size)?,
        };

        debug!(
            plane = %PLANE_NAMES[i],
            pairs = coded.runs.len(),
            dc_bytes = dc_size,
            run_bytes = run_size,
            value_bytes = value_size,
            "coded plane"
        );
    }

    Ok(Container {
        header,
        plane_headers,
        planes: plane_data,
    })
}

/// Decompress a container into a new [`Bitmap`].
pub fn decompress(container: &Container) -> Result<Bitmap> {
    let mut image = Bitmap::new(container.header.width(), container.header.height());
    decompress_into(container, &mut image)?;

    Ok(image)
}

/// Decompress a container into an existing image of the same size.
///
/// The whole container is decoded before the first pixel is written, so the
/// image is left untouched when an error is returned.
pub fn decompress_into<P: PixelImage + ?Sized>(container: &Container, image: &mut P) -> Result<()> {
    let header = &container.header;
    let expected = (header.width(), header.height());
    let actual = (image.width(), image.height());
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }

    let mut planes: [Plane; PLANE_COUNT] = Default::default();
    for (i, plane) in planes.iter_mut().enumerate() {
        let quantized = decode_plane(
            &container.plane_headers[i],
            &container.planes[i],
            header.block_count(),
        )?;

        *plane = quantized
            .par_iter()
            .map(|block| {
                let coefficients: Block<i16> = dequantize(block);
                idct(&coefficients)
            })
            .collect();
    }
    debug!(
        blocks_wide = header.blocks_wide,
        blocks_high = header.blocks_high,
        "decoded planes"
    );

    from_planes(&planes, header.blocks_wide as usize, image);

    Ok(())
}

fn block_dimensions(width: u32, height: u32) -> Result<(u8, u8)> {
    let invalid = Error::InvalidDimensions { width, height };

    if width == 0 || height == 0 || width % 8 != 0 || height % 8 != 0 {
        return Err(invalid);
    }

    match (u8::try_from(width / 8), u8::try_from(height / 8)) {
        (Ok(blocks_wide), Ok(blocks_high)) => Ok((blocks_wide, blocks_high)),
        _ => Err(invalid),
    }
}

fn segment_size(plane: usize, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::SegmentTooLarge {
        plane: PLANE_NAMES[plane],
        len,
    })
}

/// Convert every pixel into its Y, U and V residual samples, tiled into
/// blocks.
fn to_planes<P: PixelImage + ?Sized>(
    image: &P,
    blocks_wide: usize,
    blocks_high: usize,
) -> [Plane; PLANE_COUNT] {
    let mut planes: [Plane; PLANE_COUNT] =
        std::array::from_fn(|_| vec![[0i8; BLOCK_LEN]; blocks_wide * blocks_high]);

    for y in 0..image.height() as usize {
        for x in 0..image.width() as usize {
            let samples = pixel_to_residuals(image.get_pixel(x as u32, y as u32));

            let block = (y / BLOCK_DIM) * blocks_wide + x / BLOCK_DIM;
            let offset = (y % BLOCK_DIM) * BLOCK_DIM + x % BLOCK_DIM;
            for (plane, sample) in planes.iter_mut().zip(samples) {
                plane[block][offset] = sample;
            }
        }
    }

    planes
}

/// Write the pixels reconstructed from the residual planes into the image.
fn from_planes<P: PixelImage + ?Sized>(planes: &[Plane; PLANE_COUNT], blocks_wide: usize, image: &mut P) {
    for y in 0..image.height() as usize {
        for x in 0..image.width() as usize {
            let block = (y / BLOCK_DIM) * blocks_wide + x / BLOCK_DIM;
            let offset = (y % BLOCK_DIM) * BLOCK_DIM + x % BLOCK_DIM;

            let samples = [
                planes[0][block][offset],
                planes[1][block][offset],
                planes[2][block][offset],
            ];
            image.set_pixel(x as u32, y as u32, residuals_to_pixel(samples));
        }
    }
}

/// Decode the three streams of a plane back into quantized blocks.
pub(crate) fn decode_plane(
    plane_header: &PlaneHeader,
    data: &PlaneData,
    block_count: usize,
) -> Result<Plane> {
    let dc_table = CodeTable::from_lengths(&plane_header.dc_lengths)?;
    let run_table = CodeTable::from_lengths(&plane_header.run_lengths)?;
    let value_table = CodeTable::from_lengths(&plane_header.value_lengths)?;

    let mut dc_input = Cursor::new(data.dc.as_slice());
    let mut dc_reader = BitReader::new(&mut dc_input);
    let dc = (0..block_count)
        .map(|_| dc_table.decode_symbol(&mut dc_reader))
        .collect::<Result<Vec<i8>>>()?;
    ensure_consumed(dc_reader.byte_offset(), data.dc.len())?;

    let mut run_input = Cursor::new(data.runs.as_slice());
    let mut run_reader = BitReader::new(&mut run_input);
    let mut value_input = Cursor::new(data.values.as_slice());
    let mut value_reader = BitReader::new(&mut value_input);

    let blocks = coefficient::decode_plane(&dc, || {
        Ok(AcPair {
            run: run_table.decode_symbol(&mut run_reader)?,
            value: value_table.decode_symbol(&mut value_reader)?,
        })
    })?;

    ensure_consumed(run_reader.byte_offset(), data.runs.len())?;
    ensure_consumed(value_reader.byte_offset(), data.values.len())?;

    Ok(blocks)
}

/// A segment may only be longer than what was decoded by its final padding
/// bits, which never fill a whole byte.
fn ensure_consumed(read: usize, len: usize) -> Result<()> {
    if read < len {
        return Err(Error::TrailingData);
    }
    Ok(())
}
