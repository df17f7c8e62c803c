use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};

use crate::{
    compression::huffman::{LengthTable, ALPHABET_SIZE},
    error::{Error, Result},
};

/// Identifier at the start of every IM3 file.
pub const MAGIC: [u8; 2] = *b"IM";

/// Number of color planes, in Y, U, V order.
pub const PLANE_COUNT: usize = 3;

/// Names of the planes, for messages.
pub const PLANE_NAMES: [char; PLANE_COUNT] = ['Y', 'U', 'V'];

/// An IM3 file header. This must be included at the beginning of a valid
/// IM3 file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Identifier. Must be set to "IM".
    pub magic: [u8; 2],

    /// Width of the image in 8×8 blocks.
    pub blocks_wide: u8,

    /// Height of the image in 8×8 blocks.
    pub blocks_high: u8,

    /// Byte length of the AC run-length and AC value segments of each plane.
    pub ac_sizes: [AcSizes; PLANE_COUNT],
}

/// Byte lengths of the two AC segments of a plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcSizes {
    pub runs: u16,
    pub values: u16,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            blocks_wide: 0,
            blocks_high: 0,
            ac_sizes: [AcSizes::default(); PLANE_COUNT],
        }
    }
}

impl Header {
    pub const LEN: usize = 16;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];

        buf[..2].copy_from_slice(&self.magic);
        buf[2] = self.blocks_wide;
        buf[3] = self.blocks_high;

        for (i, sizes) in self.ac_sizes.iter().enumerate() {
            let offset = 4 + i * 4;
            buf[offset..offset + 2].copy_from_slice(&sizes.runs.to_le_bytes());
            buf[offset + 2..offset + 4].copy_from_slice(&sizes.values.to_le_bytes());
        }

        buf
    }

    pub fn read_from<T: Read + ReadBytesExt>(input: &mut T) -> Result<Self> {
        let mut magic = [0u8; 2];
        input.read_exact(&mut magic)?;

        if magic != MAGIC {
            return Err(Error::InvalidIdentifier(magic));
        }

        let blocks_wide = input.read_u8()?;
        let blocks_high = input.read_u8()?;

        let mut ac_sizes = [AcSizes::default(); PLANE_COUNT];
        for sizes in ac_sizes.iter_mut() {
            sizes.runs = input.read_u16::<LE>()?;
            sizes.values = input.read_u16::<LE>()?;
        }

        Ok(Header {
            magic,
            blocks_wide,
            blocks_high,
            ac_sizes,
        })
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.blocks_wide as u32 * 8
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.blocks_high as u32 * 8
    }

    /// Number of blocks in each plane.
    pub fn block_count(&self) -> usize {
        self.blocks_wide as usize * self.blocks_high as usize
    }
}

/// The code length tables of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneHeader {
    /// Lengths for the DC difference stream.
    pub dc_lengths: LengthTable,

    /// Lengths for the AC zero-run stream.
    pub run_lengths: LengthTable,

    /// Lengths for the AC value stream.
    pub value_lengths: LengthTable,
}

impl Default for PlaneHeader {
    fn default() -> Self {
        Self {
            dc_lengths: [0; ALPHABET_SIZE],
            run_lengths: [0; ALPHABET_SIZE],
            value_lengths: [0; ALPHABET_SIZE],
        }
    }
}

impl PlaneHeader {
    pub const LEN: usize = ALPHABET_SIZE * 3;

    pub fn write_into<T: WriteBytesExt + Write>(&self, output: &mut T) -> Result<usize> {
        output.write_all(&self.dc_lengths)?;
        output.write_all(&self.run_lengths)?;
        output.write_all(&self.value_lengths)?;

        Ok(Self::LEN)
    }

    pub fn read_from<T: Read + ReadBytesExt>(input: &mut T) -> Result<Self> {
        let mut header = PlaneHeader::default();

        input.read_exact(&mut header.dc_lengths)?;
        input.read_exact(&mut header.run_lengths)?;
        input.read_exact(&mut header.value_lengths)?;

        Ok(header)
    }
}

/// Size of the file header together with every plane header.
pub const FULL_HEADER_LEN: usize = Header::LEN + PlaneHeader::LEN * PLANE_COUNT;

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn header_layout() {
        let header = Header {
            blocks_wide: 2,
            blocks_high: 3,
            ac_sizes: [
                AcSizes { runs: 0x0102, values: 5 },
                AcSizes { runs: 6, values: 7 },
                AcSizes { runs: 8, values: 0xFFFF },
            ],
            ..Default::default()
        };

        assert_eq!(
            header.to_bytes(),
            [b'I', b'M', 2, 3, 0x02, 0x01, 5, 0, 6, 0, 7, 0, 8, 0, 0xFF, 0xFF]
        );

        let read = Header::read_from(&mut Cursor::new(header.to_bytes())).unwrap();
        assert_eq!(read, header);
        assert_eq!(read.width(), 16);
        assert_eq!(read.height(), 24);
        assert_eq!(read.block_count(), 6);
    }

    #[test]
    fn full_header_len() {
        assert_eq!(FULL_HEADER_LEN, 2320);
    }

    #[test]
    fn bad_magic() {
        let mut bytes = Header::default().to_bytes();
        bytes[1] = b'X';

        assert!(matches!(
            Header::read_from(&mut Cursor::new(bytes)),
            Err(Error::InvalidIdentifier([b'I', b'X']))
        ));
    }

    #[test]
    fn short_header() {
        let bytes = &Header::default().to_bytes()[..9];

        assert!(matches!(
            Header::read_from(&mut Cursor::new(bytes)),
            Err(Error::Truncated)
        ));
    }

    #[test]
    fn plane_header_order() {
        let mut plane = PlaneHeader::default();
        plane.dc_lengths[0] = 1;
        plane.run_lengths[1] = 2;
        plane.value_lengths[255] = 3;

        let mut output = Vec::new();
        assert_eq!(plane.write_into(&mut output).unwrap(), 768);
        assert_eq!(output[0], 1);
        assert_eq!(output[256 + 1], 2);
        assert_eq!(output[767], 3);

        let read = PlaneHeader::read_from(&mut Cursor::new(output)).unwrap();
        assert_eq!(read, plane);
    }
}
