use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Write},
    path::Path,
};

use byteorder::{ReadBytesExt, WriteBytesExt};
use tracing::debug;

use crate::{
    codec,
    compression::huffman,
    error::{Error, Result},
    header::{Header, PlaneHeader, FULL_HEADER_LEN, PLANE_COUNT},
};

/// The three byte-aligned payload segments of a plane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaneData {
    /// Huffman coded DC differences, one per block.
    pub dc: Vec<u8>,

    /// Huffman coded AC zero-run lengths.
    pub runs: Vec<u8>,

    /// Huffman coded AC values.
    pub values: Vec<u8>,
}

/// An IM3 file held in memory: the header, the code length tables of each
/// plane and the coded payload of each plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub header: Header,
    pub plane_headers: [PlaneHeader; PLANE_COUNT],
    pub planes: [PlaneData; PLANE_COUNT],
}

impl Container {
    /// Total size of the file in bytes.
    pub fn len(&self) -> usize {
        FULL_HEADER_LEN
            + self
                .planes
                .iter()
                .map(|p| p.dc.len() + p.runs.len() + p.values.len())
                .sum::<usize>()
    }

    /// Always false, the header alone is 2320 bytes.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Write the file into anything that implements [Write]
    pub fn encode<O: Write + WriteBytesExt>(&self, mut output: O) -> Result<()> {
        output.write_all(&self.header.to_bytes())?;

        for plane_header in &self.plane_headers {
            plane_header.write_into(&mut output)?;
        }

        for plane in &self.planes {
            output.write_all(&plane.dc)?;
            output.write_all(&plane.runs)?;
            output.write_all(&plane.values)?;
        }

        Ok(())
    }

    /// Read a file from anything that implements [Read]
    ///
    /// The end of each DC segment is not stored, so it is found by decoding
    /// one symbol per block. The input must end exactly where the last
    /// segment does, and every plane must decode to whole blocks that use
    /// up their segments.
    pub fn decode<I: Read + ReadBytesExt>(mut input: I) -> Result<Container> {
        let header = Header::read_from(&mut input)?;
        if header.block_count() == 0 {
            return Err(Error::InvalidDimensions {
                width: header.width(),
                height: header.height(),
            });
        }

        let mut plane_headers = [PlaneHeader::default(); PLANE_COUNT];
        for plane_header in plane_headers.iter_mut() {
            *plane_header = PlaneHeader::read_from(&mut input)?;
        }

        let mut payload = Vec::new();
        input.read_to_end(&mut payload)?;
        let mut payload = Cursor::new(payload.as_slice());

        let mut planes: [PlaneData; PLANE_COUNT] = Default::default();
        for ((plane, plane_header), sizes) in planes
            .iter_mut()
            .zip(&plane_headers)
            .zip(&header.ac_sizes)
        {
            let start = payload.position() as usize;
            huffman::decode::<i8, _>(&plane_header.dc_lengths, &mut payload, header.block_count())
                .map_err(|err| match err {
                    Error::BitstreamExhausted => Error::Truncated,
                    err => err,
                })?;
            let end = payload.position() as usize;
            plane.dc = payload.get_ref()[start..end].to_vec();

            plane.runs = vec![0u8; sizes.runs as usize];
            payload.read_exact(&mut plane.runs)?;

            plane.values = vec![0u8; sizes.values as usize];
            payload.read_exact(&mut plane.values)?;
        }

        if (payload.position() as usize) < payload.get_ref().len() {
            return Err(Error::TrailingData);
        }

        for (plane_header, plane) in plane_headers.iter().zip(&planes) {
            codec::decode_plane(plane_header, plane, header.block_count())?;
        }

        debug!(
            blocks_wide = header.blocks_wide,
            blocks_high = header.blocks_high,
            payload_bytes = payload.get_ref().len(),
            "read IM3 container"
        );

        Ok(Container {
            header,
            plane_headers,
            planes,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.len());
        self.encode(&mut output)
            .expect("writing into a Vec cannot fail");
        output
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Container> {
        Self::decode(Cursor::new(bytes))
    }

    /// Write the file out to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut out_file = BufWriter::new(File::create(path.as_ref())?);
        self.encode(&mut out_file)?;
        out_file.flush()?;

        Ok(())
    }
}

/// Open an IM3 file from a path.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Container> {
    let input = BufReader::new(File::open(path.as_ref())?);

    Container::decode(input)
}
