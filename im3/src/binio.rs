use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Packs bits into bytes, least significant bit first.
pub struct BitWriter<'a, O: Write + WriteBytesExt> {
    output: &'a mut O,

    current_byte: u8,

    byte_offset: usize,
    bit_offset: usize,
}

impl<'a, O: Write + WriteBytesExt> BitWriter<'a, O> {
    pub fn new(output: &'a mut O) -> Self {
        Self {
            output,

            current_byte: 0,

            byte_offset: 0,
            bit_offset: 0,
        }
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.current_byte |= (bit as u8) << self.bit_offset;

        self.bit_offset += 1;
        if self.bit_offset == 8 {
            self.output.write_u8(self.current_byte)?;

            self.byte_offset += 1;
            self.bit_offset = 0;
            self.current_byte = 0;
        }

        Ok(())
    }

    /// Write the low `bit_len` bits of `code`, most significant bit first.
    pub fn write_code(&mut self, code: u64, bit_len: usize) -> io::Result<()> {
        if bit_len > 64 {
            panic!("Cannot write more than 64 bits at once");
        }

        for i in (0..bit_len).rev() {
            self.write_bit((code >> i) & 1 == 1)?;
        }

        Ok(())
    }

    /// Pad the current byte with zero bits and write it out, returning the
    /// total number of bytes written.
    pub fn flush(mut self) -> io::Result<usize> {
        if self.bit_offset > 0 {
            self.output.write_u8(self.current_byte)?;

            self.byte_offset += 1;
            self.bit_offset = 0;
            self.current_byte = 0;
        }

        Ok(self.byte_offset)
    }
}

/// Reads bits out of bytes, least significant bit first.
///
/// Bytes are pulled from the input only when their first bit is needed, so
/// dropping the reader leaves the input positioned at the next byte
/// boundary.
pub struct BitReader<'a, I: Read + ReadBytesExt> {
    input: &'a mut I,

    current_byte: u8,

    byte_offset: usize,
    bit_offset: usize,
}

impl<'a, I: Read + ReadBytesExt> BitReader<'a, I> {
    pub fn new(input: &'a mut I) -> Self {
        Self {
            input,

            current_byte: 0,

            byte_offset: 0,
            bit_offset: 8,
        }
    }

    /// Number of bytes pulled from the input so far.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_offset == 8 {
            self.current_byte = self.input.read_u8().map_err(|err| match err.kind() {
                io::ErrorKind::UnexpectedEof => Error::BitstreamExhausted,
                _ => Error::Io(err),
            })?;

            self.byte_offset += 1;
            self.bit_offset = 0;
        }

        let bit = (self.current_byte >> self.bit_offset) & 1 == 1;
        self.bit_offset += 1;

        Ok(bit)
    }
}
