//! Canonical Huffman coding over dense 256-symbol alphabets.
//!
//! Only the table of code lengths is stored in a file. Every symbol of the
//! alphabet is a leaf of the merge tree, whether or not it occurs, so every
//! entry in a table built here is at least one bit long and the code is
//! always complete.

use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    io::{self, Read, Write},
};

use byteorder::{ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::{
    binio::{BitReader, BitWriter},
    error::{Error, Result},
};

/// Number of symbols in every alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// Longest code that can be encoded or decoded.
pub const MAX_CODE_LENGTH: usize = 64;

/// One code length per symbol, indexed by [`Symbol::index`]. A length of 0
/// means the symbol has no code.
pub type LengthTable = [u8; ALPHABET_SIZE];

/// A value from an 8-bit alphabet.
pub trait Symbol: Copy {
    /// Position of the symbol in a [`LengthTable`].
    fn index(self) -> u8;

    fn from_index(index: u8) -> Self;
}

impl Symbol for u8 {
    fn index(self) -> u8 {
        self
    }

    fn from_index(index: u8) -> Self {
        index
    }
}

impl Symbol for i8 {
    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Self {
        index as i8
    }
}

/// Huffman code: (code bits, length in bits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// The code bits, right-aligned.
    pub code: u64,
    /// Number of bits in the code.
    pub length: u8,
}

/// Count how often each symbol of the alphabet occurs.
pub fn frequencies<S: Symbol>(symbols: &[S]) -> [u64; ALPHABET_SIZE] {
    let mut counts = [0u64; ALPHABET_SIZE];
    for symbol in symbols {
        counts[symbol.index() as usize] += 1;
    }
    counts
}

/// Build the code length of every symbol from its frequency.
///
/// The two lowest-frequency nodes are merged until one root is left. Nodes
/// of equal frequency are taken in creation order: leaves first by
/// ascending symbol index, then merged nodes in the order they were made.
/// This makes the table a pure function of the frequencies.
pub fn build_lengths(frequencies: &[u64; ALPHABET_SIZE]) -> LengthTable {
    // parents[node] is the merged node it became a child of
    let mut parents: Vec<usize> = vec![usize::MAX; ALPHABET_SIZE];

    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = frequencies
        .iter()
        .enumerate()
        .map(|(symbol, &freq)| Reverse((freq, symbol)))
        .collect();

    while let (Some(Reverse((left_freq, left))), Some(Reverse((right_freq, right)))) =
        (heap.pop(), heap.pop())
    {
        let parent = parents.len();
        parents.push(usize::MAX);
        parents[left] = parent;
        parents[right] = parent;

        heap.push(Reverse((left_freq + right_freq, parent)));
    }

    let mut lengths = [0u8; ALPHABET_SIZE];
    for (symbol, length) in lengths.iter_mut().enumerate() {
        let mut depth = 0u8;
        let mut node = symbol;
        while parents[node] != usize::MAX {
            node = parents[node];
            depth += 1;
        }
        *length = depth;
    }

    lengths
}

/// Build the length table for a sequence of symbols.
pub fn code_lengths<S: Symbol>(symbols: &[S]) -> LengthTable {
    build_lengths(&frequencies(symbols))
}

/// Codes assigned canonically from a [`LengthTable`], usable for both
/// encoding and decoding.
pub struct CodeTable {
    codes: [HuffmanCode; ALPHABET_SIZE],

    /// Symbol indices sorted by (length, index).
    sorted: Vec<u8>,

    /// Per length: first code, position of its symbol in `sorted`, number
    /// of codes.
    first_code: [u64; MAX_CODE_LENGTH + 1],
    first_position: [usize; MAX_CODE_LENGTH + 1],
    count: [usize; MAX_CODE_LENGTH + 1],

    max_length: usize,
}

impl CodeTable {
    /// Assign canonical codes. Symbols are ordered by length then index, the
    /// first receives the all-zero code and each following code is the
    /// previous one plus one, shifted left when the length grows.
    pub fn from_lengths(lengths: &LengthTable) -> Result<Self> {
        if let Some(&too_long) = lengths.iter().find(|&&l| l as usize > MAX_CODE_LENGTH) {
            return Err(Error::InvalidCodeLengths(format!(
                "code length {too_long} is longer than {MAX_CODE_LENGTH} bits"
            )));
        }

        let mut sorted: Vec<u8> = (0..=u8::MAX).filter(|&s| lengths[s as usize] > 0).collect();
        sorted.sort_by_key(|&s| (lengths[s as usize], s));

        let mut table = CodeTable {
            codes: [HuffmanCode::default(); ALPHABET_SIZE],
            sorted,
            first_code: [0; MAX_CODE_LENGTH + 1],
            first_position: [0; MAX_CODE_LENGTH + 1],
            count: [0; MAX_CODE_LENGTH + 1],
            max_length: 0,
        };

        // Widened so that an over-subscribed table is detected rather than
        // wrapping around at 64 bits.
        let mut code: u128 = 0;
        let mut previous_length = 0usize;
        for (position, &symbol) in table.sorted.iter().enumerate() {
            let length = lengths[symbol as usize] as usize;

            if position > 0 {
                code = (code + 1) << (length - previous_length);
            }
            if code >> length != 0 {
                return Err(Error::InvalidCodeLengths(
                    "lengths are over-subscribed".to_string(),
                ));
            }

            if table.count[length] == 0 {
                table.first_code[length] = code as u64;
                table.first_position[length] = position;
            }
            table.count[length] += 1;

            table.codes[symbol as usize] = HuffmanCode {
                code: code as u64,
                length: length as u8,
            };

            previous_length = length;
        }
        table.max_length = previous_length;

        Ok(table)
    }

    pub fn code<S: Symbol>(&self, symbol: S) -> HuffmanCode {
        self.codes[symbol.index() as usize]
    }

    /// Write the code of every symbol, most significant bit first.
    pub fn encode<S: Symbol, O: Write + WriteBytesExt>(
        &self,
        symbols: &[S],
        writer: &mut BitWriter<O>,
    ) -> io::Result<()> {
        for &symbol in symbols {
            let HuffmanCode { code, length } = self.code(symbol);
            debug_assert!(length > 0, "symbol {} has no code", symbol.index());

            writer.write_code(code, length as usize)?;
        }

        Ok(())
    }

    /// Read bits one at a time until they form a complete code.
    pub fn decode_symbol<S: Symbol, I: Read + ReadBytesExt>(
        &self,
        reader: &mut BitReader<I>,
    ) -> Result<S> {
        let mut code = 0u64;
        for length in 1..=self.max_length {
            code = (code << 1) | reader.read_bit()? as u64;

            let offset = code.wrapping_sub(self.first_code[length]);
            if code >= self.first_code[length] && (offset as usize) < self.count[length] {
                let position = self.first_position[length] + offset as usize;
                return Ok(S::from_index(self.sorted[position]));
            }
        }

        Err(Error::InvalidCode)
    }
}

/// Huffman code a symbol sequence into `output`, padded to a whole byte.
///
/// Returns the length table needed to decode it and the number of bytes
/// written.
pub fn encode<S: Symbol, O: Write + WriteBytesExt>(
    symbols: &[S],
    output: &mut O,
) -> Result<(LengthTable, usize)> {
    let lengths = code_lengths(symbols);
    let table = CodeTable::from_lengths(&lengths)?;

    let mut writer = BitWriter::new(output);
    table.encode(symbols, &mut writer)?;
    let size = writer.flush()?;

    trace!(
        symbols = symbols.len(),
        bytes = size,
        longest = table.max_length,
        "huffman coded stream"
    );

    Ok((lengths, size))
}

/// Decode exactly `count` symbols. The input is left at the byte boundary
/// following the last symbol.
pub fn decode<S: Symbol, I: Read + ReadBytesExt>(
    lengths: &LengthTable,
    input: &mut I,
    count: usize,
) -> Result<Vec<S>> {
    let table = CodeTable::from_lengths(lengths)?;
    let mut reader = BitReader::new(input);

    (0..count).map(|_| table.decode_symbol(&mut reader)).collect()
}
