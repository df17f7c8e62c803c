//! Difference coding of DC coefficients and zigzag run-length coding of AC
//! coefficients.

use crate::{
    compression::dct::{Block, BLOCK_LEN},
    error::{Error, Result},
};

/// Number of AC coefficients in a block.
pub const AC_LEN: usize = BLOCK_LEN - 1;

/// Row-major index of each AC coefficient in zigzag order. The DC
/// coefficient at index 0 is not part of the traversal.
pub const ZIGZAG: [usize; AC_LEN] = [
         1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// A run of zero coefficients followed by one nonzero coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcPair {
    pub run: u8,
    pub value: i8,
}

impl AcPair {
    /// End of block marker. A real pair never carries a zero value.
    pub const EOB: AcPair = AcPair { run: 0, value: 0 };

    pub fn is_eob(&self) -> bool {
        *self == Self::EOB
    }
}

/// The three symbol streams of a single plane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodedPlane {
    /// One DC difference per block.
    pub dc: Vec<i8>,

    /// Zero-run lengths of the AC pairs, EOB markers included.
    pub runs: Vec<u8>,

    /// Values of the AC pairs, EOB markers included.
    pub values: Vec<i8>,
}

impl CodedPlane {
    pub fn pairs(&self) -> impl Iterator<Item = AcPair> + '_ {
        self.runs
            .iter()
            .zip(&self.values)
            .map(|(&run, &value)| AcPair { run, value })
    }
}

/// Code every block of a plane, in the order they are given.
pub fn encode_plane(blocks: &[Block<i8>]) -> CodedPlane {
    let mut coded = CodedPlane {
        dc: Vec::with_capacity(blocks.len()),
        ..Default::default()
    };

    let mut previous_dc = 0i8;
    for block in blocks {
        coded.dc.push(block[0].wrapping_sub(previous_dc));
        previous_dc = block[0];

        for pair in encode_ac(block) {
            coded.runs.push(pair.run);
            coded.values.push(pair.value);
        }
    }

    coded
}

/// Run-length code the AC coefficients of a block, ending with exactly one
/// [`AcPair::EOB`].
pub fn encode_ac(block: &Block<i8>) -> Vec<AcPair> {
    let mut pairs = Vec::new();

    let mut run = 0u8;
    for &index in &ZIGZAG {
        let value = block[index];
        if value == 0 {
            run += 1;
        } else {
            pairs.push(AcPair { run, value });
            run = 0;
        }
    }

    pairs.push(AcPair::EOB);
    pairs
}

/// Rebuild the blocks of a plane from its DC differences and a source of AC
/// pairs. One block is produced per DC difference.
pub fn decode_plane<F>(dc: &[i8], mut next_pair: F) -> Result<Vec<Block<i8>>>
where
    F: FnMut() -> Result<AcPair>,
{
    let mut blocks = Vec::with_capacity(dc.len());

    let mut previous_dc = 0i8;
    for &diff in dc {
        let mut block = [0i8; BLOCK_LEN];

        previous_dc = previous_dc.wrapping_add(diff);
        block[0] = previous_dc;
        decode_ac(&mut block, &mut next_pair)?;

        blocks.push(block);
    }

    Ok(blocks)
}

/// Replay AC pairs into a block until the end of block marker.
pub fn decode_ac<F>(block: &mut Block<i8>, mut next_pair: F) -> Result<()>
where
    F: FnMut() -> Result<AcPair>,
{
    let mut cursor = 0usize;
    loop {
        let pair = next_pair()?;
        if pair.is_eob() {
            return Ok(());
        }

        if pair.value == 0 {
            return Err(Error::MalformedCoefficients(format!(
                "pair with run {} has a zero value",
                pair.run
            )));
        }

        cursor += pair.run as usize;
        if cursor >= AC_LEN {
            return Err(Error::MalformedCoefficients(format!(
                "run of {} moves past the last AC coefficient",
                pair.run
            )));
        }

        block[ZIGZAG[cursor]] = pair.value;
        cursor += 1;
    }
}
