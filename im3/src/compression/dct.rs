use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::LazyLock;

/// Width and height of a block.
pub const BLOCK_DIM: usize = 8;

/// Number of samples in a block.
pub const BLOCK_LEN: usize = BLOCK_DIM * BLOCK_DIM;

/// An 8×8 block in row-major order, `block[row * 8 + col]`.
pub type Block<T> = [T; BLOCK_LEN];

/// A signed integer type a block can be stored as.
///
/// Conversions from `f64` round to the nearest integer and saturate at the
/// bounds of the type, so the same code serves every stage of the pipeline.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    const MIN: f64;
    const MAX: f64;

    /// Convert a value already rounded and clamped into range.
    fn from_clamped(value: f64) -> Self;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self {
        Self::from_clamped(value.round().clamp(Self::MIN, Self::MAX))
    }
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                const MIN: f64 = <$t>::MIN as f64;
                const MAX: f64 = <$t>::MAX as f64;

                fn from_clamped(value: f64) -> Self {
                    value as $t
                }

                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(i8, i16);

/// `COSINES[x][u] = cos((2x + 1)uπ / 16)`
static COSINES: LazyLock<[[f64; BLOCK_DIM]; BLOCK_DIM]> = LazyLock::new(|| {
    let mut table = [[0.0; BLOCK_DIM]; BLOCK_DIM];
    for (x, row) in table.iter_mut().enumerate() {
        for (u, value) in row.iter_mut().enumerate() {
            *value = f64::cos((2.0 * x as f64 + 1.0) * u as f64 * PI / 16.0);
        }
    }
    table
});

fn c(k: usize) -> f64 {
    if k == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Perform a Discrete Cosine Transform on a block of level-shifted samples.
pub fn dct<I: Sample, O: Sample>(input: &Block<I>) -> Block<O> {
    let cos = &*COSINES;

    let mut output = [O::default(); BLOCK_LEN];
    for v in 0..BLOCK_DIM {
        for u in 0..BLOCK_DIM {
            let mut sum = 0.0;
            for j in 0..BLOCK_DIM {
                for i in 0..BLOCK_DIM {
                    sum += input[j * BLOCK_DIM + i].to_f64() * cos[i][u] * cos[j][v];
                }
            }

            output[v * BLOCK_DIM + u] = O::from_f64(c(u) * c(v) / 4.0 * sum);
        }
    }

    output
}

/// Perform an inverse Discrete Cosine Transform, reconstructing samples
/// clamped to the range of `i8` before rounding.
pub fn idct<I: Sample, O: Sample>(input: &Block<I>) -> Block<O> {
    let cos = &*COSINES;

    let mut output = [O::default(); BLOCK_LEN];
    for j in 0..BLOCK_DIM {
        for i in 0..BLOCK_DIM {
            let mut sum = 0.0;
            for v in 0..BLOCK_DIM {
                for u in 0..BLOCK_DIM {
                    sum += c(u) * c(v)
                        * input[v * BLOCK_DIM + u].to_f64()
                        * cos[i][u]
                        * cos[j][v];
                }
            }

            let sample = (sum / 4.0).clamp(i8::MIN as f64, i8::MAX as f64);
            output[j * BLOCK_DIM + i] = O::from_f64(sample);
        }
    }

    output
}

/// JPEG 8x8 base luminance quantization matrix, used for every plane.
pub const QUANTIZATION_MATRIX: [u16; BLOCK_LEN] = [
    16, 11, 10, 16,  24,  40,  51,  61,
    12, 12, 14, 19,  26,  58,  60,  55,
    14, 13, 16, 24,  40,  57,  69,  56,
    14, 17, 22, 29,  51,  87,  80,  62,
    18, 22, 37, 56,  68, 109, 103,  77,
    24, 35, 55, 64,  81, 104, 113,  92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103,  99,
];

/// Quantize a block of coefficients, rounding to the nearest step.
pub fn quantize<I: Sample, O: Sample>(input: &Block<I>) -> Block<O> {
    let mut output = [O::default(); BLOCK_LEN];
    for ((out, v), q) in output.iter_mut().zip(input).zip(QUANTIZATION_MATRIX) {
        *out = O::from_f64(v.to_f64() / q as f64);
    }

    output
}

/// Dequantize a block, returning an approximation of the original
/// coefficients.
pub fn dequantize<I: Sample, O: Sample>(input: &Block<I>) -> Block<O> {
    let mut output = [O::default(); BLOCK_LEN];
    for ((out, v), q) in output.iter_mut().zip(input).zip(QUANTIZATION_MATRIX) {
        *out = O::from_f64(v.to_f64() * q as f64);
    }

    output
}
