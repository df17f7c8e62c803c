//! Conversions between 8-bit pixels and the normalized color spaces used by
//! the codec and the pixel operations.

/// An RGB pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// RGB scaled to `[0, 1]` per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Luma and the two color difference components.
///
/// `y` lies in `[0, 1]`, `u` in `[-U_RANGE, U_RANGE]` and `v` in
/// `[-V_RANGE, V_RANGE]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yuv {
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Largest magnitude of the U component, reached for pure blue and yellow.
pub const U_RANGE: f64 = 0.886;

/// Largest magnitude of the V component, reached for pure red and cyan.
pub const V_RANGE: f64 = 0.701;

const EPSILON: f64 = 1e-4;

fn approx_eq(x: f64, y: f64) -> bool {
    (x - y).abs() <= EPSILON
}

pub fn pixel_to_normalized_rgb(pixel: Rgb) -> NormalizedRgb {
    NormalizedRgb {
        r: pixel.r as f64 / 255.0,
        g: pixel.g as f64 / 255.0,
        b: pixel.b as f64 / 255.0,
    }
}

/// Scale back to 8 bits. Channels are clamped to `[0, 1]` and truncated.
pub fn normalized_rgb_to_pixel(rgb: NormalizedRgb) -> Rgb {
    let scale = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;

    Rgb {
        r: scale(rgb.r),
        g: scale(rgb.g),
        b: scale(rgb.b),
    }
}

pub fn normalized_rgb_to_yuv(rgb: NormalizedRgb) -> Yuv {
    let NormalizedRgb { r, g, b } = rgb;

    Yuv {
        y: 0.299 * r + 0.587 * g + 0.114 * b,
        u: -0.299 * r - 0.587 * g + 0.886 * b,
        v: 0.701 * r - 0.587 * g - 0.114 * b,
    }
}

pub fn yuv_to_normalized_rgb(yuv: Yuv) -> NormalizedRgb {
    let Yuv { y, u, v } = yuv;

    NormalizedRgb {
        r: y + v,
        g: y - 0.194 * u - 0.509 * v,
        b: y + u,
    }
}

pub fn normalized_rgb_to_hsv(rgb: NormalizedRgb) -> Hsv {
    let NormalizedRgb { r, g, b } = rgb;

    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let chroma = max - min;

    let sector = if approx_eq(chroma, 0.0) {
        0.0
    } else if approx_eq(r, max) {
        (g - b) / chroma + 6.0
    } else if approx_eq(g, max) {
        (b - r) / chroma + 2.0
    } else {
        (r - g) / chroma + 4.0
    };

    let s = if approx_eq(max, 0.0) { 0.0 } else { chroma / max };

    Hsv {
        h: (sector % 6.0) * 60.0,
        s,
        v: max,
    }
}

pub fn hsv_to_normalized_rgb(hsv: Hsv) -> NormalizedRgb {
    let primary = hsv.v * hsv.s;
    let sector = hsv.h / 60.0;
    let secondary = primary * (1.0 - ((sector % 2.0) - 1.0).abs());

    let (r, g, b) = match sector as i64 {
        0 => (primary, secondary, 0.0),
        1 => (secondary, primary, 0.0),
        2 => (0.0, primary, secondary),
        3 => (0.0, secondary, primary),
        4 => (secondary, 0.0, primary),
        _ => (primary, 0.0, secondary),
    };

    let m = hsv.v - primary;
    NormalizedRgb {
        r: r + m,
        g: g + m,
        b: b + m,
    }
}

/// Convert a pixel into its three level-shifted residual samples, in Y, U, V
/// order.
///
/// Each component is first mapped onto `[0, 1]` (chroma by its known range)
/// and then shifted down by 128 from the unsigned 8-bit range. The chroma
/// mapping is part of the file format: U and V are stored as
/// `round((c / (2 * range) + 0.5) * 255) - 128`.
pub fn pixel_to_residuals(pixel: Rgb) -> [i8; 3] {
    let yuv = normalized_rgb_to_yuv(pixel_to_normalized_rgb(pixel));

    [
        level_shift_down(yuv.y),
        level_shift_down(yuv.u / (2.0 * U_RANGE) + 0.5),
        level_shift_down(yuv.v / (2.0 * V_RANGE) + 0.5),
    ]
}

/// Inverse of [`pixel_to_residuals`], clamping each output channel.
pub fn residuals_to_pixel(samples: [i8; 3]) -> Rgb {
    let [y, u, v] = samples.map(level_shift_up);

    let yuv = Yuv {
        y,
        u: (u - 0.5) * 2.0 * U_RANGE,
        v: (v - 0.5) * 2.0 * V_RANGE,
    };

    normalized_rgb_to_pixel(yuv_to_normalized_rgb(yuv))
}

fn level_shift_down(n: f64) -> i8 {
    // `as` saturates, which pins stray values just outside [0, 1]
    (n * 255.0 - 128.0).round() as i8
}

fn level_shift_up(sample: i8) -> f64 {
    (sample as f64 + 128.0) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuv_round_trip() {
        for pixel in [
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(255, 0, 0),
            Rgb::new(12, 200, 77),
        ] {
            let rgb = pixel_to_normalized_rgb(pixel);
            let back = yuv_to_normalized_rgb(normalized_rgb_to_yuv(rgb));

            assert!((rgb.r - back.r).abs() < 1e-3);
            assert!((rgb.g - back.g).abs() < 1e-3);
            assert!((rgb.b - back.b).abs() < 1e-3);
        }
    }

    #[test]
    fn chroma_extremes_fit_residuals() {
        // Blue and yellow push U to its limits, red and cyan push V
        assert_eq!(pixel_to_residuals(Rgb::new(0, 0, 255))[1], 127);
        assert_eq!(pixel_to_residuals(Rgb::new(255, 255, 0))[1], -128);
        assert_eq!(pixel_to_residuals(Rgb::new(255, 0, 0))[2], 127);
        assert_eq!(pixel_to_residuals(Rgb::new(0, 255, 255))[2], -128);
    }

    #[test]
    fn residuals_close_to_source() {
        for pixel in [Rgb::new(30, 60, 90), Rgb::new(250, 10, 128), Rgb::new(128, 128, 128)] {
            let back = residuals_to_pixel(pixel_to_residuals(pixel));

            assert!((pixel.r as i16 - back.r as i16).abs() <= 4, "{pixel:?} -> {back:?}");
            assert!((pixel.g as i16 - back.g as i16).abs() <= 4, "{pixel:?} -> {back:?}");
            assert!((pixel.b as i16 - back.b as i16).abs() <= 4, "{pixel:?} -> {back:?}");
        }
    }

    #[test]
    fn hsv_round_trip() {
        let rgb = pixel_to_normalized_rgb(Rgb::new(200, 100, 50));
        let back = hsv_to_normalized_rgb(normalized_rgb_to_hsv(rgb));

        assert!((rgb.r - back.r).abs() < 1e-6);
        assert!((rgb.g - back.g).abs() < 1e-6);
        assert!((rgb.b - back.b).abs() < 1e-6);
    }

    #[test]
    fn gray_has_no_hue() {
        let hsv = normalized_rgb_to_hsv(pixel_to_normalized_rgb(Rgb::new(90, 90, 90)));
        assert_eq!(hsv.h, 0.0);
        assert_eq!(hsv.s, 0.0);
    }
}
