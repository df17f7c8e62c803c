use im3::{
    compression::dct::QUANTIZATION_MATRIX, header::FULL_HEADER_LEN, Bitmap, Container, Error,
    PixelImage, PixelOperation, Rgb,
};
use proptest::prelude::*;

fn max_channel_error(a: &Bitmap, b: &Bitmap) -> i16 {
    a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| (x as i16 - y as i16).abs())
        .max()
        .unwrap_or(0)
}

fn checkerboard(width: u32, height: u32) -> Bitmap {
    let mut image = Bitmap::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let pixel = if (x / 8 + y / 8) % 2 == 0 {
                Rgb::new(220, 180, 40)
            } else {
                Rgb::new(20, 60, 200)
            };
            image.set_pixel(x, y, pixel);
        }
    }
    image
}

#[test]
fn solid_color_round_trip() {
    let largest_step = *QUANTIZATION_MATRIX.iter().max().unwrap() as i16;

    for color in [
        Rgb::new(0, 0, 0),
        Rgb::new(255, 255, 255),
        Rgb::new(200, 30, 90),
        Rgb::new(10, 250, 128),
    ] {
        let image = Bitmap::filled(16, 16, color);
        let container = im3::compress(&image).unwrap();

        assert_eq!(container.header.blocks_wide, 2);
        assert_eq!(container.header.blocks_high, 2);

        let restored = im3::decompress(&container).unwrap();
        assert_eq!((restored.width(), restored.height()), (16, 16));

        // Uniform in, uniform out
        let first = restored.get_pixel(0, 0);
        assert!(restored.as_raw().chunks(3).all(|p| p == [first.r, first.g, first.b]));

        assert!(max_channel_error(&image, &restored) <= largest_step);
        // In practice only the DC step matters for a flat image
        assert!(max_channel_error(&image, &restored) <= 8, "{color:?} -> {first:?}");
    }
}

#[test]
fn container_bytes_round_trip() {
    let image = checkerboard(32, 16);
    let container = im3::compress(&image).unwrap();

    let bytes = container.to_bytes();
    assert_eq!(&bytes[..4], &[b'I', b'M', 4, 2]);
    assert!(bytes.len() > FULL_HEADER_LEN);

    let parsed = Container::from_bytes(&bytes).unwrap();
    assert_eq!(parsed, container);

    let restored = im3::decompress(&parsed).unwrap();
    assert_eq!(restored, im3::decompress(&container).unwrap());
    assert!(max_channel_error(&image, &restored) <= 40);
}

#[test]
fn compression_is_deterministic() {
    let image = checkerboard(24, 24);

    assert_eq!(
        im3::compress(&image).unwrap().to_bytes(),
        im3::compress(&image).unwrap().to_bytes()
    );
}

#[test]
fn bad_magic_leaves_image_untouched() {
    let mut bytes = im3::compress(&checkerboard(16, 16)).unwrap().to_bytes();
    bytes[0] = b'X';
    bytes[1] = b'Y';

    let mut output = Bitmap::filled(16, 16, Rgb::new(1, 2, 3));
    let result = Container::from_bytes(&bytes).and_then(|c| im3::decompress_into(&c, &mut output));

    assert!(matches!(result, Err(Error::InvalidIdentifier([b'X', b'Y']))));
    assert_eq!(output, Bitmap::filled(16, 16, Rgb::new(1, 2, 3)));
}

#[test]
fn truncated_and_extended_files() {
    let bytes = im3::compress(&checkerboard(16, 16)).unwrap().to_bytes();

    assert!(matches!(
        Container::from_bytes(&bytes[..bytes.len() - 1]),
        Err(Error::Truncated)
    ));
    assert!(matches!(
        Container::from_bytes(&bytes[..FULL_HEADER_LEN - 1]),
        Err(Error::Truncated)
    ));

    let mut longer = bytes.clone();
    longer.extend_from_slice(&[0, 0]);
    assert!(matches!(
        Container::from_bytes(&longer),
        Err(Error::TrailingData)
    ));
}

#[test]
fn inflated_segment_length_is_rejected() {
    let mut container = im3::compress(&checkerboard(16, 16)).unwrap();
    container.header.ac_sizes[2].values += 1;

    // The declared length now runs past the end of the file
    assert!(matches!(
        Container::from_bytes(&container.to_bytes()),
        Err(Error::Truncated)
    ));
}

#[test]
fn shifted_segment_boundary_is_rejected() {
    let mut container = im3::compress(&checkerboard(16, 16)).unwrap();
    container.header.ac_sizes[0].runs += 1;
    container.header.ac_sizes[0].values -= 1;

    // The file length still matches, only decoding the planes can tell
    assert!(Container::from_bytes(&container.to_bytes()).is_err());
}

#[test]
fn operations_then_compress() {
    let mut image = checkerboard(16, 16);
    PixelOperation::Grayscale.apply_to(&mut image);

    let restored = im3::decompress(&im3::compress(&image).unwrap()).unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let p = restored.get_pixel(x, y);
            assert!((p.r as i16 - p.b as i16).abs() <= 12, "({x}, {y}): {p:?}");
        }
    }
}

#[test]
fn save_and_open() {
    let container = im3::compress(&checkerboard(8, 16)).unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();

    container.save(file.path()).unwrap();
    let opened = im3::open(file.path()).unwrap();

    assert_eq!(opened, container);
    assert_eq!(
        std::fs::metadata(file.path()).unwrap().len() as usize,
        container.len()
    );
}

fn image_strategy() -> impl Strategy<Value = Bitmap> {
    (1u32..=4, 1u32..=4).prop_flat_map(|(bw, bh)| {
        let len = (bw * 8 * bh * 8 * 3) as usize;
        proptest::collection::vec(any::<u8>(), len)
            .prop_map(move |data| Bitmap::from_raw(bw * 8, bh * 8, data).unwrap())
    })
}

/// Images made of solid 8×8 blocks, each a random color.
fn block_color_strategy() -> impl Strategy<Value = Bitmap> {
    (1u32..=4, 1u32..=4).prop_flat_map(|(bw, bh)| {
        proptest::collection::vec(any::<(u8, u8, u8)>(), (bw * bh) as usize).prop_map(
            move |colors| {
                let mut image = Bitmap::new(bw * 8, bh * 8);
                for y in 0..bh * 8 {
                    for x in 0..bw * 8 {
                        let (r, g, b) = colors[((y / 8) * bw + x / 8) as usize];
                        image.set_pixel(x, y, Rgb::new(r, g, b));
                    }
                }
                image
            },
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_noise_round_trip(image in image_strategy()) {
        let container = im3::compress(&image).unwrap();
        let parsed = Container::from_bytes(&container.to_bytes()).unwrap();
        let restored = im3::decompress(&parsed).unwrap();

        prop_assert_eq!(restored.width(), image.width());
        prop_assert_eq!(restored.height(), image.height());
        prop_assert_eq!(restored, im3::decompress(&container).unwrap());
    }

    #[test]
    fn prop_block_colors_round_trip(image in block_color_strategy()) {
        let container = im3::compress(&image).unwrap();
        let restored = im3::decompress(&container).unwrap();

        // A flat block only keeps its DC coefficient, which is off by at
        // most one sample step per plane
        prop_assert!(max_channel_error(&image, &restored) <= 8);

        let parsed = Container::from_bytes(&container.to_bytes()).unwrap();
        prop_assert_eq!(im3::decompress(&parsed).unwrap(), restored);
    }
}
