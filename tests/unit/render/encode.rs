use super::*;

#[test]
fn lossless_round_trips_straight_colour() {
    let premul = [128u8, 0, 0, 128, 0, 0, 255, 255];
    let bytes = encode_premul(2, 1, &premul, OutputFormat::Lossless, [255; 4]).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 255]);
}

#[test]
fn lossy_flattens_over_background() {
    let premul = vec![0u8; 8 * 8 * 4];
    let bytes = encode_premul(
        8,
        8,
        &premul,
        OutputFormat::Lossy { quality: 0.9 },
        [0, 255, 0, 255],
    )
    .unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg
    );
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    let [r, g, b] = img.get_pixel(4, 4).0;
    assert!(r < 16 && g > 240 && b < 16, "got {r},{g},{b}");
}

#[test]
fn rejects_buffer_size_mismatch() {
    let err = encode_premul(2, 2, &[0u8; 4], OutputFormat::Lossless, [0; 4]).unwrap_err();
    assert!(matches!(err, MintError::Validation(_)));
}

#[test]
fn quality_maps_to_encoder_scale() {
    assert_eq!(jpeg_quality(1.0), 100);
    assert_eq!(jpeg_quality(0.85), 85);
    assert_eq!(jpeg_quality(0.0), 1);
    assert_eq!(jpeg_quality(f32::NAN), 100);
}
