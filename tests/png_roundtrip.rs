use enough::Unstoppable;
use labelraster::{
    CodecError, DecodeRequest, EncodeRequest, FilterMode, Limits, RasterImage, resize_nearest,
};

fn test_image(w: u32, h: u32) -> RasterImage {
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            pixels.extend_from_slice(&[
                (x * 17 % 256) as u8,
                (y * 43 % 256) as u8,
                ((x ^ y) * 29 % 256) as u8,
                if (x + y) % 3 == 0 { 255 } else { (x * y % 256) as u8 },
            ]);
        }
    }
    RasterImage::from_rgba(pixels, w, h).unwrap()
}

#[test]
fn roundtrip_is_pixel_exact() {
    let image = test_image(37, 23);
    let png = EncodeRequest::new().encode(&image, Unstoppable).unwrap();
    let back = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!(back, image);
}

#[test]
fn roundtrip_with_paeth_filter() {
    let image = test_image(16, 16);
    let png = EncodeRequest::new()
        .with_filter(FilterMode::Paeth)
        .encode(&image, Unstoppable)
        .unwrap();
    let back = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!(back, image);
}

#[test]
fn roundtrip_single_pixel() {
    let image = RasterImage::from_rgba(vec![9, 8, 7, 6], 1, 1).unwrap();
    let png = EncodeRequest::new().encode(&image, Unstoppable).unwrap();
    let back = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!(back, image);
}

#[test]
fn any_flipped_data_bit_is_rejected() {
    let image = test_image(12, 12);
    let png = EncodeRequest::new().encode(&image, Unstoppable).unwrap();

    // Flip one bit in the middle of the IDAT payload and one in IHDR.
    for &offset in &[20usize, png.len() / 2] {
        let mut corrupt = png.clone();
        corrupt[offset] ^= 0x10;
        let result = DecodeRequest::new(&corrupt).decode(Unstoppable);
        assert!(
            matches!(result, Err(CodecError::CrcMismatch { .. })),
            "offset {offset} should fail CRC, got {result:?}"
        );
    }
}

#[test]
fn corrupt_signature_is_rejected() {
    let image = test_image(4, 4);
    let mut png = EncodeRequest::new().encode(&image, Unstoppable).unwrap();
    png[1] = b'Q';
    assert!(matches!(
        DecodeRequest::new(&png).decode(Unstoppable),
        Err(CodecError::BadSignature)
    ));
}

#[test]
fn decode_respects_limits() {
    let image = test_image(64, 64);
    let png = EncodeRequest::new().encode(&image, Unstoppable).unwrap();
    let limits = Limits::bounded(1000, 1 << 30);
    assert!(matches!(
        DecodeRequest::new(&png).with_limits(&limits).decode(Unstoppable),
        Err(CodecError::LimitExceeded(_))
    ));
}

#[test]
fn upscale_then_roundtrip_preserves_blocks() {
    let image = test_image(10, 10);
    let scaled = resize_nearest(&image, 3.0).unwrap();
    let png = EncodeRequest::new().encode(&scaled, Unstoppable).unwrap();
    let back = DecodeRequest::new(&png).decode(Unstoppable).unwrap();
    assert_eq!((back.width, back.height), (30, 30));
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(back.pixel(3 * x, 3 * y), image.pixel(x, y));
            assert_eq!(back.pixel(3 * x + 2, 3 * y + 2), image.pixel(x, y));
        }
    }
}

#[test]
fn truncated_file_is_rejected() {
    let image = test_image(8, 8);
    let png = EncodeRequest::new().encode(&image, Unstoppable).unwrap();
    let result = DecodeRequest::new(&png[..png.len() - 10]).decode(Unstoppable);
    assert!(result.is_err());
}
