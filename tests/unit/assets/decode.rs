use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_keeps_translucent_pixels_straight() {
    let img = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 200, 100, 50, 3]).unwrap();

    let prepared = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(prepared.width(), 2);
    assert_eq!(prepared.height(), 1);
    assert_eq!(prepared.rgba8(), &[100, 50, 200, 128, 200, 100, 50, 3]);
}

#[test]
fn decode_image_keeps_native_dimensions() {
    let img = image::RgbaImage::from_pixel(37, 11, image::Rgba([1, 2, 3, 255]));
    let prepared = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(
        prepared.canvas(),
        Canvas {
            width: 37,
            height: 11
        }
    );
    assert_eq!(prepared.rgba8().len(), 37 * 11 * 4);
}

#[test]
fn decode_image_rejects_garbage_and_empty_input() {
    assert!(matches!(
        decode_image(b"definitely not an image"),
        Err(WatermarkError::Decode(_))
    ));
    assert!(matches!(decode_image(&[]), Err(WatermarkError::Decode(_))));
}

#[test]
fn decode_image_rejects_truncated_png() {
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([9, 9, 9, 255]));
    let bytes = png_bytes(img);
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        decode_image(truncated),
        Err(WatermarkError::Decode(_))
    ));
}

#[test]
fn from_rgba8_validates_buffer_length() {
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_rgba8(0, 2, vec![]).is_err());
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 16]).is_ok());
}
