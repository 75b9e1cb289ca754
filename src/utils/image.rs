//! Image utility functions

use std::io::Cursor;

use anyhow::Result;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView};

/// Decode an encoded image and rotate it upright according to its EXIF
/// orientation tag, if any
pub fn decode_image(data: &[u8]) -> Result<DynamicImage> {
    let mut image = image::load_from_memory(data)?;
    if let Some(orientation) = exif_orientation(data) {
        image.apply_orientation(orientation);
    }
    Ok(image)
}

fn exif_orientation(data: &[u8]) -> Option<Orientation> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    let value = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)?;
    Orientation::from_exif(u8::try_from(value).ok()?)
}

/// Encode image to JPEG bytes
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    image.to_rgb8().write_with_encoder(encoder)?;
    Ok(buffer)
}

/// Shrink so the longest side is at most `max_dimension`, keeping aspect
/// ratio. Smaller images are returned unchanged.
pub fn downscale_to_max(image: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (w, h) = image.dimensions();
    if max_dimension == 0 || w.max(h) <= max_dimension {
        return image;
    }
    image.resize(max_dimension, max_dimension, image::imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(b"definitely not an image").is_err());
    }

    #[test]
    fn test_decode_without_exif_keeps_orientation() {
        let bytes = encode_jpeg(&DynamicImage::new_rgb8(40, 20), 90).unwrap();
        assert_eq!(exif_orientation(&bytes), None);
        assert_eq!(decode_image(&bytes).unwrap().dimensions(), (40, 20));
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let image = DynamicImage::new_rgb8(2560, 1440);
        let scaled = downscale_to_max(image, 1280);
        assert_eq!(scaled.dimensions(), (1280, 720));
    }

    #[test]
    fn test_small_image_untouched() {
        let image = DynamicImage::new_rgb8(640, 480);
        assert_eq!(downscale_to_max(image, 1280).dimensions(), (640, 480));
    }

    #[test]
    fn test_encode_jpeg_roundtrips_dimensions() {
        let bytes = encode_jpeg(&DynamicImage::new_rgb8(32, 24), 90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 24));
    }
}
