//! Image preprocessing for the detection and embedding models

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, RgbImage};
use ndarray::Array4;
use anyhow::Result;

/// Standard input size for face detection (SCRFD)
pub const DETECTOR_INPUT_SIZE: (u32, u32) = (640, 640);

/// Standard input size for face embedding (ArcFace)
pub const EMBEDDER_INPUT_SIZE: (u32, u32) = (112, 112);

/// Letterbox fill used by YOLO exports
const YOLO_PAD: Rgb<u8> = Rgb([114, 114, 114]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// InsightFace: BGR, (p - 127.5) / 128
    InsightFace,
    /// YOLO: RGB, p / 255
    Yolo,
}

/// Letterbox to 640x640 and normalize for SCRFD
pub fn preprocess_for_detection(image: &DynamicImage) -> Array4<f32> {
    let (target_w, target_h) = DETECTOR_INPUT_SIZE;
    let resized = resize_with_padding(image, target_w, target_h, Rgb([0, 0, 0]));
    image_to_nchw(&resized, Normalization::InsightFace)
}

/// Letterbox to a square input and normalize for YOLO
pub fn preprocess_for_yolo(image: &DynamicImage, input_size: u32) -> Array4<f32> {
    let resized = resize_with_padding(image, input_size, input_size, YOLO_PAD);
    image_to_nchw(&resized, Normalization::Yolo)
}

/// Resize image with padding to maintain aspect ratio
pub fn resize_with_padding(
    image: &DynamicImage,
    target_w: u32,
    target_h: u32,
    fill: Rgb<u8>,
) -> DynamicImage {
    let info = ResizeInfo::new(image.dimensions(), (target_w, target_h));
    let new_w = ((info.original_width as f32 * info.scale) as u32).clamp(1, target_w);
    let new_h = ((info.original_height as f32 * info.scale) as u32).clamp(1, target_h);

    let resized = image
        .resize_exact(new_w, new_h, image::imageops::FilterType::Triangle)
        .to_rgb8();

    let mut padded = ImageBuffer::from_pixel(target_w, target_h, fill);
    image::imageops::replace(&mut padded, &resized, info.offset_x as i64, info.offset_y as i64);

    DynamicImage::ImageRgb8(padded)
}

/// Convert image to an NCHW tensor
pub fn image_to_nchw(image: &DynamicImage, normalization: Normalization) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (r, g, b) = (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32);
        let (x, y) = (x as usize, y as usize);
        match normalization {
            Normalization::InsightFace => {
                tensor[[0, 0, y, x]] = (b - 127.5) / 128.0;
                tensor[[0, 1, y, x]] = (g - 127.5) / 128.0;
                tensor[[0, 2, y, x]] = (r - 127.5) / 128.0;
            }
            Normalization::Yolo => {
                tensor[[0, 0, y, x]] = r / 255.0;
                tensor[[0, 1, y, x]] = g / 255.0;
                tensor[[0, 2, y, x]] = b / 255.0;
            }
        }
    }

    tensor
}

/// Extract face region from image given bounding box
pub fn crop_face(
    image: &DynamicImage,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    margin: f32,
) -> DynamicImage {
    let (img_w, img_h) = image.dimensions();

    let margin_x = (x2 - x1) * margin;
    let margin_y = (y2 - y1) * margin;

    let x1 = (x1 - margin_x).max(0.0) as u32;
    let y1 = (y1 - margin_y).max(0.0) as u32;
    let x2 = ((x2 + margin_x).min(img_w as f32) as u32).max(x1 + 1).min(img_w);
    let y2 = ((y2 + margin_y).min(img_h as f32) as u32).max(y1 + 1).min(img_h);

    image.crop_imm(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
}

/// ArcFace 112x112 reference positions: eyes, nose tip, mouth corners
const ARCFACE_TEMPLATE: [(f32, f32); 5] = [
    (38.2946, 51.6963),
    (73.5318, 51.5014),
    (56.0252, 71.7366),
    (41.5493, 92.3655),
    (70.7299, 92.2041),
];

/// Warp the face onto the ArcFace template using its 5 landmarks
pub fn align_face(image: &DynamicImage, landmarks: &[(f32, f32); 5]) -> Result<DynamicImage> {
    let similarity = Similarity::fit(landmarks, &ARCFACE_TEMPLATE)?;
    let (w, h) = EMBEDDER_INPUT_SIZE;
    Ok(similarity.warp(image, w, h))
}

/// Rotation + uniform scale + translation: `x' = a*x - b*y + tx`,
/// `y' = b*x + a*y + ty`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Similarity {
    a: f32,
    b: f32,
    tx: f32,
    ty: f32,
}

impl Similarity {
    /// Least-squares fit mapping `from` onto `to`
    fn fit(from: &[(f32, f32)], to: &[(f32, f32)]) -> Result<Self> {
        let (fx, fy) = mean(from);
        let (tx, ty) = mean(to);

        let (mut dot, mut cross, mut norm) = (0.0f32, 0.0f32, 0.0f32);
        for (&(px, py), &(qx, qy)) in from.iter().zip(to) {
            let (px, py) = (px - fx, py - fy);
            let (qx, qy) = (qx - tx, qy - ty);
            dot += px * qx + py * qy;
            cross += px * qy - py * qx;
            norm += px * px + py * py;
        }
        if norm <= 1e-6 {
            anyhow::bail!("degenerate landmarks");
        }

        let (a, b) = (dot / norm, cross / norm);
        Ok(Self {
            a,
            b,
            tx: tx - (a * fx - b * fy),
            ty: ty - (b * fx + a * fy),
        })
    }

    /// Source position of a destination pixel
    fn invert(&self, x: f32, y: f32) -> (f32, f32) {
        let det = self.a * self.a + self.b * self.b;
        let (dx, dy) = (x - self.tx, y - self.ty);
        (
            (self.a * dx + self.b * dy) / det,
            (self.a * dy - self.b * dx) / det,
        )
    }

    fn warp(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let src = image.to_rgb8();
        let degenerate = self.a * self.a + self.b * self.b < f32::EPSILON;
        let out = RgbImage::from_fn(width, height, |x, y| {
            if degenerate {
                return Rgb([0, 0, 0]);
            }
            let (sx, sy) = self.invert(x as f32, y as f32);
            sample_bilinear(&src, sx, sy).unwrap_or(Rgb([0, 0, 0]))
        });
        DynamicImage::ImageRgb8(out)
    }
}

fn mean(points: &[(f32, f32)]) -> (f32, f32) {
    let n = points.len().max(1) as f32;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
    (sx / n, sy / n)
}

/// None outside the interpolable area
fn sample_bilinear(src: &RgbImage, x: f32, y: f32) -> Option<Rgb<u8>> {
    if src.width() < 2 || src.height() < 2 {
        return None;
    }
    let (max_x, max_y) = ((src.width() - 1) as f32, (src.height() - 1) as f32);
    if !(0.0..max_x).contains(&x) || !(0.0..max_y).contains(&y) {
        return None;
    }

    let (x0, y0) = (x.floor() as u32, y.floor() as u32);
    let (wx, wy) = (x - x0 as f32, y - y0 as f32);
    let corners = [
        (src.get_pixel(x0, y0), (1.0 - wx) * (1.0 - wy)),
        (src.get_pixel(x0 + 1, y0), wx * (1.0 - wy)),
        (src.get_pixel(x0, y0 + 1), (1.0 - wx) * wy),
        (src.get_pixel(x0 + 1, y0 + 1), wx * wy),
    ];

    let mut out = [0u8; 3];
    for (ch, slot) in out.iter_mut().enumerate() {
        let v: f32 = corners.iter().map(|(p, w)| p[ch] as f32 * w).sum();
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(out))
}

/// Letterbox geometry, used to map model coordinates back to the image
#[derive(Debug, Clone)]
pub struct ResizeInfo {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl ResizeInfo {
    pub fn new(original: (u32, u32), target: (u32, u32)) -> Self {
        let (orig_w, orig_h) = (original.0.max(1), original.1.max(1));
        let (target_w, target_h) = target;

        let scale = f32::min(
            target_w as f32 / orig_w as f32,
            target_h as f32 / orig_h as f32,
        );

        let new_w = ((orig_w as f32 * scale) as u32).min(target_w);
        let new_h = ((orig_h as f32 * scale) as u32).min(target_h);

        Self {
            scale,
            offset_x: (target_w - new_w) / 2,
            offset_y: (target_h - new_h) / 2,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Convert model coordinates back to original image space
    pub fn to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.offset_x as f32) / self.scale,
            (y - self.offset_y as f32) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_info_letterbox() {
        let info = ResizeInfo::new((1280, 640), (640, 640));
        assert!((info.scale - 0.5).abs() < 1e-6);
        assert_eq!(info.offset_x, 0);
        assert_eq!(info.offset_y, 160);

        let (x, y) = info.to_original(320.0, 320.0);
        assert!((x - 640.0).abs() < 1e-3);
        assert!((y - 320.0).abs() < 1e-3);
    }

    #[test]
    fn test_resize_with_padding_keeps_target_size() {
        let image = DynamicImage::new_rgb8(300, 100);
        let padded = resize_with_padding(&image, 640, 640, YOLO_PAD);
        assert_eq!(padded.dimensions(), (640, 640));
        // Top band is padding
        assert_eq!(padded.to_rgb8().get_pixel(0, 0), &YOLO_PAD);
    }

    #[test]
    fn test_nchw_normalization() {
        let mut buffer = ImageBuffer::from_pixel(2, 2, Rgb([255u8, 0, 0]));
        buffer.put_pixel(1, 1, Rgb([0, 0, 255]));
        let image = DynamicImage::ImageRgb8(buffer);

        let yolo = image_to_nchw(&image, Normalization::Yolo);
        assert_eq!(yolo.shape(), &[1, 3, 2, 2]);
        assert!((yolo[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((yolo[[0, 2, 1, 1]] - 1.0).abs() < 1e-6);

        // InsightFace puts blue first
        let insight = image_to_nchw(&image, Normalization::InsightFace);
        assert!((insight[[0, 2, 0, 0]] - (127.5 / 128.0)).abs() < 1e-6);
        assert!((insight[[0, 0, 1, 1]] - (127.5 / 128.0)).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_fit_identity_and_rotation() {
        let identity = Similarity::fit(&ARCFACE_TEMPLATE, &ARCFACE_TEMPLATE).unwrap();
        assert!((identity.a - 1.0).abs() < 1e-4);
        assert!(identity.b.abs() < 1e-4);
        assert!(identity.tx.abs() < 1e-2 && identity.ty.abs() < 1e-2);

        // Template rotated 90 degrees and doubled maps back with a=0, b=-0.5
        let turned: Vec<(f32, f32)> = ARCFACE_TEMPLATE.iter().map(|&(x, y)| (-2.0 * y, 2.0 * x)).collect();
        let back = Similarity::fit(&turned, &ARCFACE_TEMPLATE).unwrap();
        assert!(back.a.abs() < 1e-4);
        assert!((back.b + 0.5).abs() < 1e-4);

        let (x, y) = back.invert(ARCFACE_TEMPLATE[2].0, ARCFACE_TEMPLATE[2].1);
        assert!((x - turned[2].0).abs() < 1e-2);
        assert!((y - turned[2].1).abs() < 1e-2);
    }

    #[test]
    fn test_align_face_output_size() {
        let aligned = align_face(&DynamicImage::new_rgb8(200, 200), &ARCFACE_TEMPLATE).unwrap();
        assert_eq!(aligned.dimensions(), EMBEDDER_INPUT_SIZE);
    }

    #[test]
    fn test_degenerate_landmarks_rejected() {
        let points = [(10.0, 10.0); 5];
        assert!(align_face(&DynamicImage::new_rgb8(50, 50), &points).is_err());
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut src = RgbImage::new(2, 2);
        src.put_pixel(1, 0, Rgb([100, 100, 100]));
        src.put_pixel(1, 1, Rgb([100, 100, 100]));
        assert_eq!(sample_bilinear(&src, 0.5, 0.5), Some(Rgb([50, 50, 50])));
        assert_eq!(sample_bilinear(&src, 1.5, 0.0), None);
    }

    #[test]
    fn test_crop_face_clamps_to_image() {
        let image = DynamicImage::new_rgb8(100, 80);
        let crop = crop_face(&image, 90.0, 70.0, 120.0, 100.0, 0.1);
        let (w, h) = crop.dimensions();
        assert!(w >= 1 && w <= 13);
        assert!(h >= 1 && h <= 13);
    }
}
