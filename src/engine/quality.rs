//! Face quality scoring
//!
//! Cheap image statistics on the face crop: sharpness from the variance of
//! the Laplacian, brightness from mean luma, and the face size.

use image::{DynamicImage, GrayImage};

/// Laplacian variance at or above this counts as fully sharp
const SHARPNESS_SATURATION: f32 = 500.0;

/// Faces this large (shorter side, px) get the full size score
const SIZE_SATURATION: f32 = 112.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScores {
    /// 0..1
    pub sharpness: f32,
    /// 0..1, mean luma / 255
    pub brightness: f32,
    pub face_size_pixels: u32,
    /// Weighted mix of the above, 0..1
    pub overall: f32,
}

pub fn assess(crop: &DynamicImage) -> QualityScores {
    let gray = crop.to_luma8();
    let (w, h) = gray.dimensions();

    let sharpness = (laplacian_variance(&gray) / SHARPNESS_SATURATION).min(1.0);
    let brightness = mean_luma(&gray) / 255.0;
    let face_size_pixels = w.min(h);

    // Mid-grey is ideal; very dark or blown-out faces score low
    let exposure = 1.0 - (brightness - 0.5).abs() * 2.0;
    let size = (face_size_pixels as f32 / SIZE_SATURATION).min(1.0);
    let overall = (0.5 * sharpness + 0.25 * exposure + 0.25 * size).clamp(0.0, 1.0);

    QualityScores {
        sharpness,
        brightness,
        face_size_pixels,
        overall,
    }
}

fn mean_luma(gray: &GrayImage) -> f32 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    sum as f32 / count as f32
}

/// Variance of the 4-neighbour Laplacian over interior pixels
fn laplacian_variance(gray: &GrayImage) -> f32 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f32;
    let mut values = Vec::with_capacity(((w - 2) * (h - 2)) as usize);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            values.push(px(x - 1, y) + px(x + 1, y) + px(x, y - 1) + px(x, y + 1) - 4.0 * px(x, y));
        }
    }

    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n
}
