//! Model seams
//!
//! Services only see these traits. The OpenVINO backends implement them, and
//! tests plug in stubs.

use std::sync::Arc;

use anyhow::Result;
use image::DynamicImage;

use super::detector::FaceBox;
use super::object_detector::ObjectDetections;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    ObjectDetector,
    FaceDetector,
    FaceEmbedder,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::ObjectDetector => "object_detector",
            ModelType::FaceDetector => "face_detector",
            ModelType::FaceEmbedder => "face_embedder",
        }
    }
}

/// Face detector: image in, boxes with landmarks out (original coordinates)
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> Result<Vec<FaceBox>>;

    /// Network input (width, height)
    fn input_size(&self) -> (u32, u32);
}

/// Face embedder: aligned face crops in, one vector per crop out
pub trait FaceEmbedder: Send + Sync {
    fn embed_batch(&self, aligned_faces: &[DynamicImage]) -> Result<Vec<Vec<f32>>>;

    fn embedding_dim(&self) -> usize;
}

pub trait ObjectDetector: Send + Sync {
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
        iou_threshold: f32,
    ) -> Result<ObjectDetections>;

    fn input_size(&self) -> u32;
}

/// Source of loaded models. Loading is lazy and idempotent.
pub trait ModelProvider: Send + Sync {
    fn device(&self) -> &str;

    fn object_detector(&self) -> Result<Arc<dyn ObjectDetector>>;

    fn face_detector(&self) -> Result<Arc<dyn FaceDetector>>;

    fn face_embedder(&self) -> Result<Arc<dyn FaceEmbedder>>;

    /// Human readable model name (usually the file stem)
    fn model_name(&self, model: ModelType) -> String;

    fn is_loaded(&self, model: ModelType) -> bool;

    fn unload(&self, model: ModelType);
}
