//! Service layer types

use serde::{Deserialize, Serialize};

/// Face box in pixels of the processed image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceQuality {
    pub overall_score: f32,
    pub sharpness: f32,
    pub brightness: f32,
    pub face_size_pixels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub quality: FaceQuality,
    pub landmarks: Vec<(f32, f32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_jpeg: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub detection_ms: f32,
    pub embedding_ms: f32,
    pub preprocessing_ms: f32,
    pub total_ms: f32,
    pub image_width: u32,
    pub image_height: u32,
    pub faces_detected: u32,
}

/// Per-call knobs; `None` falls back to the configured value
#[derive(Debug, Clone, Default)]
pub struct FaceRequestOptions {
    pub confidence_threshold: Option<f32>,
    pub max_faces: Option<usize>,
    pub include_crops: bool,
    pub max_dimension: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDetectionResult {
    pub faces: Vec<DetectedFace>,
    pub time_ms: f32,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub face_detected: bool,
    pub faces: Vec<DetectedFace>,
    pub camera_id: String,
    pub time_ms: f32,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResult {
    pub camera_id: String,
    pub faces: Vec<DetectedFace>,
    pub time_ms: f32,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceModelInfo {
    pub detector_name: String,
    pub embedder_name: String,
    pub detector_type: String,
    pub device: String,
    pub input_size: u32,
    pub embedding_dim: usize,
    pub is_ready: bool,
    pub min_face_size: u32,
    pub confidence_threshold: f32,
    pub max_faces: usize,
}

// ---------------------------------------------------------------------------
// Object detection

#[derive(Debug, Clone, Default)]
pub struct ObjectDetectionRequest {
    pub image: Vec<u8>,
    pub confidence_threshold: Option<f32>,
    pub iou_threshold: Option<f32>,
    pub target_classes: Vec<String>,
    pub exclude_classes: Vec<String>,
    pub max_detections: Option<usize>,
    pub camera_id: String,
    pub request_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectBoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub x1_norm: f32,
    pub y1_norm: f32,
    pub x2_norm: f32,
    pub y2_norm: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub class_name: String,
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: ObjectBoundingBox,
    pub area: f32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectDetectionResponse {
    pub success: bool,
    pub detections: Vec<ObjectDetection>,
    pub total_objects: usize,
    pub preprocessing_time_ms: f32,
    pub inference_time_ms: f32,
    pub postprocessing_time_ms: f32,
    pub total_time_ms: f32,
    pub request_id: String,
    pub timestamp: i64,
    pub image_metadata: Option<ImageMetadata>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetectionResponse {
    pub responses: Vec<ObjectDetectionResponse>,
    pub total_detections: usize,
    /// Fraction of requests that succeeded, 0..1
    pub success_rate: f32,
    pub total_time_ms: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionModelInfo {
    pub model_name: String,
    pub model_version: String,
    pub classes: Vec<String>,
    pub device: String,
    pub input_size: u32,
    pub is_ready: bool,
}
