//! Object detection service (YOLO)
//!
//! Requests never fail outward: every problem is folded into a response with
//! `success = false` and an error message/code.

use std::sync::Arc;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{DetectionConfig, ModelsConfig};
use crate::utils::image::decode_image;
use crate::engine::{ModelProvider, ModelType, ObjectBox, ObjectDetector};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::elapsed_ms;

use super::types::*;

pub struct ObjectDetectionService {
    provider: Arc<dyn ModelProvider>,
    config: DetectionConfig,
    classes: Vec<String>,
    detector: RwLock<Option<Arc<dyn ObjectDetector>>>,
}

impl ObjectDetectionService {
    pub fn new(provider: Arc<dyn ModelProvider>, config: DetectionConfig, models: &ModelsConfig) -> Self {
        Self {
            provider,
            config,
            classes: models.object_classes.clone(),
            detector: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.detector.read().is_some()
    }

    /// Load the detector if needed
    pub fn load(&self) -> ServiceResult<Arc<dyn ObjectDetector>> {
        if let Some(detector) = self.detector.read().as_ref() {
            return Ok(detector.clone());
        }

        let mut guard = self.detector.write();
        if let Some(detector) = guard.as_ref() {
            return Ok(detector.clone());
        }

        let start = Instant::now();
        let detector = self
            .provider
            .object_detector()
            .map_err(|e| ServiceError::ModelLoad(format!("object detector: {:#}", e)))?;
        info!(
            model = %self.provider.model_name(ModelType::ObjectDetector),
            device = %self.provider.device(),
            "Object detector loaded in {:.1}ms",
            elapsed_ms(start)
        );

        *guard = Some(detector.clone());
        Ok(detector)
    }

    /// Run `iterations` detections on a blank input-sized image
    pub fn warmup(&self, iterations: u32) -> ServiceResult<()> {
        let detector = self.load()?;
        let size = detector.input_size();
        let dummy = DynamicImage::new_rgb8(size, size);

        let start = Instant::now();
        for i in 0..iterations {
            detector
                .detect(&dummy, self.config.confidence_threshold, self.config.iou_threshold)
                .map_err(|e| ServiceError::Inference(format!("warmup iteration {}: {:#}", i + 1, e)))?;
        }
        info!(iterations, "Object detector warmed up in {:.1}ms", elapsed_ms(start));
        Ok(())
    }

    pub fn unload(&self) {
        if self.detector.write().take().is_some() {
            info!("Object detector released");
        }
        self.provider.unload(ModelType::ObjectDetector);
    }

    pub fn detect_objects(&self, request: &ObjectDetectionRequest) -> ObjectDetectionResponse {
        let start = Instant::now();
        match self.try_detect(request, start) {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    camera_id = %request.camera_id,
                    code = e.code(),
                    "object detection failed: {}",
                    e
                );
                ObjectDetectionResponse {
                    success: false,
                    total_time_ms: elapsed_ms(start),
                    request_id: request.request_id.clone(),
                    timestamp: request.timestamp,
                    error_message: Some(e.to_string()),
                    error_code: Some(e.code().to_string()),
                    ..Default::default()
                }
            }
        }
    }

    /// Sequential batch; one bad request does not affect the others
    pub fn detect_batch(&self, requests: &[ObjectDetectionRequest]) -> BatchDetectionResponse {
        let start = Instant::now();
        let responses: Vec<_> = requests.iter().map(|r| self.detect_objects(r)).collect();

        let succeeded = responses.iter().filter(|r| r.success).count();
        let total_detections = responses.iter().map(|r| r.total_objects).sum();
        let success_rate = if responses.is_empty() {
            0.0
        } else {
            succeeded as f32 / responses.len() as f32
        };

        BatchDetectionResponse {
            responses,
            total_detections,
            success_rate,
            total_time_ms: elapsed_ms(start),
        }
    }

    pub fn model_info(&self) -> DetectionModelInfo {
        DetectionModelInfo {
            model_name: self.provider.model_name(ModelType::ObjectDetector),
            model_version: env!("CARGO_PKG_VERSION").to_string(),
            classes: self.classes.clone(),
            device: self.provider.device().to_string(),
            input_size: self.config.input_size,
            is_ready: self.is_loaded(),
        }
    }

    fn try_detect(
        &self,
        request: &ObjectDetectionRequest,
        start: Instant,
    ) -> ServiceResult<ObjectDetectionResponse> {
        let confidence = request
            .confidence_threshold
            .unwrap_or(self.config.confidence_threshold);
        let iou = request.iou_threshold.unwrap_or(self.config.iou_threshold);
        for (name, value) in [("confidence_threshold", confidence), ("iou_threshold", iou)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ServiceError::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if request.image.is_empty() {
            return Err(ServiceError::InvalidImage("empty image data".to_string()));
        }
        let decode_start = Instant::now();
        let image = decode_image(&request.image)
            .map_err(|e| ServiceError::InvalidImage(format!("failed to decode image: {}", e)))?;
        let decode_ms = elapsed_ms(decode_start);

        let detector = self.load()?;
        let raw = detector
            .detect(&image, confidence, iou)
            .map_err(|e| ServiceError::Inference(format!("{:#}", e)))?;

        let filter_start = Instant::now();
        let (width, height) = image.dimensions();
        let max_detections = request.max_detections.unwrap_or(self.config.max_detections);
        let detections: Vec<ObjectDetection> = raw
            .boxes
            .iter()
            .map(|b| self.to_detection(b, width, height))
            .filter(|d| class_allowed(&d.class_name, &request.target_classes, &request.exclude_classes))
            .take(max_detections)
            .collect();
        let postprocessing_ms = raw.postprocess_ms + elapsed_ms(filter_start);

        debug!(
            request_id = %request.request_id,
            raw = raw.boxes.len(),
            kept = detections.len(),
            "objects detected"
        );

        Ok(ObjectDetectionResponse {
            success: true,
            total_objects: detections.len(),
            detections,
            preprocessing_time_ms: decode_ms + raw.preprocess_ms,
            inference_time_ms: raw.inference_ms,
            postprocessing_time_ms: postprocessing_ms,
            total_time_ms: elapsed_ms(start),
            request_id: request.request_id.clone(),
            timestamp: request.timestamp,
            image_metadata: Some(ImageMetadata {
                width,
                height,
                channels: image.color().channel_count() as u32,
            }),
            error_message: None,
            error_code: None,
        })
    }

    fn class_name(&self, class_id: usize) -> String {
        self.classes
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }

    fn to_detection(&self, b: &ObjectBox, width: u32, height: u32) -> ObjectDetection {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        ObjectDetection {
            class_name: self.class_name(b.class_id),
            class_id: b.class_id as u32,
            confidence: b.confidence,
            bbox: ObjectBoundingBox {
                x1: b.x1,
                y1: b.y1,
                x2: b.x2,
                y2: b.y2,
                x1_norm: b.x1 / w,
                y1_norm: b.y1 / h,
                x2_norm: b.x2 / w,
                y2_norm: b.y2 / h,
            },
            area: b.rect().area(),
        }
    }
}

/// Empty target list means every class is wanted
fn class_allowed(class_name: &str, target: &[String], exclude: &[String]) -> bool {
    (target.is_empty() || target.iter().any(|t| t == class_name))
        && !exclude.iter().any(|e| e == class_name)
}
