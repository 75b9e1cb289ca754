//! Service types <-> protobuf messages
//!
//! Proto3 scalars cannot be absent, so zero or negative request values mean
//! "use the configured default".

use crate::error::ServiceError;
use crate::service::types as t;
use crate::service::{failure_message, FrameInput, FrameOutcome, FrameReport};

use super::proto;

fn positive_f32(value: f32) -> Option<f32> {
    (value > 0.0).then_some(value)
}

fn positive_usize(value: i32) -> Option<usize> {
    (value > 0).then_some(value as usize)
}

pub fn face_options(req: &proto::FaceImageRequest) -> t::FaceRequestOptions {
    t::FaceRequestOptions {
        confidence_threshold: positive_f32(req.confidence_threshold),
        max_faces: positive_usize(req.max_faces),
        include_crops: req.include_crops,
        max_dimension: positive_usize(req.max_image_dimension).map(|d| d as u32),
    }
}

pub fn face_result(face: t::DetectedFace) -> proto::FaceResult {
    proto::FaceResult {
        r#box: Some(proto::FaceBox {
            x: face.bbox.x,
            y: face.bbox.y,
            w: face.bbox.width,
            h: face.bbox.height,
        }),
        embedding: face.embedding.map(|vector| proto::FaceEmbedding { vector }),
        confidence: face.confidence,
        quality: Some(proto::FaceQuality {
            overall_score: face.quality.overall_score,
            sharpness: face.quality.sharpness,
            brightness: face.quality.brightness,
            face_size_pixels: face.quality.face_size_pixels as i32,
        }),
        face_id: face.face_id.map_or(0, |id| id as i32),
        crop_jpeg: face.crop_jpeg.unwrap_or_default(),
    }
}

pub fn metrics(m: &t::PerformanceMetrics) -> proto::PerformanceMetrics {
    proto::PerformanceMetrics {
        detection_ms: m.detection_ms,
        embedding_ms: m.embedding_ms,
        preprocessing_ms: m.preprocessing_ms,
        total_ms: m.total_ms,
        image_width: m.image_width as i32,
        image_height: m.image_height as i32,
        faces_detected: m.faces_detected as i32,
    }
}

pub fn detect_faces_response(result: t::FaceDetectionResult) -> proto::DetectFacesResponse {
    proto::DetectFacesResponse {
        success: true,
        total_faces: result.faces.len() as i32,
        metrics: Some(metrics(&result.metrics)),
        faces: result.faces.into_iter().map(face_result).collect(),
        time_ms: result.time_ms,
        error_message: String::new(),
        error_code: String::new(),
    }
}

pub fn detect_faces_error(err: &ServiceError) -> proto::DetectFacesResponse {
    proto::DetectFacesResponse {
        success: false,
        error_message: err.to_string(),
        error_code: err.code().to_string(),
        ..Default::default()
    }
}

pub fn embeddings_response(result: t::EmbeddingResult) -> proto::ExtractEmbeddingsResponse {
    proto::ExtractEmbeddingsResponse {
        success: true,
        face_detected: result.face_detected,
        metrics: Some(metrics(&result.metrics)),
        faces: result.faces.into_iter().map(face_result).collect(),
        camera_id: result.camera_id,
        time_ms: result.time_ms,
        error_message: String::new(),
        error_code: String::new(),
    }
}

pub fn embeddings_error(err: &ServiceError, camera_id: String) -> proto::ExtractEmbeddingsResponse {
    proto::ExtractEmbeddingsResponse {
        success: false,
        camera_id,
        error_message: err.to_string(),
        error_code: err.code().to_string(),
        ..Default::default()
    }
}

pub fn face_model_info(info: t::FaceModelInfo) -> proto::FaceModelInfoResponse {
    proto::FaceModelInfoResponse {
        model_name: format!("{}+{}", info.detector_name, info.embedder_name),
        model_version: env!("CARGO_PKG_VERSION").to_string(),
        detector_type: info.detector_type,
        device: info.device,
        input_size: info.input_size as i32,
        embedding_dim: info.embedding_dim as i32,
        is_ready: info.is_ready,
        min_face_size: info.min_face_size as i32,
        confidence_threshold: info.confidence_threshold,
        max_faces: info.max_faces as i32,
    }
}

pub fn frame_input(req: proto::VideoFrameRequest) -> FrameInput {
    FrameInput {
        camera_id: req.camera_id,
        frame_id: req.frame_id,
        timestamp_ms: req.timestamp_ms,
        image: req.image_jpeg,
    }
}

pub fn frame_response(report: FrameReport) -> proto::VideoFrameResponse {
    let mut response = proto::VideoFrameResponse {
        camera_id: report.camera_id,
        frame_id: report.frame_id,
        ..Default::default()
    };

    match report.outcome {
        FrameOutcome::Throttled => {
            response.success = true;
            response.throttled = true;
        }
        FrameOutcome::Failed(err) => {
            response.success = false;
            response.error_message = failure_message(&err);
            response.error_code = err.code().to_string();
        }
        FrameOutcome::Processed(result) => {
            response.success = true;
            response.processing_time_ms = result.time_ms;
            response.total_faces_detected = result.faces.len() as i32;
            response.metrics = Some(metrics(&result.metrics));
            response.faces = result.faces.into_iter().map(face_result).collect();
        }
    }
    response
}

pub fn detect_request(req: proto::DetectRequest) -> t::ObjectDetectionRequest {
    t::ObjectDetectionRequest {
        image: req.image,
        confidence_threshold: positive_f32(req.confidence_threshold),
        iou_threshold: positive_f32(req.iou_threshold),
        target_classes: req.target_classes,
        exclude_classes: req.exclude_classes,
        max_detections: positive_usize(req.max_detections),
        camera_id: req.camera_id,
        request_id: req.request_id,
        timestamp: req.timestamp,
    }
}

pub fn detect_response(r: t::ObjectDetectionResponse) -> proto::DetectResponse {
    proto::DetectResponse {
        success: r.success,
        total_objects: r.total_objects as i32,
        detections: r
            .detections
            .into_iter()
            .map(|d| proto::Detection {
                class_name: d.class_name,
                class_id: d.class_id as i32,
                confidence: d.confidence,
                bbox: Some(proto::BoundingBox {
                    x1: d.bbox.x1,
                    y1: d.bbox.y1,
                    x2: d.bbox.x2,
                    y2: d.bbox.y2,
                    x1_norm: d.bbox.x1_norm,
                    y1_norm: d.bbox.y1_norm,
                    x2_norm: d.bbox.x2_norm,
                    y2_norm: d.bbox.y2_norm,
                }),
                area: d.area,
            })
            .collect(),
        preprocessing_time_ms: r.preprocessing_time_ms,
        inference_time_ms: r.inference_time_ms,
        postprocessing_time_ms: r.postprocessing_time_ms,
        total_time_ms: r.total_time_ms,
        request_id: r.request_id,
        timestamp: r.timestamp,
        image_metadata: r.image_metadata.map(|m| proto::ImageMetadata {
            width: m.width as i32,
            height: m.height as i32,
            channels: m.channels as i32,
        }),
        error_message: r.error_message.unwrap_or_default(),
        error_code: r.error_code.unwrap_or_default(),
    }
}

pub fn detect_batch_response(r: t::BatchDetectionResponse) -> proto::DetectBatchResponse {
    proto::DetectBatchResponse {
        total_detections: r.total_detections as i32,
        success_rate: r.success_rate,
        total_time_ms: r.total_time_ms,
        responses: r.responses.into_iter().map(detect_response).collect(),
    }
}

pub fn detection_model_info(info: t::DetectionModelInfo) -> proto::ModelInfoResponse {
    proto::ModelInfoResponse {
        model_name: info.model_name,
        model_version: info.model_version,
        num_classes: info.classes.len() as i32,
        classes: info.classes,
        device: info.device,
        input_size: info.input_size as i32,
        is_ready: info.is_ready,
    }
}
