//! Face recognition pipeline
//!
//! Decode, validate, detect, score and (optionally) embed faces. Every call is
//! synchronous and CPU-bound; async callers go through `spawn_blocking`.

use std::sync::Arc;
use std::time::Instant;

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::FaceConfig;
use crate::engine::preprocess::{align_face, crop_face, EMBEDDER_INPUT_SIZE};
use crate::engine::{quality, FaceBox, FaceDetector, FaceEmbedder, ModelProvider, ModelType};
use crate::error::{ServiceError, ServiceResult};
use crate::utils::elapsed_ms;
use crate::utils::image::{decode_image, downscale_to_max, encode_jpeg};

use super::types::*;

/// Larger images are rejected before any processing
const MAX_IMAGE_PIXELS: u64 = 4096 * 4096;

/// Images with a side below this cannot hold a usable face
const MIN_IMAGE_SIDE: u32 = 40;

const CROP_JPEG_QUALITY: u8 = 90;

#[derive(Clone)]
struct FaceModels {
    detector: Arc<dyn FaceDetector>,
    embedder: Arc<dyn FaceEmbedder>,
}

/// What a single pipeline pass should produce
struct PassOptions {
    confidence_threshold: f32,
    max_faces: usize,
    include_crops: bool,
    with_embeddings: bool,
}

struct PassOutput {
    faces: Vec<DetectedFace>,
    detection_ms: f32,
    embedding_ms: f32,
}

pub struct FaceRecognitionService {
    provider: Arc<dyn ModelProvider>,
    config: FaceConfig,
    models: RwLock<Option<FaceModels>>,
}

impl FaceRecognitionService {
    pub fn new(provider: Arc<dyn ModelProvider>, config: FaceConfig) -> Self {
        Self {
            provider,
            config,
            models: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.models.read().is_some()
    }

    /// Load detector and embedder on first use
    fn ensure_models(&self) -> ServiceResult<FaceModels> {
        if let Some(models) = self.models.read().as_ref() {
            return Ok(models.clone());
        }

        let mut guard = self.models.write();
        if let Some(models) = guard.as_ref() {
            return Ok(models.clone());
        }

        let start = Instant::now();
        let detector = self
            .provider
            .face_detector()
            .map_err(|e| ServiceError::ModelLoad(format!("face detector: {:#}", e)))?;
        let embedder = self
            .provider
            .face_embedder()
            .map_err(|e| ServiceError::ModelLoad(format!("face embedder: {:#}", e)))?;

        info!(
            detector = %self.provider.model_name(ModelType::FaceDetector),
            embedder = %self.provider.model_name(ModelType::FaceEmbedder),
            device = %self.provider.device(),
            "Face models loaded in {:.1}ms",
            elapsed_ms(start)
        );

        let models = FaceModels { detector, embedder };
        *guard = Some(models.clone());
        Ok(models)
    }

    /// Detect faces without embeddings
    pub fn detect_faces(
        &self,
        image_data: &[u8],
        options: &FaceRequestOptions,
    ) -> ServiceResult<FaceDetectionResult> {
        let start = Instant::now();
        let models = self.ensure_models()?;

        let prep_start = Instant::now();
        let image = self.load_image(image_data, options.max_dimension)?;
        let preprocessing_ms = elapsed_ms(prep_start);

        let pass = self.run_pass(&models, &image, &self.pass_options(options, false))?;
        let time_ms = elapsed_ms(start);

        Ok(FaceDetectionResult {
            metrics: metrics_for(&image, &pass, preprocessing_ms, time_ms),
            faces: pass.faces,
            time_ms,
        })
    }

    /// Detect faces and compute one embedding per face
    pub fn extract_embeddings(
        &self,
        image_data: &[u8],
        camera_id: &str,
        options: &FaceRequestOptions,
    ) -> ServiceResult<EmbeddingResult> {
        let start = Instant::now();
        let models = self.ensure_models()?;

        let prep_start = Instant::now();
        let image = self.load_image(image_data, options.max_dimension)?;
        let preprocessing_ms = elapsed_ms(prep_start);

        let pass = self.run_pass(&models, &image, &self.pass_options(options, true))?;
        let time_ms = elapsed_ms(start);

        debug!(camera_id = %camera_id, faces = pass.faces.len(), "embeddings extracted");

        Ok(EmbeddingResult {
            face_detected: !pass.faces.is_empty(),
            metrics: metrics_for(&image, &pass, preprocessing_ms, time_ms),
            faces: pass.faces,
            camera_id: camera_id.to_string(),
            time_ms,
        })
    }

    /// Run the pipeline on an already decoded video frame
    pub fn process_frame(
        &self,
        frame: &DynamicImage,
        camera_id: &str,
        confidence_threshold: Option<f32>,
        max_faces: Option<usize>,
        skip_embedding: bool,
    ) -> ServiceResult<FrameResult> {
        let start = Instant::now();
        let models = self.ensure_models()?;

        let options = PassOptions {
            confidence_threshold: confidence_threshold.unwrap_or(self.config.confidence_threshold),
            max_faces: max_faces.unwrap_or(self.config.max_faces),
            include_crops: false,
            with_embeddings: !skip_embedding,
        };
        let mut pass = self.run_pass(&models, frame, &options)?;
        for (id, face) in pass.faces.iter_mut().enumerate() {
            face.face_id = Some(id as u32);
        }
        let time_ms = elapsed_ms(start);

        Ok(FrameResult {
            camera_id: camera_id.to_string(),
            metrics: metrics_for(frame, &pass, 0.0, time_ms),
            faces: pass.faces,
            time_ms,
        })
    }

    /// One detection and one embedding pass on blank images
    pub fn warmup(&self) -> ServiceResult<()> {
        let start = Instant::now();
        let models = self.ensure_models()?;

        models
            .detector
            .detect(&DynamicImage::new_rgb8(640, 480), self.config.confidence_threshold)
            .map_err(|e| ServiceError::Inference(format!("detector warmup: {:#}", e)))?;

        let (w, h) = EMBEDDER_INPUT_SIZE;
        models
            .embedder
            .embed_batch(&[DynamicImage::new_rgb8(w, h)])
            .map_err(|e| ServiceError::Inference(format!("embedder warmup: {:#}", e)))?;

        info!("Face pipeline warmed up in {:.1}ms", elapsed_ms(start));
        Ok(())
    }

    /// Drop the models. Safe to call any number of times.
    pub fn cleanup(&self) {
        let had_models = self.models.write().take().is_some();
        self.provider.unload(ModelType::FaceDetector);
        self.provider.unload(ModelType::FaceEmbedder);
        if had_models {
            info!("Face models released");
        }
    }

    pub fn model_info(&self) -> FaceModelInfo {
        let input_size = self
            .models
            .read()
            .as_ref()
            .map(|m| m.detector.input_size().0)
            .unwrap_or(640);

        FaceModelInfo {
            detector_name: self.provider.model_name(ModelType::FaceDetector),
            embedder_name: self.provider.model_name(ModelType::FaceEmbedder),
            detector_type: "SCRFD".to_string(),
            device: self.provider.device().to_string(),
            input_size,
            embedding_dim: self.config.embedding_dim,
            is_ready: self.is_ready(),
            min_face_size: self.config.min_face_size,
            confidence_threshold: self.config.confidence_threshold,
            max_faces: self.config.max_faces,
        }
    }

    fn pass_options(&self, options: &FaceRequestOptions, with_embeddings: bool) -> PassOptions {
        PassOptions {
            confidence_threshold: options
                .confidence_threshold
                .unwrap_or(self.config.confidence_threshold),
            max_faces: options.max_faces.unwrap_or(self.config.max_faces),
            include_crops: options.include_crops,
            with_embeddings,
        }
    }

    /// Decode, validate and downscale
    fn load_image(&self, data: &[u8], max_dimension: Option<u32>) -> ServiceResult<DynamicImage> {
        if data.is_empty() {
            return Err(ServiceError::InvalidImage("empty image data".to_string()));
        }
        let image = decode_image(data)
            .map_err(|e| ServiceError::InvalidImage(format!("failed to decode image: {}", e)))?;

        validate_dimensions(&image)?;
        Ok(downscale_to_max(
            image,
            max_dimension.unwrap_or(self.config.max_image_dimension),
        ))
    }

    fn run_pass(
        &self,
        models: &FaceModels,
        image: &DynamicImage,
        options: &PassOptions,
    ) -> ServiceResult<PassOutput> {
        let det_start = Instant::now();
        let mut boxes = models
            .detector
            .detect(image, options.confidence_threshold)
            .map_err(|e| ServiceError::Inference(format!("face detection: {:#}", e)))?;

        let min_size = self.config.min_face_size as f32;
        boxes.retain(|b| b.width() >= min_size && b.height() >= min_size);
        boxes.truncate(options.max_faces);

        let mut faces = Vec::with_capacity(boxes.len());
        for face_box in &boxes {
            faces.push(describe_face(image, face_box, options.include_crops)?);
        }
        let detection_ms = elapsed_ms(det_start);

        let mut embedding_ms = 0.0;
        if options.with_embeddings && !boxes.is_empty() {
            let emb_start = Instant::now();
            let embeddings = self.embed_faces(models, image, &boxes)?;
            for (face, embedding) in faces.iter_mut().zip(embeddings) {
                face.embedding = Some(embedding);
            }
            embedding_ms = elapsed_ms(emb_start);
        }

        Ok(PassOutput {
            faces,
            detection_ms,
            embedding_ms,
        })
    }

    /// One embedding per box, in box order
    fn embed_faces(
        &self,
        models: &FaceModels,
        image: &DynamicImage,
        boxes: &[FaceBox],
    ) -> ServiceResult<Vec<Vec<f32>>> {
        let aligned: Vec<DynamicImage> = boxes.iter().map(|b| aligned_crop(image, b)).collect();

        let mut embeddings = models
            .embedder
            .embed_batch(&aligned)
            .map_err(|e| ServiceError::Inference(format!("face embedding: {:#}", e)))?;

        if embeddings.len() != boxes.len() {
            warn!(
                expected = boxes.len(),
                got = embeddings.len(),
                "embedder returned an unexpected number of vectors"
            );
            let dim = models.embedder.embedding_dim();
            embeddings.resize_with(boxes.len(), || vec![0.0; dim]);
        }
        Ok(embeddings)
    }
}

fn validate_dimensions(image: &DynamicImage) -> ServiceResult<()> {
    let (w, h) = image.dimensions();
    if w as u64 * h as u64 > MAX_IMAGE_PIXELS {
        return Err(ServiceError::InvalidImage(format!(
            "image too large: {}x{}",
            w, h
        )));
    }
    if w < MIN_IMAGE_SIDE || h < MIN_IMAGE_SIDE {
        return Err(ServiceError::InvalidImage(format!(
            "image too small: {}x{} (minimum {}px per side)",
            w, h, MIN_IMAGE_SIDE
        )));
    }
    Ok(())
}

fn describe_face(
    image: &DynamicImage,
    face_box: &FaceBox,
    include_crop: bool,
) -> ServiceResult<DetectedFace> {
    let crop = crop_face(image, face_box.x1, face_box.y1, face_box.x2, face_box.y2, 0.0);
    let scores = quality::assess(&crop);

    let crop_jpeg = if include_crop {
        Some(encode_jpeg(&crop, CROP_JPEG_QUALITY).map_err(ServiceError::from)?)
    } else {
        None
    };
    let landmarks = if face_box.has_landmarks() {
        face_box.landmarks.to_vec()
    } else {
        Vec::new()
    };

    Ok(DetectedFace {
        bbox: BoundingBox {
            x: face_box.x1,
            y: face_box.y1,
            width: face_box.width(),
            height: face_box.height(),
        },
        confidence: face_box.confidence,
        quality: FaceQuality {
            overall_score: scores.overall,
            sharpness: scores.sharpness,
            brightness: scores.brightness,
            face_size_pixels: scores.face_size_pixels,
        },
        landmarks,
        crop_jpeg,
        embedding: None,
        face_id: None,
    })
}

/// Landmark-aligned face, or a plain resized crop when alignment is not possible
fn aligned_crop(image: &DynamicImage, face_box: &FaceBox) -> DynamicImage {
    if face_box.has_landmarks() {
        match align_face(image, &face_box.landmarks) {
            Ok(aligned) => return aligned,
            Err(e) => debug!("alignment failed, using crop: {:#}", e),
        }
    }
    let (w, h) = EMBEDDER_INPUT_SIZE;
    crop_face(image, face_box.x1, face_box.y1, face_box.x2, face_box.y2, 0.1)
        .resize_exact(w, h, FilterType::Triangle)
}

fn metrics_for(
    image: &DynamicImage,
    pass: &PassOutput,
    preprocessing_ms: f32,
    total_ms: f32,
) -> PerformanceMetrics {
    PerformanceMetrics {
        detection_ms: pass.detection_ms,
        embedding_ms: pass.embedding_ms,
        preprocessing_ms,
        total_ms,
        image_width: image.width(),
        image_height: image.height(),
        faces_detected: pass.faces.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ObjectDetector;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedDetector(Vec<FaceBox>);

    impl FaceDetector for FixedDetector {
        fn detect(&self, _image: &DynamicImage, threshold: f32) -> anyhow::Result<Vec<FaceBox>> {
            Ok(self.0.iter().filter(|b| b.confidence >= threshold).cloned().collect())
        }

        fn input_size(&self) -> (u32, u32) {
            (640, 640)
        }
    }

    struct ShortEmbedder;

    impl FaceEmbedder for ShortEmbedder {
        // One vector short, to exercise padding
        fn embed_batch(&self, faces: &[DynamicImage]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0; 4]; faces.len().saturating_sub(1)])
        }

        fn embedding_dim(&self) -> usize {
            4
        }
    }

    struct Provider {
        faces: Vec<FaceBox>,
        loads: AtomicUsize,
    }

    impl ModelProvider for Provider {
        fn device(&self) -> &str {
            "CPU"
        }

        fn object_detector(&self) -> anyhow::Result<Arc<dyn ObjectDetector>> {
            anyhow::bail!("not used")
        }

        fn face_detector(&self) -> anyhow::Result<Arc<dyn FaceDetector>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FixedDetector(self.faces.clone())))
        }

        fn face_embedder(&self) -> anyhow::Result<Arc<dyn FaceEmbedder>> {
            Ok(Arc::new(ShortEmbedder))
        }

        fn model_name(&self, model: ModelType) -> String {
            model.as_str().to_string()
        }

        fn is_loaded(&self, _model: ModelType) -> bool {
            false
        }

        fn unload(&self, _model: ModelType) {}
    }

    fn face(x: f32, size: f32, confidence: f32) -> FaceBox {
        FaceBox {
            x1: x,
            y1: 10.0,
            x2: x + size,
            y2: 10.0 + size,
            confidence,
            landmarks: [(0.0, 0.0); 5],
        }
    }

    fn service(faces: Vec<FaceBox>) -> (Arc<Provider>, FaceRecognitionService) {
        let provider = Arc::new(Provider {
            faces,
            loads: AtomicUsize::new(0),
        });
        let svc = FaceRecognitionService::new(provider.clone(), FaceConfig::default());
        (provider, svc)
    }

    fn jpeg(w: u32, h: u32) -> Vec<u8> {
        encode_jpeg(&DynamicImage::new_rgb8(w, h), 80).unwrap()
    }

    #[test]
    fn test_rejects_bad_input() {
        let (_, svc) = service(vec![]);
        let opts = FaceRequestOptions::default();

        let err = svc.detect_faces(&[], &opts).unwrap_err();
        assert_eq!(err.code(), "INVALID_IMAGE");

        let err = svc.detect_faces(b"definitely not an image", &opts).unwrap_err();
        assert_eq!(err.code(), "INVALID_IMAGE");

        let err = svc.detect_faces(&jpeg(30, 200), &opts).unwrap_err();
        assert_eq!(err.code(), "INVALID_IMAGE");
    }

    #[test]
    fn test_no_face_is_success() {
        let (_, svc) = service(vec![]);
        let result = svc
            .extract_embeddings(&jpeg(320, 240), "cam", &FaceRequestOptions::default())
            .unwrap();
        assert!(!result.face_detected);
        assert!(result.faces.is_empty());
        assert_eq!(result.metrics.image_width, 320);
    }

    #[test]
    fn test_small_faces_dropped_and_order_kept() {
        let faces = vec![
            face(10.0, 60.0, 0.95),
            face(100.0, 20.0, 0.99), // below min face size
            face(200.0, 50.0, 0.80),
            face(300.0, 50.0, 0.90),
        ];
        let (_, svc) = service(faces);
        let opts = FaceRequestOptions {
            max_faces: Some(2),
            include_crops: true,
            ..Default::default()
        };

        let result = svc.detect_faces(&jpeg(640, 480), &opts).unwrap();
        assert_eq!(result.faces.len(), 2);
        assert_eq!(result.faces[0].bbox.x, 10.0);
        assert_eq!(result.faces[1].bbox.x, 200.0);
        assert!(result.faces.iter().all(|f| f.embedding.is_none()));
        assert!(result.faces[0].crop_jpeg.as_ref().is_some_and(|c| !c.is_empty()));
        assert_eq!(result.metrics.faces_detected, 2);
    }

    #[test]
    fn test_process_frame_ids_and_embedding_padding() {
        let (provider, svc) = service(vec![face(10.0, 60.0, 0.9), face(200.0, 60.0, 0.9)]);
        let frame = DynamicImage::new_rgb8(640, 480);

        let result = svc.process_frame(&frame, "cam1", None, None, false).unwrap();
        assert_eq!(result.camera_id, "cam1");
        let ids: Vec<_> = result.faces.iter().map(|f| f.face_id).collect();
        assert_eq!(ids, vec![Some(0), Some(1)]);
        assert_eq!(result.faces[0].embedding.as_deref(), Some(&[1.0; 4][..]));
        assert_eq!(result.faces[1].embedding.as_deref(), Some(&[0.0; 4][..]));

        let skipped = svc.process_frame(&frame, "cam1", None, None, true).unwrap();
        assert!(skipped.faces.iter().all(|f| f.embedding.is_none()));
        assert_eq!(skipped.metrics.embedding_ms, 0.0);

        // Models load once
        assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_warmup_and_cleanup() {
        let (provider, svc) = service(vec![]);
        assert!(!svc.is_ready());
        svc.warmup().unwrap();
        assert!(svc.is_ready());
        assert_eq!(svc.model_info().input_size, 640);

        svc.cleanup();
        svc.cleanup();
        assert!(!svc.is_ready());

        svc.warmup().unwrap();
        assert_eq!(provider.loads.load(Ordering::SeqCst), 2);
    }
}
