//! Shared test doubles: model stubs and image helpers
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, RgbImage};

use faceflow::config::FaceConfig;
use faceflow::engine::{
    FaceBox, FaceDetector, FaceEmbedder, ModelProvider, ModelType, ObjectBox, ObjectDetections,
    ObjectDetector,
};
use faceflow::service::FaceRecognitionService;
use faceflow::utils::image::encode_jpeg;

pub const EMBEDDING_DIM: usize = 512;

/// How the stub detector misbehaves once it reaches a given call
#[derive(Debug, Clone, Copy)]
pub enum DetectorFault {
    /// Every call from the nth (1-based) on returns an error
    ErrorFrom(usize),
    /// Only the nth call panics
    PanicAt(usize),
}

pub struct StubFaceDetector {
    pub faces: Vec<FaceBox>,
    pub calls: Arc<AtomicUsize>,
    pub fault: Option<DetectorFault>,
}

impl FaceDetector for StubFaceDetector {
    fn detect(&self, _image: &DynamicImage, threshold: f32) -> anyhow::Result<Vec<FaceBox>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.fault {
            Some(DetectorFault::ErrorFrom(n)) if call >= n => {
                anyhow::bail!("detector exploded on call {}", call)
            }
            Some(DetectorFault::PanicAt(n)) if call == n => {
                panic!("detector crashed on call {}", call)
            }
            _ => {}
        }
        Ok(self
            .faces
            .iter()
            .filter(|f| f.confidence >= threshold)
            .cloned()
            .collect())
    }

    fn input_size(&self) -> (u32, u32) {
        (640, 640)
    }
}

pub struct StubEmbedder;

impl FaceEmbedder for StubEmbedder {
    fn embed_batch(&self, faces: &[DynamicImage]) -> anyhow::Result<Vec<Vec<f32>>> {
        let value = 1.0 / (EMBEDDING_DIM as f32).sqrt();
        Ok(faces.iter().map(|_| vec![value; EMBEDDING_DIM]).collect())
    }

    fn embedding_dim(&self) -> usize {
        EMBEDDING_DIM
    }
}

pub struct StubObjectDetector;

impl ObjectDetector for StubObjectDetector {
    fn detect(&self, _image: &DynamicImage, _conf: f32, _iou: f32) -> anyhow::Result<ObjectDetections> {
        Ok(ObjectDetections {
            boxes: vec![ObjectBox {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
                confidence: 0.9,
                class_id: 0,
            }],
            ..Default::default()
        })
    }

    fn input_size(&self) -> u32 {
        64
    }
}

/// Model provider backed by stubs; counts face detector loads and detect calls
#[derive(Default)]
pub struct StubProvider {
    pub faces: Vec<FaceBox>,
    pub face_loads: AtomicUsize,
    pub fail_face_models: bool,
    /// Sleep before handing out the face detector, like a slow model compile
    pub face_load_delay: Option<Duration>,
    pub detector_fault: Option<DetectorFault>,
    pub detect_calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn with_faces(faces: Vec<FaceBox>) -> Self {
        Self {
            faces,
            ..Default::default()
        }
    }

    pub fn face_loads(&self) -> usize {
        self.face_loads.load(Ordering::SeqCst)
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }
}

impl ModelProvider for StubProvider {
    fn device(&self) -> &str {
        "CPU"
    }

    fn object_detector(&self) -> anyhow::Result<Arc<dyn ObjectDetector>> {
        Ok(Arc::new(StubObjectDetector))
    }

    fn face_detector(&self) -> anyhow::Result<Arc<dyn FaceDetector>> {
        if self.fail_face_models {
            anyhow::bail!("model file not found: models/face.xml");
        }
        if let Some(delay) = self.face_load_delay {
            std::thread::sleep(delay);
        }
        self.face_loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubFaceDetector {
            faces: self.faces.clone(),
            calls: self.detect_calls.clone(),
            fault: self.detector_fault,
        }))
    }

    fn face_embedder(&self) -> anyhow::Result<Arc<dyn FaceEmbedder>> {
        Ok(Arc::new(StubEmbedder))
    }

    fn model_name(&self, model: ModelType) -> String {
        format!("stub_{}", model.as_str())
    }

    fn is_loaded(&self, _model: ModelType) -> bool {
        false
    }

    fn unload(&self, _model: ModelType) {}
}

pub fn face_box(x: f32, y: f32, size: f32, confidence: f32) -> FaceBox {
    FaceBox {
        x1: x,
        y1: y,
        x2: x + size,
        y2: y + size,
        confidence,
        landmarks: [(0.0, 0.0); 5],
    }
}

pub fn face_service(faces: Vec<FaceBox>) -> (Arc<StubProvider>, Arc<FaceRecognitionService>) {
    face_service_with(StubProvider::with_faces(faces))
}

pub fn face_service_with(provider: StubProvider) -> (Arc<StubProvider>, Arc<FaceRecognitionService>) {
    let provider = Arc::new(provider);
    let service = Arc::new(FaceRecognitionService::new(
        provider.clone(),
        FaceConfig::default(),
    ));
    (provider, service)
}

/// A real JPEG with some texture, comfortably above the minimum frame size
pub fn jpeg_frame(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    });
    encode_jpeg(&DynamicImage::ImageRgb8(image), 85).expect("encode test frame")
}
