//! Model Pool
//!
//! Owns the OpenVINO core and compiles models on first use. Compiled models
//! are shared by every caller; each inference creates its own request.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use ndarray::Array4;
use openvino::{CompiledModel, Core, ElementType, Shape, Tensor};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::config::Config;

use super::detector::ScrfdDetector;
use super::embedder::ArcFaceEmbedder;
use super::object_detector::YoloDetector;
use super::traits::{FaceDetector, FaceEmbedder, ModelProvider, ModelType, ObjectDetector};

/// Wrapper for OpenVINO Core that implements Send + Sync
pub struct SafeCore(Core);
unsafe impl Send for SafeCore {}
unsafe impl Sync for SafeCore {}

impl Deref for SafeCore {
    type Target = Core;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for SafeCore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Wrapper for OpenVINO CompiledModel that implements Send + Sync
#[derive(Clone)]
pub struct SafeCompiledModel(pub Arc<CompiledModel>);
unsafe impl Send for SafeCompiledModel {}
unsafe impl Sync for SafeCompiledModel {}

impl SafeCompiledModel {
    /// Create an inference request.
    /// CompiledModel is thread-safe on the C++ side but the Rust bindings
    /// take `&mut self` here.
    pub fn create_infer_request(&self) -> Result<openvino::InferRequest> {
        unsafe {
            let ptr = Arc::as_ptr(&self.0) as *mut CompiledModel;
            (*ptr).create_infer_request().map_err(|e| e.into())
        }
    }
}

/// Copy an NCHW array into a new f32 input tensor
pub fn tensor_from_array(array: &Array4<f32>) -> Result<Tensor> {
    let dims: Vec<i64> = array.shape().iter().map(|d| *d as i64).collect();
    let shape = Shape::new(&dims)?;
    let mut tensor = Tensor::new(ElementType::F32, &shape)?;

    let data = array.as_slice().context("input array is not contiguous")?;
    unsafe {
        let dst = tensor.get_raw_data_mut()?.as_mut_ptr() as *mut f32;
        std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
    }
    Ok(tensor)
}

/// Read an f32 output tensor along with its dimensions
pub fn read_tensor_f32(tensor: &Tensor) -> Result<(Vec<i64>, Vec<f32>)> {
    let shape = tensor.get_shape()?;
    let dims: Vec<i64> = shape.get_dimensions().to_vec();
    let total: i64 = dims.iter().product();

    let data = unsafe {
        let ptr = tensor.get_raw_data()?.as_ptr() as *const f32;
        std::slice::from_raw_parts(ptr, total as usize).to_vec()
    };
    Ok((dims, data))
}

pub struct ModelPool {
    /// Created on first load so a missing runtime only fails the models
    core: Mutex<Option<SafeCore>>,
    device: String,

    object_detector_path: PathBuf,
    face_detector_path: PathBuf,
    face_embedder_path: PathBuf,

    detection_input_size: u32,
    embedding_dim: usize,

    object_detector: RwLock<Option<SafeCompiledModel>>,
    face_detector: RwLock<Option<SafeCompiledModel>>,
    face_embedder: RwLock<Option<SafeCompiledModel>>,
}

impl ModelPool {
    pub fn new(config: &Config) -> Self {
        Self {
            core: Mutex::new(None),
            device: config.inference.device.clone(),
            object_detector_path: config.models.object_detector.clone(),
            face_detector_path: config.models.face_detector.clone(),
            face_embedder_path: config.models.face_embedder.clone(),
            detection_input_size: config.detection.input_size,
            embedding_dim: config.face.embedding_dim,
            object_detector: RwLock::new(None),
            face_detector: RwLock::new(None),
            face_embedder: RwLock::new(None),
        }
    }

    fn slot(&self, model_type: ModelType) -> (&RwLock<Option<SafeCompiledModel>>, &Path) {
        match model_type {
            ModelType::ObjectDetector => (&self.object_detector, &self.object_detector_path),
            ModelType::FaceDetector => (&self.face_detector, &self.face_detector_path),
            ModelType::FaceEmbedder => (&self.face_embedder, &self.face_embedder_path),
        }
    }

    /// Get or compile a model
    pub fn get_model(&self, model_type: ModelType) -> Result<SafeCompiledModel> {
        let (cache, path) = self.slot(model_type);

        if let Some(compiled) = cache.read().as_ref() {
            return Ok(compiled.clone());
        }

        let mut write_guard = cache.write();
        // Another caller may have loaded it while we waited
        if let Some(compiled) = write_guard.as_ref() {
            return Ok(compiled.clone());
        }

        let path_str = path
            .to_str()
            .with_context(|| format!("model path is not valid UTF-8: {:?}", path))?;
        if !path.exists() {
            anyhow::bail!("model file not found: {}", path.display());
        }

        info!(model = model_type.as_str(), path = %path.display(), device = %self.device, "loading model");
        let start = Instant::now();

        let mut core_guard = self.core.lock();
        if core_guard.is_none() {
            *core_guard = Some(SafeCore(Core::new()?));
        }
        let core = core_guard
            .as_mut()
            .context("OpenVINO core is not initialized")?;

        let model = core.read_model_from_file(path_str, "")?;
        let compiled = core.compile_model(&model, self.device.as_str().into())?;
        let compiled = SafeCompiledModel(Arc::new(compiled));

        info!(model = model_type.as_str(), elapsed = ?start.elapsed(), "model loaded");

        *write_guard = Some(compiled.clone());
        Ok(compiled)
    }
}

impl ModelProvider for ModelPool {
    fn device(&self) -> &str {
        &self.device
    }

    fn object_detector(&self) -> Result<Arc<dyn ObjectDetector>> {
        let model = self.get_model(ModelType::ObjectDetector)?;
        Ok(Arc::new(YoloDetector::new(model, self.detection_input_size)))
    }

    fn face_detector(&self) -> Result<Arc<dyn FaceDetector>> {
        let model = self.get_model(ModelType::FaceDetector)?;
        Ok(Arc::new(ScrfdDetector::new(model)))
    }

    fn face_embedder(&self) -> Result<Arc<dyn FaceEmbedder>> {
        let model = self.get_model(ModelType::FaceEmbedder)?;
        Ok(Arc::new(ArcFaceEmbedder::new(model, self.embedding_dim)))
    }

    fn model_name(&self, model_type: ModelType) -> String {
        let (_, path) = self.slot(model_type);
        model_name_from_path(path)
    }

    fn is_loaded(&self, model_type: ModelType) -> bool {
        self.slot(model_type).0.read().is_some()
    }

    fn unload(&self, model_type: ModelType) {
        let (cache, _) = self.slot(model_type);
        if cache.write().take().is_some() {
            info!(model = model_type.as_str(), "model unloaded");
        }
    }
}

fn model_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
