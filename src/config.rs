//! Inference service configuration
//!
//! Loaded from a TOML file, with a few environment overrides for the knobs
//! that usually differ between deployments.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub inference: InferenceConfig,
    pub models: ModelsConfig,
    pub detection: DetectionConfig,
    pub face: FaceConfig,
    pub stream: StreamConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub rest_host: String,
    pub rest_port: u16,
    pub grpc_host: String,
    pub grpc_port: u16,
    /// Max concurrent requests served per gRPC connection
    pub grpc_max_workers: usize,
    /// Max encoded/decoded gRPC message size in bytes
    pub grpc_max_message_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub device: String,
    pub num_threads: u32,
    pub warmup_iterations: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub object_detector: PathBuf,
    pub face_detector: PathBuf,
    pub face_embedder: PathBuf,
    /// Class names of the object detector, in model output order
    pub object_classes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub input_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub confidence_threshold: f32,
    pub max_faces: usize,
    /// Images larger than this on their longest side are downscaled
    pub max_image_dimension: u32,
    pub min_face_size: u32,
    pub embedding_dim: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Frames of one camera closer together than this are dropped
    pub min_frame_interval_ms: f64,
    pub fps_window: usize,
    pub metrics_log_interval_secs: u64,
    /// Skip embeddings on streamed frames (detection only)
    pub skip_embedding: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Budget for components without a model-specific one (the gRPC server)
    pub startup_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub parallel_startup: bool,
    pub fail_on_component_error: bool,
    pub health_check_interval_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> String {
        std::env::var("FACEFLOW_CONFIG").unwrap_or_else(|_| "config.toml".to_string())
    }

    /// Apply `FACEFLOW_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = env_parse::<u16>("FACEFLOW_GRPC_PORT") {
            self.server.grpc_port = port;
        }
        if let Some(port) = env_parse::<u16>("FACEFLOW_REST_PORT") {
            self.server.rest_port = port;
        }
        if let Ok(device) = std::env::var("FACEFLOW_DEVICE") {
            if !device.is_empty() {
                self.inference.device = device;
            }
        }
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.grpc_port == 0 || self.server.rest_port == 0 {
            anyhow::bail!("server ports must be non-zero");
        }
        if self.server.grpc_max_workers == 0 {
            anyhow::bail!("server.grpc_max_workers must be at least 1");
        }
        for (name, value) in [
            ("detection.confidence_threshold", self.detection.confidence_threshold),
            ("detection.iou_threshold", self.detection.iou_threshold),
            ("face.confidence_threshold", self.face.confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if self.face.max_faces == 0 {
            anyhow::bail!("face.max_faces must be at least 1");
        }
        if self.stream.min_frame_interval_ms < 0.0 {
            anyhow::bail!("stream.min_frame_interval_ms must not be negative");
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rest_host: "0.0.0.0".to_string(),
            rest_port: 8001,
            grpc_host: "0.0.0.0".to_string(),
            grpc_port: 50051,
            grpc_max_workers: 10,
            grpc_max_message_size: 100 * 1024 * 1024,
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: "CPU".to_string(),
            num_threads: 4,
            warmup_iterations: 3,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            object_detector: PathBuf::from("models/yolov8s.xml"),
            face_detector: PathBuf::from("models/scrfd_10g_kps.onnx"),
            face_embedder: PathBuf::from("models/arcface_r100.onnx"),
            object_classes: [
                "person", "bicycle", "car", "motorcycle", "bus", "truck",
                "backpack", "handbag", "suitcase", "bottle",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
            input_size: 640,
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            max_faces: 10,
            max_image_dimension: 1280,
            min_face_size: 40,
            embedding_dim: 512,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            min_frame_interval_ms: 33.0,
            fps_window: 30,
            metrics_log_interval_secs: 5,
            skip_embedding: false,
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            startup_timeout_secs: 20,
            shutdown_timeout_secs: 10,
            parallel_startup: true,
            fail_on_component_error: false,
            health_check_interval_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            grpc_port = 6000

            [stream]
            min_frame_interval_ms = 100.0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.grpc_port, 6000);
        assert_eq!(config.server.rest_port, 8001);
        assert_eq!(config.stream.min_frame_interval_ms, 100.0);
        assert_eq!(config.stream.fps_window, 30);
        assert!(config.lifecycle.parallel_startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = Config::default();
        config.face.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.face.max_faces = 0;
        assert!(config.validate().is_err());
    }
}
