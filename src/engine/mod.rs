//! Inference engine module
//!
//! OpenVINO backends behind small traits:
//! - Lazy model compilation shared by all callers
//! - SCRFD face detection and ArcFace embedding
//! - YOLOv8 object detection
//! - Face quality scoring

pub mod traits;
pub mod pool;
pub mod detector;
pub mod embedder;
pub mod object_detector;
pub mod preprocess;
pub mod quality;

pub use pool::ModelPool;
pub use traits::{FaceDetector, FaceEmbedder, ModelProvider, ModelType, ObjectDetector};
pub use detector::FaceBox;
pub use object_detector::{ObjectBox, ObjectDetections};
