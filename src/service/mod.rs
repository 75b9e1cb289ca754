//! Service layer module
//!
//! Business logic on top of the engine traits, returning typed results.

pub mod face_recognition;
pub mod object_detection;
pub mod types;
pub mod video_stream;

pub use face_recognition::FaceRecognitionService;
pub use object_detection::ObjectDetectionService;
pub use types::*;
pub use video_stream::{
    failure_message, process_encoded_frame, CameraSummary, FrameInput, FrameOutcome, FrameReport, StreamSession,
    StreamSettings,
};
