//! gRPC services
//!
//! Detection, Face and VideoStream handlers over the generated `inference`
//! package, assembled into one tonic router.

use std::sync::Arc;

use tonic::transport::server::Router;
use tonic::transport::Server;

use crate::config::ServerConfig;
use crate::service::{FaceRecognitionService, ObjectDetectionService, StreamSettings};

// Include generated protobuf code
pub mod proto {
    include!("../../proto/inference.rs");
}

pub mod convert;
pub mod detection;
pub mod face;
pub mod video_stream;

pub use detection::DetectionHandler;
pub use face::FaceHandler;
pub use video_stream::{run_stream, VideoStreamHandler};

use proto::detection_service_server::DetectionServiceServer;
use proto::face_service_server::FaceServiceServer;
use proto::video_stream_service_server::VideoStreamServiceServer;

/// Fully qualified names of the served services
pub const SERVICE_NAMES: [&str; 3] = [
    "inference.DetectionService",
    "inference.FaceService",
    "inference.VideoStreamService",
];

/// Everything the handlers need
#[derive(Clone)]
pub struct GrpcServices {
    pub detection: Arc<ObjectDetectionService>,
    pub face: Arc<FaceRecognitionService>,
    pub stream: StreamSettings,
}

/// Build the router with message size and per-connection concurrency limits
pub fn build_router(services: &GrpcServices, config: &ServerConfig) -> Router {
    let max_message = config.grpc_max_message_size;

    let detection = DetectionServiceServer::new(DetectionHandler::new(services.detection.clone()))
        .max_decoding_message_size(max_message)
        .max_encoding_message_size(max_message);
    let face = FaceServiceServer::new(FaceHandler::new(
        services.face.clone(),
        services.stream.skip_embedding,
    ))
    .max_decoding_message_size(max_message)
    .max_encoding_message_size(max_message);
    let stream = VideoStreamServiceServer::new(VideoStreamHandler::new(
        services.face.clone(),
        services.stream.clone(),
    ))
    .max_decoding_message_size(max_message)
    .max_encoding_message_size(max_message);

    Server::builder()
        .concurrency_limit_per_connection(config.grpc_max_workers)
        .add_service(detection)
        .add_service(face)
        .add_service(stream)
}
