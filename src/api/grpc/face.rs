//! FaceService handler
//!
//! Pipeline failures come back as `success = false` responses carrying the
//! error message and code. Only a crashed worker task becomes a gRPC status.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::warn;

use crate::error::ServiceError;
use crate::service::{
    failure_message, process_encoded_frame, FaceRecognitionService, FrameOutcome, FrameReport,
};

use super::convert;
use super::proto::face_service_server::FaceService;
use super::proto::*;

const NOT_IMPLEMENTED: &str = "not implemented in this service";

pub struct FaceHandler {
    service: Arc<FaceRecognitionService>,
    skip_embedding: bool,
}

impl FaceHandler {
    pub fn new(service: Arc<FaceRecognitionService>, skip_embedding: bool) -> Self {
        Self {
            service,
            skip_embedding,
        }
    }

    async fn extract(
        &self,
        req: FaceImageRequest,
        default_max_faces: Option<usize>,
    ) -> Result<ExtractEmbeddingsResponse, Status> {
        let mut options = convert::face_options(&req);
        if options.max_faces.is_none() {
            options.max_faces = default_max_faces;
        }
        let camera_id = req.camera_id;

        let service = self.service.clone();
        let cam = camera_id.clone();
        let result = tokio::task::spawn_blocking(move || {
            service.extract_embeddings(&req.image, &cam, &options)
        })
        .await
        .map_err(ServiceError::from)?;

        Ok(match result {
            Ok(result) => convert::embeddings_response(result),
            Err(e) => {
                warn!(camera_id = %camera_id, code = e.code(), "embedding extraction failed: {}", e);
                convert::embeddings_error(&e, camera_id)
            }
        })
    }
}

#[tonic::async_trait]
impl FaceService for FaceHandler {
    async fn detect_faces(
        &self,
        request: Request<FaceImageRequest>,
    ) -> Result<Response<DetectFacesResponse>, Status> {
        let req = request.into_inner();
        let options = convert::face_options(&req);

        let service = self.service.clone();
        let result = tokio::task::spawn_blocking(move || service.detect_faces(&req.image, &options))
            .await
            .map_err(ServiceError::from)?;

        Ok(Response::new(match result {
            Ok(result) => convert::detect_faces_response(result),
            Err(e) => {
                warn!(code = e.code(), "face detection failed: {}", e);
                convert::detect_faces_error(&e)
            }
        }))
    }

    /// Single-face variant: at most one face unless the caller asks for more
    async fn extract_embedding(
        &self,
        request: Request<FaceImageRequest>,
    ) -> Result<Response<ExtractEmbeddingsResponse>, Status> {
        let response = self.extract(request.into_inner(), Some(1)).await?;
        Ok(Response::new(response))
    }

    async fn extract_embeddings(
        &self,
        request: Request<FaceImageRequest>,
    ) -> Result<Response<ExtractEmbeddingsResponse>, Status> {
        let response = self.extract(request.into_inner(), None).await?;
        Ok(Response::new(response))
    }

    async fn get_model_info(
        &self,
        _request: Request<FaceModelInfoRequest>,
    ) -> Result<Response<FaceModelInfoResponse>, Status> {
        Ok(Response::new(convert::face_model_info(self.service.model_info())))
    }

    /// One frame, no throttling
    async fn process_frame(
        &self,
        request: Request<VideoFrameRequest>,
    ) -> Result<Response<VideoFrameResponse>, Status> {
        let frame = convert::frame_input(request.into_inner());

        let service = self.service.clone();
        let skip_embedding = self.skip_embedding;
        let report = tokio::task::spawn_blocking(move || {
            let outcome =
                match process_encoded_frame(&service, &frame.camera_id, &frame.image, skip_embedding) {
                    Ok(result) => FrameOutcome::Processed(result),
                    Err(err) => {
                        warn!(
                            camera_id = %frame.camera_id,
                            frame_id = frame.frame_id,
                            code = err.code(),
                            "{}",
                            failure_message(&err)
                        );
                        FrameOutcome::Failed(err)
                    }
                };
            FrameReport {
                camera_id: frame.camera_id,
                frame_id: frame.frame_id,
                outcome,
            }
        })
        .await
        .map_err(ServiceError::from)?;

        Ok(Response::new(convert::frame_response(report)))
    }

    async fn verify(
        &self,
        _request: Request<VerifyRequest>,
    ) -> Result<Response<VerifyResponse>, Status> {
        Err(Status::unimplemented(NOT_IMPLEMENTED))
    }

    async fn enroll(
        &self,
        _request: Request<EnrollRequest>,
    ) -> Result<Response<EnrollResponse>, Status> {
        Err(Status::unimplemented(NOT_IMPLEMENTED))
    }

    async fn recognize(
        &self,
        _request: Request<RecognizeRequest>,
    ) -> Result<Response<RecognizeResponse>, Status> {
        Err(Status::unimplemented(NOT_IMPLEMENTED))
    }
}
