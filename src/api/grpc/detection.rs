//! DetectionService handler

use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::error::ServiceError;
use crate::service::ObjectDetectionService;

use super::convert;
use super::proto::detection_service_server::DetectionService;
use super::proto::*;

pub struct DetectionHandler {
    service: Arc<ObjectDetectionService>,
}

impl DetectionHandler {
    pub fn new(service: Arc<ObjectDetectionService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl DetectionService for DetectionHandler {
    async fn detect_objects(
        &self,
        request: Request<DetectRequest>,
    ) -> Result<Response<DetectResponse>, Status> {
        let req = convert::detect_request(request.into_inner());

        let service = self.service.clone();
        let result = tokio::task::spawn_blocking(move || service.detect_objects(&req))
            .await
            .map_err(ServiceError::from)?;

        Ok(Response::new(convert::detect_response(result)))
    }

    async fn detect_objects_batch(
        &self,
        request: Request<DetectBatchRequest>,
    ) -> Result<Response<DetectBatchResponse>, Status> {
        let requests: Vec<_> = request
            .into_inner()
            .requests
            .into_iter()
            .map(convert::detect_request)
            .collect();

        let service = self.service.clone();
        let result = tokio::task::spawn_blocking(move || service.detect_batch(&requests))
            .await
            .map_err(ServiceError::from)?;

        Ok(Response::new(convert::detect_batch_response(result)))
    }

    async fn get_model_info(
        &self,
        _request: Request<ModelInfoRequest>,
    ) -> Result<Response<ModelInfoResponse>, Status> {
        Ok(Response::new(convert::detection_model_info(
            self.service.model_info(),
        )))
    }
}
