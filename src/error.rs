//! Caller-visible error conditions of the inference services

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Stable machine-checkable code carried in error responses
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidImage(_) => "INVALID_IMAGE",
            ServiceError::ModelNotLoaded(_) => "MODEL_NOT_LOADED",
            ServiceError::ModelLoad(_) => "MODEL_LOAD_FAILED",
            ServiceError::Inference(_) => "INFERENCE_FAILED",
            ServiceError::InvalidParameter(_) => "INVALID_PARAMETER",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidImage(_) | ServiceError::InvalidParameter(_)
        )
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ServiceError>() {
            Ok(service_err) => service_err,
            Err(err) => ServiceError::Internal(format!("{:#}", err)),
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("inference task failed: {}", err))
    }
}

impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        if err.is_invalid_input() {
            tonic::Status::invalid_argument(err.to_string())
        } else {
            tonic::Status::internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let status: tonic::Status = ServiceError::InvalidImage("too small".into()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: tonic::Status = ServiceError::Inference("boom".into()).into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_kind() {
        let err = anyhow::Error::new(ServiceError::InvalidImage("bad".into()));
        let back = ServiceError::from(err);
        assert_eq!(back.code(), "INVALID_IMAGE");

        let other = ServiceError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(other.code(), "INTERNAL_ERROR");
    }
}
