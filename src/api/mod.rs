//! API module - gRPC services and HTTP health probes

pub mod dto;
pub mod grpc;
pub mod rest;

pub use rest::{create_rest_router, AppState};
