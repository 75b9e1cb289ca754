//! Face recognition and object detection inference service
//!
//! gRPC inference APIs and HTTP health probes, with models and servers run
//! as dependency-ordered lifecycle components.

pub mod api;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod service;
pub mod utils;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
