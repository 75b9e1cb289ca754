//! Face detector + embedder component

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::lifecycle::component::{Component, ComponentDescriptor, ComponentPriority};
use crate::lifecycle::health::Metadata;
use crate::service::FaceRecognitionService;

use super::blocking::run_blocking_or_undo;

pub const NAME: &str = "face_models";

pub struct FaceModelsComponent {
    service: Arc<FaceRecognitionService>,
}

impl FaceModelsComponent {
    pub fn new(service: Arc<FaceRecognitionService>) -> Self {
        Self { service }
    }

    pub fn descriptor(self: Arc<Self>) -> ComponentDescriptor {
        ComponentDescriptor::from_instance(NAME, self)
            .priority(ComponentPriority::HIGH)
            .startup_timeout(Duration::from_secs(120))
            .shutdown_timeout(Duration::from_secs(15))
    }
}

#[async_trait]
impl Component for FaceModelsComponent {
    /// Loads both models and runs one warmup pass. If startup is abandoned
    /// mid-load, the models are released once the load finishes.
    async fn startup(&self) -> anyhow::Result<()> {
        let service = self.service.clone();
        let abandoned = self.service.clone();
        run_blocking_or_undo(move || service.warmup(), move || abandoned.cleanup()).await??;
        Ok(())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || service.cleanup()).await?;
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(self.service.is_ready())
    }

    fn metadata(&self) -> Metadata {
        let info = self.service.model_info();
        let mut metadata = Metadata::new();
        metadata.insert("detector".into(), Value::from(info.detector_name));
        metadata.insert("embedder".into(), Value::from(info.embedder_name));
        metadata.insert("detector_type".into(), Value::from(info.detector_type));
        metadata.insert("device".into(), Value::from(info.device));
        metadata.insert("embedding_dim".into(), Value::from(info.embedding_dim));
        metadata.insert("ready".into(), Value::from(info.is_ready));
        metadata
    }
}
