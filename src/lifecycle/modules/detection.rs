//! Object detection model component

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::ModelType;
use crate::lifecycle::component::{Component, ComponentDescriptor, ComponentPriority};
use crate::lifecycle::health::Metadata;
use crate::service::ObjectDetectionService;

use super::blocking::run_blocking_or_undo;

pub const NAME: &str = "detection_model";

pub struct DetectionModelComponent {
    service: Arc<ObjectDetectionService>,
    warmup_iterations: u32,
    warmup_completed: AtomicBool,
}

impl DetectionModelComponent {
    pub fn new(service: Arc<ObjectDetectionService>, warmup_iterations: u32) -> Self {
        Self {
            service,
            warmup_iterations,
            warmup_completed: AtomicBool::new(false),
        }
    }

    pub fn descriptor(self: Arc<Self>) -> ComponentDescriptor {
        ComponentDescriptor::from_instance(NAME, self)
            .priority(ComponentPriority::HIGH)
            .startup_timeout(Duration::from_secs(90))
            .shutdown_timeout(Duration::from_secs(15))
    }
}

#[async_trait]
impl Component for DetectionModelComponent {
    async fn startup(&self) -> anyhow::Result<()> {
        let service = self.service.clone();
        let abandoned = self.service.clone();
        run_blocking_or_undo(move || service.load(), move || abandoned.unload()).await??;

        // A model that loads but fails warmup still serves requests
        let service = self.service.clone();
        let abandoned = self.service.clone();
        let iterations = self.warmup_iterations;
        match run_blocking_or_undo(move || service.warmup(iterations), move || abandoned.unload())
            .await?
        {
            Ok(()) => self.warmup_completed.store(true, Ordering::SeqCst),
            Err(e) => {
                warn!("object detector warmup failed: {}", e);
                self.warmup_completed.store(false, Ordering::SeqCst);
            }
        }

        info!(model = %self.service.model_info().model_name, "detection model ready");
        Ok(())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        self.service.unload();
        self.warmup_completed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(self.service.is_loaded())
    }

    fn metadata(&self) -> Metadata {
        let info = self.service.model_info();
        let mut metadata = Metadata::new();
        metadata.insert("model_type".into(), Value::from(ModelType::ObjectDetector.as_str()));
        metadata.insert("model_name".into(), Value::from(info.model_name));
        metadata.insert("device".into(), Value::from(info.device));
        metadata.insert("num_classes".into(), Value::from(info.classes.len()));
        metadata.insert("loaded".into(), Value::from(info.is_ready));
        metadata.insert("warmup_iterations".into(), Value::from(self.warmup_iterations));
        metadata.insert(
            "warmup_completed".into(),
            Value::from(self.warmup_completed.load(Ordering::SeqCst)),
        );
        metadata
    }
}
