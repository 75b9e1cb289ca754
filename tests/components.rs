mod common;

use std::sync::Arc;
use std::time::Duration;

use faceflow::lifecycle::modules::FaceModelsComponent;
use faceflow::lifecycle::Component;

use common::{face_service_with, StubProvider};

#[tokio::test]
async fn test_face_models_startup_loads_and_warms_up() {
    let (provider, service) = face_service_with(StubProvider::default());
    let component = FaceModelsComponent::new(service.clone());

    component.startup().await.unwrap();
    assert!(service.is_ready());
    assert!(component.health_check().await.unwrap());
    assert_eq!(provider.face_loads(), 1);
    assert_eq!(component.metadata()["ready"], true);

    component.shutdown().await.unwrap();
    assert!(!service.is_ready());
}

#[tokio::test]
async fn test_timed_out_face_model_load_is_released() {
    let (provider, service) = face_service_with(StubProvider {
        face_load_delay: Some(Duration::from_millis(200)),
        ..Default::default()
    });
    let component = Arc::new(FaceModelsComponent::new(service.clone()));

    let attempt = tokio::time::timeout(Duration::from_millis(50), component.startup()).await;
    assert!(attempt.is_err());

    // The load keeps going in the background and is dropped when it lands
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(provider.face_loads(), 1);
    assert!(!service.is_ready());
    assert!(!component.health_check().await.unwrap());
}
