mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use faceflow::api::grpc::GrpcServices;
use faceflow::api::{create_rest_router, AppState};
use faceflow::config::Config;
use faceflow::engine::ModelProvider;
use faceflow::lifecycle::modules::{register_default_components, GrpcServerComponent};
use faceflow::lifecycle::{
    Component, ComponentRegistry, ComponentState, HealthRegistry, HealthStatus, LifespanManager,
    LifespanOptions, RunState,
};
use faceflow::service::{FaceRecognitionService, ObjectDetectionService, StreamSettings};

use common::StubProvider;

struct App {
    manager: Arc<LifespanManager>,
    router: Router,
}

/// The full component set over stub models, gRPC on an ephemeral port
fn app(provider: StubProvider) -> App {
    let mut config = Config::default();
    config.server.grpc_host = "127.0.0.1".to_string();
    config.server.grpc_port = 0;
    config.inference.warmup_iterations = 1;

    let provider: Arc<dyn ModelProvider> = Arc::new(provider);
    let services = GrpcServices {
        detection: Arc::new(ObjectDetectionService::new(
            provider.clone(),
            config.detection.clone(),
            &config.models,
        )),
        face: Arc::new(FaceRecognitionService::new(provider, config.face.clone())),
        stream: StreamSettings::from(&config.stream),
    };

    let registry = Arc::new(ComponentRegistry::new());
    assert_eq!(register_default_components(&registry, &config, &services).unwrap(), 3);

    let manager = Arc::new(LifespanManager::new(
        registry,
        Arc::new(HealthRegistry::new()),
        LifespanOptions::from(&config.lifecycle),
    ));
    let router = create_rest_router(Arc::new(AppState::new(manager.clone())));
    App { manager, router }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_probes_before_startup() {
    let app = app(StubProvider::default());

    let (status, body) = get(&app.router, "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = get(&app.router, "/health/startup").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "starting");

    let (status, _) = get(&app.router, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Nothing reported yet: unknown, which is not a failure
    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_status"], "unknown");
    assert_eq!(body["run_state"], "not_started");
}

#[tokio::test]
async fn test_healthy_service_lifecycle() {
    let app = app(StubProvider::default());
    let report = app.manager.startup().await.unwrap();
    assert!(report.all_successful, "{:?}", report.failed);
    assert_eq!(
        report.started,
        vec!["detection_model", "face_models", "grpc_server"]
    );

    let grpc = app
        .manager
        .component("grpc_server")
        .expect("grpc server registered");
    assert!(grpc.health_check().await.unwrap());
    let metadata = grpc.metadata();
    assert_ne!(metadata["port"], 0);
    assert_eq!(metadata["services"].as_array().unwrap().len(), 3);

    let (status, _) = get(&app.router, "/health/startup").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get(&app.router, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_status"], "healthy");
    assert_eq!(body["run_state"], "running");
    assert_eq!(body["summary"]["total"], 3);
    assert_eq!(body["summary"]["healthy"], 3);
    assert_eq!(body["components"]["detection_model"]["metadata"]["loaded"], true);
    assert_eq!(body["components"]["face_models"]["status"], "healthy");
    assert_eq!(body["component_metrics"].as_array().unwrap().len(), 3);

    let results = app.manager.check_health().await;
    assert!(results.values().all(|ok| *ok), "{:?}", results);

    app.manager.shutdown().await;
    assert_eq!(app.manager.run_state(), RunState::Stopped);
    assert!(!grpc.health_check().await.unwrap());
    assert_eq!(
        app.manager.health().overall_status(),
        HealthStatus::Unknown
    );
}

#[tokio::test]
async fn test_face_model_failure_degrades_readiness() {
    let app = app(StubProvider {
        fail_face_models: true,
        ..Default::default()
    });

    let report = app.manager.startup().await.unwrap();
    assert!(!report.all_successful);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "face_models");
    // Dependents still start
    assert!(report.started.contains(&"grpc_server".to_string()));
    assert_eq!(
        app.manager.component_state("face_models"),
        Some(ComponentState::Failed)
    );

    let (status, _) = get(&app.router, "/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, body) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["overall_status"], "unhealthy");
    assert!(body["components"]["face_models"]["error_message"]
        .as_str()
        .unwrap()
        .contains("model file not found"));
    // Startup has completed even though it was not clean
    let (status, _) = get(&app.router, "/health/startup").await;
    assert_eq!(status, StatusCode::OK);

    app.manager.shutdown().await;
}

#[tokio::test]
async fn test_grpc_server_shutdown_is_idempotent() {
    let mut config = Config::default().server;
    config.grpc_host = "127.0.0.1".to_string();
    config.grpc_port = 0;

    let provider: Arc<dyn ModelProvider> = Arc::new(StubProvider::default());
    let services = GrpcServices {
        detection: Arc::new(ObjectDetectionService::new(
            provider.clone(),
            Default::default(),
            &Default::default(),
        )),
        face: Arc::new(FaceRecognitionService::new(provider, Default::default())),
        stream: StreamSettings::default(),
    };
    let server = GrpcServerComponent::new(config, services);

    assert!(server.shutdown().await.is_ok());
    server.startup().await.unwrap();
    let addr = server.local_addr().expect("bound address");
    // Already serving: a second startup keeps the same listener
    server.startup().await.unwrap();
    assert_eq!(server.local_addr(), Some(addr));
    assert!(server.is_serving());

    server.shutdown().await.unwrap();
    assert!(!server.is_serving());
    assert!(server.shutdown().await.is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = app(StubProvider::default());
    let (status, body) = get(&app.router, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
