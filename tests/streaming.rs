mod common;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tonic::{Code, Status};

use faceflow::api::grpc::proto::{VideoFrameRequest, VideoFrameResponse};
use faceflow::api::grpc::run_stream;
use faceflow::service::{CameraSummary, StreamSession, StreamSettings};

use common::{face_box, face_service, face_service_with, jpeg_frame, DetectorFault, StubProvider};

fn frame(camera_id: &str, frame_id: i64, timestamp_ms: i64, image: Vec<u8>) -> Result<VideoFrameRequest, Status> {
    Ok(VideoFrameRequest {
        camera_id: camera_id.to_string(),
        frame_id,
        timestamp_ms,
        image_jpeg: image,
    })
}

type Emitted = (Vec<Result<VideoFrameResponse, Status>>, Vec<CameraSummary>);

/// Feed `items` through a streaming call and collect everything it emitted
async fn run(items: Vec<Result<VideoFrameRequest, Status>>, faces: Vec<faceflow::engine::FaceBox>) -> Emitted {
    let (_, pipeline) = face_service(faces);
    drive(items, pipeline).await
}

async fn run_with(
    items: Vec<Result<VideoFrameRequest, Status>>,
    provider: StubProvider,
) -> (Emitted, Arc<StubProvider>) {
    let (provider, pipeline) = face_service_with(provider);
    (drive(items, pipeline).await, provider)
}

async fn drive(
    items: Vec<Result<VideoFrameRequest, Status>>,
    pipeline: Arc<faceflow::service::FaceRecognitionService>,
) -> Emitted {
    let session = StreamSession::new(pipeline, StreamSettings::default());
    let (tx, mut rx) = mpsc::channel(64);

    let summaries = run_stream(tokio_stream::iter(items), tx, session).await;

    let mut responses = Vec::new();
    while let Some(item) = rx.recv().await {
        responses.push(item);
    }
    (responses, summaries)
}

fn ok(response: &Result<VideoFrameResponse, Status>) -> &VideoFrameResponse {
    response.as_ref().expect("expected a frame response")
}

#[tokio::test]
async fn test_throttle_scenario() {
    let image = jpeg_frame(320, 240);
    let (responses, summaries) = run(
        vec![
            frame("cam1", 1, 0, image.clone()),
            frame("cam1", 2, 10, image.clone()),
            frame("cam1", 3, 50, image),
        ],
        vec![],
    )
    .await;

    assert_eq!(responses.len(), 3);
    let flags: Vec<bool> = responses.iter().map(|r| ok(r).throttled).collect();
    assert_eq!(flags, vec![false, true, false]);

    let throttled = ok(&responses[1]);
    assert!(throttled.success);
    assert!(throttled.faces.is_empty());
    assert_eq!(throttled.processing_time_ms, 0.0);
    assert_eq!(throttled.frame_id, 2);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].camera_id, "cam1");
    assert_eq!(summaries[0].frames_processed, 2);
    assert_eq!(summaries[0].frames_dropped, 1);
    assert_eq!(summaries[0].frames_received, 3);
}

#[tokio::test]
async fn test_corrupt_frames_do_not_end_the_stream() {
    let (responses, summaries) = run(
        vec![
            frame("cam1", 1, 0, vec![0xFF, 0xD8, 0x00]),
            frame("cam1", 2, 100, vec![0xAB; 500]),
            frame("cam1", 3, 200, jpeg_frame(320, 240)),
        ],
        vec![],
    )
    .await;

    assert_eq!(responses.len(), 3);
    for response in &responses[..2] {
        let response = ok(response);
        assert!(!response.success);
        assert!(!response.throttled);
        assert_eq!(response.camera_id, "cam1");
        assert_eq!(response.error_code, "INVALID_IMAGE");
        assert!(response.error_message.contains("failed to decode JPEG frame"));
    }
    assert_eq!(ok(&responses[0]).frame_id, 1);
    assert!(ok(&responses[2]).success);

    let s = &summaries[0];
    assert_eq!(s.frames_processed, 1);
    assert_eq!(s.frames_failed, 2);
    assert_eq!(s.frames_processed + s.frames_dropped, s.frames_received);
}

#[tokio::test]
async fn test_faces_and_accounting_per_camera() {
    let faces = vec![face_box(10.0, 10.0, 60.0, 0.9), face_box(150.0, 60.0, 80.0, 0.95)];
    let image = jpeg_frame(320, 240);
    let (responses, summaries) = run(
        vec![
            frame("a", 1, 0, image.clone()),
            frame("b", 1, 0, image.clone()),
            frame("a", 2, 20, image.clone()),
            frame("b", 2, 40, image.clone()),
            frame("a", 3, 40, image),
        ],
        faces,
    )
    .await;

    assert_eq!(responses.len(), 5);
    let first = ok(&responses[0]);
    assert!(first.success);
    assert_eq!(first.total_faces_detected, 2);
    let ids: Vec<i32> = first.faces.iter().map(|f| f.face_id).collect();
    assert_eq!(ids, vec![0, 1]);
    assert!(first
        .faces
        .iter()
        .all(|f| f.embedding.as_ref().is_some_and(|e| e.vector.len() == common::EMBEDDING_DIM)));
    let metrics = first.metrics.as_ref().expect("metrics");
    assert_eq!(metrics.image_width, 320);
    assert_eq!(metrics.image_height, 240);
    assert_eq!(metrics.faces_detected, 2);

    // a: 0 processed, 20 throttled, 40 processed. b: 0 and 40 processed
    let a = summaries.iter().find(|s| s.camera_id == "a").expect("camera a");
    let b = summaries.iter().find(|s| s.camera_id == "b").expect("camera b");
    assert_eq!((a.frames_processed, a.frames_dropped), (2, 1));
    assert_eq!((b.frames_processed, b.frames_dropped), (2, 0));
    assert_eq!(a.faces_detected, 4);
    for s in &summaries {
        assert_eq!(s.frames_processed + s.frames_dropped, s.frames_received);
    }
}

#[tokio::test]
async fn test_transport_error_aborts_with_internal() {
    let (responses, summaries) = run(
        vec![
            frame("cam1", 1, 0, jpeg_frame(320, 240)),
            Err(Status::unavailable("connection reset")),
            frame("cam1", 2, 100, jpeg_frame(320, 240)),
        ],
        vec![],
    )
    .await;

    assert_eq!(responses.len(), 2);
    assert!(ok(&responses[0]).success);
    let status = responses[1].as_ref().expect_err("expected a status");
    assert_eq!(status.code(), Code::Internal);
    assert!(status.message().starts_with("Stream failed"));

    // The frame after the error is never consumed
    assert_eq!(summaries[0].frames_received, 1);
}

#[tokio::test]
async fn test_stops_when_client_is_gone() {
    let (_, pipeline) = face_service(vec![]);
    let session = StreamSession::new(pipeline, StreamSettings::default());
    let (tx, rx) = mpsc::channel(4);
    drop(rx);

    let summaries = run_stream(
        tokio_stream::iter(vec![frame("cam1", 1, 0, jpeg_frame(320, 240))]),
        tx,
        session,
    )
    .await;
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn test_frame_after_disconnect_is_not_processed() {
    let (provider, pipeline) = face_service_with(StubProvider::default());
    let session = StreamSession::new(pipeline, StreamSettings::default());
    let (tx, rx) = mpsc::channel(4);

    // The client hangs up while frame 2 is in flight
    let mut receiver = Some(rx);
    let image = jpeg_frame(320, 240);
    let inbound = tokio_stream::iter(vec![
        frame("cam1", 1, 0, image.clone()),
        frame("cam1", 2, 100, image.clone()),
        frame("cam1", 3, 200, image),
    ])
    .map(move |item| {
        if item.as_ref().is_ok_and(|f| f.frame_id == 2) {
            receiver.take();
        }
        item
    });

    let summaries = run_stream(inbound, tx, session).await;

    assert_eq!(provider.detect_calls(), 1);
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].frames_received, 1);
    assert_eq!(summaries[0].frames_processed, 1);
}

#[tokio::test]
async fn test_processing_error_is_reported_per_frame() {
    let image = jpeg_frame(320, 240);
    let ((responses, summaries), provider) = run_with(
        vec![
            frame("cam1", 1, 0, image.clone()),
            frame("cam1", 2, 100, image.clone()),
            frame("cam1", 3, 200, image.clone()),
            frame("cam1", 4, 210, image),
        ],
        StubProvider {
            detector_fault: Some(DetectorFault::ErrorFrom(2)),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(responses.len(), 4);
    assert!(ok(&responses[0]).success);
    for response in &responses[1..3] {
        let response = ok(response);
        assert!(!response.success);
        assert!(!response.throttled);
        assert_eq!(response.error_code, "INFERENCE_FAILED");
        assert!(
            response.error_message.starts_with("Processing failed: inference failed"),
            "{}",
            response.error_message
        );
    }
    // Still answered, and still throttled against the failed frame's timestamp
    let last = ok(&responses[3]);
    assert_eq!(last.frame_id, 4);
    assert!(last.throttled);

    assert_eq!(provider.detect_calls(), 3);
    let s = &summaries[0];
    assert_eq!(s.frames_received, 4);
    assert_eq!(s.frames_processed, 1);
    assert_eq!(s.frames_failed, 2);
    assert_eq!(s.frames_dropped, 3);
    assert_eq!(s.frames_processed + s.frames_dropped, s.frames_received);
}

#[tokio::test]
async fn test_panicking_frame_keeps_the_session() {
    let image = jpeg_frame(320, 240);
    let ((responses, summaries), _) = run_with(
        vec![
            frame("a", 1, 0, image.clone()),
            frame("b", 1, 0, image.clone()),
            frame("a", 2, 100, image.clone()),
            frame("b", 2, 100, image.clone()),
            frame("a", 3, 200, image),
        ],
        StubProvider {
            detector_fault: Some(DetectorFault::PanicAt(3)),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(responses.len(), 5);
    let crashed = ok(&responses[2]);
    assert_eq!((crashed.camera_id.as_str(), crashed.frame_id), ("a", 2));
    assert!(!crashed.success);
    assert_eq!(crashed.error_code, "INTERNAL_ERROR");
    assert!(crashed.error_message.starts_with("Processing failed"));
    assert!(crashed.error_message.contains("detector crashed on call 3"));
    assert!(ok(&responses[3]).success);
    assert!(ok(&responses[4]).success);

    assert_eq!(summaries.len(), 2);
    let a = summaries.iter().find(|s| s.camera_id == "a").expect("camera a");
    assert_eq!((a.frames_received, a.frames_processed, a.frames_failed), (3, 2, 1));
    let b = summaries.iter().find(|s| s.camera_id == "b").expect("camera b");
    assert_eq!((b.frames_received, b.frames_processed), (2, 2));
}

#[tokio::test]
async fn test_missing_camera_id_is_unknown() {
    let (responses, summaries) = run(vec![frame("", 9, 0, jpeg_frame(320, 240))], vec![]).await;
    assert_eq!(ok(&responses[0]).camera_id, "unknown");
    assert_eq!(summaries[0].camera_id, "unknown");
}
