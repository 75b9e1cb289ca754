//! VideoStreamService handler
//!
//! One task per call runs a sequential loop over the inbound frames and
//! pushes responses into a bounded channel. The frame work itself happens on
//! the blocking pool, one frame at a time.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, error, info};

use crate::service::{CameraSummary, FaceRecognitionService, StreamSession, StreamSettings};

use super::convert;
use super::proto::video_stream_service_server::VideoStreamService;
use super::proto::{VideoFrameRequest, VideoFrameResponse};

const RESPONSE_BUFFER: usize = 16;

pub type FrameResponseSender = mpsc::Sender<Result<VideoFrameResponse, Status>>;

pub struct VideoStreamHandler {
    pipeline: Arc<FaceRecognitionService>,
    settings: StreamSettings,
}

impl VideoStreamHandler {
    pub fn new(pipeline: Arc<FaceRecognitionService>, settings: StreamSettings) -> Self {
        Self { pipeline, settings }
    }
}

#[tonic::async_trait]
impl VideoStreamService for VideoStreamHandler {
    type StreamFramesStream = ReceiverStream<Result<VideoFrameResponse, Status>>;

    async fn stream_frames(
        &self,
        request: Request<Streaming<VideoFrameRequest>>,
    ) -> Result<Response<Self::StreamFramesStream>, Status> {
        let peer = request
            .remote_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(peer = %peer, "video stream opened");

        let inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(RESPONSE_BUFFER);
        let session = StreamSession::new(self.pipeline.clone(), self.settings.clone());

        tokio::spawn(async move {
            run_stream(inbound, tx, session).await;
            info!(peer = %peer, "video stream finished");
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// Drive one streaming call to completion and return the per-camera totals.
///
/// Stops when the inbound stream ends, when the client stops listening, or
/// on a transport error (reported to the client as INTERNAL). Whatever the
/// exit route, the session's final summary is logged.
pub async fn run_stream<S>(
    inbound: S,
    tx: FrameResponseSender,
    session: StreamSession,
) -> Vec<CameraSummary>
where
    S: Stream<Item = Result<VideoFrameRequest, Status>>,
{
    tokio::pin!(inbound);
    let mut session = session;

    loop {
        if tx.is_closed() {
            info!("client disconnected, stopping stream");
            break;
        }

        let request = match inbound.next().await {
            Some(Ok(request)) => request,
            Some(Err(status)) => {
                error!(code = ?status.code(), "video stream failed: {}", status.message());
                let _ = tx
                    .send(Err(Status::internal(format!(
                        "Stream failed: {}",
                        status.message()
                    ))))
                    .await;
                break;
            }
            None => {
                debug!("client finished sending frames");
                break;
            }
        };

        // The client may have gone away while we were waiting for this frame
        if tx.is_closed() {
            info!(frame_id = request.frame_id, "client disconnected, discarding frame");
            break;
        }

        let frame = convert::frame_input(request);
        let mut current = session;
        let joined = tokio::task::spawn_blocking(move || {
            let report = current.handle_frame(frame);
            (current, report)
        })
        .await;

        match joined {
            Ok((returned, report)) => {
                session = returned;
                if tx.send(Ok(convert::frame_response(report))).await.is_err() {
                    info!("client disconnected, stopping stream");
                    break;
                }
            }
            Err(e) => {
                // Panics are contained per frame, so this is a cancelled blocking
                // task. The session went down with it and logged its summary.
                error!("frame processing task failed: {}", e);
                let _ = tx
                    .send(Err(Status::internal(format!("Stream failed: {}", e))))
                    .await;
                return Vec::new();
            }
        }
    }

    session.finish()
}
