//! Per-call video stream session
//!
//! Frames arrive in order, possibly from several cameras. Each camera gets
//! its own throttle state and counters; the session lives exactly as long as
//! the streaming call and always logs a final summary per camera.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::StreamConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::utils::image::{decode_image, downscale_to_max};

use super::face_recognition::FaceRecognitionService;
use super::types::FrameResult;

/// Anything shorter cannot be a real JPEG frame
const MIN_FRAME_BYTES: usize = 100;

const UNKNOWN_CAMERA: &str = "unknown";

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub min_frame_interval_ms: f64,
    pub fps_window: usize,
    pub metrics_log_interval: Duration,
    pub skip_embedding: bool,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from(&StreamConfig::default())
    }
}

impl From<&StreamConfig> for StreamSettings {
    fn from(config: &StreamConfig) -> Self {
        Self {
            min_frame_interval_ms: config.min_frame_interval_ms,
            fps_window: config.fps_window.max(2),
            metrics_log_interval: Duration::from_secs(config.metrics_log_interval_secs),
            skip_embedding: config.skip_embedding,
        }
    }
}

/// One incoming frame
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub camera_id: String,
    pub frame_id: i64,
    pub timestamp_ms: i64,
    pub image: Vec<u8>,
}

#[derive(Debug)]
pub enum FrameOutcome {
    /// Arrived too soon after the previous processed frame of its camera
    Throttled,
    Failed(ServiceError),
    Processed(FrameResult),
}

/// Message sent back for a failed frame. Bad input keeps the error's own
/// wording; anything else is reported as a processing failure.
pub fn failure_message(err: &ServiceError) -> String {
    if err.is_invalid_input() {
        err.to_string()
    } else {
        format!("Processing failed: {}", err)
    }
}

#[derive(Debug)]
pub struct FrameReport {
    pub camera_id: String,
    pub frame_id: i64,
    pub outcome: FrameOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSummary {
    pub camera_id: String,
    pub frames_received: u64,
    pub frames_processed: u64,
    /// Throttled plus failed frames
    pub frames_dropped: u64,
    pub frames_failed: u64,
    pub faces_detected: u64,
    pub drop_rate: f64,
    pub average_fps: f64,
    pub avg_processing_ms: f64,
    pub duration_secs: f64,
}

struct CameraSession {
    last_processed_ts: Option<i64>,
    recent: VecDeque<Instant>,
    received: u64,
    processed: u64,
    dropped: u64,
    failed: u64,
    faces: u64,
    total_processing_ms: f64,
    started: Instant,
    last_log: Instant,
}

impl CameraSession {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            last_processed_ts: None,
            recent: VecDeque::new(),
            received: 0,
            processed: 0,
            dropped: 0,
            failed: 0,
            faces: 0,
            total_processing_ms: 0.0,
            started: now,
            last_log: now,
        }
    }

    /// True when the frame must be dropped. Otherwise the timestamp becomes
    /// the camera's reference point.
    fn throttle(&mut self, timestamp_ms: i64, min_interval_ms: f64) -> bool {
        if let Some(last) = self.last_processed_ts {
            let elapsed = timestamp_ms.saturating_sub(last) as f64;
            if elapsed < min_interval_ms {
                return true;
            }
        }
        self.last_processed_ts = Some(timestamp_ms);
        false
    }

    fn record_processed(&mut self, faces: usize, processing_ms: f64, window: usize) {
        self.processed += 1;
        self.faces += faces as u64;
        self.total_processing_ms += processing_ms;

        self.recent.push_back(Instant::now());
        while self.recent.len() > window {
            self.recent.pop_front();
        }
    }

    /// Frames per second over the rolling window
    fn current_fps(&self) -> f64 {
        match (self.recent.front(), self.recent.back()) {
            (Some(oldest), Some(newest)) => {
                let span = newest.duration_since(*oldest).as_secs_f64();
                if span > 0.0 {
                    self.recent.len() as f64 / span
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    fn avg_processing_ms(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.total_processing_ms / self.processed as f64
        }
    }

    fn summary(&self, camera_id: &str) -> CameraSummary {
        let received = self.received;
        let duration_secs = self.started.elapsed().as_secs_f64();
        CameraSummary {
            camera_id: camera_id.to_string(),
            frames_received: received,
            frames_processed: self.processed,
            frames_dropped: self.dropped,
            frames_failed: self.failed,
            faces_detected: self.faces,
            drop_rate: if received == 0 {
                0.0
            } else {
                self.dropped as f64 / received as f64
            },
            average_fps: if duration_secs > 0.0 {
                self.processed as f64 / duration_secs
            } else {
                0.0
            },
            avg_processing_ms: self.avg_processing_ms(),
            duration_secs,
        }
    }
}

/// State of one streaming call
pub struct StreamSession {
    pipeline: Arc<FaceRecognitionService>,
    settings: StreamSettings,
    cameras: HashMap<String, CameraSession>,
    finished: bool,
}

impl StreamSession {
    pub fn new(pipeline: Arc<FaceRecognitionService>, settings: StreamSettings) -> Self {
        Self {
            pipeline,
            settings,
            cameras: HashMap::new(),
            finished: false,
        }
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Throttle, decode and process one frame. Blocking.
    pub fn handle_frame(&mut self, frame: FrameInput) -> FrameReport {
        let camera_id = if frame.camera_id.is_empty() {
            UNKNOWN_CAMERA.to_string()
        } else {
            frame.camera_id
        };
        let frame_id = frame.frame_id;
        let settings = &self.settings;
        let camera = self
            .cameras
            .entry(camera_id.clone())
            .or_insert_with(CameraSession::new);
        camera.received += 1;

        if camera.throttle(frame.timestamp_ms, settings.min_frame_interval_ms) {
            camera.dropped += 1;
            return FrameReport {
                camera_id,
                frame_id,
                outcome: FrameOutcome::Throttled,
            };
        }

        let pipeline = &self.pipeline;
        let processed = panic::catch_unwind(AssertUnwindSafe(|| {
            process_encoded_frame(pipeline, &camera_id, &frame.image, settings.skip_embedding)
        }))
        .unwrap_or_else(|payload| {
            Err(ServiceError::Internal(format!(
                "frame processing panicked: {}",
                panic_message(payload.as_ref())
            )))
        });

        let outcome = match processed {
            Ok(result) => {
                camera.record_processed(
                    result.faces.len(),
                    result.time_ms as f64,
                    settings.fps_window,
                );
                FrameOutcome::Processed(result)
            }
            Err(err) => {
                warn!(camera_id = %camera_id, frame_id, code = err.code(), "{}", failure_message(&err));
                camera.dropped += 1;
                camera.failed += 1;
                FrameOutcome::Failed(err)
            }
        };

        if camera.last_log.elapsed() >= settings.metrics_log_interval {
            info!(
                camera_id = %camera_id,
                fps = format_args!("{:.1}", camera.current_fps()),
                avg_ms = format_args!("{:.1}", camera.avg_processing_ms()),
                processed = camera.processed,
                dropped = camera.dropped,
                "stream metrics"
            );
            camera.last_log = Instant::now();
        }

        FrameReport {
            camera_id,
            frame_id,
            outcome,
        }
    }

    /// Per-camera totals, ordered by camera id
    pub fn summaries(&self) -> Vec<CameraSummary> {
        let mut summaries: Vec<_> = self
            .cameras
            .iter()
            .map(|(id, camera)| camera.summary(id))
            .collect();
        summaries.sort_by(|a, b| a.camera_id.cmp(&b.camera_id));
        summaries
    }

    /// Log the final summary of every camera. Only the first call logs.
    pub fn finish(&mut self) -> Vec<CameraSummary> {
        let summaries = self.summaries();
        if !self.finished {
            self.finished = true;
            for s in &summaries {
                info!(
                    camera_id = %s.camera_id,
                    frames = s.frames_received,
                    processed = s.frames_processed,
                    dropped = s.frames_dropped,
                    failed = s.frames_failed,
                    faces = s.faces_detected,
                    drop_rate = format_args!("{:.1}%", s.drop_rate * 100.0),
                    avg_fps = format_args!("{:.1}", s.average_fps),
                    duration_secs = format_args!("{:.1}", s.duration_secs),
                    "stream closed"
                );
            }
        }
        summaries
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Decode one JPEG frame and run the face pipeline on it. Short or
/// undecodable frames are `InvalidImage`.
pub fn process_encoded_frame(
    pipeline: &FaceRecognitionService,
    camera_id: &str,
    data: &[u8],
    skip_embedding: bool,
) -> ServiceResult<FrameResult> {
    if data.len() < MIN_FRAME_BYTES {
        return Err(ServiceError::InvalidImage(format!(
            "failed to decode JPEG frame: {} bytes is too short",
            data.len()
        )));
    }
    let image = decode_image(data).map_err(|e| {
        ServiceError::InvalidImage(format!("failed to decode JPEG frame: {}", e))
    })?;
    let image = downscale_to_max(image, pipeline.config().max_image_dimension);

    pipeline.process_frame(&image, camera_id, None, None, skip_embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_always_passes_throttle() {
        let mut camera = CameraSession::new();
        assert!(!camera.throttle(0, 33.0));
        assert!(camera.throttle(10, 33.0));
        assert!(!camera.throttle(50, 33.0));
        // Reference point only moves on processed frames
        assert!(camera.throttle(80, 33.0));
        assert!(!camera.throttle(83, 33.0));
    }

    #[test]
    fn test_zero_interval_never_throttles() {
        let mut camera = CameraSession::new();
        assert!(!camera.throttle(5, 0.0));
        assert!(!camera.throttle(5, 0.0));
    }

    #[test]
    fn test_window_is_bounded() {
        let mut camera = CameraSession::new();
        for _ in 0..50 {
            camera.record_processed(1, 2.0, 30);
        }
        assert_eq!(camera.recent.len(), 30);
        assert_eq!(camera.processed, 50);
        assert!((camera.avg_processing_ms() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_failure_message_by_kind() {
        let bad = ServiceError::InvalidImage("failed to decode JPEG frame: 3 bytes is too short".into());
        assert_eq!(
            failure_message(&bad),
            "invalid image: failed to decode JPEG frame: 3 bytes is too short"
        );
        let broken = ServiceError::Inference("detector exploded".into());
        assert_eq!(
            failure_message(&broken),
            "Processing failed: inference failed: detector exploded"
        );
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload = panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static text");
        let payload = panic::catch_unwind(|| panic!("frame {}", 7)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "frame 7");
    }

    #[test]
    fn test_summary_accounting() {
        let mut camera = CameraSession::new();
        camera.received = 4;
        camera.record_processed(2, 10.0, 30);
        camera.dropped = 3;
        camera.failed = 1;

        let s = camera.summary("cam");
        assert_eq!(s.frames_received, 4);
        assert_eq!(s.frames_processed + s.frames_dropped, s.frames_received);
        assert!((s.drop_rate - 0.75).abs() < 1e-9);
        assert_eq!(s.faces_detected, 2);
    }
}
