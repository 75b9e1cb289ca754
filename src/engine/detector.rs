//! SCRFD Face Detector
//!
//! Anchor-free face detector from InsightFace. Produces boxes and 5-point
//! landmarks in original image coordinates.

use image::{DynamicImage, GenericImageView};
use openvino::InferRequest;
use anyhow::Result;
use tracing::{debug, warn};

use crate::utils::math::{nms, Rect};

use super::pool::{read_tensor_f32, tensor_from_array, SafeCompiledModel};
use super::preprocess::{preprocess_for_detection, ResizeInfo, DETECTOR_INPUT_SIZE};
use super::traits::FaceDetector;

const NMS_THRESHOLD: f32 = 0.4;

/// Face detection result
#[derive(Debug, Clone)]
pub struct FaceBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub landmarks: [(f32, f32); 5],
}

impl FaceBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Landmarks are all zero when the model has no keypoint head
    pub fn has_landmarks(&self) -> bool {
        self.landmarks.iter().any(|(x, y)| *x != 0.0 || *y != 0.0)
    }
}

/// Output layout of an SCRFD export, derived from its output count
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrfdLayout {
    strides: &'static [i32],
    use_kps: bool,
    anchors_per_cell: usize,
}

impl ScrfdLayout {
    fn from_output_count(count: usize) -> Self {
        const THREE: &[i32] = &[8, 16, 32];
        const FIVE: &[i32] = &[8, 16, 32, 64, 128];
        match count {
            6 => Self { strides: THREE, use_kps: false, anchors_per_cell: 2 },
            9 => Self { strides: THREE, use_kps: true, anchors_per_cell: 2 },
            10 => Self { strides: FIVE, use_kps: false, anchors_per_cell: 1 },
            15 => Self { strides: FIVE, use_kps: true, anchors_per_cell: 1 },
            other => {
                warn!(outputs = other, "unknown SCRFD output count, assuming 3 strides with keypoints");
                Self { strides: THREE, use_kps: true, anchors_per_cell: 2 }
            }
        }
    }

    fn fmc(&self) -> usize {
        self.strides.len()
    }
}

pub struct ScrfdDetector {
    model: SafeCompiledModel,
}

impl ScrfdDetector {
    pub fn new(model: SafeCompiledModel) -> Self {
        Self { model }
    }

    fn output_count(request: &InferRequest) -> usize {
        (0..20)
            .take_while(|i| request.get_output_tensor_by_index(*i).is_ok())
            .count()
    }

    fn parse_outputs(
        &self,
        request: &InferRequest,
        resize_info: &ResizeInfo,
        threshold: f32,
    ) -> Result<Vec<FaceBox>> {
        let layout = ScrfdLayout::from_output_count(Self::output_count(request));
        let fmc = layout.fmc();
        let mut boxes = Vec::new();

        for (idx, &stride) in layout.strides.iter().enumerate() {
            let (_, scores) = read_tensor_f32(&request.get_output_tensor_by_index(idx)?)?;
            let (_, bboxes) = read_tensor_f32(&request.get_output_tensor_by_index(idx + fmc)?)?;
            let kps = if layout.use_kps {
                Some(read_tensor_f32(&request.get_output_tensor_by_index(idx + fmc * 2)?)?.1)
            } else {
                None
            };

            let decoded = decode_stride(
                stride,
                layout.anchors_per_cell,
                &scores,
                &bboxes,
                kps.as_deref(),
                threshold,
                resize_info,
            );
            debug!(stride, faces = decoded.len(), "decoded stride");
            boxes.extend(decoded);
        }

        Ok(boxes)
    }
}

impl FaceDetector for ScrfdDetector {
    fn detect(&self, image: &DynamicImage, confidence_threshold: f32) -> Result<Vec<FaceBox>> {
        let resize_info = ResizeInfo::new(image.dimensions(), DETECTOR_INPUT_SIZE);
        let input = tensor_from_array(&preprocess_for_detection(image))?;

        let mut request = self.model.create_infer_request()?;
        request.set_input_tensor(&input)?;
        request.infer()?;

        let candidates = self.parse_outputs(&request, &resize_info, confidence_threshold)?;
        let total = candidates.len();

        let rects: Vec<Rect> = candidates.iter().map(FaceBox::rect).collect();
        let scores: Vec<f32> = candidates.iter().map(|b| b.confidence).collect();
        let faces: Vec<FaceBox> = nms(&rects, &scores, NMS_THRESHOLD)
            .into_iter()
            .map(|i| candidates[i].clone())
            .collect();

        debug!(candidates = total, kept = faces.len(), "face detection finished");
        Ok(faces)
    }

    fn input_size(&self) -> (u32, u32) {
        DETECTOR_INPUT_SIZE
    }
}

/// Decode one stride of SCRFD output. Box predictions are distances
/// (left, top, right, bottom) from the anchor centre in stride units.
fn decode_stride(
    stride: i32,
    anchors_per_cell: usize,
    scores: &[f32],
    bboxes: &[f32],
    kps: Option<&[f32]>,
    threshold: f32,
    resize_info: &ResizeInfo,
) -> Vec<FaceBox> {
    let (input_w, input_h) = (DETECTOR_INPUT_SIZE.0 as i32, DETECTOR_INPUT_SIZE.1 as i32);
    let (feat_w, feat_h) = (input_w / stride, input_h / stride);
    let s = stride as f32;
    let (max_x, max_y) = (
        resize_info.original_width as f32,
        resize_info.original_height as f32,
    );

    let centers = (0..feat_h).flat_map(|y| {
        (0..feat_w).flat_map(move |x| {
            std::iter::repeat((x as f32 * s, y as f32 * s)).take(anchors_per_cell)
        })
    });

    let mut faces = Vec::new();
    for (i, (cx, cy)) in centers.enumerate() {
        let Some(&score) = scores.get(i) else { break };
        if score < threshold {
            continue;
        }
        let Some(d) = bboxes.get(i * 4..i * 4 + 4) else { continue };

        let (x1, y1) = resize_info.to_original(cx - d[0] * s, cy - d[1] * s);
        let (x2, y2) = resize_info.to_original(cx + d[2] * s, cy + d[3] * s);

        let mut landmarks = [(0.0f32, 0.0f32); 5];
        if let Some(k) = kps.and_then(|k| k.get(i * 10..i * 10 + 10)) {
            for (j, landmark) in landmarks.iter_mut().enumerate() {
                *landmark = resize_info.to_original(cx + k[j * 2] * s, cy + k[j * 2 + 1] * s);
            }
        }

        faces.push(FaceBox {
            x1: x1.clamp(0.0, max_x),
            y1: y1.clamp(0.0, max_y),
            x2: x2.clamp(0.0, max_x),
            y2: y2.clamp(0.0, max_y),
            confidence: score,
            landmarks,
        });
    }
    faces
}
