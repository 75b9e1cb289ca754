//! YOLOv8 Object Detector
//!
//! Output is `[1, 4 + num_classes, num_anchors]` (or its transpose), with
//! boxes as centre/size in input pixels followed by per-class scores.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use anyhow::{bail, Result};
use tracing::debug;

use crate::utils::math::{nms, Rect};

use super::pool::{read_tensor_f32, tensor_from_array, SafeCompiledModel};
use super::preprocess::{preprocess_for_yolo, ResizeInfo};
use super::traits::ObjectDetector;

/// Single detection in original image coordinates
#[derive(Debug, Clone)]
pub struct ObjectBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl ObjectBox {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.x2, self.y2)
    }
}

/// Detections plus the time spent in each stage
#[derive(Debug, Clone, Default)]
pub struct ObjectDetections {
    pub boxes: Vec<ObjectBox>,
    pub preprocess_ms: f32,
    pub inference_ms: f32,
    pub postprocess_ms: f32,
}

pub struct YoloDetector {
    model: SafeCompiledModel,
    input_size: u32,
}

impl YoloDetector {
    pub fn new(model: SafeCompiledModel, input_size: u32) -> Self {
        Self { model, input_size }
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
        iou_threshold: f32,
    ) -> Result<ObjectDetections> {
        let start = Instant::now();
        let resize_info = ResizeInfo::new(image.dimensions(), (self.input_size, self.input_size));
        let input = tensor_from_array(&preprocess_for_yolo(image, self.input_size))?;
        let preprocess_ms = start.elapsed().as_secs_f32() * 1000.0;

        let start = Instant::now();
        let mut request = self.model.create_infer_request()?;
        request.set_input_tensor(&input)?;
        request.infer()?;
        let (dims, output) = read_tensor_f32(&request.get_output_tensor_by_index(0)?)?;
        let inference_ms = start.elapsed().as_secs_f32() * 1000.0;

        let start = Instant::now();
        let candidates = decode_output(&dims, &output, confidence_threshold, &resize_info)?;
        let boxes = class_aware_nms(candidates, iou_threshold);
        let postprocess_ms = start.elapsed().as_secs_f32() * 1000.0;

        debug!(objects = boxes.len(), "object detection finished");
        Ok(ObjectDetections {
            boxes,
            preprocess_ms,
            inference_ms,
            postprocess_ms,
        })
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }
}

/// Turn raw YOLO output into thresholded candidates
pub fn decode_output(
    dims: &[i64],
    output: &[f32],
    confidence_threshold: f32,
    resize_info: &ResizeInfo,
) -> Result<Vec<ObjectBox>> {
    let (rows, cols) = match dims {
        [1, a, b] | [a, b] => (*a as usize, *b as usize),
        _ => bail!("unexpected YOLO output shape {:?}", dims),
    };
    // Attributes are the short axis: 4 box values plus class scores
    let (attrs, anchors, transposed) = if rows <= cols {
        (rows, cols, false)
    } else {
        (cols, rows, true)
    };
    if attrs <= 4 || output.len() < attrs * anchors {
        bail!("YOLO output too small: {:?}", dims);
    }
    let at = |attr: usize, anchor: usize| -> f32 {
        if transposed {
            output[anchor * attrs + attr]
        } else {
            output[attr * anchors + anchor]
        }
    };

    let (max_x, max_y) = (
        resize_info.original_width as f32,
        resize_info.original_height as f32,
    );
    let mut boxes = Vec::new();
    for anchor in 0..anchors {
        let (class_id, confidence) = (4..attrs)
            .map(|attr| (attr - 4, at(attr, anchor)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
        if confidence < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, anchor), at(1, anchor), at(2, anchor), at(3, anchor));
        let (x1, y1) = resize_info.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = resize_info.to_original(cx + w / 2.0, cy + h / 2.0);

        boxes.push(ObjectBox {
            x1: x1.clamp(0.0, max_x),
            y1: y1.clamp(0.0, max_y),
            x2: x2.clamp(0.0, max_x),
            y2: y2.clamp(0.0, max_y),
            confidence,
            class_id,
        });
    }
    Ok(boxes)
}

/// NMS applied per class, result sorted by confidence
pub fn class_aware_nms(candidates: Vec<ObjectBox>, iou_threshold: f32) -> Vec<ObjectBox> {
    // Offsetting each class keeps boxes of different classes from overlapping
    const CLASS_OFFSET: f32 = 8192.0;
    let rects: Vec<Rect> = candidates
        .iter()
        .map(|b| {
            let offset = b.class_id as f32 * CLASS_OFFSET;
            Rect::new(b.x1 + offset, b.y1 + offset, b.x2 + offset, b.y2 + offset)
        })
        .collect();
    let scores: Vec<f32> = candidates.iter().map(|b| b.confidence).collect();

    nms(&rects, &scores, iou_threshold)
        .into_iter()
        .map(|i| candidates[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a `[1, 4 + classes, anchors]` output from (cx, cy, w, h, scores)
    fn yolo_output(anchors: &[(f32, f32, f32, f32, Vec<f32>)], classes: usize) -> Vec<f32> {
        let n = anchors.len();
        let mut out = vec![0.0; (4 + classes) * n];
        for (i, (cx, cy, w, h, scores)) in anchors.iter().enumerate() {
            out[i] = *cx;
            out[n + i] = *cy;
            out[2 * n + i] = *w;
            out[3 * n + i] = *h;
            for (c, s) in scores.iter().enumerate() {
                out[(4 + c) * n + i] = *s;
            }
        }
        out
    }

    #[test]
    fn test_decode_picks_best_class() {
        let info = ResizeInfo::new((640, 640), (640, 640));
        let mut anchors = vec![
            (100.0, 100.0, 50.0, 50.0, vec![0.1, 0.8]),
            (300.0, 300.0, 20.0, 20.0, vec![0.1, 0.2]),
        ];
        // Real outputs have far more anchors than attributes
        anchors.extend((0..8).map(|_| (0.0, 0.0, 0.0, 0.0, vec![0.0, 0.0])));
        let output = yolo_output(&anchors, 2);

        let boxes = decode_output(&[1, 6, 10], &output, 0.25, &info).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].class_id, 1);
        assert!((boxes[0].x1 - 75.0).abs() < 1e-3);
        assert!((boxes[0].y2 - 125.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let info = ResizeInfo::new((640, 640), (640, 640));
        assert!(decode_output(&[1, 2, 3, 4], &[0.0; 24], 0.25, &info).is_err());
    }

    #[test]
    fn test_nms_keeps_overlapping_boxes_of_different_classes() {
        let a = ObjectBox { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0, confidence: 0.9, class_id: 0 };
        let b = ObjectBox { class_id: 1, confidence: 0.8, ..a.clone() };
        let c = ObjectBox { confidence: 0.5, ..a.clone() };

        let kept = class_aware_nms(vec![a, b, c], 0.45);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].class_id, 0);
        assert_eq!(kept[1].class_id, 1);
    }
}
