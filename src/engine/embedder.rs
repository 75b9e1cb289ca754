//! ArcFace Face Embedder
//!
//! Produces L2-normalized identity vectors from aligned 112x112 faces.

use image::DynamicImage;
use ndarray::{s, Array4};
use anyhow::Result;

use crate::utils::math::l2_normalize;

use super::pool::{read_tensor_f32, tensor_from_array, SafeCompiledModel};
use super::preprocess::{image_to_nchw, Normalization, EMBEDDER_INPUT_SIZE};
use super::traits::FaceEmbedder;

pub struct ArcFaceEmbedder {
    model: SafeCompiledModel,
    embedding_dim: usize,
}

impl ArcFaceEmbedder {
    pub fn new(model: SafeCompiledModel, embedding_dim: usize) -> Self {
        Self { model, embedding_dim }
    }
}

impl FaceEmbedder for ArcFaceEmbedder {
    fn embed_batch(&self, aligned_faces: &[DynamicImage]) -> Result<Vec<Vec<f32>>> {
        if aligned_faces.is_empty() {
            return Ok(Vec::new());
        }

        let batch = batch_tensor(aligned_faces);
        let input = tensor_from_array(&batch)?;

        let mut request = self.model.create_infer_request()?;
        request.set_input_tensor(&input)?;
        request.infer()?;

        let (_, output) = read_tensor_f32(&request.get_output_tensor()?)?;
        Ok(split_embeddings(output, self.embedding_dim))
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}

/// Stack faces into one NCHW batch, resizing to the embedder input
fn batch_tensor(faces: &[DynamicImage]) -> Array4<f32> {
    let (target_w, target_h) = EMBEDDER_INPUT_SIZE;
    let mut batch = Array4::<f32>::zeros((faces.len(), 3, target_h as usize, target_w as usize));

    for (i, face) in faces.iter().enumerate() {
        let resized = face.resize_exact(target_w, target_h, image::imageops::FilterType::Triangle);
        let single = image_to_nchw(&resized, Normalization::InsightFace);
        batch.slice_mut(s![i, .., .., ..]).assign(&single.slice(s![0, .., .., ..]));
    }

    batch
}

/// Split a flat model output into normalized per-face vectors
fn split_embeddings(output: Vec<f32>, embedding_dim: usize) -> Vec<Vec<f32>> {
    if embedding_dim == 0 {
        return Vec::new();
    }
    output
        .chunks_exact(embedding_dim)
        .map(|chunk| {
            let mut vector = chunk.to_vec();
            l2_normalize(&mut vector);
            vector
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_embeddings_normalizes() {
        let vectors = split_embeddings(vec![3.0, 4.0, 0.0, 2.0], 2);
        assert_eq!(vectors.len(), 2);
        assert!((vectors[0][0] - 0.6).abs() < 1e-6);
        assert!((vectors[0][1] - 0.8).abs() < 1e-6);
        assert!((vectors[1][1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_tensor_shape() {
        let faces = vec![DynamicImage::new_rgb8(50, 60), DynamicImage::new_rgb8(112, 112)];
        let batch = batch_tensor(&faces);
        assert_eq!(batch.shape(), &[2, 3, 112, 112]);
    }
}
