use crate::errors::Result;
use image::{DynamicImage, GrayImage};
use ndarray::prelude::*;

/// Abstraction over the edge-detection model so the batch pipeline can run
/// against the real ONNX session or a test double.
pub trait EdgeDetectionModel: Send + Sync {
    /// Full per-image transformation: preprocess, forward pass, crop/resize,
    /// threshold. The returned mask has the source image's exact dimensions
    /// and contains only the values 0 and 255.
    fn detect_edges(&self, img: &DynamicImage, threshold: f32) -> Result<GrayImage>;

    /// One forward pass mapping an NCHW input tensor to the network's raw
    /// single-channel probability map (low-level API).
    fn predict(&self, tensor: ArrayView4<'_, f32>) -> Result<Array4<f32>>;
}
