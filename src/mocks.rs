use crate::errors::Result;
use crate::model::{postprocess, preprocess};
use crate::traits::EdgeDetectionModel;
use image::{DynamicImage, GenericImageView, GrayImage};
use ndarray::prelude::*;

/// Deterministic stand-in for the ONNX model.
///
/// `predict` emits a probability map padded `margin` pixels wider than the
/// input on every side, with a hot border and a half-bright/half-dark
/// interior, so the full crop/resize/threshold path gets exercised without a
/// model file. `detect_edges` drives the real preprocessing and
/// postprocessing around it.
#[derive(Debug, Clone)]
pub struct MockEdgeModel {
    pub margin: usize,
}

impl MockEdgeModel {
    pub const fn new(margin: usize) -> Self {
        Self { margin }
    }
}

impl EdgeDetectionModel for MockEdgeModel {
    fn detect_edges(&self, img: &DynamicImage, threshold: f32) -> Result<GrayImage> {
        let rgb_img = img.to_rgb8();
        let tensor = preprocess(&rgb_img);
        let input_shape: [usize; 4] = [1, 3, rgb_img.height() as usize, rgb_img.width() as usize];

        let output = self.predict(tensor.view())?;

        let (width, height) = img.dimensions();
        Ok(postprocess(
            output.view(),
            &input_shape,
            width,
            height,
            threshold,
        ))
    }

    fn predict(&self, tensor: ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        let shape = tensor.shape();
        let (height, width) = (shape[2], shape[3]);
        let margin = self.margin;

        Ok(Array4::from_shape_fn(
            (1, 1, height + 2 * margin, width + 2 * margin),
            |(_, _, y, x)| {
                let inside =
                    y >= margin && y < margin + height && x >= margin && x < margin + width;
                if !inside {
                    // hot border: must be cut away by the crop alignment
                    1.0
                } else if y - margin < height / 2 {
                    0.9
                } else {
                    0.2
                }
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn predict_pads_by_margin() -> Result<()> {
        let mock = MockEdgeModel::new(3);
        let input = Array4::<f32>::zeros((1, 3, 10, 8));

        let output = mock.predict(input.view())?;

        assert_eq!(output.shape(), &[1, 1, 16, 14]);
        assert_eq!(output[(0, 0, 0, 0)], 1.0);
        assert_eq!(output[(0, 0, 3, 3)], 0.9);
        assert_eq!(output[(0, 0, 12, 3)], 0.2);
        Ok(())
    }

    #[test]
    fn detect_edges_splits_image_in_half() -> Result<()> {
        let mock = MockEdgeModel::new(2);
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([128, 128, 128])));

        let mask = mock.detect_edges(&img, 0.6)?;

        assert_eq!(mask.dimensions(), (8, 8));
        assert_eq!(mask.get_pixel(4, 1).0[0], 255);
        assert_eq!(mask.get_pixel(4, 6).0[0], 0);
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        Ok(())
    }
}
