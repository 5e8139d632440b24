use std::path::Path;

use crate::{
    crop::CropLayer,
    errors::{EdgeMaskError, Result},
    traits::EdgeDetectionModel,
};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, GrayImage,
    ImageBuffer, Luma, RgbImage};
use imageproc::map::map_colors;
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

/// Per-channel training mean of the HED network, B/G/R order. Subtracted from
/// the input tensor before the forward pass.
pub const BGR_MEAN: [f32; 3] = [104.006_99, 116.668_77, 122.678_91];

/// Pretrained HED network behind an ONNX Runtime session.
///
/// The session is loaded once before the per-image loop and shared read-only
/// across all iterations; the mutex exists because `Session::run` takes
/// `&mut self`, not for cross-thread coordination.
pub struct Model {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl Model {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        let session = SessionBuilder::new()
            .map_err(|e| EdgeMaskError::Model {
                operation: "session builder initialization".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| EdgeMaskError::Model {
                operation: "execution provider setup".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| EdgeMaskError::Model {
                operation: "memory pattern setup".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| EdgeMaskError::Model {
                operation: format!("model file loading: {}", model_path.display()),
                source: Box::new(e),
            })?;

        // HED takes arbitrary spatial sizes, so the tensor names are the only
        // metadata needed from the session.
        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl EdgeDetectionModel for Model {
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
        let tensor = tensor.as_standard_layout();
        let mut binding = self.session.lock();
        let outputs = binding.run(
            ort::inputs![self.input_name.as_str() => TensorRef::from_array_view(&tensor)?],
        )?;
        Ok(outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned())
    }
}

/// Build the network input tensor from a decoded image: `[1, 3, H, W]` at the
/// image's own resolution (no resize, no crop), channels reversed to BGR to
/// match the network's training layout, minus the per-channel mean.
pub fn preprocess(image: &RgbImage) -> Array4<f32> {
    let bgr = image.as_ndarray3().slice_move(s![NewAxis, ..;-1, .., ..]);
    Array4::from_shape_fn(bgr.raw_dim(), |(n, c, y, x)| {
        f32::from(bgr[(n, c, y, x)]) - BGR_MEAN[c]
    })
}

/// Turn the network's raw probability map into the final mask: center-crop to
/// the input tensor's spatial size, resize to the source image's exact
/// dimensions with bilinear interpolation, then threshold to {0, 255}.
pub fn postprocess(
    output: ArrayView4<'_, f32>,
    input_shape: &[usize; 4],
    width: u32,
    height: u32,
    threshold: f32,
) -> GrayImage {
    let aligned = CropLayer.apply(output, input_shape);
    let (_, _, map_height, map_width) = aligned.dim();

    let map: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(
        map_width as u32,
        map_height as u32,
        aligned.into_raw_vec_and_offset().0,
    )
    .unwrap();
    let map = imageops::resize(&map, width, height, FilterType::Triangle);

    map_colors(&map, |Luma([v])| {
        Luma([if v > threshold { 255u8 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn preprocess_reverses_channels_and_subtracts_mean() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([10, 20, 30]));
        image.put_pixel(1, 0, Rgb([0, 0, 0]));

        let tensor = preprocess(&image);

        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);
        // channel 0 = blue, 1 = green, 2 = red
        assert!((tensor[(0, 0, 0, 0)] - (30.0 - BGR_MEAN[0])).abs() < 1e-5);
        assert!((tensor[(0, 1, 0, 0)] - (20.0 - BGR_MEAN[1])).abs() < 1e-5);
        assert!((tensor[(0, 2, 0, 0)] - (10.0 - BGR_MEAN[2])).abs() < 1e-5);
        assert!((tensor[(0, 0, 0, 1)] - (0.0 - BGR_MEAN[0])).abs() < 1e-5);
    }

    #[test]
    fn postprocess_upscales_and_thresholds_quadrants() {
        // 50x40 raw map with one value per quadrant, upscaled to a 80x100
        // source image. Only the quadrants above 0.6 may survive.
        let output = Array4::from_shape_fn((1, 1, 50, 40), |(_, _, y, x)| {
            match (y < 25, x < 20) {
                (true, true) => 0.3,
                (true, false) => 0.7,
                (false, true) => 0.9,
                (false, false) => 0.5,
            }
        });

        let mask = postprocess(output.view(), &[1, 3, 50, 40], 80, 100, 0.6);

        assert_eq!(mask.dimensions(), (80, 100));
        assert_eq!(mask.get_pixel(20, 25).0[0], 0);
        assert_eq!(mask.get_pixel(60, 25).0[0], 255);
        assert_eq!(mask.get_pixel(20, 75).0[0], 255);
        assert_eq!(mask.get_pixel(60, 75).0[0], 0);
    }

    #[test]
    fn postprocess_yields_only_binary_values() {
        let output = Array4::from_shape_fn((1, 1, 16, 16), |(_, _, y, x)| {
            (y as f32 * 16.0 + x as f32) / 255.0
        });

        let mask = postprocess(output.view(), &[1, 3, 16, 16], 31, 17, 0.6);

        assert_eq!(mask.dimensions(), (31, 17));
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn postprocess_crops_oversized_output_before_resizing() {
        // Hot border outside the centered region must be cut away by the
        // crop, leaving an all-zero mask.
        let mut output = Array4::from_elem((1, 1, 10, 10), 1.0_f32);
        output.slice_mut(s![0, 0, 3..7, 3..7]).fill(0.0);

        let mask = postprocess(output.view(), &[1, 3, 4, 4], 4, 4, 0.6);

        assert_eq!(mask.dimensions(), (4, 4));
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }
}
