use std::path::Path;

use image::{imageops, DynamicImage, GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::errors::{EdgeMaskError, Result};

/// Render the three comparison panels, stacked vertically: the source image,
/// the binary mask, and an eroded variant of the mask (3x3 kernel, one
/// iteration). The eroded panel is diagnostic only and never ends up in the
/// mask output.
pub fn comparison_panels(original: &DynamicImage, mask: &GrayImage) -> RgbImage {
    let eroded = morphology::erode(mask, Norm::LInf, 1);
    let original = original.to_rgb8();
    let (width, height) = original.dimensions();

    let mut canvas = RgbImage::new(width, height * 3);
    imageops::replace(&mut canvas, &original, 0, 0);
    imageops::replace(
        &mut canvas,
        &DynamicImage::ImageLuma8(mask.clone()).to_rgb8(),
        0,
        i64::from(height),
    );
    imageops::replace(
        &mut canvas,
        &DynamicImage::ImageLuma8(eroded).to_rgb8(),
        0,
        2 * i64::from(height),
    );
    canvas
}

/// Write the comparison panels next to the mask output.
pub fn write_comparison(original: &DynamicImage, mask: &GrayImage, path: &Path) -> Result<()> {
    comparison_panels(original, mask)
        .save(path)
        .map_err(|e| EdgeMaskError::ImageProcessing {
            path: path.display().to_string(),
            operation: "comparison artifact write".to_string(),
            source: Box::new(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn panels_stack_three_images_vertically() {
        let original = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])));
        let mut mask = GrayImage::new(8, 6);
        mask.put_pixel(4, 3, Luma([255]));

        let panels = comparison_panels(&original, &mask);

        assert_eq!(panels.dimensions(), (8, 18));
        assert_eq!(panels.get_pixel(0, 0), &Rgb([10, 20, 30]));
        // middle panel reproduces the mask
        assert_eq!(panels.get_pixel(4, 9), &Rgb([255, 255, 255]));
        assert_eq!(panels.get_pixel(0, 9), &Rgb([0, 0, 0]));
        // a lone pixel does not survive the erosion panel
        assert_eq!(panels.get_pixel(4, 15), &Rgb([0, 0, 0]));
    }
}
