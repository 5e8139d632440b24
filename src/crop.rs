use ndarray::prelude::*;

/// Slice bounds for one center-crop, recomputed per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOffsets {
    pub ystart: usize,
    pub yend: usize,
    pub xstart: usize,
    pub xend: usize,
}

/// Symmetric center-crop of a 4-D NCHW tensor to the spatial size of a
/// reference tensor, keeping batch size and channel count.
///
/// The HED network combines upsampled side outputs whose spatial size exceeds
/// the input due to deconvolution padding; this layer aligns the larger map to
/// the reference before the two can be compared element-wise. ONNX Runtime has
/// no custom-layer registry, so the crop runs as an explicit post-processing
/// step on the raw output map instead of inside the graph.
///
/// Precondition: the input's spatial dimensions must be >= the reference's in
/// both axes. This is guaranteed by the network design and is not a handled
/// error path.
#[derive(Debug, Clone, Copy, Default)]
pub struct CropLayer;

impl CropLayer {
    /// Output shape for a crop of `input` to `target`'s spatial size:
    /// `[batch_input, channels_input, height_target, width_target]`.
    pub fn output_shape(&self, input: &[usize; 4], target: &[usize; 4]) -> [usize; 4] {
        [input[0], input[1], target[2], target[3]]
    }

    /// Centered slice bounds along the height and width axes.
    pub fn offsets(&self, input: &[usize; 4], target: &[usize; 4]) -> CropOffsets {
        debug_assert!(
            input[2] >= target[2] && input[3] >= target[3],
            "crop input {}x{} smaller than reference {}x{}",
            input[2],
            input[3],
            target[2],
            target[3]
        );

        let ystart = (input[2] - target[2]) / 2;
        let xstart = (input[3] - target[3]) / 2;
        CropOffsets {
            ystart,
            yend: ystart + target[2],
            xstart,
            xend: xstart + target[3],
        }
    }

    /// Crop `input` to `target`'s spatial size, batch and channel axes
    /// untouched. Purely functional; nothing is cached across calls.
    pub fn apply<A: Clone>(&self, input: ArrayView4<'_, A>, target: &[usize; 4]) -> Array4<A> {
        let (batch, channels, height, width) = input.dim();
        let CropOffsets {
            ystart,
            yend,
            xstart,
            xend,
        } = self.offsets(&[batch, channels, height, width], target);

        input
            .slice(s![.., .., ystart..yend, xstart..xend])
            .to_owned()
    }
}
