pub mod config;
pub mod crop;
pub mod errors;
pub mod mocks;
pub mod model;
pub mod traits;
pub mod visualize;

use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use config::Config;
pub use crop::{CropLayer, CropOffsets};
pub use errors::{EdgeMaskError, Result};
pub use model::Model;
pub use traits::EdgeDetectionModel;

/// Drives the per-image transformation over an input directory: decode, run
/// the network, write the mask under the same file name.
///
/// Processing is strictly sequential, one image at a time; the model is
/// loaded once and shared read-only across all iterations. Any per-image
/// failure aborts the whole run.
pub struct EdgeMaskGenerator<M: EdgeDetectionModel> {
    model: M,
    config: Config,
}

impl<M: EdgeDetectionModel> EdgeMaskGenerator<M> {
    pub const fn new(model: M, config: Config) -> Self {
        Self { model, config }
    }

    pub fn process_directory(&self) -> Result<()> {
        let input_path = &self.config.input;
        let output_path = &self.config.output;

        if !input_path.exists() {
            return Err(EdgeMaskError::FileSystem {
                path: input_path.clone(),
                operation: "input directory check".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            });
        }

        fs::create_dir_all(output_path).map_err(|e| EdgeMaskError::FileSystem {
            path: output_path.clone(),
            operation: "output directory creation".to_string(),
            source: e,
        })?;

        let image_files = self.collect_image_files(input_path)?;

        if image_files.is_empty() {
            println!("no images found in {}", input_path.display());
            return Ok(());
        }

        let pb = ProgressBar::new(image_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );

        for input_file in &image_files {
            self.process_single_image(input_file, output_path)?;
            pb.inc(1);
        }

        pb.finish_with_message("done");
        Ok(())
    }

    /// One level deep, directory enumeration order; the original tool
    /// iterates a flat folder of images.
    fn collect_image_files(&self, input_path: &Path) -> Result<Vec<PathBuf>> {
        let mut image_files = Vec::new();

        for entry in WalkDir::new(input_path)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && self.is_supported_image_format(path) {
                image_files.push(path.to_path_buf());
            }
        }

        Ok(image_files)
    }

    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" | "tiff"
            )
        } else {
            false
        }
    }

    fn process_single_image(&self, input_file: &Path, output_dir: &Path) -> Result<()> {
        let img = image::open(input_file).map_err(|e| EdgeMaskError::ImageProcessing {
            path: input_file.display().to_string(),
            operation: "image decode".to_string(),
            source: Box::new(e),
        })?;

        let mask = self.model.detect_edges(&img, self.config.threshold)?;

        let output_file = self.output_file_for(input_file, output_dir)?;
        mask.save(&output_file)
            .map_err(|e| EdgeMaskError::ImageProcessing {
                path: output_file.display().to_string(),
                operation: "mask write".to_string(),
                source: Box::new(e),
            })?;

        if self.config.visualize {
            let comparison_file = output_file.with_file_name(format!(
                "{}_comparison.png",
                output_file
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("mask")
            ));
            visualize::write_comparison(&img, &mask, &comparison_file)?;
        }

        Ok(())
    }

    /// Masks keep the source file name; the optional format flag only swaps
    /// the extension.
    fn output_file_for(&self, input_file: &Path, output_dir: &Path) -> Result<PathBuf> {
        let file_name = input_file
            .file_name()
            .ok_or_else(|| EdgeMaskError::Validation {
                field: "input".to_string(),
                reason: format!("{} has no file name", input_file.display()),
            })?;

        let output_file = output_dir.join(file_name);
        Ok(match &self.config.format {
            Some(format) => output_file.with_extension(format),
            None => output_file,
        })
    }
}

impl EdgeMaskGenerator<Model> {
    pub fn with_onnx_model(config: Config) -> Result<Self> {
        let model = Model::new(&config.model, config.device_id)?;
        Ok(Self::new(model, config))
    }
}
