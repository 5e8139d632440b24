use anyhow::{ensure, Context, Result};
use clap::Parser;

use edge_mask_rs::{Config, EdgeMaskGenerator};

fn main() -> Result<()> {
    let config = Config::parse();

    ensure!(config.model.exists(), "Model path does not exist");
    ensure!(config.input.exists(), "Input directory does not exist");
    ensure!(
        config.threshold.is_finite(),
        "Threshold must be a finite value"
    );

    // The model loads exactly once, before any image is touched; a malformed
    // model file fails here rather than mid-run.
    let generator =
        EdgeMaskGenerator::with_onnx_model(config).context("Failed to load the HED model")?;

    generator
        .process_directory()
        .context("Edge mask generation failed")?;

    Ok(())
}
