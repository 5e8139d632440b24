use clap::Parser;
use image::ImageFormat;
use std::path::PathBuf;

/// Generates edge masks for a folder of images with a pretrained HED network.
#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to the source image folder.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the output mask folder.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to the pretrained HED model (ONNX).
    #[arg(short, long)]
    pub model: PathBuf,

    /// Edge probability threshold; values strictly above become mask pixels.
    #[arg(short, long, default_value_t = 0.6)]
    pub threshold: f32,

    /// Output file extension override. Masks keep the source file name
    /// unchanged when this is not set.
    #[arg(short, long, value_parser = check_format)]
    pub format: Option<String>,

    /// GPU device for the execution providers.
    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,

    /// Write a per-image comparison artifact (original, mask, eroded mask)
    /// next to the mask.
    #[arg(long)]
    pub visualize: bool,
}

fn check_format(s: &str) -> Result<String, String> {
    let supported: Vec<_> = ImageFormat::all()
        .filter(|f| f.writing_enabled())
        .flat_map(|f| f.extensions_str())
        .map(|s| format!("`{}`", s))
        .collect();
    let supported_message = format!("Supported formats: {}", supported.join(", "));

    let format = ImageFormat::from_extension(s)
        .ok_or(format!("{} is not supported. {}", s, supported_message))?;
    if !format.writing_enabled() {
        return Err(format!("{} is not supported. {}", s, supported_message));
    }

    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parser_accepts_writable_extensions() {
        assert_eq!(check_format("png").unwrap(), "png");
        assert_eq!(check_format("jpg").unwrap(), "jpg");
    }

    #[test]
    fn format_parser_rejects_unknown_extensions() {
        assert!(check_format("txt").is_err());
        assert!(check_format("").is_err());
    }
}
