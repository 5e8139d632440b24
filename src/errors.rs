use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for edge-mask generation.
///
/// Each variant captures context specific to its error domain (filesystem,
/// image processing, model operations). All errors are fatal to the run:
/// there is no retry and no skip-and-continue, a failure on any image
/// terminates the whole batch.
#[derive(Error, Debug)]
pub enum EdgeMaskError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EdgeMaskError>;

/// Convert I/O errors to filesystem errors.
///
/// Code that has context should construct `EdgeMaskError::FileSystem`
/// directly with the specific path and operation; this conversion is the
/// fallback for callsites without either.
impl From<std::io::Error> for EdgeMaskError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for EdgeMaskError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ONNX Runtime errors to model errors.
impl From<ort::Error> for EdgeMaskError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to model errors.
///
/// Shape errors occur during tensor operations which are part of model
/// inference, so they're categorized as model errors rather than a separate
/// tensor error type.
impl From<ndarray::ShapeError> for EdgeMaskError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}
