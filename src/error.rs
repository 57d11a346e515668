use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("{0} does not exist")]
    PathNotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid target size: {0}. Must be a positive number of megabytes")]
    InvalidTargetSize(f64),

    #[error("Input validation error: {0:?} is not a number")]
    InvalidNumber(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, ResizeError>;
