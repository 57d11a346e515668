//! Image codec handling for the formats this tool rewrites.
//!
//! Discovery trusts the file extension, while re-encoding trusts the container
//! the decoder actually found. `ImageKind` is the bridge between the two.

use crate::error::{ResizeError, Result};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Codecs that can be resized and written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Lossy JPEG, re-encoded at the default quality
    Jpeg,
    /// Lossless PNG
    Png,
}

impl ImageKind {
    /// Detects the kind from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Maps a decoded container format onto a writable kind.
    pub fn from_image_format(format: ImageFormat) -> Result<Self> {
        match format {
            ImageFormat::Jpeg => Ok(ImageKind::Jpeg),
            ImageFormat::Png => Ok(ImageKind::Png),
            other => Err(ResizeError::UnsupportedFormat(format!("{:?}", other))),
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ImageKind {
    type Err = ResizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageKind::Jpeg),
            "png" => Ok(ImageKind::Png),
            _ => Err(ResizeError::UnsupportedFormat(s.to_string())),
        }
    }
}
