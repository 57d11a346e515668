use image::imageops::FilterType;

/// Target sizes are given in decimal megabytes.
pub const BYTES_PER_MEGABYTE: f64 = 1_000_000.0;

pub const DEFAULT_ITERATIONS: u32 = 5;

pub const INITIAL_SCALE_FACTOR: f64 = 0.5;
pub const INITIAL_STEP_SIZE: f64 = 0.5;

pub const DEFAULT_JPEG_QUALITY: u8 = 75;
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

pub const PNG_OPTIMIZATION_PRESET: u8 = 2;

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg"];

pub const AFFIRMATIVE_ANSWERS: &[&str] = &["y", "yes"];

pub const PROGRESS_BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const INFO_PREFIX: &str = "📋";

pub const IN_PLACE_WARNING: &str =
    "Warning! This will modify files in-place. Be sure to make a backup before running! Continue [y/N]?";
