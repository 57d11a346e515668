use crate::constants::{
    BYTES_PER_MEGABYTE, DEFAULT_ITERATIONS, DEFAULT_JPEG_QUALITY, INITIAL_SCALE_FACTOR,
    INITIAL_STEP_SIZE, PNG_OPTIMIZATION_PRESET, RESIZE_FILTER,
};
use crate::discovery::ImageTask;
use crate::error::{ResizeError, Result};
use crate::formats::ImageKind;
use crate::utils::format_file_size;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};

/// Maximum acceptable on-disk size of an image, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Budget {
    bytes: u64,
}

impl Budget {
    /// Builds a budget from decimal megabytes (1 MB = 1,000,000 bytes).
    ///
    /// # Example
    /// ```
    /// use img_fit::Budget;
    ///
    /// let budget = Budget::from_megabytes(2.5).unwrap();
    /// assert_eq!(budget.bytes(), 2_500_000);
    /// assert!(Budget::from_megabytes(0.0).is_err());
    /// ```
    pub fn from_megabytes(megabytes: f64) -> Result<Self> {
        if !megabytes.is_finite() || megabytes <= 0.0 {
            return Err(ResizeError::InvalidTargetSize(megabytes));
        }
        Ok(Self {
            bytes: (megabytes * BYTES_PER_MEGABYTE).floor() as u64,
        })
    }

    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn fits(&self, size: u64) -> bool {
        size <= self.bytes
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.bytes)
    }
}

#[derive(Debug, Clone)]
pub struct ResizeOptions {
    pub budget: Budget,
    pub iterations: u32,
    pub lazy: bool,
    pub optimize_png: bool,
}

impl ResizeOptions {
    pub fn new(
        target_megabytes: f64,
        iterations: Option<u32>,
        lazy: bool,
        optimize_png: bool,
    ) -> Result<Self> {
        Ok(Self {
            budget: Budget::from_megabytes(target_megabytes)?,
            iterations: iterations.unwrap_or(DEFAULT_ITERATIONS),
            lazy,
            optimize_png,
        })
    }
}

/// Result of fitting one image into the budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The file is already small enough and was not decoded.
    AlreadyWithinBudget,
    /// Encoded bytes that fit the budget, ready to be written back.
    Resized(Vec<u8>),
    /// Every attempt within the iteration cap exceeded the budget.
    NoAcceptableScaleFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    Continue,
    Stop,
}

/// Per-image search over the scale factor.
///
/// The step is halved on every attempt. Oversized attempts move the scale
/// down, fitting attempts move it up (or end the search in lazy mode).
#[derive(Debug, Clone)]
pub struct SearchState {
    scale_factor: f64,
    step_size: f64,
    best: Option<Vec<u8>>,
    iteration: u32,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            scale_factor: INITIAL_SCALE_FACTOR,
            step_size: INITIAL_STEP_SIZE,
            best: None,
            iteration: 0,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn best(&self) -> Option<&[u8]> {
        self.best.as_deref()
    }

    /// Records an attempt encoded at the current scale factor.
    pub fn advance(&mut self, encoded: Vec<u8>, budget: Budget, lazy: bool) -> SearchStep {
        self.iteration += 1;
        self.step_size /= 2.0;

        if !budget.fits(encoded.len() as u64) {
            self.scale_factor -= self.step_size;
            return SearchStep::Continue;
        }

        // Encoded size is not monotonic in pixel count, so a later fit can be smaller.
        let is_larger_fit = self
            .best
            .as_ref()
            .map_or(true, |best| encoded.len() >= best.len());
        if is_larger_fit {
            self.best = Some(encoded);
        }

        if lazy {
            return SearchStep::Stop;
        }
        self.scale_factor += self.step_size;
        SearchStep::Continue
    }

    pub fn into_best(self) -> Option<Vec<u8>> {
        self.best
    }
}

/// Runs the bounded scale search, calling `encode_at` with each scale factor.
///
/// Returns the largest fitting buffer seen (or the first one in lazy mode),
/// or `None` when no attempt within `iterations` fit.
pub fn search_scale<F>(
    budget: Budget,
    iterations: u32,
    lazy: bool,
    mut encode_at: F,
) -> Result<Option<Vec<u8>>>
where
    F: FnMut(f64) -> Result<Vec<u8>>,
{
    let mut state = SearchState::new();

    while state.iteration() < iterations {
        let encoded = encode_at(state.scale_factor())?;
        let step = state.advance(encoded, budget, lazy);
        trace!(
            iteration = state.iteration(),
            scale_factor = state.scale_factor(),
            step_size = state.step_size(),
            "search state"
        );
        if step == SearchStep::Stop {
            break;
        }
    }

    Ok(state.into_best())
}

/// Pixel dimensions for a scale factor, never smaller than 1x1.
pub fn scaled_dimensions(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let scale = |side: u32| ((side as f64 * scale_factor).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// A decoded, orientation-corrected image and the container it came from.
pub struct DecodedImage {
    pub image: DynamicImage,
    pub kind: ImageKind,
}

/// Decodes an image, trusting its content over its extension, and applies
/// the embedded orientation so width and height match what a viewer shows.
pub fn load_oriented_image(path: &Path) -> Result<DecodedImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format().ok_or_else(|| {
        ResizeError::UnsupportedFormat(format!("{} has an unrecognized format", path.display()))
    })?;
    let kind = ImageKind::from_image_format(format)?;

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);

    Ok(DecodedImage { image, kind })
}

/// Encodes an image into memory using the given codec.
pub fn encode_image(img: &DynamicImage, kind: ImageKind, optimize_png: bool) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match kind {
        ImageKind::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, DEFAULT_JPEG_QUALITY);
            match img.color() {
                ColorType::L8 | ColorType::Rgb8 => img.write_with_encoder(encoder)?,
                // JPEG has no alpha channel or 16-bit samples
                _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?,
            }
        }
        ImageKind::Png => {
            img.write_with_encoder(PngEncoder::new(&mut buffer))?;
            if optimize_png {
                let options = oxipng::Options::from_preset(PNG_OPTIMIZATION_PRESET);
                buffer = oxipng::optimize_from_memory(&buffer, &options)
                    .map_err(|e| ResizeError::PngOptimization(e.to_string()))?;
            }
        }
    }

    Ok(buffer)
}

/// Resizes to `scale_factor` of the original dimensions and encodes the result.
pub fn encode_scaled(
    img: &DynamicImage,
    kind: ImageKind,
    scale_factor: f64,
    optimize_png: bool,
) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, scale_factor);
    let resized = img.resize_exact(new_width, new_height, RESIZE_FILTER);
    let encoded = encode_image(&resized, kind, optimize_png)?;

    debug!(
        "+ Testing size ({}, {}). Result: {}",
        new_width,
        new_height,
        format_file_size(encoded.len() as u64)
    );
    Ok(encoded)
}

/// Finds bytes for `task` that fit under the budget. Nothing is written.
pub fn resize_to_budget(task: &ImageTask, options: &ResizeOptions) -> Result<ResizeOutcome> {
    let current_size = fs::metadata(&task.path)?.len();
    if options.budget.fits(current_size) {
        return Ok(ResizeOutcome::AlreadyWithinBudget);
    }

    let decoded = load_oriented_image(&task.path)?;
    if decoded.kind != task.kind {
        warn!(
            "{} is named as {} but contains {}; keeping {}",
            task.path.display(),
            task.kind,
            decoded.kind,
            decoded.kind
        );
    }

    debug!("Processing {}", task.path.display());

    let best = search_scale(options.budget, options.iterations, options.lazy, |scale| {
        encode_scaled(&decoded.image, decoded.kind, scale, options.optimize_png)
    })?;

    Ok(match best {
        Some(buffer) => ResizeOutcome::Resized(buffer),
        None => ResizeOutcome::NoAcceptableScaleFound,
    })
}

/// Replaces the file at `path` with `bytes`.
///
/// Bytes land in a temporary file next to the original, which is then
/// renamed over it, so a crash never leaves a truncated image behind.
/// Symlinks are resolved first so the link target is what gets replaced.
pub fn write_in_place(path: &Path, bytes: &[u8]) -> Result<()> {
    let path = fs::canonicalize(path)?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(&path)?.permissions();

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(bytes)?;
    temp_file.as_file().sync_all()?;
    fs::set_permissions(temp_file.path(), permissions)?;

    temp_file
        .persist(&path)
        .map_err(|e| ResizeError::Io(e.error))?;
    Ok(())
}
