//! Small helpers shared by the library and the binary.

use crate::constants::{AFFIRMATIVE_ANSWERS, PROGRESS_BAR_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};

/// Format a byte count with binary prefixes (1 KiB = 1024 B).
///
/// Budgets are entered in decimal megabytes but results are reported in
/// binary units, so `5 MB` shows up as roughly `4.8MiB`.
///
/// # Examples
/// ```
/// use img_fit::utils::format_file_size;
///
/// assert_eq!(format_file_size(1536), "1.5KiB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];
    const THRESHOLD: f64 = 1024.0;

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < THRESHOLD {
            return format!("{:3.1}{}B", size, unit);
        }
        size /= THRESHOLD;
    }
    format!("{:.1}YiB", size)
}

/// Whether a confirmation answer allows destructive writes.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE_ANSWERS.contains(&answer.as_str())
}

/// Strip the double quotes terminals add around drag-and-dropped paths.
pub fn strip_drag_quotes(input: &str) -> &str {
    input.trim().trim_matches('"')
}

/// Progress bar for the resize loop. Hidden when `quiet` is set.
pub fn create_progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
