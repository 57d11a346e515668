use crate::constants::{INFO_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX};
use crate::discovery::{ImageTask, SizePartition};
use crate::error::Result;
use crate::processing::{resize_to_budget, write_in_place, ResizeOptions, ResizeOutcome};
use crate::utils::{create_progress_bar, format_file_size};
use indicatif::ProgressBar;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Images that passed the extension filter
    pub scanned: usize,
    pub within_budget: usize,
    pub oversized: usize,
    /// Files actually overwritten
    pub resized: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The confirmation gate was declined; nothing was written.
    Aborted,
    Completed(BatchSummary),
}

/// Resizes every oversized image in discovery order.
///
/// `confirm` runs once, before any file is touched. If it returns `false`
/// the batch stops there. Per-file failures are logged and counted as
/// skipped; they never abort the batch.
pub fn process_batch<G>(
    partition: &SizePartition,
    options: &ResizeOptions,
    quiet: bool,
    confirm: G,
) -> Result<BatchOutcome>
where
    G: FnOnce() -> Result<bool>,
{
    if !confirm()? {
        info!("Exiting...");
        return Ok(BatchOutcome::Aborted);
    }

    let start_time = Instant::now();
    let mut summary = BatchSummary {
        scanned: partition.total(),
        within_budget: partition.within_budget.len(),
        oversized: partition.oversized.len(),
        ..BatchSummary::default()
    };

    info!("--- Processing Images ---");

    let progress = create_progress_bar(partition.oversized.len() as u64, quiet);
    for task in &partition.oversized {
        progress.set_message(task.path.display().to_string());
        process_task(task, options, &progress, &mut summary);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!("-------------------------");
    info!(
        "Finished processing {} images. Resized {} images.",
        summary.scanned, summary.resized
    );
    if summary.within_budget > 0 {
        info!(
            "{} {} images were already within {}",
            INFO_PREFIX, summary.within_budget, options.budget
        );
    }
    if summary.skipped > 0 {
        warn!("{}  Skipped {} images", WARNING_PREFIX, summary.skipped);
    }
    debug!("Total time: {:?}", start_time.elapsed());

    Ok(BatchOutcome::Completed(summary))
}

fn process_task(
    task: &ImageTask,
    options: &ResizeOptions,
    progress: &ProgressBar,
    summary: &mut BatchSummary,
) {
    let path = task.path.display();

    match resize_to_budget(task, options) {
        Ok(ResizeOutcome::Resized(buffer)) => match write_in_place(&task.path, &buffer) {
            Ok(()) => {
                summary.resized += 1;
                progress.suspend(|| {
                    info!(
                        "{} Resized {} to {}",
                        SUCCESS_PREFIX,
                        path,
                        format_file_size(buffer.len() as u64)
                    )
                });
            }
            Err(e) => {
                summary.skipped += 1;
                progress.suspend(|| warn!("{} could not be written: {}", path, e));
            }
        },
        Ok(ResizeOutcome::NoAcceptableScaleFound) => {
            summary.skipped += 1;
            progress.suspend(|| warn!("{} could not be resized", path));
        }
        // Shrunk since discovery.
        Ok(ResizeOutcome::AlreadyWithinBudget) => {
            summary.oversized = summary.oversized.saturating_sub(1);
            summary.within_budget += 1;
            progress.suspend(|| debug!("{} is already within budget", path));
        }
        Err(e) => {
            summary.skipped += 1;
            progress.suspend(|| warn!("Skipping {}: {}", path, e));
        }
    }
}
