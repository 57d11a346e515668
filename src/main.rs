use anyhow::Context;
use clap::Parser;
use img_fit::batch::{process_batch, BatchOutcome};
use img_fit::cli::{self, Args};
use img_fit::discovery::{collect_paths, filter_image_paths, partition_by_budget};
use img_fit::logger;
use img_fit::processing::ResizeOptions;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.quiet);

    let inputs = if args.input.is_empty() {
        vec![cli::prompt_input_path().context("Could not read the input path")?]
    } else {
        args.input.clone()
    };
    let target_megabytes = match args.size {
        Some(size) => size,
        None => cli::prompt_target_size()?,
    };

    let options = ResizeOptions::new(
        target_megabytes,
        Some(args.iterations),
        args.lazy,
        args.optimize_png,
    )?;

    let candidates = collect_paths(&inputs)?;
    let image_paths = filter_image_paths(candidates);
    let partition = partition_by_budget(&image_paths, options.budget)?;
    debug!(
        "{} images found, {} over {}",
        partition.total(),
        partition.oversized.len(),
        options.budget
    );

    let outcome = process_batch(&partition, &options, args.quiet, || {
        if args.yes {
            Ok(true)
        } else {
            cli::confirm_overwrite()
        }
    })
    .context("Could not confirm the in-place overwrite")?;

    if !args.yes && outcome != BatchOutcome::Aborted {
        cli::pause_before_exit();
    }

    Ok(())
}
