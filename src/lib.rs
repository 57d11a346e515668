pub mod batch;
pub mod cli;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod logger;
pub mod processing;
pub mod utils;

pub use batch::{process_batch, BatchOutcome, BatchSummary};
pub use discovery::{
    collect_paths, extension_of, filter_image_paths, is_image_file, partition_by_budget,
    ImageTask, SizePartition,
};
pub use error::{ResizeError, Result};
pub use formats::ImageKind;
pub use processing::{
    encode_scaled, load_oriented_image, resize_to_budget, scaled_dimensions, search_scale,
    write_in_place, Budget, ResizeOptions, ResizeOutcome, SearchState, SearchStep,
};
