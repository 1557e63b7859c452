pub mod archive;
pub mod batch;
pub mod cli;
pub mod compressor;
pub mod constants;
pub mod error;
pub mod formats;
pub mod intake;
pub mod logger;
pub mod preview;
pub mod progress;
pub mod surface;
pub mod utils;
pub mod validation;

pub use archive::{build_archive, save_archive, unique_entry_names};
pub use batch::{run_batch, BatchPhase, BatchReport, BatchState, CancelToken, ItemFailure};
pub use compressor::{compress_image, derive_output_name, CompressedImage, CompressionConfig};
pub use error::{CompressionError, Result};
pub use formats::OutputFormat;
pub use intake::{collect_selection, intake, SelectedFile, SourceImage};
pub use preview::{render_preview, render_previews, PreviewTile};
pub use progress::{BarProgress, NoProgress, ProgressEvent, ProgressSink};
pub use utils::format_file_size;
