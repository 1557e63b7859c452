use crate::constants::{DEFAULT_ARCHIVE_NAME, DEFAULT_ITEM_TIMEOUT_SECS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "squeeze-pack",
    about = "Recompress a batch of images and bundle them into one ZIP archive",
    long_about = "squeeze-pack takes up to 100 images, re-encodes each one to JPEG, PNG or WebP \
                  at a chosen quality, and writes the results into a single ZIP archive. \
                  Non-image files in the selection are ignored.",
    version,
    after_help = "EXAMPLES:\n  \
    squeeze-pack compress photos/*.png -q 75 -f image/jpeg\n  \
    squeeze-pack compress ./shoot -r -f webp -o shoot.zip\n  \
    squeeze-pack preview ./shoot --thumbnails ./thumbs"
)]
pub struct Args {
    #[arg(short = 'v', long, global = true, help = "Show debug logging")]
    pub verbose: bool,

    #[arg(long, global = true, conflicts_with = "verbose", help = "Only show warnings and errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug)]
pub struct Selection {
    #[arg(
        required = true,
        help = "Input files, directories or glob patterns",
        long_help = "Files, directories or glob expressions. At most 100 files may be selected; \
                     files whose type is not an image are skipped."
    )]
    pub inputs: Vec<String>,

    #[arg(short = 'r', long, help = "Descend into subdirectories")]
    pub recursive: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a batch of images into a ZIP archive",
        long_about = "Re-encode every selected image, one at a time, and write all results \
                      into one archive. Images that fail to decode or encode are skipped and \
                      listed in the summary."
    )]
    Compress {
        #[command(flatten)]
        selection: Selection,

        #[arg(
            short = 'o',
            long,
            default_value = DEFAULT_ARCHIVE_NAME,
            help = "Output archive path"
        )]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            value_parser = clap::value_parser!(u8).range(0..=100),
            help = "Quality percentage (0-100, default: 80)",
            long_help = "Encoder quality from 0 (smallest) to 100 (best). \
                         PNG stays lossless; higher values spend more effort on deflate."
        )]
        quality: Option<u8>,

        #[arg(
            short = 'f',
            long,
            help = "Target format (image/jpeg, image/png, image/webp)",
            long_help = "Target format as a MIME type or short name: \
                         image/jpeg (jpeg, jpg), image/png (png), image/webp (webp). Default: image/jpeg"
        )]
        format: Option<String>,

        #[arg(
            long,
            default_value_t = DEFAULT_ITEM_TIMEOUT_SECS,
            help = "Per-image timeout in seconds"
        )]
        timeout: u64,
    },

    #[command(
        about = "List the selected images with size labels",
        long_about = "Decode each selected image and print its name, size and dimensions. \
                      Optionally write a thumbnail for each one."
    )]
    Preview {
        #[command(flatten)]
        selection: Selection,

        #[arg(long, help = "Directory to write PNG thumbnails into")]
        thumbnails: Option<PathBuf>,
    },
}
