use crate::error::Result;
use crate::formats::TargetFormat;
use crate::processing::OptimizeOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "web-squeeze",
    about = "Optimize the images of a website and point its pages at the results",
    long_about = "web-squeeze walks a directory tree, downsamples oversized JPEG and PNG images, \
                  re-encodes them (optionally converting to WebP or AVIF) and rewrites references \
                  in HTML, CSS and JavaScript files so they point at the converted assets. \
                  Version-control directories (.git) are never touched.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    web-squeeze optimize ./site -q 80 -w 1600\n  \
    web-squeeze optimize --no-convert\n  \
    web-squeeze update-refs ./site --strict\n  \
    web-squeeze run ./site -f avif"
)]
pub struct Args {
    #[arg(
        short = 'Q',
        long,
        global = true,
        help = "Only print errors"
    )]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Print resize details and totals"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the commands that touch images.
#[derive(clap::Args, Debug, Clone)]
pub struct ImageArgs {
    #[arg(
        short = 'q',
        long,
        help = "Encoding quality (0-100, default: 85)",
        long_help = "Quality for lossy encoders: JPEG when saving in place, WebP and AVIF when \
                     converting. PNG is always optimized losslessly."
    )]
    pub quality: Option<u8>,

    #[arg(
        short = 'w',
        long,
        help = "Maximum width in pixels (default: 1920)",
        long_help = "Images wider than this are downsampled to exactly this width, keeping the \
                     aspect ratio. Narrower images are never upscaled."
    )]
    pub max_width: Option<u32>,

    #[arg(
        long,
        help = "Re-save images in their own format instead of converting",
        long_help = "Overwrite each image in place in its original format. Without this flag a \
                     sibling file with the target extension is written and the original is kept."
    )]
    pub no_convert: bool,

    #[arg(
        short = 'f',
        long,
        help = "Target format (webp, avif; default: webp)"
    )]
    pub format: Option<TargetFormat>,

    #[arg(
        long,
        help = "Encode WebP output losslessly (ignores --quality for WebP)"
    )]
    pub lossless: bool,
}

impl ImageArgs {
    pub fn to_options(&self) -> Result<OptimizeOptions> {
        OptimizeOptions::new(self.quality, !self.no_convert, self.max_width, self.format)
            .map(|options| options.with_lossless(self.lossless))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Downsample and re-encode every JPEG and PNG under a directory",
        long_about = "Recursively optimize .jpg, .jpeg and .png files. A file that fails to \
                      decode or save is reported and skipped; the run continues."
    )]
    Optimize {
        #[arg(default_value = ".", help = "Directory to process")]
        directory: PathBuf,

        #[command(flatten)]
        image: ImageArgs,
    },

    #[command(
        about = "Rewrite image extensions in HTML, CSS and JS files",
        long_about = "Replace .png, .jpg and .jpeg with the target extension in every .html, \
                      .css and .js file. Files are only written when their content changes."
    )]
    UpdateRefs {
        #[arg(default_value = ".", help = "Directory to process")]
        directory: PathBuf,

        #[arg(
            short = 'f',
            long,
            help = "Target format (webp, avif; default: webp)"
        )]
        format: Option<TargetFormat>,

        #[arg(
            long,
            help = "Only rewrite references whose converted image exists",
            long_help = "Without this flag every occurrence of a source extension is replaced, \
                         even in text that is not an image reference. With it, only path-like \
                         references with an existing converted sibling are rewritten."
        )]
        strict: bool,
    },

    #[command(
        about = "Optimize images, then rewrite references to the converted files",
        long_about = "Run optimize followed by update-refs over the same directory. The rewrite \
                      pass is skipped with --no-convert since no new files exist."
    )]
    Run {
        #[arg(default_value = ".", help = "Directory to process")]
        directory: PathBuf,

        #[command(flatten)]
        image: ImageArgs,

        #[arg(long, help = "Only rewrite references whose converted image exists")]
        strict: bool,
    },
}
