pub mod cli;
pub mod constants;
pub mod error;
pub mod formats;
pub mod logger;
pub mod optimizer;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod rewriter;
pub mod utils;
pub mod walker;

pub use error::{Result, SqueezeError};
pub use formats::{is_container_file, is_image_file, ContainerKind, SourceFormat, TargetFormat};
pub use optimizer::optimize;
pub use pipeline::run;
pub use processing::{
    load_image_with_metadata, optimize_image, output_path_for, resize_image, scaled_dimensions,
    OptimizeOptions, OptimizedImage,
};
pub use report::{Conversion, FileFailure, OptimizeReport, PipelineReport, RewriteReport};
pub use rewriter::{
    update_references, update_references_with, ReferenceRewriter, RewriteMode, RewriteOptions,
};
pub use walker::{walk_files, TreeEntry, TreeWalk};
