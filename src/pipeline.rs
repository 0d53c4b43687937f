use crate::error::Result;
use crate::optimizer::optimize;
use crate::processing::OptimizeOptions;
use crate::report::PipelineReport;
use crate::rewriter::{update_references_with, RewriteMode, RewriteOptions};
use std::path::Path;

/// Optimizes images under `directory`, then rewrites references to them.
///
/// The rewrite pass uses the optimizer's target format and receives the
/// list of conversions it produced. When images were re-saved in place
/// there is no new extension to point at, so the rewrite pass is skipped.
pub fn run(
    directory: &Path,
    options: &OptimizeOptions,
    mode: RewriteMode,
) -> Result<PipelineReport> {
    let optimize_report = optimize(directory, options)?;

    if !options.convert_to_target_format {
        crate::verbose!("Images were saved in place; skipping reference rewrite");
        return Ok(PipelineReport {
            optimize: optimize_report,
            rewrite: None,
        });
    }

    let rewrite_options = RewriteOptions {
        target_format: options.target_format,
        mode,
    };
    let rewrite_report =
        update_references_with(directory, &rewrite_options, &optimize_report.conversions())?;

    Ok(PipelineReport {
        optimize: optimize_report,
        rewrite: Some(rewrite_report),
    })
}
