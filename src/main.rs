use clap::Parser;
use web_squeeze::cli::{Args, Commands};
use web_squeeze::rewriter::{RewriteMode, RewriteOptions};
use web_squeeze::{logger, optimize, run, update_references, Result, SqueezeError};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::configure(args.quiet, args.verbose);

    match execute(args.command) {
        // A missing or non-directory target is reported once; there is nothing to do.
        Err(e @ (SqueezeError::DirectoryNotFound(_) | SqueezeError::NotADirectory(_))) => {
            web_squeeze::error!("{}", e);
            Ok(())
        }
        other => Ok(other?),
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Optimize { directory, image } => {
            let options = image.to_options()?;
            optimize(&directory, &options)?;
        }
        Commands::UpdateRefs {
            directory,
            format,
            strict,
        } => {
            let options = RewriteOptions::new(format, strict);
            update_references(&directory, &options)?;
        }
        Commands::Run {
            directory,
            image,
            strict,
        } => {
            let options = image.to_options()?;
            let mode = if strict {
                RewriteMode::Strict
            } else {
                RewriteMode::Blind
            };
            run(&directory, &options, mode)?;
        }
    }

    Ok(())
}
