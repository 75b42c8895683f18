//! `kiln pack`: zip a directory from disk, keeping permission bits.

use tracing::instrument;

use crate::{
    cli::PackArgs,
    commands::{project_service, write_output},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: PackArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    if !args.dir.is_dir() {
        return Err(CliError::FileNotFound { path: args.dir });
    }

    let root = args
        .root
        .or(config.archive.root_label.clone())
        .unwrap_or_default();
    let bytes = project_service(&config)?.pack_directory(&args.dir, &root)?;
    write_output(&args.out, &bytes, args.force)?;

    output.success(&format!(
        "Packed {} into {} ({} bytes)",
        args.dir.display(),
        args.out.display(),
        bytes.len()
    ))?;
    Ok(())
}
