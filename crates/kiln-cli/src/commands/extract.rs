//! `kiln extract`: unzip an archive with path-traversal protection.

use tracing::instrument;

use kiln_adapters::ZipCodec;
use kiln_core::application::ArchiveCodec;

use crate::{
    cli::ExtractArgs,
    commands::read_input,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

#[instrument(skip_all, fields(archive = %args.archive.display()))]
pub fn execute(args: ExtractArgs, output: OutputManager) -> CliResult<()> {
    let bytes = read_input(&args.archive)?;
    std::fs::create_dir_all(&args.dir)
        .with_cli_context(|| format!("Failed to create '{}'", args.dir.display()))?;

    let tree = ZipCodec::new().unzip(&bytes, &args.dir)?;

    if output.is_json() {
        let paths: Vec<String> = tree.iter().map(|r| r.path().to_string()).collect();
        output.json(&paths)?;
    } else {
        output.success(&format!(
            "Extracted {} entries into {}",
            tree.len(),
            args.dir.display()
        ))?;
    }
    Ok(())
}
