//! Implementation of the `kiln generate` command.
//!
//! Builds the property maps, optionally seeds the run from an archive,
//! runs the generator and writes the result as a zip or a directory.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument};

use kiln_core::domain::{Properties, ResourceTree};

use crate::{
    cli::GenerateArgs,
    commands::{project_service, read_input, read_properties, write_output},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct GenerateReport {
    generator: String,
    output: PathBuf,
    kind: &'static str,
    files: usize,
    directories: usize,
}

#[instrument(skip_all, fields(generator = %args.name))]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    if let Some(out) = &args.out {
        if out.exists() && !args.force {
            return Err(CliError::OutputExists { path: out.clone() });
        }
    }

    let service = project_service(&config)?;
    let props = build_properties(&args)?;
    let extra = match &args.extra_file {
        Some(path) => read_properties(path)?,
        None => Properties::new(),
    };

    let seed = match &args.from {
        Some(path) => {
            let bytes = read_input(path)?;
            let seed = service.import_archive(&bytes, &config.scratch_dir())?;
            info!(entries = seed.len(), archive = %path.display(), "Seed imported");
            seed
        }
        None => ResourceTree::new(),
    };

    let tree = service.generate(&args.name, seed, &props, &extra)?;

    let (destination, kind) = match (&args.out, &args.dir) {
        (Some(out), _) => {
            let root = args
                .root
                .clone()
                .or_else(|| config.archive.root_label.clone())
                .unwrap_or_default();
            let bytes = service.export_archive(&root, &tree)?;
            write_output(out, &bytes, args.force)?;
            (out.clone(), "archive")
        }
        (None, Some(dir)) => {
            service.materialize(&tree, dir, args.force)?;
            (dir.clone(), "directory")
        }
        (None, None) => {
            return Err(CliError::invalid_input("one of --out or --dir is required"));
        }
    };

    let report = GenerateReport {
        generator: args.name,
        output: destination,
        kind,
        files: tree.files().count(),
        directories: tree.directories().count(),
    };

    if output.is_json() {
        output.json(&report)?;
    } else {
        output.success(&format!(
            "Generated '{}' into {} ({} files)",
            report.generator,
            report.output.display(),
            report.files,
        ))?;
    }
    Ok(())
}

/// `--props` file first, then each `-p key=value` on top.
fn build_properties(args: &GenerateArgs) -> CliResult<Properties> {
    let mut props = match &args.props_file {
        Some(path) => read_properties(path)?,
        None => Properties::new(),
    };
    for (key, value) in &args.props {
        props.insert(key.clone(), value.clone());
    }
    Ok(props)
}
