//! Implementation of the `kiln list` command.

use serde::Serialize;

use kiln_core::application::GeneratorInfo;

use crate::{
    cli::{ListArgs, ListFormat},
    commands::project_service,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct GeneratorRow {
    name: String,
    category: String,
    description: String,
    required: Vec<String>,
    optional: Vec<String>,
    transforms: usize,
}

impl From<GeneratorInfo> for GeneratorRow {
    fn from(info: GeneratorInfo) -> Self {
        Self {
            name: info.name,
            category: info.category.to_string(),
            description: info.description,
            required: info.required,
            optional: info.optional,
            transforms: info.transforms,
        }
    }
}

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = project_service(&config)?;
    let rows: Vec<GeneratorRow> = service
        .list_generators()
        .into_iter()
        .map(GeneratorRow::from)
        .collect();

    let format = if output.is_json() { ListFormat::Json } else { args.format };

    match format {
        ListFormat::Table => {
            output.header("Available Generators:")?;
            let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
            for row in &rows {
                output.print(&format!(
                    "  {:<width$}  {:<10}  {}",
                    row.name, row.category, row.description
                ))?;
                if !row.required.is_empty() {
                    output.print(&format!(
                        "  {:<width$}  requires: {}",
                        "",
                        row.required.join(", ")
                    ))?;
                }
            }
        }
        // JSON bypasses quiet mode so it stays parseable in pipes.
        ListFormat::Json => output.json(&rows)?,
        ListFormat::List => {
            for row in &rows {
                println!("{}", row.name);
            }
        }
    }

    Ok(())
}
