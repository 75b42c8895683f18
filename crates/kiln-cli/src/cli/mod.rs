//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Composable project generators",
    long_about = "Kiln runs named generators over an in-memory file tree and \
                  writes the result to a directory or a zip archive. \
                  Generators can call each other and splice snippets into \
                  files produced by earlier ones.",
    after_help = "EXAMPLES:\n\
        \x20 kiln generate application -p application=shop --out shop.zip\n\
        \x20 kiln generate application -p application=shop --dir ./shop\n\
        \x20 kiln generate health-check --from upload.zip -p serviceName=shop --out out.zip\n\
        \x20 kiln extract upload.zip ./upload\n\
        \x20 kiln completions bash > /usr/share/bash-completion/completions/kiln",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a generator and write the result.
    #[command(
        visible_alias = "g",
        about = "Run a generator",
        after_help = "EXAMPLES:\n\
            \x20 kiln generate application -p application=shop -p runtime=node --out shop.zip\n\
            \x20 kiln generate readme --props props.toml --dir ./shop --force\n\
            \x20 kiln generate license --from seed.zip --root shop --out shop.zip"
    )]
    Generate(GenerateArgs),

    /// List registered generators.
    #[command(
        visible_alias = "ls",
        about = "List available generators",
        after_help = "EXAMPLES:\n\
            \x20 kiln list\n\
            \x20 kiln list --format json"
    )]
    List(ListArgs),

    /// Safely extract a zip archive.
    #[command(
        about = "Extract an archive into a directory",
        after_help = "EXAMPLES:\n\
            \x20 kiln extract upload.zip ./upload"
    )]
    Extract(ExtractArgs),

    /// Zip a directory from disk.
    #[command(
        about = "Pack a directory into an archive",
        after_help = "EXAMPLES:\n\
            \x20 kiln pack ./shop --out shop.zip --root shop"
    )]
    Pack(PackArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init\n\
            \x20 kiln -c ./kiln.toml init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the active configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get catalog.path\n\
            \x20 kiln config list\n\
            \x20 kiln config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `kiln generate`.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("destination").required(true).args(["out", "dir"])))]
pub struct GenerateArgs {
    /// Registered generator name.
    #[arg(value_name = "NAME", help = "Generator to run")]
    pub name: String,

    /// Property as `key=value`; repeatable and applied after `--props`.
    #[arg(
        short = 'p',
        long = "prop",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Set a property (repeatable)"
    )]
    pub props: Vec<(String, String)>,

    /// JSON or TOML file with the generator's properties.
    #[arg(long = "props", value_name = "FILE", help = "Properties file (.json or .toml)")]
    pub props_file: Option<PathBuf>,

    /// JSON or TOML file with invocation-wide context.
    #[arg(long = "extra", value_name = "FILE", help = "Extra context file (.json or .toml)")]
    pub extra_file: Option<PathBuf>,

    /// Seed the run with the contents of an existing archive.
    #[arg(long = "from", value_name = "ARCHIVE", help = "Seed archive")]
    pub from: Option<PathBuf>,

    /// Top-level directory inside the written archive.
    #[arg(long = "root", value_name = "LABEL", help = "Archive root directory")]
    pub root: Option<String>,

    /// Write a zip archive.
    #[arg(long = "out", value_name = "FILE", help = "Write a zip archive")]
    pub out: Option<PathBuf>,

    /// Write the files into a directory.
    #[arg(long = "dir", value_name = "DIR", help = "Write into a directory")]
    pub dir: Option<PathBuf>,

    /// Replace an existing output file or directory.
    #[arg(long = "force", help = "Overwrite existing output")]
    pub force: bool,
}

/// Split `key=value` at the first `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        Some(_) => Err(format!("missing key in '{raw}'")),
        None => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── extract / pack ────────────────────────────────────────────────────────────

/// Arguments for `kiln extract`.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[arg(value_name = "ARCHIVE", help = "Zip archive to extract")]
    pub archive: PathBuf,

    #[arg(value_name = "DIR", help = "Destination directory")]
    pub dir: PathBuf,
}

/// Arguments for `kiln pack`.
#[derive(Debug, Args)]
pub struct PackArgs {
    #[arg(value_name = "DIR", help = "Directory to pack")]
    pub dir: PathBuf,

    #[arg(long = "out", value_name = "FILE", help = "Archive to write")]
    pub out: PathBuf,

    #[arg(long = "root", value_name = "LABEL", help = "Archive root directory")]
    pub root: Option<String>,

    #[arg(long = "force", help = "Overwrite an existing archive")]
    pub force: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kiln completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `kiln config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `archive.root_label`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "kiln",
            "generate",
            "application",
            "-p",
            "application=shop",
            "-p",
            "runtime=node",
            "--out",
            "shop.zip",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.name, "application");
        assert_eq!(
            args.props,
            vec![
                ("application".to_string(), "shop".to_string()),
                ("runtime".to_string(), "node".to_string()),
            ]
        );
        assert_eq!(args.out, Some(PathBuf::from("shop.zip")));
    }

    #[test]
    fn generate_needs_a_destination() {
        let result = Cli::try_parse_from(["kiln", "generate", "readme"]);
        assert!(result.is_err());
    }

    #[test]
    fn generate_rejects_both_destinations() {
        let result = Cli::try_parse_from([
            "kiln", "generate", "readme", "--out", "a.zip", "--dir", "a",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn key_value_splits_on_first_equals() {
        assert_eq!(
            parse_key_value("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["kiln", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn list_alias() {
        let cli = Cli::parse_from(["kiln", "ls", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::List(ListArgs {
                format: ListFormat::Json
            })
        ));
    }
}
