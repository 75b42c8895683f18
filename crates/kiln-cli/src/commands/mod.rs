//! Command handlers. Each translates arguments into core calls and prints
//! the outcome; adapters are wired here and nowhere else.

pub mod completions;
pub mod config;
pub mod extract;
pub mod generate;
pub mod init;
pub mod list;
pub mod pack;

use std::fs;
use std::io;
use std::path::Path;

use kiln_adapters::{LocalFilesystem, ZipCodec, build_registry};
use kiln_core::application::{GeneratorService, ProjectService};
use kiln_core::domain::Properties;

use crate::{
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
};

/// Wire the production adapters around the registry for `config`.
pub(crate) fn project_service(config: &AppConfig) -> CliResult<ProjectService> {
    let registry = build_registry(config.catalog.path.as_deref())?;
    Ok(ProjectService::new(
        GeneratorService::new(registry),
        Box::new(ZipCodec::new()),
        Box::new(LocalFilesystem::new()),
    ))
}

/// Read a file named on the command line.
pub(crate) fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CliError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CliError::IoError {
            message: format!("Failed to read '{}'", path.display()),
            source: e,
        },
    })
}

/// Write `bytes` to `path`, refusing to replace a file unless `force`.
pub(crate) fn write_output(path: &Path, bytes: &[u8], force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::OutputExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(path, bytes).with_cli_context(|| format!("Failed to write '{}'", path.display()))
}

/// Parse a `.json` or `.toml` properties file.
pub(crate) fn read_properties(path: &Path) -> CliResult<Properties> {
    let bytes = read_input(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| CliError::invalid_input(format!("'{}' is not UTF-8", path.display())))?;

    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|e| CliError::InvalidInput {
            message: format!("'{}' is not a valid properties file", path.display()),
            source: Some(Box::new(e)),
        })?,
        Some("toml") => toml::from_str(&text).map_err(|e| CliError::InvalidInput {
            message: format!("'{}' is not a valid properties file", path.display()),
            source: Some(Box::new(e)),
        })?,
        _ => {
            return Err(CliError::invalid_input(format!(
                "'{}' must end in .json or .toml",
                path.display()
            )));
        }
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn properties_from_json_and_toml_agree() {
        let temp = TempDir::new().unwrap();
        let json = temp.path().join("p.json");
        let toml = temp.path().join("p.toml");
        fs::write(&json, r#"{"application": "shop", "env": {"PORT": "8080"}}"#).unwrap();
        fs::write(&toml, "application = \"shop\"\n\n[env]\nPORT = \"8080\"\n").unwrap();

        let a = read_properties(&json).unwrap();
        let b = read_properties(&toml).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.require_str("application").unwrap(), "shop");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("p.yaml");
        fs::write(&path, "a: b").unwrap();

        assert!(matches!(
            read_properties(&path),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn missing_input_is_not_found() {
        assert!(matches!(
            read_input(Path::new("/definitely/missing.zip")),
            Err(CliError::FileNotFound { .. })
        ));
    }

    #[test]
    fn write_output_respects_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/out.zip");

        write_output(&path, b"one", false).unwrap();
        assert!(matches!(
            write_output(&path, b"two", false),
            Err(CliError::OutputExists { .. })
        ));
        write_output(&path, b"two", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");
    }
}
