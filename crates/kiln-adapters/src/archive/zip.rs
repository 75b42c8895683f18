//! Zip archive codec.
//!
//! Writing is deterministic: entries follow the tree's depth-first order and
//! every timestamp is the zip epoch (1980-01-01), so equal trees produce
//! byte-identical archives. Reading refuses any entry that would resolve
//! outside the output directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument, warn};
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter, write::SimpleFileOptions};

use kiln_core::{
    application::{ApplicationError, ports::ArchiveCodec},
    domain::{DomainError, FileMode, RelativePath, Resource, ResourceTree},
    error::KilnResult,
};

use crate::filesystem::{apply_mode, map_io_error, read_tree};

/// [`ArchiveCodec`] backed by the `zip` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ZipCodec {
    pub fn new() -> Self {
        Self
    }

    /// Read `dir` from disk (with modes) and zip it under `root_label`.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn zip_directory(&self, root_label: &str, dir: &Path) -> KilnResult<Vec<u8>> {
        let tree = read_tree(dir)?;
        self.zip(root_label, &tree)
    }

    fn options(mode: FileMode) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(mode.bits())
    }
}

impl ArchiveCodec for ZipCodec {
    #[instrument(skip_all, fields(root = %root_label, entries = tree.len()))]
    fn zip(&self, root_label: &str, tree: &ResourceTree) -> KilnResult<Vec<u8>> {
        let prefix = root_prefix(root_label)?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        if !prefix.is_empty() {
            writer
                .add_directory(prefix.clone(), Self::options(FileMode::DIRECTORY))
                .map_err(ApplicationError::archive)?;
        }

        for resource in tree {
            let name = format!("{}{}", prefix, resource.path());
            if resource.is_directory() {
                writer
                    .add_directory(format!("{name}/"), Self::options(resource.mode()))
                    .map_err(ApplicationError::archive)?;
            } else {
                writer
                    .start_file(name, Self::options(resource.mode()))
                    .map_err(ApplicationError::archive)?;
                writer
                    .write_all(resource.content())
                    .map_err(ApplicationError::archive)?;
            }
        }

        let cursor = writer.finish().map_err(ApplicationError::archive)?;
        Ok(cursor.into_inner())
    }

    #[instrument(skip_all, fields(bytes = bytes.len(), output = %output_dir.display()))]
    fn unzip(&self, bytes: &[u8], output_dir: &Path) -> KilnResult<ResourceTree> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ApplicationError::archive)?;
        let absolute = std::path::absolute(output_dir)
            .map_err(|e| map_io_error(output_dir, e, "resolve directory"))?;
        let root = normalize_lexically(&absolute);
        let mut tree = ResourceTree::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(ApplicationError::archive)?;
            let name = entry.name().replace('\\', "/");

            let target = normalize_lexically(&root.join(&name));
            let Ok(relative) = target.strip_prefix(&root) else {
                warn!(entry = %name, "Refusing archive entry outside the output directory");
                return Err(DomainError::PathTraversal { path: name }.into());
            };
            let relative = if relative.as_os_str().is_empty() {
                None
            } else {
                Some(RelativePath::from_path(relative)?)
            };

            if entry.is_dir() {
                fs::create_dir_all(&target)
                    .map_err(|e| map_io_error(&target, e, "create directory"))?;
                if let Some(relative) = relative {
                    tree.insert(Resource::directory(relative))?;
                }
                continue;
            }
            let Some(relative) = relative else {
                return Err(DomainError::EmptyPath.into());
            };

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| map_io_error(parent, e, "create directory"))?;
            }

            // The header size is untrusted; never reserve more than the archive holds.
            let capacity = entry.size().min(bytes.len() as u64) as usize;
            let mut content = Vec::with_capacity(capacity);
            io::copy(&mut entry, &mut content).map_err(ApplicationError::archive)?;

            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .map_err(|e| map_io_error(&target, e, "create file"))?;
            file.write_all(&content)
                .map_err(|e| map_io_error(&target, e, "write file"))?;
            drop(file);

            let mode = entry.unix_mode().map(FileMode::new).unwrap_or(FileMode::new(0));
            if mode.bits() != 0 {
                apply_mode(&target, mode)?;
            }

            debug!(entry = %name, mode = %mode, "Extracted");
            let mode = if mode.bits() != 0 { mode } else { FileMode::FILE };
            tree.insert(Resource::file(relative, content, mode))?;
        }

        Ok(tree)
    }
}

/// `"label/"`, or empty when the label normalizes to nothing.
fn root_prefix(root_label: &str) -> Result<String, DomainError> {
    match RelativePath::parse(root_label) {
        Ok(path) => Ok(format!("{path}/")),
        Err(DomainError::EmptyPath) => Ok(String::new()),
        Err(e) => Err(e),
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    /// Hand-built archive with arbitrary entry names.
    fn raw_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer
                    .start_file(*name, SimpleFileOptions::default().unix_permissions(0o644))
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    fn two_file_tree() -> ResourceTree {
        let mut tree = ResourceTree::new();
        tree.put_text("README.md", "# myapp\n").unwrap();
        tree.put("bin/run.sh", "#!/bin/sh\n", FileMode::EXECUTABLE)
            .unwrap();
        tree
    }

    #[test]
    fn zip_prefixes_every_entry_with_root() {
        let bytes = ZipCodec::new().zip("myapp", &two_file_tree()).unwrap();

        assert_eq!(
            entry_names(&bytes),
            vec!["myapp/", "myapp/README.md", "myapp/bin/", "myapp/bin/run.sh"]
        );
    }

    #[test]
    fn zip_without_root_has_no_prefix() {
        let bytes = ZipCodec::new().zip("", &two_file_tree()).unwrap();

        assert_eq!(
            entry_names(&bytes),
            vec!["README.md", "bin/", "bin/run.sh"]
        );
    }

    #[test]
    fn zip_rejects_escaping_root_label() {
        assert!(ZipCodec::new().zip("../up", &two_file_tree()).is_err());
    }

    #[test]
    fn zip_is_deterministic() {
        let codec = ZipCodec::new();
        let a = codec.zip("myapp", &two_file_tree()).unwrap();
        let b = codec.zip("myapp", &two_file_tree()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn round_trip_preserves_paths_content_and_modes() {
        let temp = TempDir::new().unwrap();
        let codec = ZipCodec::new();
        let bytes = codec.zip("myapp", &two_file_tree()).unwrap();

        let tree = codec.unzip(&bytes, temp.path()).unwrap();

        assert_eq!(tree.text("myapp/README.md").unwrap(), "# myapp\n");
        assert_eq!(
            tree.get("myapp/bin/run.sh").unwrap().mode(),
            FileMode::EXECUTABLE
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("myapp/bin/run.sh")).unwrap(),
            "#!/bin/sh\n"
        );
        assert_eq!(tree.subtree("myapp").unwrap(), two_file_tree());
    }

    #[cfg(unix)]
    #[test]
    fn extracted_file_gets_entry_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bytes = raw_archive(&[("docs/", ""), ("docs/a.txt", "a")]);

        ZipCodec::new().unzip(&bytes, temp.path()).unwrap();

        let meta = fs::metadata(temp.path().join("docs/a.txt")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o644);
        assert_eq!(FileMode::new(meta.permissions().mode()).symbolic(), "rw-r--r--");
        assert!(temp.path().join("docs").is_dir());
    }

    #[test]
    fn zip_slip_stops_extraction() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        fs::create_dir(&out).unwrap();
        let bytes = raw_archive(&[
            ("first.txt", "ok"),
            ("../../etc/passwd", "owned"),
            ("later.txt", "never"),
        ]);

        let err = ZipCodec::new().unzip(&bytes, &out).unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(DomainError::PathTraversal { path }) if path == "../../etc/passwd"
        ));
        assert!(out.join("first.txt").exists());
        assert!(!out.join("later.txt").exists());
        assert!(!temp.path().join("etc").exists());
    }

    #[test]
    fn inflated_size_header_is_not_trusted() {
        let temp = TempDir::new().unwrap();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                "a.txt",
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            )
            .unwrap();
        writer.write_all(b"hi").unwrap();
        let mut bytes = writer.finish().unwrap().into_inner();

        // Uncompressed size: offset 22 in the local header, 24 in the central one.
        let claimed = 0xFFFF_FFF0_u32.to_le_bytes();
        for (signature, offset) in [(b"PK\x03\x04", 22), (b"PK\x01\x02", 24)] {
            let start = bytes
                .windows(4)
                .position(|w| w == signature)
                .unwrap();
            bytes[start + offset..start + offset + 4].copy_from_slice(&claimed);
        }

        let tree = ZipCodec::new().unzip(&bytes, temp.path()).unwrap();

        assert_eq!(tree.text("a.txt").unwrap(), "hi");
    }

    #[test]
    fn backslash_names_are_normalized() {
        let temp = TempDir::new().unwrap();
        let bytes = raw_archive(&[("..\\escape.txt", "x")]);

        let err = ZipCodec::new().unzip(&bytes, temp.path()).unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(DomainError::PathTraversal { .. })
        ));
    }

    #[test]
    fn duplicate_entries_do_not_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "existing").unwrap();
        let bytes = raw_archive(&[("a.txt", "new")]);

        assert!(ZipCodec::new().unzip(&bytes, temp.path()).is_err());
        assert_eq!(
            fs::read_to_string(temp.path().join("a.txt")).unwrap(),
            "existing"
        );
    }

    #[test]
    fn malformed_bytes_are_an_archive_error() {
        let temp = TempDir::new().unwrap();
        let err = ZipCodec::new()
            .unzip(b"definitely not a zip", temp.path())
            .unwrap_err();

        assert_eq!(err.category(), kiln_core::error::ErrorCategory::Validation);
    }

    #[test]
    fn zip_directory_reads_from_disk() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/lib.rs"), "").unwrap();

        let bytes = ZipCodec::new().zip_directory("lib", temp.path()).unwrap();

        assert_eq!(entry_names(&bytes), vec!["lib/", "lib/src/", "lib/src/lib.rs"]);
    }
}
