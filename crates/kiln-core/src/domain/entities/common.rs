use super::DomainError;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A normalized path relative to a project root.
///
/// Invariant: never absolute, never empty, no `.` or `..` segments, `/` as
/// the only separator. Enforced at construction, so any `RelativePath`
/// joined onto an output root stays inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalize `raw` into a contained relative path.
    ///
    /// `\` is treated as a separator, empty and `.` segments are dropped and
    /// `..` pops the preceding segment. Climbing above the root, a leading
    /// `/` or a drive prefix (`C:`) is a [`DomainError::PathTraversal`].
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let unified = raw.replace('\\', "/");
        if unified.starts_with('/') || has_drive_prefix(&unified) {
            return Err(DomainError::PathTraversal { path: raw.into() });
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    if segments.pop().is_none() {
                        return Err(DomainError::PathTraversal { path: raw.into() });
                    }
                }
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::EmptyPath);
        }
        Ok(Self(segments.join("/")))
    }

    /// Build from a filesystem path relative to some root.
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if segments.pop().is_none() {
                        return Err(DomainError::PathTraversal {
                            path: path.display().to_string(),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::PathTraversal {
                        path: path.display().to_string(),
                    });
                }
            }
        }
        Self::parse(&segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Parent directory, or `None` for a top-level entry.
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rfind('/')
            .map(|index| Self(self.0[..index].to_string()))
    }

    /// Every proper ancestor, outermost first.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(dir) = current {
            current = dir.parent();
            out.push(dir);
        }
        out.reverse();
        out
    }

    /// Join a segment, maintaining the containment invariant.
    pub fn join(&self, segment: &str) -> Result<Self, DomainError> {
        Self::parse(&format!("{}/{}", self.0, segment))
    }

    /// Segment-wise prefix check (`src` is a prefix of `src/main.rs`, not of `srcs`).
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0[prefix.0.len()..].starts_with('/'))
    }

    /// Strip `prefix`, returning `None` when it is not a proper prefix.
    pub fn strip_prefix(&self, prefix: &Self) -> Option<Self> {
        if self.0 == prefix.0 || !self.starts_with(prefix) {
            return None;
        }
        Some(Self(self.0[prefix.0.len() + 1..].to_string()))
    }

    /// Host-specific path under `root`.
    pub fn to_path_under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl Ord for RelativePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments().cmp(other.segments())
    }
}

impl PartialOrd for RelativePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// POSIX permission bits of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// `rw-r--r--`
    pub const FILE: Self = Self(0o644);
    /// `rwxr-xr-x`
    pub const DIRECTORY: Self = Self(0o755);
    /// `rwxr-xr-x`
    pub const EXECUTABLE: Self = Self(0o755);

    /// Keep only permission and special bits; file-type bits are dropped.
    pub const fn new(bits: u32) -> Self {
        Self(bits & 0o7777)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_executable(self) -> bool {
        self.0 & 0o111 != 0
    }

    /// Parse an octal string such as `755`, `0755` or `0o755`.
    pub fn parse_octal(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches("0o");
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|bits| *bits <= 0o7777)
            .map(Self)
    }

    /// `ls -l` style rendering of the nine permission bits.
    pub fn symbolic(self) -> String {
        const FLAGS: [(u32, char); 9] = [
            (0o400, 'r'),
            (0o200, 'w'),
            (0o100, 'x'),
            (0o040, 'r'),
            (0o020, 'w'),
            (0o010, 'x'),
            (0o004, 'r'),
            (0o002, 'w'),
            (0o001, 'x'),
        ];
        FLAGS
            .iter()
            .map(|(bit, flag)| if self.0 & bit != 0 { *flag } else { '-' })
            .collect()
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::FILE
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
