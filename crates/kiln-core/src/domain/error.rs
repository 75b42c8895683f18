// ============================================================================
// domain/error.rs - DOMAIN ERROR TAXONOMY
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through nested generator invocations)
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Path Errors
    // ========================================================================
    #[error("Path escapes the project root: {path}")]
    PathTraversal { path: String },

    #[error("Path resolves to the project root itself")]
    EmptyPath,

    #[error("Path conflict at '{path}': {reason}")]
    PathConflict { path: String, reason: String },

    #[error("Resource not found: {path}")]
    ResourceNotFound { path: String },

    #[error("Merge conflict: '{path}' differs in both trees")]
    MergeConflict { path: String },

    // ========================================================================
    // Transform Errors
    // ========================================================================
    #[error("Anchor '{anchor}' not found in {file}")]
    AnchorNotFound { file: String, anchor: String },

    #[error("Cannot transform '{path}': {reason}")]
    UnsupportedResourceKind { path: String, reason: String },

    // ========================================================================
    // Property Errors
    // ========================================================================
    #[error("Required property missing: {key}")]
    MissingProperty { key: String },

    #[error("Property '{key}' must be {expected}, found {found}")]
    InvalidPropertyShape {
        key: String,
        expected: String,
        found: String,
    },

    #[error("Unknown property: {key}")]
    UnknownProperty { key: String },

    // ========================================================================
    // Registry Errors
    // ========================================================================
    #[error("Unknown generator: {name}")]
    UnknownGenerator { name: String },

    #[error("Generator '{name}' is already registered")]
    DuplicateGenerator { name: String },

    #[error("Generator invocation cycle: {chain}")]
    InvocationCycle { chain: String },

    #[error("Invalid generator descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::PathTraversal { path } => vec![
                format!("Refusing to write outside the output root: {}", path),
                "The archive or generator may be malicious or corrupted".into(),
            ],
            Self::AnchorNotFound { file, anchor } => vec![
                format!("'{}' no longer contains the anchor '{}'", file, anchor),
                "The base template and its overlay have drifted apart".into(),
                "Update the overlay anchor or restore the marker in the template".into(),
            ],
            Self::MissingProperty { key } => vec![
                format!("Provide a value for '{}'", key),
                "Example: kiln generate <name> -p key=value".into(),
            ],
            Self::InvalidPropertyShape { key, expected, .. } => {
                vec![format!("Property '{}' must be {}", key, expected)]
            }
            Self::UnknownProperty { key } => vec![
                format!("'{}' is not accepted by this generator", key),
                "Check the generator's property list with: kiln list".into(),
            ],
            Self::UnknownGenerator { name } => vec![
                format!("No generator named '{}' is registered", name),
                "Try: kiln list".into(),
            ],
            Self::MergeConflict { path } => vec![
                format!("Both trees define '{}' with different content", path),
                "Merge with last-writer-wins if overwriting is intended".into(),
            ],
            Self::UnsupportedResourceKind { path, .. } => vec![
                format!("'{}' is not a text file", path),
                "Narrow the transform target glob to text resources".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PathTraversal { .. } => ErrorCategory::Security,
            Self::EmptyPath
            | Self::MissingProperty { .. }
            | Self::InvalidPropertyShape { .. }
            | Self::UnknownProperty { .. }
            | Self::InvalidDescriptor { .. }
            | Self::InvalidGlob { .. }
            | Self::UnsupportedResourceKind { .. } => ErrorCategory::Validation,
            Self::PathConflict { .. }
            | Self::MergeConflict { .. }
            | Self::DuplicateGenerator { .. }
            | Self::InvocationCycle { .. }
            | Self::AnchorNotFound { .. } => ErrorCategory::Conflict,
            Self::ResourceNotFound { .. } | Self::UnknownGenerator { .. } => {
                ErrorCategory::NotFound
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Security,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_a_security_error() {
        let err = DomainError::PathTraversal {
            path: "../etc/passwd".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Security);
        assert!(err.to_string().contains("../etc/passwd"));
    }

    #[test]
    fn anchor_error_names_file_and_pattern() {
        let err = DomainError::AnchorNotFound {
            file: "src/App.java".into(),
            anchor: "// imports".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("src/App.java"));
        assert!(msg.contains("// imports"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn unknown_generator_suggests_listing() {
        let err = DomainError::UnknownGenerator {
            name: "nope".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("kiln list")));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
