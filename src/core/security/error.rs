//! Security error taxonomy.
//!
//! Every denial produced by the validation layer is one of these variants.
//! Callers match on the variant (or on [`SecurityError::kind`]) to tell
//! denials apart; the `Display` text is meant for humans and the agent.

use std::io;
use std::path::PathBuf;

/// Errors returned when a proposed tool invocation is denied.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Command contains forbidden pattern '{pattern}'")]
    ForbiddenCommand { pattern: String },

    #[error("Potential shell injection detected in command")]
    ShellInjectionDetected,

    #[error("Path '{path}' traverses outside workspace '{root}'")]
    PathTraversal { path: String, root: PathBuf },

    #[error("Path '{path}' is outside workspace '{root}'")]
    PathOutsideWorkspace { path: PathBuf, root: PathBuf },

    #[error("Access to '{path}' is forbidden (matches '{entry}')")]
    ForbiddenPath { path: PathBuf, entry: String },

    #[error("Symlink '{path}' resolves to '{target}', which is not allowed")]
    SymlinkEscape { path: PathBuf, target: PathBuf },

    #[error("Invalid target type for '{path}': expected {expected}")]
    InvalidTargetType { path: PathBuf, expected: &'static str },

    #[error("Missing or invalid '{name}' parameter")]
    MissingParameter { name: &'static str },

    #[error("Cannot resolve path '{path}': {error}")]
    Unresolvable { path: PathBuf, error: io::Error },
}

impl SecurityError {
    /// Stable, machine-readable code for this denial.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::ForbiddenCommand { .. } => "forbidden_command",
            Self::ShellInjectionDetected => "shell_injection_detected",
            Self::PathTraversal { .. } => "path_traversal",
            Self::PathOutsideWorkspace { .. } => "path_outside_workspace",
            Self::ForbiddenPath { .. } => "forbidden_path",
            Self::SymlinkEscape { .. } => "symlink_escape",
            Self::InvalidTargetType { .. } => "invalid_target_type",
            Self::MissingParameter { .. } => "missing_parameter",
            Self::Unresolvable { .. } => "unresolvable",
        }
    }

    /// Whether this denial is a workspace containment failure.
    pub fn is_containment(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::PathOutsideWorkspace { .. }
        )
    }
}
