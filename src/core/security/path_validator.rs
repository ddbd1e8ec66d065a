use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::error::SecurityError;
use super::sanitizer::{PathSanitizer, normalize_lexically, resolve_real_path};

/// Sensitive locations seeded into every new validator.
///
/// Absolute entries deny the entry and everything beneath it. Relative
/// entries deny any path containing that run of components, wherever it
/// appears (e.g. `.ssh` covers every user's key directory).
pub const DEFAULT_FORBIDDEN_PATHS: &[&str] = &[
    "/etc/passwd",
    "/etc/shadow",
    "/etc/gshadow",
    "/etc/sudoers",
    "/etc/sudoers.d",
    "/etc/ssh",
    "/root/.ssh",
    "/proc",
    "/sys",
    "/dev",
    "/boot",
    ".ssh",
    ".gnupg",
    ".aws/credentials",
];

/// A read-only view of the path rules in force for one validation.
#[derive(Debug, Clone, Copy)]
pub struct PathPolicy<'a> {
    /// Primary workspace root.
    pub workspace: &'a PathSanitizer,
    /// Extra roots in which paths are also accepted.
    pub allowed_dirs: &'a [PathSanitizer],
    /// Forbidden entries, matched case-insensitively.
    pub forbidden: &'a [String],
}

impl PathPolicy<'_> {
    /// Validates that a given path is within the configured security boundaries.
    ///
    /// This function performs the following checks:
    /// 1. Canonicalizes the input path against the workspace (then the extra
    ///    allowed roots) and enforces containment
    /// 2. Rejects the path if it or any ancestor is on the forbidden list
    /// 3. Resolves symlinks and re-checks the real location
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - The canonical, validated path
    /// * `Err(SecurityError)` - If validation fails
    pub fn validate(&self, input: &str) -> Result<PathBuf, SecurityError> {
        let canonical = self.contain(input)?;

        if let Some(entry) = self.forbidden_entry(&canonical) {
            return Err(SecurityError::ForbiddenPath {
                path: canonical,
                entry: entry.clone(),
            });
        }

        let real = resolve_real_path(&canonical).map_err(|error| SecurityError::Unresolvable {
            path: canonical.clone(),
            error,
        })?;

        if real != canonical {
            debug!("Path {:?} resolves to {:?}", canonical, real);
            if !self.is_contained(&real) || self.forbidden_entry(&real).is_some() {
                return Err(SecurityError::SymlinkEscape {
                    path: canonical,
                    target: real,
                });
            }
        }

        Ok(canonical)
    }

    /// Run the sanitizer against the workspace, falling back to the extra
    /// roots. The workspace error is the one reported.
    fn contain(&self, input: &str) -> Result<PathBuf, SecurityError> {
        let err = match self.workspace.sanitize(input) {
            Ok(path) => return Ok(path),
            Err(err) if err.is_containment() => err,
            Err(err) => return Err(err),
        };

        if self.allowed_dirs.is_empty() {
            return Err(err);
        }

        let absolute = normalize_lexically(&self.workspace.work_dir().join(input.trim()));
        let absolute = absolute.to_string_lossy();
        self.allowed_dirs
            .iter()
            .find_map(|dir| dir.sanitize(&absolute).ok())
            .ok_or(err)
    }

    fn is_contained(&self, path: &Path) -> bool {
        self.workspace.contains(path) || self.allowed_dirs.iter().any(|dir| dir.contains(path))
    }

    fn forbidden_entry(&self, path: &Path) -> Option<&String> {
        let lowered = PathBuf::from(path.to_string_lossy().to_lowercase());
        self.forbidden.iter().find(|entry| {
            let entry = entry.trim();
            !entry.is_empty() && matches_entry(&lowered, Path::new(&entry.to_lowercase()))
        })
    }
}

/// Component-bounded match of a forbidden entry against a lowercased path.
fn matches_entry(path: &Path, entry: &Path) -> bool {
    if entry.is_absolute() {
        return path.starts_with(entry);
    }

    let needle: Vec<Component<'_>> = entry
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if needle.is_empty() {
        return false;
    }

    let haystack: Vec<Component<'_>> = path.components().collect();
    haystack.windows(needle.len()).any(|window| window == needle.as_slice())
}
