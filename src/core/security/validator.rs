//! The per-instance security validator.
//!
//! A [`SecurityValidator`] owns one workspace root plus its denylists.
//! Several validators can live in the same process (one per agent session)
//! without sharing any state.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, info};

use super::command_validator::{self, DEFAULT_FORBIDDEN_COMMANDS};
use super::error::SecurityError;
use super::path_validator::{DEFAULT_FORBIDDEN_PATHS, PathPolicy};
use super::sanitizer::PathSanitizer;
use crate::core::config::SecurityConfig;

/// Mutable part of the validator configuration.
///
/// Each setter swaps one whole list, so a reader holding the lock always
/// sees a consistent policy.
#[derive(Debug, Clone)]
struct SecurityPolicy {
    forbidden_commands: Vec<String>,
    forbidden_paths: Vec<String>,
    allowed_dirs: Vec<PathSanitizer>,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            forbidden_commands: DEFAULT_FORBIDDEN_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            forbidden_paths: DEFAULT_FORBIDDEN_PATHS.iter().map(|s| s.to_string()).collect(),
            allowed_dirs: Vec::new(),
        }
    }
}

/// Gatekeeper for shell commands and file paths proposed by an agent.
///
/// The workspace root is fixed at construction. The denylists and extra
/// allowed roots may be replaced at any time; replacements are exclusive
/// with in-flight validations.
#[derive(Debug)]
pub struct SecurityValidator {
    workspace: PathSanitizer,
    policy: RwLock<SecurityPolicy>,
}

impl SecurityValidator {
    /// Create a validator rooted at `work_dir` with the default denylists.
    ///
    /// `work_dir` does not need to exist; it is stored absolute and
    /// canonical either way.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        let workspace = PathSanitizer::new(work_dir);
        info!("Security validator rooted at {:?}", workspace.work_dir());
        Self {
            workspace,
            policy: RwLock::new(SecurityPolicy::default()),
        }
    }

    /// Build a validator from the loaded security configuration.
    ///
    /// Lists that are not configured keep their defaults.
    pub fn from_config(config: &SecurityConfig) -> Self {
        let work_dir = config
            .work_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let validator = Self::new(work_dir);

        if let Some(ref commands) = config.forbidden_commands {
            validator.set_forbidden_commands(commands.iter().cloned());
        }
        if let Some(ref paths) = config.forbidden_paths {
            validator.set_forbidden_paths(paths.iter().cloned());
        }
        if !config.allowed_dirs.is_empty() {
            validator.set_allowed_dirs(&config.allowed_dirs);
        }

        validator
    }

    /// The canonical workspace root.
    pub fn work_dir(&self) -> &Path {
        self.workspace.work_dir()
    }

    /// Replace the forbidden command substrings.
    pub fn set_forbidden_commands<I, S>(&self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands: Vec<String> = commands.into_iter().map(Into::into).collect();
        debug!("Replacing forbidden commands ({} entries)", commands.len());
        self.write_policy(|policy| policy.forbidden_commands = commands);
    }

    /// Replace the forbidden path entries.
    pub fn set_forbidden_paths<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        debug!("Replacing forbidden paths ({} entries)", paths.len());
        self.write_policy(|policy| policy.forbidden_paths = paths);
    }

    /// Replace the additional roots in which paths are accepted.
    pub fn set_allowed_dirs<I, P>(&self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dirs: Vec<PathSanitizer> = dirs.into_iter().map(PathSanitizer::new).collect();
        debug!("Replacing allowed directories ({} entries)", dirs.len());
        self.write_policy(|policy| policy.allowed_dirs = dirs);
    }

    pub fn forbidden_commands(&self) -> Vec<String> {
        self.read_policy().forbidden_commands.clone()
    }

    pub fn forbidden_paths(&self) -> Vec<String> {
        self.read_policy().forbidden_paths.clone()
    }

    /// Canonical forms of the extra allowed roots.
    pub fn allowed_dirs(&self) -> Vec<PathBuf> {
        self.read_policy()
            .allowed_dirs
            .iter()
            .map(|dir| dir.work_dir().to_path_buf())
            .collect()
    }

    /// Canonicalize `path` against the workspace root only.
    pub fn sanitize(&self, path: &str) -> Result<PathBuf, SecurityError> {
        self.workspace.sanitize(path)
    }

    /// Check a shell command for injection syntax and forbidden substrings.
    pub fn validate_command(&self, command: &str) -> Result<(), SecurityError> {
        let policy = self.read_policy();
        command_validator::validate_command(command, &policy.forbidden_commands)
    }

    /// Check a path for containment, forbidden entries and symlink escapes.
    ///
    /// Returns the canonical path on success.
    pub fn validate_path(&self, path: &str) -> Result<PathBuf, SecurityError> {
        let policy = self.read_policy();
        PathPolicy {
            workspace: &self.workspace,
            allowed_dirs: &policy.allowed_dirs,
            forbidden: &policy.forbidden_paths,
        }
        .validate(path)
    }

    // A panic while holding the lock cannot leave a half-written list,
    // so a poisoned lock is still safe to use.
    fn read_policy(&self) -> RwLockReadGuard<'_, SecurityPolicy> {
        self.policy.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_policy(&self, update: impl FnOnce(&mut SecurityPolicy)) {
        let mut policy = self.policy.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut policy);
    }
}
