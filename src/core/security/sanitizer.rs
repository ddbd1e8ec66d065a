//! Path canonicalization against a workspace root.
//!
//! [`PathSanitizer`] turns an untrusted path string into an absolute,
//! traversal-free path and guarantees the result lies inside its root.
//! It never requires the target to exist.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::trace;

use super::error::SecurityError;

/// Upper bound on symbolic links followed while resolving one path.
const MAX_LINK_DEPTH: usize = 40;

/// Reduces candidate paths to canonical form inside a single root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSanitizer {
    work_dir: PathBuf,
}

impl PathSanitizer {
    /// Create a sanitizer rooted at `work_dir`.
    ///
    /// The root is made absolute and canonical even when it does not exist
    /// yet: the existing part of it is resolved through the filesystem and
    /// the rest is appended as-is.
    pub fn new(work_dir: impl AsRef<Path>) -> Self {
        Self {
            work_dir: canonical_root(work_dir.as_ref()),
        }
    }

    /// The canonical root of this sanitizer.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Whether `path` (already canonical) is the root or lies beneath it.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.work_dir)
    }

    /// Canonicalize `path` and enforce containment in the root.
    ///
    /// Relative paths are resolved against the root. On success the
    /// returned path is the root itself or one of its descendants.
    pub fn sanitize(&self, path: &str) -> Result<PathBuf, SecurityError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(SecurityError::EmptyInput);
        }

        let candidate = Path::new(trimmed);
        let lexical = normalize_lexically(&self.work_dir.join(candidate));
        if self.contains(&lexical) {
            return Ok(lexical);
        }

        // The input may name the root through an alias (e.g. a symlinked
        // temp directory); compare the real location once before denying.
        if let Ok(real) = resolve_real_path(&lexical) {
            if self.contains(&real) {
                trace!("Path '{}' reached workspace via {:?}", trimmed, real);
                return Ok(real);
            }
        }

        if has_parent_segment(candidate) {
            Err(SecurityError::PathTraversal {
                path: trimmed.to_string(),
                root: self.work_dir.clone(),
            })
        } else {
            Err(SecurityError::PathOutsideWorkspace {
                path: lexical,
                root: self.work_dir.clone(),
            })
        }
    }
}

/// Make `path` absolute and canonical, tolerating a missing tail.
fn canonical_root(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let lexical = normalize_lexically(&absolute);
    resolve_real_path(&lexical).unwrap_or(lexical)
}

fn has_parent_segment(path: &Path) -> bool {
    path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Resolve every symbolic link in `path`, tolerating a missing tail.
///
/// Components are resolved one at a time, the way the kernel walks a path:
/// a link's target is spliced in front of the components still to visit and
/// `..` always pops the already-resolved prefix. Components that do not
/// exist are kept as written, so a dangling link is reported at its real
/// destination.
pub(crate) fn resolve_real_path(path: &Path) -> io::Result<PathBuf> {
    let path = std::path::absolute(path)?;
    let mut resolved = root_of(&path);
    let mut pending: VecDeque<OsString> = segments(&path).into();
    let mut links_followed = 0;

    while let Some(segment) = pending.pop_front() {
        if segment == ".." {
            resolved.pop();
            continue;
        }

        let candidate = resolved.join(&segment);
        match fs::symlink_metadata(&candidate) {
            Ok(meta) if meta.file_type().is_symlink() => {
                links_followed += 1;
                if links_followed > MAX_LINK_DEPTH {
                    return Err(io::Error::other(format!(
                        "too many levels of symbolic links at {}",
                        candidate.display()
                    )));
                }

                let target = fs::read_link(&candidate)?;
                if target.has_root() {
                    resolved = root_of(&target);
                }
                for segment in segments(&target).into_iter().rev() {
                    pending.push_front(segment);
                }
            }
            Ok(_) => resolved = candidate,
            Err(e) if e.kind() == io::ErrorKind::NotFound => resolved = candidate,
            Err(e) => return Err(e),
        }
    }

    Ok(resolved)
}

/// The prefix and root directory of `path`, e.g. `/` or `C:\`.
fn root_of(path: &Path) -> PathBuf {
    path.components()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}

/// Normal and `..` components of `path`; `.` is dropped.
fn segments(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_os_string()),
            Component::ParentDir => Some(OsString::from("..")),
            Component::Prefix(_) | Component::RootDir | Component::CurDir => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sanitizer() -> (TempDir, PathSanitizer) {
        let temp_dir = TempDir::new().unwrap();
        let sanitizer = PathSanitizer::new(temp_dir.path());
        (temp_dir, sanitizer)
    }

    #[test]
    fn test_relative_path_is_strict_descendant() {
        let (_temp, sanitizer) = sanitizer();
        let result = sanitizer.sanitize("test.txt").unwrap();

        assert!(result.starts_with(sanitizer.work_dir()));
        assert_ne!(result, sanitizer.work_dir());
        assert!(result.is_absolute());
    }

    #[test]
    fn test_traversal_rejected() {
        let (_temp, sanitizer) = sanitizer();
        let result = sanitizer.sanitize("../../../etc/passwd");

        assert!(matches!(result, Err(SecurityError::PathTraversal { .. })));
    }

    #[test]
    fn test_traversal_that_stays_inside_is_collapsed() {
        let (_temp, sanitizer) = sanitizer();
        let result = sanitizer.sanitize("a/./b/../c.txt").unwrap();

        assert_eq!(result, sanitizer.work_dir().join("a").join("c.txt"));
    }

    #[test]
    fn test_absolute_outside_rejected() {
        let (_temp, sanitizer) = sanitizer();
        let result = sanitizer.sanitize("/etc/passwd");

        assert!(matches!(
            result,
            Err(SecurityError::PathOutsideWorkspace { .. })
        ));
    }

    #[test]
    fn test_absolute_inside_accepted() {
        let (temp, sanitizer) = sanitizer();
        let inside = temp.path().join("notes.md");
        let result = sanitizer.sanitize(inside.to_str().unwrap()).unwrap();

        assert!(result.starts_with(sanitizer.work_dir()));
        assert!(result.ends_with("notes.md"));
    }

    #[test]
    fn test_sibling_with_shared_prefix_rejected() {
        let temp = TempDir::new().unwrap();
        let sanitizer = PathSanitizer::new(temp.path().join("work"));
        let sibling = sanitizer
            .work_dir()
            .parent()
            .unwrap()
            .join("workspace2")
            .join("secret.txt");

        let result = sanitizer.sanitize(sibling.to_str().unwrap());
        assert!(matches!(
            result,
            Err(SecurityError::PathOutsideWorkspace { .. })
        ));
    }

    #[test]
    fn test_root_itself_is_allowed() {
        let (_temp, sanitizer) = sanitizer();
        assert_eq!(sanitizer.sanitize(".").unwrap(), sanitizer.work_dir());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let (_temp, sanitizer) = sanitizer();
        let result = sanitizer.sanitize("  file.txt \n").unwrap();
        assert_eq!(result, sanitizer.work_dir().join("file.txt"));
    }

    #[test]
    fn test_empty_rejected() {
        let (_temp, sanitizer) = sanitizer();
        assert!(matches!(sanitizer.sanitize(""), Err(SecurityError::EmptyInput)));
        assert!(matches!(sanitizer.sanitize("   "), Err(SecurityError::EmptyInput)));
    }

    #[test]
    fn test_missing_work_dir_is_still_absolute() {
        let temp = TempDir::new().unwrap();
        let sanitizer = PathSanitizer::new(temp.path().join("not/yet/created/../here"));

        assert!(sanitizer.work_dir().is_absolute());
        assert!(sanitizer.work_dir().ends_with("not/yet/here"));
        assert!(sanitizer.sanitize("file.txt").is_ok());
    }

    #[test]
    fn test_normalize_never_climbs_above_root() {
        assert_eq!(
            normalize_lexically(Path::new("/../../etc/./passwd")),
            PathBuf::from("/etc/passwd")
        );
        assert_eq!(
            normalize_lexically(Path::new("/a/b/../../c")),
            PathBuf::from("/c")
        );
    }

    #[test]
    fn test_resolve_missing_tail() {
        let (temp, _sanitizer) = sanitizer();
        let real_root = fs::canonicalize(temp.path()).unwrap();
        let resolved = resolve_real_path(&real_root.join("missing/child.txt")).unwrap();

        assert_eq!(resolved, real_root.join("missing").join("child.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_dangling_link() {
        use std::os::unix::fs::symlink;

        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let real_root = fs::canonicalize(root.path()).unwrap();
        let real_outside = fs::canonicalize(outside.path()).unwrap();

        let link = real_root.join("dangling");
        symlink(real_outside.join("later.txt"), &link).unwrap();

        let resolved = resolve_real_path(&link).unwrap();
        assert_eq!(resolved, real_outside.join("later.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_parent_segment_after_linked_dir() {
        use std::os::unix::fs::symlink;

        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let real_root = fs::canonicalize(root.path()).unwrap();
        let real_outside = fs::canonicalize(outside.path()).unwrap();
        fs::create_dir_all(real_outside.join("deep/dir")).unwrap();

        symlink(real_outside.join("deep/dir"), real_root.join("b")).unwrap();
        symlink("b/../x", real_root.join("dl")).unwrap();

        let resolved = resolve_real_path(&real_root.join("dl")).unwrap();
        assert_eq!(resolved, real_outside.join("deep").join("x"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_matches_canonicalize_for_existing_paths() {
        use std::os::unix::fs::symlink;

        let root = TempDir::new().unwrap();
        let real_root = fs::canonicalize(root.path()).unwrap();
        fs::create_dir_all(real_root.join("a/b")).unwrap();
        fs::write(real_root.join("a/b/file.txt"), "x").unwrap();
        symlink("a/b", real_root.join("short")).unwrap();

        let through_link = root.path().join("short/../b/file.txt");
        assert_eq!(
            resolve_real_path(&through_link).unwrap(),
            fs::canonicalize(&through_link).unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_link_loop_fails() {
        use std::os::unix::fs::symlink;

        let root = TempDir::new().unwrap();
        let real_root = fs::canonicalize(root.path()).unwrap();
        symlink("l2", real_root.join("l1")).unwrap();
        symlink("l1", real_root.join("l2")).unwrap();

        assert!(resolve_real_path(&real_root.join("l1")).is_err());
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let (_temp, sanitizer) = sanitizer();
        let first = sanitizer.sanitize("dir/../file.txt").unwrap();
        let second = sanitizer.sanitize("dir/../file.txt").unwrap();
        assert_eq!(first, second);
        assert_eq!(sanitizer.sanitize(first.to_str().unwrap()).unwrap(), first);
    }
}
