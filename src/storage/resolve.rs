//! Path resolution
//!
//! Turns user-supplied relative paths into absolute paths confined to a
//! manager's root directory. Rejection happens before any I/O; the jail
//! check canonicalizes against the real filesystem so symlinks cannot be
//! used to escape the root.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::VaultError;

/// Resolves relative user input against a single root directory.
///
/// The canonical form of the root is captured at construction. A resolved
/// path is only guaranteed to be inside the root at the instant of
/// resolution; callers must not cache it across operations that may race
/// with deletion or symlink changes.
#[derive(Debug)]
pub struct PathResolver {
    root: PathBuf,
    canonical_root: PathBuf,
    allow_nested: bool,
}

impl PathResolver {
    pub fn new(root: &Path, allow_nested: bool) -> Result<Self, VaultError> {
        let canonical_root = root.canonicalize()?;
        Ok(Self {
            root: root.to_path_buf(),
            canonical_root,
            allow_nested,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn allow_nested(&self) -> bool {
        self.allow_nested
    }

    /// Resolves a file or directory path. Empty input is rejected.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, VaultError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VaultError::Validation("The path cannot be empty.".into()));
        }
        self.resolve_non_empty(trimmed)
    }

    /// Resolves a directory path, treating empty input as the root itself.
    pub fn resolve_dir(&self, raw: &str) -> Result<PathBuf, VaultError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(self.root.clone());
        }
        self.resolve_non_empty(trimmed)
    }

    fn resolve_non_empty(&self, raw: &str) -> Result<PathBuf, VaultError> {
        if raw.contains("..") {
            return Err(VaultError::Validation(format!(
                "Invalid path `{}`. Paths cannot contain `..` sequences.",
                raw
            )));
        }

        if !self.allow_nested && (raw.contains('/') || raw.contains('\\')) {
            return Err(VaultError::Validation(format!(
                "Invalid filename `{}`. Filenames cannot contain path separators here.",
                raw
            )));
        }

        // Normalize lexically: keep plain components, drop `.` and any
        // root/prefix component so the result stays relative to the root.
        let mut candidate = self.root.clone();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(part) => candidate.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(VaultError::Validation(format!(
                        "Invalid path `{}`. Paths cannot contain `..` sequences.",
                        raw
                    )));
                }
                Component::RootDir | Component::Prefix(_) => {}
            }
        }

        self.ensure_within_root(&candidate, raw)?;
        Ok(candidate)
    }

    /// Canonicalizes the longest existing ancestor of `candidate` and checks
    /// it stays under the canonical root. The tail of the path may not exist
    /// yet (upload and mkdir targets), which is fine: only components that
    /// exist can carry a symlink.
    fn ensure_within_root(&self, candidate: &Path, raw: &str) -> Result<(), VaultError> {
        let mut probe = candidate.to_path_buf();
        loop {
            match probe.canonicalize() {
                Ok(canonical) => {
                    if canonical.starts_with(&self.canonical_root) {
                        return Ok(());
                    }
                    return Err(VaultError::Validation(format!(
                        "Invalid path `{}`. It resolves outside the managed directory.",
                        raw
                    )));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    if !probe.pop() {
                        return Err(VaultError::Io(e));
                    }
                }
                Err(e) => return Err(VaultError::Io(e)),
            }
        }
    }
}

/// Path relative to `root`, rendered with forward slashes regardless of
/// platform. Falls back to the file name when the path is not under `root`.
pub fn relative_display(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
