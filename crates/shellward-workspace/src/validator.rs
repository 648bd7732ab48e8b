//! Resolving paths against the workspace root.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::paths::{expand_home, normalize_lexically};

/// Path-validation collaborator used by the [`BoundaryEnforcer`](crate::BoundaryEnforcer).
pub trait PathValidator: Send + Sync + fmt::Debug {
    /// Resolve `path` and confirm it stays inside the workspace.
    ///
    /// Relative paths are resolved against the workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::PathOutsideWorkspace`] when the resolved
    /// path escapes the root.
    fn validate_path(&self, path: &Path) -> WorkspaceResult<PathBuf>;

    /// Whether `path` resolves inside the workspace.
    fn is_path_safe(&self, path: &Path) -> bool {
        self.validate_path(path).is_ok()
    }

    /// The workspace root.
    fn workspace_root(&self) -> &Path;

    /// `path` relative to the workspace root, or `path` unchanged when it
    /// lies outside.
    fn relative_path_from_workspace(&self, path: &Path) -> PathBuf;
}

/// Default [`PathValidator`]: lexical normalization followed by symlink
/// resolution of the longest existing ancestor.
#[derive(Debug, Clone)]
pub struct WorkspaceSecurity {
    root: PathBuf,
    home: Option<PathBuf>,
}

impl WorkspaceSecurity {
    /// Create a validator rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::InvalidRoot`] if `root` is relative.
    pub fn new(root: impl Into<PathBuf>) -> WorkspaceResult<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(WorkspaceError::InvalidRoot {
                root,
                reason: "workspace root must be absolute".to_owned(),
            });
        }

        let root = root
            .canonicalize()
            .unwrap_or_else(|_| normalize_lexically(&root));
        let home = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());

        Ok(Self { root, home })
    }

    /// Override the directory `~` expands to.
    #[must_use]
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolve a path as written in a command to an absolute path, following
    /// symlinks where the path exists.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = expand_home(&path.to_string_lossy(), self.home.as_deref());
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        };
        resolve_existing_prefix(&normalize_lexically(&absolute))
    }
}

impl PathValidator for WorkspaceSecurity {
    fn validate_path(&self, path: &Path) -> WorkspaceResult<PathBuf> {
        let resolved = self.resolve(path);
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            debug!(
                path = %path.display(),
                resolved = %resolved.display(),
                "path resolves outside workspace"
            );
            Err(WorkspaceError::PathOutsideWorkspace {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })
        }
    }

    fn workspace_root(&self) -> &Path {
        &self.root
    }

    fn relative_path_from_workspace(&self, path: &Path) -> PathBuf {
        let resolved = self.resolve(path);
        resolved
            .strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// rest, so a symlinked directory anywhere on the way is followed.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut out = canonical;
            for part in rest.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            },
            _ => return path.to_path_buf(),
        }
    }
}
