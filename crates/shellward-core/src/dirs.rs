//! Directory scaffolding for the Shellward home.
//!
//! # Layout
//!
//! ```text
//! ~/.shellward/                   (ShellwardHome)
//! ├── logs/
//! │   ├── command-execution.log     (execution audit lines)
//! │   └── security-events.log       (security event lines)
//! └── config.toml                   (user config)
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// File name of the execution audit log.
pub const EXECUTION_LOG_FILE: &str = "command-execution.log";

/// File name of the security event log.
pub const SECURITY_LOG_FILE: &str = "security-events.log";

/// Global Shellward home directory (`~/.shellward/` or `$SHELLWARD_HOME`).
#[derive(Debug, Clone)]
pub struct ShellwardHome {
    root: PathBuf,
}

impl ShellwardHome {
    /// Resolve the home directory.
    ///
    /// Checks `$SHELLWARD_HOME` first, then falls back to `$HOME/.shellward/`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is set, or if `$SHELLWARD_HOME`
    /// is relative.
    pub fn resolve() -> io::Result<Self> {
        let root = if let Ok(custom) = std::env::var("SHELLWARD_HOME") {
            let p = PathBuf::from(&custom);
            if !p.is_absolute() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "SHELLWARD_HOME must be an absolute path",
                ));
            }
            p
        } else {
            let home = std::env::var("HOME").map_err(|_| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "neither SHELLWARD_HOME nor HOME environment variable is set",
                )
            })?;
            PathBuf::from(home).join(".shellward")
        };

        Ok(Self { root })
    }

    /// Create from an explicit path (useful for testing).
    #[must_use]
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensure the directory structure exists with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or permission setting fails.
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(self.root(), perms.clone())?;
            std::fs::set_permissions(self.logs_dir(), perms)?;
        }
        Ok(())
    }

    /// Root directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Logs directory (`~/.shellward/logs/`).
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Path of the execution audit log.
    #[must_use]
    pub fn execution_log_path(&self) -> PathBuf {
        self.logs_dir().join(EXECUTION_LOG_FILE)
    }

    /// Path of the security event log.
    #[must_use]
    pub fn security_log_path(&self) -> PathBuf {
        self.logs_dir().join(SECURITY_LOG_FILE)
    }

    /// Path of the user config file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let home = ShellwardHome::from_path("/tmp/sw");
        assert_eq!(home.logs_dir(), PathBuf::from("/tmp/sw/logs"));
        assert_eq!(
            home.execution_log_path(),
            PathBuf::from("/tmp/sw/logs/command-execution.log")
        );
        assert_eq!(
            home.security_log_path(),
            PathBuf::from("/tmp/sw/logs/security-events.log")
        );
    }

    #[test]
    fn test_ensure_creates_logs_dir() {
        let dir = tempfile::tempdir().unwrap();
        let home = ShellwardHome::from_path(dir.path().join("home"));
        home.ensure().unwrap();
        assert!(home.logs_dir().is_dir());
    }
}
