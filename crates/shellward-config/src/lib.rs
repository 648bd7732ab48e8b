#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for the Shellward command gate.
//!
//! # Usage
//!
//! ```rust,no_run
//! use shellward_config::Config;
//!
//! let resolved = Config::load(Some(std::path::Path::new("."))).unwrap();
//! println!("timeout: {}ms", resolved.config.commands.confirmation_timeout_ms);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`SHELLWARD_*`)
//! 2. **Workspace** (`{workspace}/.shellward/config.toml`), which can only *tighten* the gate
//! 3. **User** (`~/.shellward/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other internal shellward crates.
//! Conversion into domain settings happens in the runtime's config bridge.

/// `SHELLWARD_*` overrides.
pub mod env;
/// Load failures.
pub mod error;
/// Finding and reading the config layers.
pub mod loader;
/// Merging layers and keeping the workspace layer from loosening the gate.
pub mod merge;
/// `config show` rendering.
pub mod show;
/// The configuration schema.
pub mod types;
/// Cross-field checks on the merged result.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Resolve defaults, `~/.shellward`, the workspace layer under
    /// `workspace_root` and the environment, in that order.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unreadable or malformed layer, an
    /// unusable override, or a merged result that fails validation.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// Like [`Config::load`], reading the user layer from `shellward_home`
    /// instead of discovering it.
    ///
    /// # Errors
    ///
    /// As for [`Config::load`].
    pub fn load_with_home(
        workspace_root: Option<&std::path::Path>,
        shellward_home: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, Some(shellward_home))
    }

    /// Read one file on its own, with missing keys taking their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or
    /// fails validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
