//! Configuration errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadError {
        /// The file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A layer is not valid TOML or does not fit the schema.
    #[error("{path} is not a valid shellward config: {source}")]
    ParseError {
        /// The file, or `<embedded defaults>` / `<merged config>`.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The merged configuration breaks a constraint.
    #[error("{field}: {message}")]
    ValidationError {
        /// Dotted key of the offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A `SHELLWARD_*` variable holds a value its field cannot take.
    #[error("{var_name} is unusable: {message}")]
    EnvError {
        /// The variable.
        var_name: String,
        /// What is wrong with it.
        message: String,
    },

    /// Neither `SHELLWARD_HOME` nor a home directory is available.
    #[error("no home directory to look for ~/.shellward in")]
    NoHomeDir,
}

impl ConfigError {
    /// The dotted field this error concerns, when it names one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The file this error concerns, when it names one.
    #[must_use]
    pub fn file(&self) -> Option<PathBuf> {
        match self {
            Self::ReadError { path, .. } | Self::ParseError { path, .. }
                if !path.starts_with('<') =>
            {
                Some(PathBuf::from(path))
            },
            _ => None,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_and_file_accessors() {
        let err = ConfigError::ValidationError {
            field: "session.max_entries".to_owned(),
            message: "max_entries must be greater than zero".to_owned(),
        };
        assert_eq!(err.field(), Some("session.max_entries"));
        assert!(err.file().is_none());
        assert_eq!(
            err.to_string(),
            "session.max_entries: max_entries must be greater than zero"
        );

        let err = ConfigError::ReadError {
            path: "/etc/sw/config.toml".to_owned(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.file(), Some(PathBuf::from("/etc/sw/config.toml")));
    }
}
