//! Errors raised while reading, writing or resolving `scalrctl` profiles

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file or its directory could not be written
    #[error("Failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    /// No profile was named, none is marked default and the file has none
    #[error("No profiles configured. {suggestion}")]
    NoProfiles { suggestion: String },

    /// A profile field (address, base path or token) could not be resolved
    #[error("Failed to resolve {field}: {message}")]
    Credential { field: &'static str, message: String },

    #[cfg(feature = "secure-storage")]
    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Could not determine the scalrctl config directory")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
