//! Configuration management for scalrctl
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles,
//! each describing one Scalr installation and the token used to reach it.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::client::{
    ADDRESS_ENV, BASE_PATH_ENV, ClientConfig, DEFAULT_ADDRESS, DEFAULT_BASE_PATH, TOKEN_ENV,
};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when `--profile` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Connection settings for one Scalr installation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Service address, e.g. `https://example.scalr.io`
    #[serde(default = "default_address")]
    pub address: String,
    /// Bearer token. Supports the `keyring:` prefix for secure storage.
    pub token: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Extra headers sent with every request, e.g. `Prefer = "profile=preview"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

impl Profile {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            base_path: default_base_path(),
            headers: BTreeMap::new(),
            timeout_secs: None,
        }
    }

    /// Whether the token lives in the OS keyring
    pub fn uses_keyring(&self) -> bool {
        CredentialStore::is_keyring_reference(&self.token)
    }

    /// Build a client configuration, resolving credentials
    ///
    /// `SCALR_ADDRESS`, `SCALR_BASE_PATH` and `SCALR_TOKEN` override the
    /// stored values; `keyring:` references are looked up in the OS keyring.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let store = CredentialStore::new();

        let resolve = |field: &'static str, value: &str, env_var: &str| {
            store
                .get_credential(value, Some(env_var))
                .map_err(|e| ConfigError::Credential {
                    field,
                    message: e.to_string(),
                })
        };
        let address = resolve("address", &self.address, ADDRESS_ENV)?;
        let base_path = resolve("base path", &self.base_path, BASE_PATH_ENV)?;
        let token = resolve("token", &self.token, TOKEN_ENV)?;

        let mut config = ClientConfig::default()
            .with_address(address)
            .with_base_path(base_path)
            .with_token(token);
        for (name, value) in &self.headers {
            config = config.with_header(name.clone(), value.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

impl Config {
    /// Profile names sorted alphabetically
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    /// Resolve which profile to use
    ///
    /// Resolution order: the explicit name, then `default_profile`, then the
    /// first profile alphabetically.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        if let Some(profile_name) = self.profile_names().first() {
            return Ok(profile_name.to_string());
        }

        Err(ConfigError::NoProfiles {
            suggestion: format!(
                "Use 'scalrctl profile set' to create a profile, or set {} and {}.",
                ADDRESS_ENV, TOKEN_ENV
            ),
        })
    }

    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Client configuration for the resolved profile
    ///
    /// With no profiles at all and no explicit name, falls back to
    /// [`ClientConfig::from_env`] so that `SCALR_ADDRESS`/`SCALR_TOKEN`
    /// alone are enough.
    pub fn client_config(&self, explicit_profile: Option<&str>) -> Result<ClientConfig> {
        if explicit_profile.is_none() && self.profiles.is_empty() {
            return Ok(ClientConfig::from_env());
        }
        let name = self.resolve_profile(explicit_profile)?;
        self.get_profile(&name)?.client_config()
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;

        let expanded_content = Self::expand_env_vars(&content);
        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|source| ConfigError::Write {
            path: config_path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/scalrctl/config.toml` is preferred when it (or its
    /// directory) exists, falling back to the platform location.
    ///
    /// On Linux: ~/.config/scalrctl/config.toml
    /// On Windows: %APPDATA%\scalr\scalrctl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("scalrctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path.parent().is_some_and(|p| p.exists())
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("io", "scalr", "scalrctl").ok_or(ConfigError::NoConfigDir)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references in configuration content
    ///
    /// ```toml
    /// [profiles.work]
    /// address = "${SCALR_ADDRESS:-https://example.scalr.io}"
    /// token = "${WORK_SCALR_TOKEN}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        // Unset variables are left as-is so unused profiles still parse
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok()).to_string()
    }
}
