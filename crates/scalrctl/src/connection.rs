//! Connection management: turning the loaded configuration into a client

use crate::error::{Result as CliResult, ScalrCtlError};
use scalr_core::client::{ADDRESS_ENV, TOKEN_ENV};
use scalr_core::{ClientConfig, Config, ScalrClient};
use std::path::PathBuf;
use tracing::{debug, info, trace};

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config.save_to_path(path)?;
        } else {
            self.config.save()?;
        }
        Ok(())
    }

    /// Path shown to the user for the active configuration file
    pub fn display_path(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(|| Config::config_path().ok())
    }

    /// Resolve the client configuration for `profile_name`
    ///
    /// When --config-file is explicitly specified and holds no profiles, the
    /// SCALR_* environment fallback is not used, so an isolated config stays
    /// isolated.
    pub fn client_config(&self, profile_name: Option<&str>) -> CliResult<ClientConfig> {
        trace!("Profile name: {:?}", profile_name);

        if self.config.profiles.is_empty() && profile_name.is_none() {
            if self.config_path.is_some() {
                info!("--config-file specified explicitly, ignoring environment variables");
                return Err(ScalrCtlError::NoProfileConfigured);
            }
            if std::env::var(TOKEN_ENV).is_err() {
                return Err(ScalrCtlError::NoProfileConfigured);
            }
            debug!(
                "No profiles configured, using {} and {}",
                ADDRESS_ENV, TOKEN_ENV
            );
        } else {
            let resolved = self.config.resolve_profile(profile_name)?;
            info!("Using Scalr profile: {}", resolved);
        }

        Ok(self.config.client_config(profile_name)?)
    }

    /// Create a client for the resolved profile
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<ScalrClient> {
        debug!("Creating Scalr client");
        let config = self.client_config(profile_name)?;
        debug!(?config, "Resolved client configuration");
        Ok(ScalrClient::new(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalr_core::Profile;

    fn manager_with(profiles: &[(&str, &str)], default: Option<&str>) -> ConnectionManager {
        let mut config = Config::default();
        for (name, token) in profiles {
            config.set_profile(
                name.to_string(),
                Profile::new("https://example.scalr.io", *token),
            );
        }
        config.default_profile = default.map(str::to_string);
        ConnectionManager::with_config_path(config, Some(PathBuf::from("/tmp/unused.toml")))
    }

    #[test]
    fn isolated_empty_config_has_no_profile() {
        let manager = manager_with(&[], None);
        let err = manager.client_config(None).unwrap_err();
        assert!(matches!(err, ScalrCtlError::NoProfileConfigured));
    }

    #[test]
    fn unknown_profile_is_reported_by_name() {
        let manager = manager_with(&[("work", "t-1")], None);
        let err = manager.client_config(Some("home")).unwrap_err();
        assert!(matches!(err, ScalrCtlError::ProfileNotFound { ref name } if name == "home"));
    }

    #[test]
    fn default_profile_builds_a_client() {
        let manager = manager_with(&[("a", "t-a"), ("b", "t-b")], Some("b"));
        let client = manager.create_client(None).unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://example.scalr.io/api/iacp/v3/"
        );
    }
}
