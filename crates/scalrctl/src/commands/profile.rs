//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::ScalrCtlError;
use crate::output;
use colored::Colorize;
use scalr_core::config::CredentialStore;
use scalr_core::{Config, Profile};
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// Handle profile management commands
pub fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            address,
            token,
            base_path,
            headers,
            timeout_secs,
            default,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let mut profile = Profile::new(address.clone(), token.clone());
            profile.base_path = base_path.clone();
            profile.headers = headers.iter().cloned().collect::<BTreeMap<_, _>>();
            profile.timeout_secs = *timeout_secs;

            #[cfg(feature = "secure-storage")]
            if *use_keyring {
                let store = CredentialStore::new();
                profile.token = store.store_credential(&token_key(name), token)?;
                info!(
                    "Stored token for profile '{}' in {}",
                    name,
                    store.storage_backend()
                );
            }

            handle_set(conn_mgr, name, profile, *default)
        }
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Keyring entry name for a profile's token
fn token_key(profile_name: &str) -> String {
    format!("{}-token", profile_name)
}

/// Token as shown to the user: never the full secret
fn token_preview(token: &str) -> String {
    if CredentialStore::is_keyring_reference(token) {
        return token.to_string();
    }
    let shown: String = token.chars().take(4).collect();
    format!("{}...", shown)
}

fn profile_summary(name: &str, profile: &Profile, is_default: bool) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "name": name,
        "address": profile.address,
        "base_path": profile.base_path,
        "token": token_preview(&profile.token),
        "is_default": is_default,
    });
    if !profile.headers.is_empty() {
        obj["headers"] = serde_json::json!(&profile.headers);
    }
    if let Some(secs) = profile.timeout_secs {
        obj["timeout_secs"] = serde_json::json!(secs);
    }
    obj
}

fn handle_list(
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let default = conn_mgr.config.default_profile.as_deref();

    let summaries: Vec<serde_json::Value> = profiles
        .iter()
        .map(|(name, profile)| profile_summary(name, profile, default == Some(name.as_str())))
        .collect();

    if output_format.is_structured() {
        let output_data = serde_json::json!({
            "config_path": conn_mgr.display_path().map(|p| p.display().to_string()),
            "profiles": summaries,
            "count": profiles.len()
        });
        output::print_output(&output_data, output_format.resolve(output::OutputFormat::Json))?;
        return Ok(());
    }

    if let Some(path) = conn_mgr.display_path() {
        println!("Configuration file: {}", path.display());
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'scalrctl profile set' to create a profile.");
        return Ok(());
    }

    if output_format == OutputFormat::Table {
        println!("{}", output::render_table(&serde_json::json!(summaries)));
        return Ok(());
    }

    for (name, profile) in &profiles {
        let marker = if default == Some(name.as_str()) {
            format!(" {}", "(default)".green())
        } else {
            String::new()
        };
        println!("{}{}", name.bold(), marker);
        println!("  Address: {}{}", profile.address, profile.base_path);
    }
    Ok(())
}

fn handle_path(
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    let config_path = match conn_mgr.config_path.clone() {
        Some(path) => path,
        None => Config::config_path()?,
    };

    if output_format.is_structured() {
        let output_data = serde_json::json!({
            "config_path": config_path.to_str()
        });
        output::print_output(&output_data, output_format.resolve(output::OutputFormat::Json))?;
    } else {
        println!("{}", config_path.display());
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> Result<(), ScalrCtlError> {
    let profile = conn_mgr.config.get_profile(name)?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    let summary = profile_summary(name, profile, is_default);

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml | OutputFormat::Table => {
            output::print_output(&summary, output_format.resolve(output::OutputFormat::Json))?;
        }
        OutputFormat::Auto => {
            println!("Profile: {}", name.bold());
            println!("Address: {}", profile.address);
            println!("Base path: {}", profile.base_path);
            println!("Token: {}", token_preview(&profile.token));
            for (header, value) in &profile.headers {
                println!("Header: {}: {}", header, value);
            }
            if let Some(secs) = profile.timeout_secs {
                println!("Timeout: {}s", secs);
            }
            if is_default {
                println!("Default: yes");
            }
        }
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    profile: Profile,
    make_default: bool,
) -> Result<(), ScalrCtlError> {
    debug!("Setting profile: {}", name);
    if profile.token.trim().is_empty() {
        return Err(ScalrCtlError::InvalidInput {
            message: "token must not be empty".to_string(),
        });
    }

    let mut config = conn_mgr.config.clone();
    let replaced = config.profiles.contains_key(name);
    config.set_profile(name.to_string(), profile);
    if make_default || config.profiles.len() == 1 {
        config.default_profile = Some(name.to_string());
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    let verb = if replaced { "updated" } else { "created" };
    info!("Profile '{}' {}", name, verb);
    println!("Profile '{}' {} successfully.", name, verb);
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> Result<(), ScalrCtlError> {
    debug!("Removing profile: {}", name);

    let mut config = conn_mgr.config.clone();
    let removed = config
        .remove_profile(name)
        .ok_or_else(|| ScalrCtlError::ProfileNotFound { name: name.into() })?;

    if removed.uses_keyring() {
        CredentialStore::new().delete_credential(&token_key(name))?;
    }

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    info!("Profile '{}' removed", name);
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> Result<(), ScalrCtlError> {
    let mut config = conn_mgr.config.clone();
    config.get_profile(name)?;
    config.default_profile = Some(name.to_string());

    ConnectionManager::with_config_path(config, conn_mgr.config_path.clone()).save_config()?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_preview_hides_the_secret() {
        assert_eq!(token_preview("abcdefghijkl"), "abcd...");
        assert_eq!(token_preview("ab"), "ab...");
        assert_eq!(token_preview("keyring:work-token"), "keyring:work-token");
    }

    #[test]
    fn summary_marks_default_and_omits_empty_fields() {
        let profile = Profile::new("https://example.scalr.io", "secret-token");
        let summary = profile_summary("work", &profile, true);
        assert_eq!(summary["is_default"], true);
        assert_eq!(summary["token"], "secr...");
        assert!(summary.get("headers").is_none());
        assert!(summary.get("timeout_secs").is_none());
    }
}
