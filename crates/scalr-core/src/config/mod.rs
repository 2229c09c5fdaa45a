//! Configuration and profile management for scalrctl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! # Features
//!
//! - Multiple named profiles for different Scalr installations
//! - Secure token storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;

pub use config::{Config, Profile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
