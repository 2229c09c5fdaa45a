//! Error types for scalrctl
//!
//! Defines structured error types using thiserror for better error handling and user experience.

use colored::Colorize;
use scalr_core::config::ConfigError;
use scalr_core::{ScalrError, WorkflowError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'work' not found
///
///   tip: List available profiles: scalrctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<String>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for description in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
        }
    }
}

/// Main error type for the scalrctl application
#[derive(Error, Debug)]
pub enum ScalrCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured and SCALR_TOKEN is not set")]
    NoProfileConfigured,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rejected by the service: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Cancelled")]
    Cancelled,

    /// A workflow stopped at `step`
    #[error("Step '{step}' failed: {source}")]
    Workflow {
        step: &'static str,
        #[source]
        source: Box<ScalrCtlError>,
    },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for scalrctl operations
pub type Result<T> = std::result::Result<T, ScalrCtlError>;

impl ScalrCtlError {
    /// The workflow step that failed, if this came from a workflow
    pub fn failed_step(&self) -> Option<&'static str> {
        match self {
            ScalrCtlError::Workflow { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            ScalrCtlError::Workflow { source, .. } => source.suggestions(),
            ScalrCtlError::ProfileNotFound { name } => vec![
                "List available profiles: scalrctl profile list".to_string(),
                format!(
                    "Create profile '{}': scalrctl profile set {} --address <url> --token <token>",
                    name, name
                ),
            ],
            ScalrCtlError::NoProfileConfigured => vec![
                "Create a profile: scalrctl profile set <name> --address <url> --token <token>"
                    .to_string(),
                "Or export SCALR_ADDRESS and SCALR_TOKEN".to_string(),
            ],
            ScalrCtlError::AuthenticationFailed { .. } => vec![
                "Check your token: scalrctl profile show <profile>".to_string(),
                "Verify the token has access to this account".to_string(),
            ],
            ScalrCtlError::NotFound { .. } => vec![
                "Verify the resource ID is correct".to_string(),
                "List available resources to find the correct ID: scalrctl list <resource>"
                    .to_string(),
            ],
            ScalrCtlError::ConnectionError { message } if message.contains("certificate") => vec![
                "Check that the service address uses a trusted certificate".to_string(),
                "Verify the address: scalrctl profile show <profile>".to_string(),
            ],
            ScalrCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the address is correct: scalrctl profile show <profile>".to_string(),
            ],
            ScalrCtlError::Timeout { .. } => {
                vec!["Allow more time with --timeout <secs>".to_string()]
            }
            ScalrCtlError::InvalidInput { .. } => {
                vec!["Check the command syntax: scalrctl <command> --help".to_string()]
            }
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        if let ScalrCtlError::Validation { details, .. } = self.root()
            && details.len() > 1
        {
            diag = diag.detail(&details.join("; "));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }

    fn root(&self) -> &ScalrCtlError {
        match self {
            ScalrCtlError::Workflow { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<ScalrError> for ScalrCtlError {
    fn from(err: ScalrError) -> Self {
        match err {
            ScalrError::Configuration(message) => ScalrCtlError::Configuration(message),
            ScalrError::Request { message } => ScalrCtlError::ConnectionError { message },
            ScalrError::NotFound { message } => ScalrCtlError::NotFound { message },
            ScalrError::Validation { message, details, .. } => {
                ScalrCtlError::Validation { message, details }
            }
            ScalrError::Unauthorized { message, .. } => {
                ScalrCtlError::AuthenticationFailed { message }
            }
            ScalrError::DeadlineExceeded(after) => ScalrCtlError::Timeout {
                message: format!("Operation timed out after {:?}", after),
            },
            ScalrError::Cancelled => ScalrCtlError::Cancelled,
            ScalrError::InvalidId { .. } => ScalrCtlError::InvalidInput {
                message: err.to_string(),
            },
            ScalrError::Api { .. } | ScalrError::Decode(_) => ScalrCtlError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<WorkflowError> for ScalrCtlError {
    fn from(err: WorkflowError) -> Self {
        ScalrCtlError::Workflow {
            step: err.step,
            source: Box::new(ScalrCtlError::from(err.source)),
        }
    }
}

impl From<ConfigError> for ScalrCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => ScalrCtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => ScalrCtlError::NoProfileConfigured,
            other => ScalrCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ScalrCtlError {
    fn from(err: serde_json::Error) -> Self {
        ScalrCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for ScalrCtlError {
    fn from(err: std::io::Error) -> Self {
        ScalrCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for ScalrCtlError {
    fn from(err: anyhow::Error) -> Self {
        ScalrCtlError::OutputError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_error_keeps_step_and_suggestions() {
        let err = ScalrCtlError::from(WorkflowError {
            step: "create workspace",
            source: ScalrError::NotFound {
                message: "Environment env-1 not found".to_string(),
            },
        });

        assert_eq!(err.failed_step(), Some("create workspace"));
        assert!(err.to_string().contains("create workspace"));
        assert!(err.to_string().contains("env-1"));
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("resource ID"))
        );
    }

    #[test]
    fn unauthorized_maps_to_authentication_failed() {
        let err = ScalrCtlError::from(ScalrError::Unauthorized {
            status: 401,
            message: "invalid token".to_string(),
        });
        assert!(matches!(err, ScalrCtlError::AuthenticationFailed { .. }));
        assert_eq!(err.failed_step(), None);
    }

    #[test]
    fn missing_profiles_suggest_environment() {
        let err = ScalrCtlError::from(ConfigError::NoProfiles {
            suggestion: String::new(),
        });
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("SCALR_TOKEN"))
        );
    }

    #[test]
    fn invalid_id_is_invalid_input() {
        let err = ScalrCtlError::from(ScalrError::InvalidId {
            kind: "workspace",
            id: "ws/1".to_string(),
        });
        assert!(matches!(err, ScalrCtlError::InvalidInput { .. }));
        assert!(err.to_string().contains("ws/1"));
    }
}
