//! Error types for the Schemata context and settings layer

use schemata_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for context, template and settings operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building contexts, evaluating templates or loading settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A scope lookup found nothing bound under the name
    #[error("no binding named '{name}' in resolution scope")]
    NotFound { name: String },

    /// A templated string could not be parsed or rendered
    #[error("failed to evaluate template '{template}': {message}")]
    Template { template: String, message: String },

    /// Settings extraction failed
    #[error("failed to load resolution settings: {source}")]
    Settings {
        #[source]
        source: Box<figment::Error>,
    },

    /// A YAML or TOML document could not be parsed
    #[error("failed to parse {format} document: {message}")]
    DocumentParse {
        format: &'static str,
        message: String,
    },

    /// A key path into a parsed document did not lead where expected
    #[error("document path '{path}': {message}")]
    DocumentPath { path: String, message: String },
}

impl ConfigError {
    /// Create a template evaluation error
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a document path error
    pub fn document_path(path: &[&str], message: impl Into<String>) -> Self {
        ConfigError::DocumentPath {
            path: path.join("."),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Settings {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::Settings { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
