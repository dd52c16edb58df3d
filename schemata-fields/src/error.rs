//! Error types for schema declaration and kwargs resolution

use schemata_common::{ErrorSeverity, Severity};
use schemata_config::{ConfigError, FieldPath};
use std::fmt;
use thiserror::Error;

use crate::types::ScalarType;

/// Result type for registry and resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Why a raw value failed to satisfy its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// Required field absent from the raw mapping
    MissingField,
    /// Raw mapping carries a key the schema does not declare
    UnknownField,
    /// A nested schema received something other than a mapping
    ExpectedMapping { found: String },
    /// A sequence field received something other than a sequence
    ExpectedSequence { found: String },
    /// Scalar value could not be converted to the declared type
    Coercion { expected: ScalarType, found: String },
    /// Nested schemas went deeper than the configured limit
    NestingTooDeep { depth: usize, limit: usize },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorKind::MissingField => f.write_str("missing required field"),
            ValidationErrorKind::UnknownField => f.write_str("unknown field"),
            ValidationErrorKind::ExpectedMapping { found } => {
                write!(f, "expected a mapping, found {found}")
            }
            ValidationErrorKind::ExpectedSequence { found } => {
                write!(f, "expected a sequence, found {found}")
            }
            ValidationErrorKind::Coercion { expected, found } => {
                write!(f, "cannot convert {found} to {expected}")
            }
            ValidationErrorKind::NestingTooDeep { depth, limit } => {
                write!(f, "nesting depth {depth} exceeds limit {limit}")
            }
        }
    }
}

/// Errors surfaced by registry building and kwargs resolution.
///
/// Nothing is caught or recovered internally: the first failure anywhere in
/// a nested record aborts the whole call and comes back as one of these.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Structurally invalid schema, detected when the schema is built
    #[error("invalid schema '{schema}': {message}")]
    SchemaDefinition { schema: String, message: String },

    /// Raw input does not satisfy the schema
    #[error("invalid value at '{path}': {kind}")]
    Validation {
        path: FieldPath,
        kind: ValidationErrorKind,
    },

    /// A custom field resolver returned an error
    #[error("custom resolver for '{path}' on schema '{schema}' failed: {source}")]
    Resolution {
        path: FieldPath,
        schema: String,
        #[source]
        source: anyhow::Error,
    },

    /// A templated string could not be evaluated against the scope
    #[error("template evaluation failed at '{path}': {source}")]
    TemplateEvaluation {
        path: FieldPath,
        #[source]
        source: ConfigError,
    },

    /// Resolved kwargs did not deserialize into the consumer's type
    #[error("cannot construct {target} from schema '{schema}': {source}")]
    Construction {
        schema: String,
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ResolveError {
    pub fn schema_definition(schema: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::SchemaDefinition {
            schema: schema.into(),
            message: message.into(),
        }
    }

    pub fn validation(path: &FieldPath, kind: ValidationErrorKind) -> Self {
        ResolveError::Validation {
            path: path.clone(),
            kind,
        }
    }

    /// Path of the offending field, when the error has one.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            ResolveError::Validation { path, .. }
            | ResolveError::Resolution { path, .. }
            | ResolveError::TemplateEvaluation { path, .. } => Some(path),
            ResolveError::SchemaDefinition { .. } | ResolveError::Construction { .. } => None,
        }
    }

    /// Validation kind, when this is a validation error.
    pub fn validation_kind(&self) -> Option<&ValidationErrorKind> {
        match self {
            ResolveError::Validation { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

impl Severity for ResolveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ResolveError::SchemaDefinition { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}
