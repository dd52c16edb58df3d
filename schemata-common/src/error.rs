//! Severity classification for Schemata errors
//!
//! Each crate defines its own error enum. They all implement [`Severity`] so
//! callers can decide how loudly to report a failure without matching on
//! every variant.

/// Severity levels for error classification
///
/// - **Warning**: something looks off but the operation can proceed.
/// - **Error**: the operation failed; the caller can carry on with other work.
/// - **Critical**: the failure comes from a broken declaration and will recur
///   on every attempt until the declaration is fixed.
///
/// # Examples
///
/// ```rust
/// use schemata_common::ErrorSeverity;
///
/// // A typo in one config file fails that file only
/// let bad_input = ErrorSeverity::Error;
///
/// // A schema with conflicting overrides can never resolve anything
/// let bad_schema = ErrorSeverity::Critical;
/// assert_ne!(bad_input, bad_schema);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,

    /// Operation failed but the caller can continue
    ///
    /// # Examples
    /// - A required field missing from a config document
    /// - A string that does not parse as the declared integer type
    Error,

    /// Declaration-level failure that cannot be fixed by changing input
    ///
    /// # Examples
    /// - Inconsistent inheritance order
    /// - An override that flips a field from required to optional
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
            ErrorSeverity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Trait for error types that have severity levels
///
/// # Example
///
/// ```rust
/// use schemata_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum LoadError {
///     BadSchema,
///     BadValue,
/// }
///
/// impl Severity for LoadError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             LoadError::BadSchema => ErrorSeverity::Critical,
///             LoadError::BadValue => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(LoadError::BadSchema.severity(), ErrorSeverity::Critical);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;

    /// Whether this error points at a declaration rather than at input data
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}
