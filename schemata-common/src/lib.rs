//! # Schemata Common
//!
//! Foundational pieces shared by the Schemata crates: a severity classification
//! that every error enum implements, and the [`Pretty`] wrapper used to render
//! structured values inside tracing output.

pub mod error;
pub mod logging;

pub use error::{ErrorSeverity, Severity};
pub use logging::Pretty;
