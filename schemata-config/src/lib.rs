//! Schemata resolution context and settings
//!
//! This crate owns everything a resolver can see besides the raw value it is
//! resolving:
//!
//! - [`ResolutionContext`]: base path, scope bindings, settings and the current
//!   [`FieldPath`]. Immutable; derive child contexts for nested positions.
//! - [`ResolutionSettings`]: tunables layered with figment from defaults,
//!   `schemata.{toml,yaml,yml,json}` and `SCHEMATA_*` environment variables.
//! - [`template`]: `{{ ... }}` evaluation against the scope using liquid.
//! - [`document`]: YAML/TOML text to raw value trees, plus key-path helpers.
//!
//! # Quick Start
//!
//! ```
//! use schemata_config::{template, ResolutionContext};
//! use serde_json::{json, Map};
//!
//! let mut scope = Map::new();
//! scope.insert("env".to_string(), json!("prod"));
//!
//! let ctx = ResolutionContext::new("/project/defs", scope);
//! let value = template::evaluate(&ctx, "orders-{{ env }}")?;
//! assert_eq!(value, json!("orders-prod"));
//! # Ok::<(), schemata_config::ConfigError>(())
//! ```

/// Resolution context
pub mod context;
/// YAML/TOML documents as raw value trees
pub mod document;
/// Error types and handling
pub mod error;
/// Positions inside a resolved document
pub mod path;
/// Settings loaded with figment
pub mod settings;
/// Template evaluation
pub mod template;

pub use context::ResolutionContext;
pub use error::{ConfigError, Result};
pub use path::{FieldPath, PathSegment};
pub use settings::{ResolutionSettings, ENV_PREFIX, SETTINGS_FILE_STEM};
