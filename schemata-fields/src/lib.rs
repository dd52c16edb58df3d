//! Schemata fields: declarative schemas resolved into typed objects
//!
//! A schema declares fields with a type, a requirement status and optionally
//! a custom resolver. Schemas inherit fields from any number of parents. For
//! each schema a [`ResolverRegistry`] is merged once, most-derived
//! declaration winning, and cached by schema identity.
//!
//! Resolving a raw mapping walks the registry top-down:
//!
//! - scalar fields are template-evaluated and coerced to their declared type
//! - nested fields recurse into their schema with a derived context
//! - sequence elements get an index-bound context of their own
//! - custom resolvers receive the raw value and take over completely
//!
//! The first failure aborts the whole call.
//!
//! # Quick Start
//!
//! ```
//! use schemata_config::ResolutionContext;
//! use schemata_fields::{resolve, CustomResolver, FieldDecl, ScalarType, SchemaType};
//! use serde_json::{json, Value};
//!
//! let base = SchemaType::builder("Base")
//!     .field(FieldDecl::new("value", ScalarType::Int))
//!     .build()?;
//! let derived = SchemaType::builder("Derived")
//!     .extends(&base)
//!     .field(FieldDecl::new("value", ScalarType::Any).resolver(CustomResolver::new(
//!         "stringify",
//!         |_ctx, raw| Ok(Value::String(raw.to_string())),
//!     )))
//!     .build()?;
//!
//! let ctx = ResolutionContext::for_test();
//! assert_eq!(resolve(&base, &json!({"value": "5"}), &ctx)?.get("value"), Some(&json!(5)));
//! assert_eq!(resolve(&derived, &json!({"value": 5}), &ctx)?.get("value"), Some(&json!("5")));
//! # Ok::<(), schemata_fields::ResolveError>(())
//! ```

/// Scalar coercion rules
pub mod coerce;
/// Consumer types built from resolved kwargs
pub mod component;
/// Error types and handling
pub mod error;
/// Kwargs resolution
pub mod kwargs;
/// Built-in shared schemas
pub mod objects;
/// Merged per-schema resolver tables
pub mod registry;
/// Field resolvers
pub mod resolver;
/// Schema declarations and inheritance
pub mod schema;
/// Field declarations
pub mod types;

pub use component::{load_component, ResolvedFrom};
pub use error::{ResolveError, Result, ValidationErrorKind};
pub use kwargs::{resolve, resolve_field_value, ResolvedKwargs};
pub use objects::{asset_spec_schema, asset_spec_sequence_field, AssetSpec};
pub use registry::{build_registry, registry_for, FieldSummary, RegistryEntry, ResolverRegistry};
pub use resolver::{CustomResolver, FieldResolver};
pub use schema::{SchemaBuilder, SchemaType};
pub use types::{FieldDecl, FieldType, Requirement, ScalarType};

// Re-exported so consumers need only one import for contexts and settings
pub use schemata_config::{FieldPath, ResolutionContext, ResolutionSettings};
