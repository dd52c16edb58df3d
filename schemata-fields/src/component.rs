//! The boundary between resolution and consumer types.
//!
//! A consumer type names the schema it is loaded from and deserializes from
//! the resolved record. [`load_component`] runs both steps.

use std::sync::Arc;

use schemata_config::ResolutionContext;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::kwargs::resolve;
use crate::schema::SchemaType;

/// A type constructed from kwargs resolved against a schema.
///
/// Field names of the schema must line up with the serde field names of the
/// type. Extra resolved fields are only a problem if the type denies unknown
/// fields.
pub trait ResolvedFrom: DeserializeOwned {
    fn schema() -> Result<Arc<SchemaType>>;
}

/// Resolve `raw` against `T::schema()` and construct a `T`.
pub fn load_component<T: ResolvedFrom>(raw: &Value, context: &ResolutionContext) -> Result<T> {
    let schema = T::schema()?;
    let kwargs = resolve(&schema, raw, context)?;
    debug!(
        schema = schema.name(),
        target = std::any::type_name::<T>(),
        "constructing component"
    );
    kwargs.into_typed()
}
