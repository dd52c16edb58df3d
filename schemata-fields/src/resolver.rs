//! Field resolvers: the capability that turns one raw field value into its
//! resolved value.
//!
//! [`FieldResolver`] is a sum type over two variants. `Default` resolves
//! structurally from the declared [`FieldType`]; `Custom` hands the raw value
//! and the current context to a user-supplied function and takes its output
//! as-is.

use std::fmt;
use std::sync::Arc;

use schemata_config::ResolutionContext;
use serde_json::Value;

use crate::error::{ResolveError, Result};
use crate::kwargs::resolve_field_value;
use crate::types::FieldType;

type CustomFn = dyn Fn(&ResolutionContext, &Value) -> anyhow::Result<Value> + Send + Sync;

/// A user-supplied resolver function captured at schema declaration time.
///
/// The function receives the context already in force for the field and the
/// raw, unresolved value. Any recursion it needs is its own business; the
/// engine applies no coercion to what it returns.
///
/// ```
/// use schemata_fields::CustomResolver;
/// use serde_json::Value;
///
/// let stringify = CustomResolver::new("stringify", |_ctx, raw| {
///     Ok(Value::String(match raw {
///         Value::String(s) => s.clone(),
///         other => other.to_string(),
///     }))
/// });
/// assert_eq!(stringify.name(), "stringify");
/// ```
#[derive(Clone)]
pub struct CustomResolver {
    name: String,
    func: Arc<CustomFn>,
}

impl CustomResolver {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ResolutionContext, &Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, context: &ResolutionContext, raw: &Value) -> anyhow::Result<Value> {
        (self.func)(context, raw)
    }

    /// Whether both handles wrap the same function instance.
    pub fn same(&self, other: &CustomResolver) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for CustomResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResolver")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub enum FieldResolver {
    #[default]
    Default,
    Custom(CustomResolver),
}

impl FieldResolver {
    pub fn is_custom(&self) -> bool {
        matches!(self, FieldResolver::Custom(_))
    }

    pub fn as_custom(&self) -> Option<&CustomResolver> {
        match self {
            FieldResolver::Custom(custom) => Some(custom),
            FieldResolver::Default => None,
        }
    }

    /// Label used in logs and registry summaries.
    pub fn label(&self) -> &str {
        match self {
            FieldResolver::Default => "default",
            FieldResolver::Custom(custom) => custom.name(),
        }
    }

    /// Resolve one raw value.
    ///
    /// `schema` names the schema being resolved, which may have inherited the
    /// field, and is recorded on errors raised by custom resolvers.
    pub fn resolve(
        &self,
        field_type: &FieldType,
        schema: &str,
        raw: &Value,
        context: &ResolutionContext,
    ) -> Result<Value> {
        match self {
            FieldResolver::Default => resolve_field_value(field_type, raw, context),
            FieldResolver::Custom(custom) => {
                custom
                    .call(context, raw)
                    .map_err(|source| ResolveError::Resolution {
                        path: context.field_path().clone(),
                        schema: schema.to_string(),
                        source,
                    })
            }
        }
    }
}
