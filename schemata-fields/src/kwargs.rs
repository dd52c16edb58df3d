//! Kwargs resolution: raw mapping + schema + context → resolved field values.
//!
//! Resolution is top-down and fail-fast. Unknown keys are rejected before any
//! resolver runs; after that each registry entry is resolved in declaration
//! order and the first error aborts the whole call. Partially resolved
//! records are never returned.

use std::sync::Arc;

use indexmap::IndexMap;
use schemata_config::{template, ResolutionContext};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::coerce::{coerce_scalar, describe_value};
use crate::error::{ResolveError, Result, ValidationErrorKind};
use crate::registry::{registry_for, RegistryEntry};
use crate::schema::SchemaType;
use crate::types::{FieldType, Requirement, ScalarType};

/// Resolved values for every field a schema declares, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedKwargs {
    #[serde(skip)]
    schema: String,
    values: IndexMap<String, Value>,
}

impl ResolvedKwargs {
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }

    /// The resolved record as a JSON mapping.
    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect::<Map<String, Value>>())
    }

    /// Deserialize the resolved record into the consumer's constructor type.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        let schema = self.schema.clone();
        serde_json::from_value(self.into_value()).map_err(|source| ResolveError::Construction {
            schema,
            target: std::any::type_name::<T>(),
            source,
        })
    }
}

/// Resolve a raw mapping against `schema`.
///
/// ```
/// use schemata_config::ResolutionContext;
/// use schemata_fields::{resolve, FieldDecl, ScalarType, SchemaType};
/// use serde_json::json;
///
/// let schema = SchemaType::builder("Example")
///     .field(FieldDecl::new("count", ScalarType::Int))
///     .build()?;
/// let resolved = resolve(&schema, &json!({"count": "5"}), &ResolutionContext::for_test())?;
/// assert_eq!(resolved.get("count"), Some(&json!(5)));
/// # Ok::<(), schemata_fields::ResolveError>(())
/// ```
pub fn resolve(
    schema: &Arc<SchemaType>,
    raw: &Value,
    context: &ResolutionContext,
) -> Result<ResolvedKwargs> {
    let registry = registry_for(schema)?;
    let mapping = raw.as_object().ok_or_else(|| {
        ResolveError::validation(
            context.field_path(),
            ValidationErrorKind::ExpectedMapping {
                found: describe_value(raw),
            },
        )
    })?;

    if context.field_path().is_root() {
        debug!(
            schema = schema.name(),
            fields = registry.len(),
            base_path = %context.base_path().display(),
            "resolving kwargs"
        );
    }

    if let Some(unknown) = mapping.keys().find(|key| !registry.contains(key)) {
        return Err(ResolveError::validation(
            &context.field_path().child(unknown.as_str()),
            ValidationErrorKind::UnknownField,
        ));
    }

    let mut values = IndexMap::with_capacity(registry.len());
    for entry in registry.iter() {
        let field_context = context.at_field(entry.name());
        let value = resolve_entry(schema, entry, mapping.get(entry.name()), &field_context)?;
        values.insert(entry.name().to_string(), value);
    }

    Ok(ResolvedKwargs {
        schema: schema.name().to_string(),
        values,
    })
}

fn resolve_entry(
    schema: &SchemaType,
    entry: &RegistryEntry,
    raw: Option<&Value>,
    context: &ResolutionContext,
) -> Result<Value> {
    let raw = match (raw, entry.requirement()) {
        (Some(Value::Null), Requirement::Optional | Requirement::Default(_)) | (None, _) => None,
        (Some(value), _) => Some(value),
    };

    match (raw, entry.requirement()) {
        (Some(raw), _) => {
            trace!(
                field = %context.field_path(),
                resolver = entry.resolver().label(),
                "resolving field"
            );
            entry
                .resolver()
                .resolve(entry.field_type(), schema.name(), raw, context)
        }
        (None, Requirement::Required) => Err(ResolveError::validation(
            context.field_path(),
            ValidationErrorKind::MissingField,
        )),
        (None, Requirement::Optional) => Ok(Value::Null),
        (None, Requirement::Default(value)) => {
            trace!(field = %context.field_path(), "using declared default");
            Ok(value.clone())
        }
    }
}

/// Default resolution of a single value according to its declared type.
///
/// Nested schemas recurse through [`resolve`], so custom resolvers declared
/// on nested schemas apply there too.
pub fn resolve_field_value(
    field_type: &FieldType,
    raw: &Value,
    context: &ResolutionContext,
) -> Result<Value> {
    match field_type {
        FieldType::Scalar(scalar) => resolve_scalar(*scalar, raw, context),
        FieldType::Nested(schema) => resolve_nested(schema, raw, context),
        FieldType::NestedSequence(schema) => expect_sequence(raw, context)?
            .iter()
            .enumerate()
            .map(|(i, item)| resolve_nested(schema, item, &context.at_index(i)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        FieldType::ScalarSequence(scalar) => expect_sequence(raw, context)?
            .iter()
            .enumerate()
            .map(|(i, item)| resolve_scalar(*scalar, item, &context.at_index(i)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
    }
}

fn resolve_scalar(expected: ScalarType, raw: &Value, context: &ResolutionContext) -> Result<Value> {
    let value = match raw {
        Value::String(s) if context.settings().templates && template::is_templated(s) => {
            template::evaluate(context, s).map_err(|source| ResolveError::TemplateEvaluation {
                path: context.field_path().clone(),
                source,
            })?
        }
        other => other.clone(),
    };
    coerce_scalar(expected, value, context)
        .map_err(|kind| ResolveError::validation(context.field_path(), kind))
}

fn resolve_nested(
    schema: &Arc<SchemaType>,
    raw: &Value,
    context: &ResolutionContext,
) -> Result<Value> {
    let nested = context.descend();
    let limit = context.settings().max_depth;
    if nested.depth() > limit {
        return Err(ResolveError::validation(
            context.field_path(),
            ValidationErrorKind::NestingTooDeep {
                depth: nested.depth(),
                limit,
            },
        ));
    }
    resolve(schema, raw, &nested).map(ResolvedKwargs::into_value)
}

fn expect_sequence<'a>(raw: &'a Value, context: &ResolutionContext) -> Result<&'a Vec<Value>> {
    raw.as_array().ok_or_else(|| {
        ResolveError::validation(
            context.field_path(),
            ValidationErrorKind::ExpectedSequence {
                found: describe_value(raw),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDecl;
    use schemata_config::ResolutionSettings;
    use serde_json::json;

    fn point() -> Arc<SchemaType> {
        SchemaType::builder("Point")
            .field(FieldDecl::new("x", ScalarType::Int))
            .field(FieldDecl::new("y", ScalarType::Int).default(json!(0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolves_in_declaration_order() {
        let resolved = resolve(
            &point(),
            &json!({"y": "7", "x": 1}),
            &ResolutionContext::for_test(),
        )
        .unwrap();
        assert_eq!(resolved.names().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(resolved.into_value(), json!({"x": 1, "y": 7}));
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = resolve(&point(), &json!([1, 2]), &ResolutionContext::for_test()).unwrap_err();
        assert!(matches!(
            err.validation_kind(),
            Some(ValidationErrorKind::ExpectedMapping { .. })
        ));
    }

    #[test]
    fn test_null_default_substituted() {
        let resolved = resolve(
            &point(),
            &json!({"x": 1, "y": null}),
            &ResolutionContext::for_test(),
        )
        .unwrap();
        assert_eq!(resolved.get("y"), Some(&json!(0)));
    }

    #[test]
    fn test_null_for_required_is_coercion_error() {
        let err = resolve(&point(), &json!({"x": null}), &ResolutionContext::for_test())
            .unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "x");
        assert!(matches!(
            err.validation_kind(),
            Some(ValidationErrorKind::Coercion { .. })
        ));
    }

    #[test]
    fn test_templates_can_be_disabled() {
        let label = SchemaType::builder("Label")
            .field(FieldDecl::new("text", ScalarType::Str))
            .build()
            .unwrap();
        let settings = ResolutionSettings {
            templates: false,
            ..ResolutionSettings::default()
        };
        let ctx = ResolutionContext::for_test().with_settings(settings);
        let resolved = resolve(&label, &json!({"text": "{{ missing }}"}), &ctx).unwrap();
        assert_eq!(resolved.get("text"), Some(&json!("{{ missing }}")));
    }

    #[test]
    fn test_scalar_sequence_paths_carry_index() {
        let ctx = ResolutionContext::for_test().at_field("ports");
        let err = resolve_field_value(
            &FieldType::ScalarSequence(ScalarType::Int),
            &json!([1, "2", "three"]),
            &ctx,
        )
        .unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "ports[2]");
    }

    #[test]
    fn test_into_typed_construction_error() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            x: String,
        }
        let resolved = resolve(&point(), &json!({"x": 1}), &ResolutionContext::for_test()).unwrap();
        let err = resolved.into_typed::<Wrong>().unwrap_err();
        match err {
            ResolveError::Construction { schema, target, .. } => {
                assert_eq!(schema, "Point");
                assert!(target.ends_with("Wrong"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
