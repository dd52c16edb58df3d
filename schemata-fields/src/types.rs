//! Field declarations: names, declared types and requirement status.
//!
//! A schema lists [`FieldDecl`]s. Each declaration carries the semantic
//! [`FieldType`] that drives default resolution, whether the field may be
//! absent, and optionally a custom resolver that takes over entirely.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::{CustomResolver, FieldResolver};
use crate::schema::SchemaType;

/// Scalar kinds that default resolution knows how to coerce into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    Str,
    /// String anchored at the context's base path when relative
    Path,
    /// Any value, passed through unchanged
    Any,
}

impl ScalarType {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::Str => "str",
            ScalarType::Path => "path",
            ScalarType::Any => "any",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared semantic type of a field.
#[derive(Clone)]
pub enum FieldType {
    Scalar(ScalarType),
    /// A mapping resolved against another schema
    Nested(Arc<SchemaType>),
    /// A sequence of mappings, each resolved against the same schema
    NestedSequence(Arc<SchemaType>),
    /// A sequence of scalars, coerced element-wise
    ScalarSequence(ScalarType),
}

impl FieldType {
    /// Short human-readable form, e.g. `int`, `AssetSpec`, `[str]`.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Scalar(scalar) => scalar.name().to_string(),
            FieldType::Nested(schema) => schema.name().to_string(),
            FieldType::NestedSequence(schema) => format!("[{}]", schema.name()),
            FieldType::ScalarSequence(scalar) => format!("[{}]", scalar.name()),
        }
    }

    /// The schema a nested field resolves against.
    pub fn nested_schema(&self) -> Option<&Arc<SchemaType>> {
        match self {
            FieldType::Nested(schema) | FieldType::NestedSequence(schema) => Some(schema),
            FieldType::Scalar(_) | FieldType::ScalarSequence(_) => None,
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Scalar(a), FieldType::Scalar(b)) => a == b,
            (FieldType::ScalarSequence(a), FieldType::ScalarSequence(b)) => a == b,
            (FieldType::Nested(a), FieldType::Nested(b)) => a.id() == b.id(),
            (FieldType::NestedSequence(a), FieldType::NestedSequence(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl From<ScalarType> for FieldType {
    fn from(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }
}

/// Whether a field may be absent from the raw mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    Required,
    /// Absent or `null` resolves to `null`
    Optional,
    /// Absent or `null` resolves to this value without invoking the resolver
    Default(Value),
}

impl Requirement {
    pub fn is_required(&self) -> bool {
        matches!(self, Requirement::Required)
    }
}

/// One field as declared by one schema.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    name: String,
    field_type: FieldType,
    requirement: Requirement,
    resolver: FieldResolver,
    description: Option<String>,
}

impl FieldDecl {
    /// A required field resolved structurally from its type.
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            requirement: Requirement::Required,
            resolver: FieldResolver::Default,
            description: None,
        }
    }

    /// Substitute `value` when the field is absent.
    pub fn default(mut self, value: Value) -> Self {
        self.requirement = Requirement::Default(value);
        self
    }

    /// Resolve to `null` when the field is absent.
    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    /// Attach a custom resolver that replaces default resolution.
    pub fn resolver(mut self, resolver: CustomResolver) -> Self {
        self.resolver = FieldResolver::Custom(resolver);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn field_resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    pub fn doc(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
