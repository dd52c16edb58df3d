//! Built-in schemas for objects most component definitions share.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::component::ResolvedFrom;
use crate::error::Result;
use crate::resolver::CustomResolver;
use crate::schema::SchemaType;
use crate::types::{FieldDecl, FieldType, ScalarType};

static ASSET_SPEC_SCHEMA: OnceLock<Arc<SchemaType>> = OnceLock::new();

/// Schema for a single asset declaration.
///
/// | field        | type  | when absent |
/// |--------------|-------|-------------|
/// | `key`        | str   | error       |
/// | `description`| str   | null        |
/// | `group_name` | str   | null        |
/// | `deps`       | [str] | `[]`        |
/// | `tags`       | any   | `{}`        |
/// | `metadata`   | any   | `{}`        |
///
/// `tags` goes through a custom resolver: it must be a mapping and its
/// scalar values are stringified.
pub fn asset_spec_schema() -> Arc<SchemaType> {
    Arc::clone(ASSET_SPEC_SCHEMA.get_or_init(|| {
        SchemaType::builder("AssetSpec")
            .description("A single asset declaration")
            .field(FieldDecl::new("key", ScalarType::Str).description("Slash-separated asset key"))
            .field(FieldDecl::new("description", ScalarType::Str).optional())
            .field(FieldDecl::new("group_name", ScalarType::Str).optional())
            .field(
                FieldDecl::new("deps", FieldType::ScalarSequence(ScalarType::Str))
                    .default(json!([])),
            )
            .field(
                FieldDecl::new("tags", ScalarType::Any)
                    .default(json!({}))
                    .resolver(CustomResolver::new("string_tags", |_ctx, raw| {
                        stringify_tags(raw)
                    })),
            )
            .field(FieldDecl::new("metadata", ScalarType::Any).default(json!({})))
            .build()
            .expect("Invalid built-in AssetSpec schema")
    }))
}

/// A field holding a list of asset specs, defaulting to empty.
pub fn asset_spec_sequence_field(name: impl Into<String>) -> FieldDecl {
    FieldDecl::new(name, FieldType::NestedSequence(asset_spec_schema())).default(json!([]))
}

fn stringify_tags(raw: &Value) -> anyhow::Result<Value> {
    let Value::Object(tags) = raw else {
        anyhow::bail!("tags must be a mapping of strings");
    };
    let mut out = Map::with_capacity(tags.len());
    for (key, value) in tags {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                anyhow::bail!("tag '{key}' must be a scalar")
            }
        };
        out.insert(key.clone(), Value::String(text));
    }
    Ok(Value::Object(out))
}

/// Typed form of a resolved asset spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub key: String,
    pub description: Option<String>,
    pub group_name: Option<String>,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AssetSpec {
    /// Key split into its path components.
    pub fn key_path(&self) -> Vec<&str> {
        self.key.split('/').filter(|part| !part.is_empty()).collect()
    }
}

impl ResolvedFrom for AssetSpec {
    fn schema() -> Result<Arc<SchemaType>> {
        Ok(asset_spec_schema())
    }
}
