//! Resolver registry, the merged per-schema table of field name to resolver.
//!
//! [`build_registry`] walks a schema's linearized ancestors from most-base to
//! most-derived and records every declared field. A more derived declaration
//! of the same name replaces the earlier entry in full (resolver, type and
//! requirement) while keeping the position where the name first appeared.
//!
//! [`registry_for`] memoizes registries process-wide, keyed by schema
//! identity. Schemas never change after they are built, so entries are never
//! invalidated. Two threads missing at once both build the same registry and
//! the second insert simply replaces an identical value.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use indexmap::IndexMap;
use schemata_common::Pretty;
use serde::Serialize;
use tracing::{debug, trace};
use ulid::Ulid;

use crate::error::{ResolveError, Result};
use crate::resolver::FieldResolver;
use crate::schema::SchemaType;
use crate::types::{FieldDecl, FieldType, Requirement};

static REGISTRY_CACHE: OnceLock<DashMap<Ulid, Arc<ResolverRegistry>>> = OnceLock::new();

fn cache() -> &'static DashMap<Ulid, Arc<ResolverRegistry>> {
    REGISTRY_CACHE.get_or_init(DashMap::new)
}

/// The merged declaration of one field as seen by a particular schema.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    name: String,
    field_type: FieldType,
    requirement: Requirement,
    resolver: FieldResolver,
    declared_by: String,
}

impl RegistryEntry {
    fn from_decl(decl: &FieldDecl, declared_by: &SchemaType) -> Self {
        Self {
            name: decl.name().to_string(),
            field_type: decl.field_type().clone(),
            requirement: decl.requirement().clone(),
            resolver: decl.field_resolver().clone(),
            declared_by: declared_by.name().to_string(),
        }
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

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Name of the schema whose declaration won the merge.
    pub fn declared_by(&self) -> &str {
        &self.declared_by
    }
}

/// Serializable one-line view of an entry, for logs and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub resolver: String,
    pub required: bool,
    pub declared_by: String,
}

#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    schema: String,
    schema_id: Ulid,
    entries: IndexMap<String, RegistryEntry>,
}

impl ResolverRegistry {
    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn schema_id(&self) -> Ulid {
        self.schema_id
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn resolver(&self, name: &str) -> Option<&FieldResolver> {
        self.entries.get(name).map(RegistryEntry::resolver)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Field names in first-declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Vec<FieldSummary> {
        self.iter()
            .map(|entry| FieldSummary {
                name: entry.name.clone(),
                type_: entry.field_type.describe(),
                resolver: entry.resolver.label().to_string(),
                required: entry.requirement.is_required(),
                declared_by: entry.declared_by.clone(),
            })
            .collect()
    }
}

/// Merge the resolvers of `schema` and all its ancestors. Not cached.
pub fn build_registry(schema: &Arc<SchemaType>) -> Result<ResolverRegistry> {
    let mut chain = schema.linearization();
    chain.reverse();

    let mut entries: IndexMap<String, RegistryEntry> = IndexMap::new();
    for ancestor in &chain {
        for decl in ancestor.declared_fields() {
            if let Some(existing) = entries.get(decl.name()) {
                if existing.requirement.is_required() != decl.requirement().is_required() {
                    return Err(ResolveError::schema_definition(
                        schema.name(),
                        format!(
                            "field '{}' is {} in '{}' but {} in '{}'",
                            decl.name(),
                            requirement_label(&existing.requirement),
                            existing.declared_by,
                            requirement_label(decl.requirement()),
                            ancestor.name()
                        ),
                    ));
                }
                trace!(
                    schema = schema.name(),
                    field = decl.name(),
                    from = %existing.declared_by,
                    to = ancestor.name(),
                    "field overridden"
                );
            }
            // IndexMap keeps the first slot when a key is re-inserted
            entries.insert(
                decl.name().to_string(),
                RegistryEntry::from_decl(decl, ancestor),
            );
        }
    }

    Ok(ResolverRegistry {
        schema: schema.name().to_string(),
        schema_id: schema.id(),
        entries,
    })
}

/// Cached registry for `schema`, building it on a miss.
pub fn registry_for(schema: &Arc<SchemaType>) -> Result<Arc<ResolverRegistry>> {
    if let Some(hit) = cache().get(&schema.id()) {
        return Ok(Arc::clone(hit.value()));
    }

    let registry = Arc::new(build_registry(schema)?);
    debug!(
        "Built resolver registry for {}: {}",
        schema.name(),
        Pretty(&registry.summary())
    );
    cache().insert(schema.id(), Arc::clone(&registry));
    Ok(registry)
}

/// Whether a registry for `schema` is already cached.
pub fn is_cached(schema: &SchemaType) -> bool {
    cache().contains_key(&schema.id())
}

fn requirement_label(requirement: &Requirement) -> &'static str {
    if requirement.is_required() {
        "required"
    } else {
        "optional"
    }
}
