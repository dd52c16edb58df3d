//! Schema types and their inheritance hierarchy.
//!
//! A [`SchemaType`] is an immutable description of expected fields. Schemas
//! may extend any number of parents; the ancestor order used when merging
//! fields is the C3 linearization of the declared parents, so a diamond
//! contributes each ancestor exactly once and the merge is deterministic.
//!
//! Schemas are built through [`SchemaBuilder`], which validates the
//! declaration and computes the merged resolver registry eagerly. Broken
//! declarations fail at `build()`, never at first use.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use ulid::Ulid;

use crate::error::{ResolveError, Result};
use crate::registry::registry_for;
use crate::types::FieldDecl;

pub struct SchemaType {
    id: Ulid,
    name: String,
    parents: Vec<Arc<SchemaType>>,
    /// C3 order of all ancestors, excluding the schema itself
    ancestors: Vec<Arc<SchemaType>>,
    fields: Vec<FieldDecl>,
    description: Option<String>,
}

impl SchemaType {
    /// Start declaring a schema named `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            parents: Vec::new(),
            fields: Vec::new(),
            description: None,
        }
    }

    /// Identity assigned at build time; keys the registry cache.
    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Direct parents in declaration order.
    pub fn parents(&self) -> &[Arc<SchemaType>] {
        &self.parents
    }

    /// Fields declared at this level only, excluding inherited ones.
    pub fn declared_fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn declared_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Whether `ancestor` appears anywhere in this schema's hierarchy,
    /// including the schema itself.
    pub fn extends(&self, ancestor: &SchemaType) -> bool {
        self.id == ancestor.id || self.ancestors.iter().any(|a| a.id == ancestor.id)
    }

    /// C3 linearization, most-derived first.
    ///
    /// Computed once when the schema is built.
    pub fn linearization(self: &Arc<Self>) -> Vec<Arc<SchemaType>> {
        let mut order = Vec::with_capacity(self.ancestors.len() + 1);
        order.push(Arc::clone(self));
        order.extend(self.ancestors.iter().cloned());
        order
    }
}

/// Merge the parents' stored linearizations into the C3 order of a schema
/// named `name`, excluding the schema itself.
fn c3_ancestors(name: &str, parents: &[Arc<SchemaType>]) -> Result<Vec<Arc<SchemaType>>> {
    let mut sequences: Vec<VecDeque<Arc<SchemaType>>> = parents
        .iter()
        .map(|parent| parent.linearization().into())
        .collect();
    sequences.push(parents.iter().cloned().collect());

    let mut order = Vec::new();
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Ok(order);
        }

        let next = sequences
            .iter()
            .map(|sequence| &sequence[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|sequence| sequence.iter().skip(1).any(|s| s.id == head.id))
            })
            .cloned()
            .ok_or_else(|| {
                let pending: Vec<&str> = sequences
                    .iter()
                    .map(|sequence| sequence[0].name())
                    .collect();
                ResolveError::schema_definition(
                    name,
                    format!(
                        "cannot linearize parents: inconsistent order among {}",
                        pending.join(", ")
                    ),
                )
            })?;

        for sequence in sequences.iter_mut() {
            if sequence.front().map(|head| head.id) == Some(next.id) {
                sequence.pop_front();
            }
        }
        order.push(next);
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parents: Vec<&str> = self.parents.iter().map(|p| p.name()).collect();
        f.debug_struct("SchemaType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parents", &parents)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for [`SchemaType`]. Created by [`SchemaType::builder`].
///
/// ```
/// use schemata_fields::{FieldDecl, ScalarType, SchemaType};
///
/// let base = SchemaType::builder("Base")
///     .field(FieldDecl::new("base_field", ScalarType::Int))
///     .build()?;
/// let derived = SchemaType::builder("Derived")
///     .extends(&base)
///     .field(FieldDecl::new("derived_field", ScalarType::Str))
///     .build()?;
/// assert!(derived.extends(&base));
/// # Ok::<(), schemata_fields::ResolveError>(())
/// ```
pub struct SchemaBuilder {
    name: String,
    parents: Vec<Arc<SchemaType>>,
    fields: Vec<FieldDecl>,
    description: Option<String>,
}

impl SchemaBuilder {
    /// Add a parent. Order matters: earlier parents win over later ones.
    pub fn extends(mut self, parent: &Arc<SchemaType>) -> Self {
        self.parents.push(Arc::clone(parent));
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Validate the declaration, merge the registry and cache it.
    pub fn build(self) -> Result<Arc<SchemaType>> {
        if self.name.trim().is_empty() {
            return Err(ResolveError::schema_definition(
                "<unnamed>",
                "schema name cannot be empty",
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name().trim().is_empty() {
                return Err(ResolveError::schema_definition(
                    &self.name,
                    "field name cannot be empty",
                ));
            }
            if !seen.insert(field.name()) {
                return Err(ResolveError::schema_definition(
                    &self.name,
                    format!("field '{}' declared more than once", field.name()),
                ));
            }
        }

        let mut parent_ids = HashSet::new();
        for parent in &self.parents {
            if !parent_ids.insert(parent.id()) {
                return Err(ResolveError::schema_definition(
                    &self.name,
                    format!("parent '{}' listed more than once", parent.name()),
                ));
            }
        }

        let ancestors = c3_ancestors(&self.name, &self.parents)?;
        let schema = Arc::new(SchemaType {
            id: Ulid::new(),
            name: self.name,
            parents: self.parents,
            ancestors,
            fields: self.fields,
            description: self.description,
        });

        let registry = registry_for(&schema)?;
        debug!(
            schema = schema.name(),
            id = %schema.id(),
            fields = registry.len(),
            "schema declared"
        );
        Ok(schema)
    }
}
