//! ResolutionContext: ambient values available while resolving one record.
//!
//! A context carries the base directory that path-valued fields are anchored
//! at, the scope of named bindings that templates read from, the settings in
//! force, and the position inside the document currently being resolved.
//!
//! Contexts are immutable. Every `derive`/`at_*` call returns a new context
//! and leaves the parent untouched. A derived context owns a snapshot of its
//! scope, so lookups never consult the parent and bindings injected for one
//! sequence element are invisible to its siblings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::path::FieldPath;
use crate::settings::ResolutionSettings;

/// Directory name used as the synthetic base path of test contexts
const TEST_BASE_DIR: &str = "schemata-test-context";

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    base_path: PathBuf,
    scope: Arc<Map<String, Value>>,
    settings: Arc<ResolutionSettings>,
    field_path: FieldPath,
    depth: usize,
}

impl ResolutionContext {
    /// Production constructor with default settings.
    pub fn new(base_path: impl Into<PathBuf>, scope: Map<String, Value>) -> Self {
        Self {
            base_path: base_path.into(),
            scope: Arc::new(scope),
            settings: Arc::new(ResolutionSettings::default()),
            field_path: FieldPath::root(),
            depth: 0,
        }
    }

    /// Production constructor from loaded settings; the settings' `scope`
    /// table becomes the initial scope.
    pub fn from_settings(base_path: impl Into<PathBuf>, settings: ResolutionSettings) -> Self {
        let base_path = base_path.into();
        debug!(
            base_path = %base_path.display(),
            bindings = settings.scope.len(),
            "creating resolution context"
        );
        Self {
            base_path,
            scope: Arc::new(settings.scope.clone()),
            settings: Arc::new(settings),
            field_path: FieldPath::root(),
            depth: 0,
        }
    }

    /// Context for use outside any real file layout.
    ///
    /// The base path points into the OS temp directory but is never created.
    pub fn for_test() -> Self {
        Self::new(std::env::temp_dir().join(TEST_BASE_DIR), Map::new())
    }

    /// Same context with different settings.
    pub fn with_settings(&self, settings: ResolutionSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            ..self.clone()
        }
    }

    // --- Accessors ---

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn scope(&self) -> &Map<String, Value> {
        &self.scope
    }

    pub fn settings(&self) -> &ResolutionSettings {
        &self.settings
    }

    /// Position of the value being resolved, relative to the root record.
    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    /// Number of nested schema levels entered so far.
    pub fn depth(&self) -> usize {
        self.depth
    }

    // --- Lookup ---

    /// Look up a binding, navigating nested objects for dotted names.
    ///
    /// Numeric segments index into sequences, so `items.0` is the first
    /// element of `items`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut parts = name.split('.');
        let first = parts.next()?;
        let mut current = self.scope.get(first)?;
        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Like [`get`](Self::get) but reports a missing binding as an error.
    pub fn lookup(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| ConfigError::NotFound {
            name: name.to_string(),
        })
    }

    /// Anchor a relative path at the base path; absolute paths pass through.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    // --- Derivation ---

    /// Child context with `bindings` overlaid on a copy of this scope and,
    /// when given, a new base path.
    pub fn derive<I>(&self, bindings: I, base_path: Option<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut bindings = bindings.into_iter().peekable();
        let scope = if bindings.peek().is_none() {
            Arc::clone(&self.scope)
        } else {
            let mut scope = (*self.scope).clone();
            scope.extend(bindings);
            Arc::new(scope)
        };
        Self {
            base_path: base_path.unwrap_or_else(|| self.base_path.clone()),
            scope,
            settings: Arc::clone(&self.settings),
            field_path: self.field_path.clone(),
            depth: self.depth,
        }
    }

    /// Child context with a single extra binding.
    pub fn bind(&self, name: impl Into<String>, value: Value) -> Self {
        self.derive([(name.into(), value)], None)
    }

    /// Child context whose scope is replaced entirely.
    pub fn with_scope(&self, scope: Map<String, Value>) -> Self {
        Self {
            scope: Arc::new(scope),
            ..self.clone()
        }
    }

    /// Child context positioned at a named field.
    pub fn at_field(&self, name: &str) -> Self {
        Self {
            field_path: self.field_path.child(name),
            ..self.clone()
        }
    }

    /// Child context positioned at a sequence element.
    ///
    /// The element's position is bound under the configured index binding.
    pub fn at_index(&self, index: usize) -> Self {
        let binding = self.settings.index_binding.clone();
        let mut child = self.bind(binding, Value::from(index));
        child.field_path = self.field_path.index(index);
        child
    }

    /// Child context one nesting level deeper.
    pub fn descend(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> Map<String, Value> {
        let mut scope = Map::new();
        scope.insert("env".into(), json!("prod"));
        scope.insert("database".into(), json!({"host": "db", "ports": {"main": 5432}}));
        scope
    }

    #[test]
    fn test_for_test_context() {
        let ctx = ResolutionContext::for_test();
        assert!(ctx.scope().is_empty());
        assert!(ctx.base_path().ends_with(TEST_BASE_DIR));
        assert!(ctx.field_path().is_root());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_lookup_dotted() {
        let ctx = ResolutionContext::new("/project", scope());
        assert_eq!(ctx.get("env"), Some(&json!("prod")));
        assert_eq!(ctx.get("database.ports.main"), Some(&json!(5432)));
        assert_eq!(ctx.get("database.missing"), None);
        assert_eq!(ctx.get("env.length"), None);
    }

    #[test]
    fn test_lookup_indexes_sequences() {
        let mut scope = scope();
        scope.insert("items".into(), json!([{"name": "first"}, "second"]));
        let ctx = ResolutionContext::new("/project", scope);
        assert_eq!(ctx.get("items.0.name"), Some(&json!("first")));
        assert_eq!(ctx.get("items.1"), Some(&json!("second")));
        assert_eq!(ctx.get("items.2"), None);
        assert_eq!(ctx.get("items.first"), None);
    }

    #[test]
    fn test_lookup_not_found() {
        let ctx = ResolutionContext::for_test();
        let err = ctx.lookup("nope").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { name } if name == "nope"));
    }

    #[test]
    fn test_derive_does_not_mutate_parent() {
        let parent = ResolutionContext::new("/project", scope());
        let child = parent.derive([("env".to_string(), json!("dev"))], Some("/other".into()));

        assert_eq!(child.get("env"), Some(&json!("dev")));
        assert_eq!(child.get("database.host"), Some(&json!("db")));
        assert_eq!(child.base_path(), Path::new("/other"));

        assert_eq!(parent.get("env"), Some(&json!("prod")));
        assert_eq!(parent.base_path(), Path::new("/project"));
    }

    #[test]
    fn test_with_scope_replaces_everything() {
        let parent = ResolutionContext::new("/project", scope());
        let mut replacement = Map::new();
        replacement.insert("only".into(), json!(1));
        let child = parent.with_scope(replacement);

        assert_eq!(child.get("only"), Some(&json!(1)));
        assert!(child.get("env").is_none());
    }

    #[test]
    fn test_siblings_do_not_share_index() {
        let parent = ResolutionContext::for_test().at_field("items");
        let first = parent.at_index(0);
        let second = parent.at_index(1);

        assert_eq!(first.get("index"), Some(&json!(0)));
        assert_eq!(second.get("index"), Some(&json!(1)));
        assert!(parent.get("index").is_none());
        assert_eq!(second.field_path().to_string(), "items[1]");
    }

    #[test]
    fn test_index_binding_follows_settings() {
        let settings = ResolutionSettings {
            index_binding: "position".into(),
            ..ResolutionSettings::default()
        };
        let ctx = ResolutionContext::for_test().with_settings(settings).at_index(4);
        assert_eq!(ctx.get("position"), Some(&json!(4)));
        assert!(ctx.get("index").is_none());
    }

    #[test]
    fn test_from_settings_seeds_scope() {
        let settings = ResolutionSettings {
            scope: scope(),
            ..ResolutionSettings::default()
        };
        let ctx = ResolutionContext::from_settings("/project", settings);
        assert_eq!(ctx.get("env"), Some(&json!("prod")));
    }

    #[test]
    fn test_resolve_path() {
        let ctx = ResolutionContext::new("/project/defs", Map::new());
        assert_eq!(
            ctx.resolve_path("scripts/run.sh"),
            PathBuf::from("/project/defs/scripts/run.sh")
        );
        assert_eq!(ctx.resolve_path("/abs/run.sh"), PathBuf::from("/abs/run.sh"));
    }

    #[test]
    fn test_descend_tracks_depth() {
        let ctx = ResolutionContext::for_test().descend().descend();
        assert_eq!(ctx.depth(), 2);
    }
}
