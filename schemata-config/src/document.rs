//! Helpers for turning declarative documents into raw value trees.
//!
//! Reading files is the caller's job; these functions start from text. The
//! path helpers walk and edit nested tables the way component loaders address
//! keys such as `["tool", "schemata", "module_name"]`.

use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Parse YAML text into a raw value tree.
pub fn parse_yaml(source: &str) -> Result<Value> {
    serde_yaml::from_str(source).map_err(|e| ConfigError::DocumentParse {
        format: "YAML",
        message: e.to_string(),
    })
}

/// Parse TOML text into a raw value tree.
pub fn parse_toml(source: &str) -> Result<Value> {
    toml::from_str(source).map_err(|e| ConfigError::DocumentParse {
        format: "TOML",
        message: e.to_string(),
    })
}

/// Walk `path` through nested tables.
///
/// Fails when a key is missing or an intermediate value is not a table.
pub fn value_at<'a>(doc: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = doc;
    for key in path {
        current = current
            .as_object()
            .and_then(|table| table.get(*key))
            .ok_or_else(|| ConfigError::document_path(path, format!("key '{key}' not found")))?;
    }
    Ok(current)
}

/// Set the value at `path`; every key before the last must already lead to a table.
pub fn set_value_at(doc: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Err(ConfigError::document_path(path, "empty path"));
    };

    let mut current = doc;
    for key in parents {
        current = current
            .as_object_mut()
            .and_then(|table| table.get_mut(*key))
            .ok_or_else(|| ConfigError::document_path(path, format!("key '{key}' not found")))?;
    }

    let table = current
        .as_object_mut()
        .ok_or_else(|| ConfigError::document_path(path, "parent is not a table"))?;
    table.insert((*last).to_string(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PYPROJECT: &str = r#"
[project]
name = "bar"
version = "0.1.0"

[tool.schemata]
module_name = "bar.definitions"
"#;

    #[test]
    fn test_parse_yaml_component_document() {
        let doc = parse_yaml(
            "script_path: run.sh\nasset_specs:\n  - key: a\n  - key: b\n",
        )
        .unwrap();
        assert_eq!(doc["script_path"], json!("run.sh"));
        assert_eq!(doc["asset_specs"][1]["key"], json!("b"));
    }

    #[test]
    fn test_parse_errors_name_format() {
        let err = parse_toml("not = [valid").unwrap_err();
        assert!(err.to_string().contains("TOML"));
        let err = parse_yaml("key: [unclosed").unwrap_err();
        assert!(err.to_string().contains("YAML"));
    }

    #[test]
    fn test_value_at() {
        let doc = parse_toml(PYPROJECT).unwrap();
        let value = value_at(&doc, &["tool", "schemata", "module_name"]).unwrap();
        assert_eq!(value, &json!("bar.definitions"));
    }

    #[test]
    fn test_value_at_missing_key() {
        let doc = parse_toml(PYPROJECT).unwrap();
        let err = value_at(&doc, &["tool", "other"]).unwrap_err();
        assert!(err.to_string().contains("key 'other' not found"));
        assert!(err.to_string().contains("tool.other"));
    }

    #[test]
    fn test_value_at_through_scalar_fails() {
        let doc = parse_toml(PYPROJECT).unwrap();
        assert!(value_at(&doc, &["project", "name", "inner"]).is_err());
    }

    #[test]
    fn test_set_value_at() {
        let mut doc = parse_toml(PYPROJECT).unwrap();
        set_value_at(&mut doc, &["project", "version"], json!("0.2.0")).unwrap();
        assert_eq!(doc["project"]["version"], json!("0.2.0"));
    }

    #[test]
    fn test_set_value_at_requires_existing_parent() {
        let mut doc = parse_toml(PYPROJECT).unwrap();
        assert!(set_value_at(&mut doc, &["missing", "key"], json!(1)).is_err());
        assert!(set_value_at(&mut doc, &["project", "name", "x"], json!(1)).is_err());
        assert!(set_value_at(&mut doc, &[], json!(1)).is_err());
    }
}
