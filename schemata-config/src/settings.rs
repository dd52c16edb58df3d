//! Resolution settings loaded with figment
//!
//! Settings are read fresh on every call to [`ResolutionSettings::load`], with
//! later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `schemata.toml` in the given directory
//! 3. `schemata.yaml` / `schemata.yml`
//! 4. `schemata.json`
//! 5. `SCHEMATA_*` environment variables (`__` separates nested keys, so
//!    `SCHEMATA_SCOPE__ENV=prod` binds `scope.env`)

use crate::error::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, trace};

/// File stem searched for in a settings directory
pub const SETTINGS_FILE_STEM: &str = "schemata";

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "SCHEMATA_";

/// Tunables for one resolution engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSettings {
    /// Maximum number of nested schema levels entered during one resolution
    pub max_depth: usize,
    /// Evaluate `{{ ... }}` references in default scalar fields
    pub templates: bool,
    /// Scope binding that carries a sequence element's position
    pub index_binding: String,
    /// Initial scope bindings for production contexts
    pub scope: Map<String, Value>,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            max_depth: 32,
            templates: true,
            index_binding: "index".to_string(),
            scope: Map::new(),
        }
    }
}

impl ResolutionSettings {
    /// Load settings from `dir` and the environment.
    pub fn load(dir: &Path) -> Result<Self> {
        debug!("Loading resolution settings from {}", dir.display());
        let settings: ResolutionSettings = Self::figment(dir).extract()?;
        debug!(
            max_depth = settings.max_depth,
            templates = settings.templates,
            scope_bindings = settings.scope.len(),
            "resolution settings loaded"
        );
        Ok(settings)
    }

    /// Build the layered figment without extracting it.
    ///
    /// Missing files are skipped by figment, so an empty directory yields the
    /// defaults plus whatever the environment sets.
    pub fn figment(dir: &Path) -> Figment {
        let stem = SETTINGS_FILE_STEM;
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let toml_path = dir.join(format!("{stem}.toml"));
        trace!("Checking settings file {}", toml_path.display());
        figment = figment.merge(Toml::file(toml_path));

        for ext in ["yaml", "yml"] {
            let yaml_path = dir.join(format!("{stem}.{ext}"));
            trace!("Checking settings file {}", yaml_path.display());
            figment = figment.merge(Yaml::file(yaml_path));
        }

        let json_path = dir.join(format!("{stem}.json"));
        trace!("Checking settings file {}", json_path.display());
        figment
            .merge(Json::file(json_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = ResolutionSettings::default();
        assert_eq!(settings.max_depth, 32);
        assert!(settings.templates);
        assert_eq!(settings.index_binding, "index");
        assert!(settings.scope.is_empty());
    }

    #[test]
    #[serial]
    fn test_empty_directory_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = ResolutionSettings::load(temp_dir.path()).unwrap();
        assert_eq!(settings, ResolutionSettings::default());
    }

    #[test]
    #[serial]
    fn test_toml_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("schemata.toml"),
            r#"
max_depth = 4
templates = false

[scope]
env = "prod"
"#,
        )
        .unwrap();

        let settings = ResolutionSettings::load(temp_dir.path()).unwrap();
        assert_eq!(settings.max_depth, 4);
        assert!(!settings.templates);
        assert_eq!(settings.index_binding, "index");
        assert_eq!(settings.scope.get("env"), Some(&Value::String("prod".into())));
    }

    #[test]
    #[serial]
    fn test_yaml_overrides_toml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("schemata.toml"), "max_depth = 4\n").unwrap();
        fs::write(temp_dir.path().join("schemata.yaml"), "max_depth: 9\n").unwrap();

        let settings = ResolutionSettings::load(temp_dir.path()).unwrap();
        assert_eq!(settings.max_depth, 9);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("schemata.toml"),
            "index_binding = \"position\"\n",
        )
        .unwrap();

        std::env::set_var("SCHEMATA_INDEX_BINDING", "slot");
        let settings = ResolutionSettings::load(temp_dir.path());
        std::env::remove_var("SCHEMATA_INDEX_BINDING");

        assert_eq!(settings.unwrap().index_binding, "slot");
    }

    #[test]
    #[serial]
    fn test_invalid_value_is_settings_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("schemata.toml"),
            "max_depth = \"deep\"\n",
        )
        .unwrap();

        let err = ResolutionSettings::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, crate::ConfigError::Settings { .. }));
    }
}
