//! Configuration management for tenantgraph.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`TENANTGRAPH__` prefix, `__` separator)
//! 2. Config file (`tenantgraph.toml` by default)
//! 3. Defaults

use serde::Deserialize;

use crate::error::{Result, TenancyError};

/// Which tenant label provider is active.
///
/// ```toml
/// [tenancy.tenant_label_provider]
/// mode = "static"
/// value = "Customer1"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TenantLabelConfig {
    Static {
        value: String,
    },
    /// The tenant source is supplied in code. `initial` seeds it.
    Dynamic {
        #[serde(default)]
        initial: Option<String>,
    },
}

impl Default for TenantLabelConfig {
    fn default() -> Self {
        Self::Dynamic { initial: None }
    }
}

/// The `[tenancy]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TenancyConfig {
    #[serde(default)]
    pub tenant_label_provider: TenantLabelConfig,
}

/// The `[neo4j]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "secret".to_string()
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
        }
    }
}

/// Everything a tenantgraph process reads at startup.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub tenancy: TenancyConfig,
    #[serde(default)]
    pub neo4j: Neo4jSettings,
}

impl Settings {
    /// Load from `<file_prefix>.{toml,yaml,json,...}` (optional) and the
    /// environment.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("TENANTGRAPH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TenancyError::Configuration(e.to_string()))?;

        cfg.try_deserialize()
            .map_err(|e| TenancyError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("tenantgraph")
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(
            settings.tenancy.tenant_label_provider,
            TenantLabelConfig::Dynamic { initial: None }
        );
        assert_eq!(settings.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(settings.neo4j.user, "neo4j");
    }

    #[test]
    fn load_static_provider_from_file() {
        let file = toml_file(
            r#"
[tenancy.tenant_label_provider]
mode = "static"
value = "Customer1"

[neo4j]
uri = "bolt://graph.internal:7687"
"#,
        );

        let prefix = file.path().with_extension("");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(
            settings.tenancy.tenant_label_provider,
            TenantLabelConfig::Static {
                value: "Customer1".to_string()
            }
        );
        assert_eq!(settings.neo4j.uri, "bolt://graph.internal:7687");
        assert_eq!(settings.neo4j.password, "secret");
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let settings = Settings::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(settings.tenancy, TenancyConfig::default());
    }

    #[test]
    fn unknown_mode_is_an_error() {
        let file = toml_file("[tenancy.tenant_label_provider]\nmode = \"plugin\"\n");
        let prefix = file.path().with_extension("");
        assert!(matches!(
            Settings::load(prefix.to_str().unwrap()),
            Err(TenancyError::Configuration(_))
        ));
    }
}
