use crate::config::{ConfigError, ConfigSource};
use crate::discovery::classifier::Strictness;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::Path;

pub const ENV_STRICTNESS: &str = "AUTORESOLVE_STRICTNESS";
pub const ENV_FAIL_ON_UNRESOLVED_MODULE: &str = "AUTORESOLVE_FAIL_ON_UNRESOLVED_MODULE";
pub const ENV_REQUIRED_BINDINGS: &str = "AUTORESOLVE_REQUIRED_BINDINGS";

const FIELD_STRICTNESS: &str = "strictness";
const FIELD_FAIL_ON_UNRESOLVED_MODULE: &str = "fail_on_unresolved_module";
const FIELD_REQUIRED_BINDINGS: &str = "required_bindings";

/// Settings controlling how a scan treats problems it finds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoResolveConfig {
    /// Whether an ambiguous implementation aborts the scan
    pub strictness: Strictness,
    /// Abort instead of warning when a referenced module cannot be loaded
    pub fail_on_unresolved_module: bool,
    /// Service keys that must be registered once discovered bindings are applied
    pub required_bindings: Vec<String>,
    /// Where each explicitly set field came from
    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

impl PartialEq for AutoResolveConfig {
    fn eq(&self, other: &Self) -> bool {
        self.strictness == other.strictness
            && self.fail_on_unresolved_module == other.fail_on_unresolved_module
            && self.required_bindings == other.required_bindings
    }
}

impl Eq for AutoResolveConfig {}

impl AutoResolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict scan: ambiguity and unloadable modules both abort
    pub fn strict() -> Self {
        Self::new()
            .with_strictness(Strictness::Strict)
            .fail_on_unresolved_module(true)
    }

    /// Lenient scan: problems are listed as diagnostics
    pub fn lenient() -> Self {
        Self::new()
            .with_strictness(Strictness::Lenient)
            .fail_on_unresolved_module(false)
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self.record(FIELD_STRICTNESS, ConfigSource::Programmatic);
        self
    }

    pub fn fail_on_unresolved_module(mut self, fail: bool) -> Self {
        self.fail_on_unresolved_module = fail;
        self.record(FIELD_FAIL_ON_UNRESOLVED_MODULE, ConfigSource::Programmatic);
        self
    }

    /// Require a binding for `service` after the scan
    pub fn require(mut self, service: impl Into<String>) -> Self {
        self.required_bindings.push(service.into());
        self.record(FIELD_REQUIRED_BINDINGS, ConfigSource::Programmatic);
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(value) = env::var(ENV_STRICTNESS) {
            config.strictness = value.parse().map_err(|value: String| {
                ConfigError::invalid_value("strictness", value, "strict or lenient")
            })?;
            config.record(FIELD_STRICTNESS, ConfigSource::EnvVar(ENV_STRICTNESS.to_string()));
        }

        if let Ok(value) = env::var(ENV_FAIL_ON_UNRESOLVED_MODULE) {
            config.fail_on_unresolved_module = parse_flag(FIELD_FAIL_ON_UNRESOLVED_MODULE, &value)?;
            config.record(
                FIELD_FAIL_ON_UNRESOLVED_MODULE,
                ConfigSource::EnvVar(ENV_FAIL_ON_UNRESOLVED_MODULE.to_string()),
            );
        }

        if let Ok(value) = env::var(ENV_REQUIRED_BINDINGS) {
            config.required_bindings = value
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect();
            config.record(
                FIELD_REQUIRED_BINDINGS,
                ConfigSource::EnvVar(ENV_REQUIRED_BINDINGS.to_string()),
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(yaml, ConfigSource::Programmatic)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::parse_yaml(&contents, ConfigSource::File(path.display().to_string()))
    }

    fn parse_yaml(yaml: &str, source: ConfigSource) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let present: Vec<String> = value
            .as_mapping()
            .map(|mapping| {
                mapping
                    .keys()
                    .filter_map(|key| key.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let mut config: Self = serde_yaml::from_value(value)?;
        for field in present {
            config.record(&field, source.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for key in &self.required_bindings {
            if key.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "required_bindings",
                    key,
                    "non-empty service key",
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::validation_failed(format!(
                    "required binding '{}' is listed more than once",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Source of each field; fields never set report their default
    pub fn config_sources(&self) -> HashMap<String, ConfigSource> {
        [
            (FIELD_STRICTNESS, "strict"),
            (FIELD_FAIL_ON_UNRESOLVED_MODULE, "false"),
            (FIELD_REQUIRED_BINDINGS, "none"),
        ]
        .into_iter()
        .map(|(field, default)| {
            let source = self
                .sources
                .get(field)
                .cloned()
                .unwrap_or_else(|| ConfigSource::Default(default.to_string()));
            (field.to_string(), source)
        })
        .collect()
    }

    fn record(&mut self, field: &str, source: ConfigSource) {
        self.sources.insert(field.to_string(), source);
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(field, value, "true or false")),
    }
}
