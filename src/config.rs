use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::graph_ddl::graph_type::DEFAULT_MAX_PATTERN_EXPANSION;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// What to do when two mappings in one graph share a (type, view) key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateMappingPolicy {
    /// Reject the definition with `DuplicateMapping`
    #[default]
    Fail,
    /// Keep the mapping declared last
    Overwrite,
}

#[derive(Debug, Error)]
#[error("Unknown duplicate mapping policy '{0}'. Supported: fail, overwrite")]
pub struct ParsePolicyError(String);

impl FromStr for DuplicateMappingPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(DuplicateMappingPolicy::Fail),
            "overwrite" => Ok(DuplicateMappingPolicy::Overwrite),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

impl fmt::Display for DuplicateMappingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateMappingPolicy::Fail => f.write_str("fail"),
            DuplicateMappingPolicy::Overwrite => f.write_str("overwrite"),
        }
    }
}

/// Resolver configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_distinct_columns"))]
#[serde(default)]
pub struct ResolverConfig {
    /// Behaviour on duplicate (type, view) mapping keys within a graph
    pub duplicate_mappings: DuplicateMappingPolicy,

    /// Implicit identity column bound on every node and edge mapping
    #[validate(length(min = 1, message = "id column cannot be empty"))]
    pub id_column: String,

    /// Implicit start-node key column bound on every edge mapping
    #[validate(length(min = 1, message = "start column cannot be empty"))]
    pub start_column: String,

    /// Implicit end-node key column bound on every edge mapping
    #[validate(length(min = 1, message = "end column cannot be empty"))]
    pub end_column: String,

    /// Maximum number of patterns a single pattern definition may expand to
    #[validate(range(
        min = 1,
        max = 1_000_000,
        message = "Max pattern expansion must be between 1 and 1000000"
    ))]
    pub max_pattern_expansion: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            duplicate_mappings: DuplicateMappingPolicy::Fail,
            id_column: "id".to_string(),
            start_column: "start".to_string(),
            end_column: "end".to_string(),
            max_pattern_expansion: DEFAULT_MAX_PATTERN_EXPANSION,
        }
    }
}

fn validate_distinct_columns(config: &ResolverConfig) -> Result<(), ValidationError> {
    let columns = [&config.id_column, &config.start_column, &config.end_column];
    for (i, column) in columns.iter().enumerate() {
        if columns[i + 1..].contains(column) {
            let mut error = ValidationError::new("distinct_columns");
            error.message = Some(format!("implicit column '{}' is bound twice", column).into());
            return Err(error);
        }
    }
    Ok(())
}

impl ResolverConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            duplicate_mappings: parse_env_var(
                "VIEWGRAPH_DUPLICATE_MAPPINGS",
                &defaults.duplicate_mappings.to_string(),
            )?,
            id_column: env::var("VIEWGRAPH_ID_COLUMN").unwrap_or(defaults.id_column),
            start_column: env::var("VIEWGRAPH_START_COLUMN").unwrap_or(defaults.start_column),
            end_column: env::var("VIEWGRAPH_END_COLUMN").unwrap_or(defaults.end_column),
            max_pattern_expansion: parse_env_var(
                "VIEWGRAPH_MAX_PATTERN_EXPANSION",
                &defaults.max_pattern_expansion.to_string(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Build the effective configuration for a CLI run: the config file if
    /// given, otherwise the environment, then CLI overrides on top
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = match &cli.config_file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::from_env()?,
        };
        config.merge(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn merge(&mut self, cli: CliConfig) {
        if let Some(policy) = cli.duplicate_mappings {
            self.duplicate_mappings = policy;
        }
        if let Some(limit) = cli.max_pattern_expansion {
            self.max_pattern_expansion = limit;
        }
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub config_file: Option<PathBuf>,
    pub duplicate_mappings: Option<DuplicateMappingPolicy>,
    pub max_pattern_expansion: Option<usize>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
