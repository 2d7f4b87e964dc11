//! Run configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! `RETAG_*` environment variables (nested keys use `__`, e.g.
//! `RETAG_REGISTRY__URL`). Command-line overrides are applied on top by the
//! binary. [`Settings::validate`] turns the result into an immutable
//! [`ReassignmentPlan`].
//!
//! Quote tag values in YAML. An unquoted `target_tag: 2.0` is read as a
//! number and reaches the plan as `2`, not `2.0`.

use crate::auth::Credentials;
use crate::client::ClientConfig;
use crate::error::{Result, RetagError};
use crate::reassign::ReassignmentPlan;
use config::{Config as ConfigRs, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;


/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "RETAG";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub source_tag: Option<String>,
    pub target_tag: Option<String>,
    pub current_tag: Option<String>,
    pub repositories: Option<RepositoryList>,
    pub registry: RegistrySettings,
    pub network: Network,
}

/// Repositories given either as a comma-separated string or as a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RepositoryList {
    Csv(String),
    List(Vec<String>),
}

impl RepositoryList {
    /// Returns the trimmed, non-empty repository names in order.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Csv(s) => parse_repositories(s),
            Self::List(list) => list
                .iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }
}

/// Registry endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct RegistrySettings {
    /// Registry base URL; takes precedence over the ECR account/region pair.
    pub url: Option<String>,
    pub aws_account_id: Option<String>,
    pub region: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Per-request timeout in seconds.
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

/// Splits a comma-separated repository list, trimming names and dropping
/// empty entries.
///
/// # Examples
///
/// ```
/// use libretag::config::parse_repositories;
///
/// assert_eq!(parse_repositories("api, web,,worker "), ["api", "web", "worker"]);
/// ```
pub fn parse_repositories(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    /// Parses `Settings` from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder().add_source(File::from_str(s, FileFormat::Yaml));
        Self::from_builder(builder)
    }

    /// Loads settings from an optional YAML file and the process environment.
    ///
    /// A path that is given must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// Loads settings from an optional YAML file and an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = ConfigRs::builder();

        if let Some(p) = path {
            builder = builder.add_source(File::from(p).format(FileFormat::Yaml).required(true));
        }

        Self::from_builder(builder.add_source(environment))
    }

    /// The `RETAG_*` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| RetagError::configuration_with_source("Failed to load configuration", e))
    }

    /// Returns the configured repository names.
    pub fn repository_names(&self) -> Vec<String> {
        self.repositories
            .as_ref()
            .map(RepositoryList::names)
            .unwrap_or_default()
    }

    /// Checks required inputs and builds the run plan.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming every missing input.
    pub fn validate(&self) -> Result<ReassignmentPlan> {
        ReassignmentPlan::new(
            non_empty(&self.source_tag).unwrap_or_default(),
            non_empty(&self.target_tag).unwrap_or_default(),
            non_empty(&self.current_tag).unwrap_or_default(),
            self.repository_names(),
        )
    }

    /// Resolves the registry base URL.
    ///
    /// An explicit URL wins; otherwise an AWS account id and region select
    /// the ECR endpoint `<account>.dkr.ecr.<region>.amazonaws.com`.
    pub fn registry_endpoint(&self) -> Result<String> {
        if let Some(url) = non_empty(&self.registry.url) {
            return Ok(url.to_string());
        }

        match (
            non_empty(&self.registry.aws_account_id),
            non_empty(&self.registry.region),
        ) {
            (Some(account), Some(region)) => {
                Ok(format!("https://{}.dkr.ecr.{}.amazonaws.com", account, region))
            }
            _ => Err(RetagError::configuration(
                "No registry configured: set registry, or aws-account-id and region",
            )),
        }
    }

    /// Credentials derived from the registry settings.
    pub fn credentials(&self) -> Credentials {
        Credentials::from_parts(
            self.registry.username.as_deref(),
            self.registry.password.as_deref(),
            self.registry.token.as_deref(),
        )
    }

    /// HTTP client settings.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new().with_timeout(self.network.timeout)
    }
}
