//! Named provider configurations.
//!
//! Configuration is organized in groups so an application can switch between
//! services (or keys) by name. Each group names a service and an API key:
//!
//! ```toml
//! timeout-secs = 10
//!
//! [default]
//! service = "Google"
//! api-key = "..."
//!
//! [fallback]
//! service = "Yahoo"
//! api-key = "..."
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GEOCODE_CONFIG` | Path to a TOML file as above | None |
//! | `GEOCODE_SERVICE` | Service of the `default` group | `Google` |
//! | `GEOCODE_API_KEY` | API key of the `default` group | empty |
//! | `GEOCODE_TIMEOUT_SECS` | HTTP request timeout | 30 |

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, Result};
use crate::fetch::DEFAULT_TIMEOUT_SECS;
use crate::provider::Service;

/// Name of the group used when none is given.
pub const DEFAULT_GROUP: &str = "default";

const ENV_CONFIG: &str = "GEOCODE_CONFIG";
const ENV_SERVICE: &str = "GEOCODE_SERVICE";
const ENV_API_KEY: &str = "GEOCODE_API_KEY";
const ENV_TIMEOUT: &str = "GEOCODE_TIMEOUT_SECS";

/// One configuration group: which service to use, with which key.
///
/// The service name is kept as written and only resolved when a provider is
/// built, so a typo surfaces as [`GeocodeError::UnknownService`] at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
    pub service: String,
    #[serde(default)]
    pub api_key: String,
}

impl ProviderConfig {
    pub fn new(service: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolve the service name.
    pub fn service(&self) -> Result<Service> {
        self.service.parse()
    }
}

impl Default for ProviderConfig {
    /// Google with an empty key, which no provider accepts.
    fn default() -> Self {
        Self::new(Service::Google.to_string(), "")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    groups: BTreeMap<String, ProviderConfig>,
}

/// All configuration groups plus transport settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeConfig {
    groups: BTreeMap<String, ProviderConfig>,
    timeout: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(DEFAULT_GROUP.to_string(), ProviderConfig::default());
        Self {
            groups,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeocodeConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Config`] if the document is not valid TOML or a
    /// group is missing its `service` key.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(toml)?;
        Ok(Self {
            groups: raw.groups,
            timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Read and parse a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Build the configuration from environment variables.
    ///
    /// Starts from `GEOCODE_CONFIG` if set (otherwise [`Default`]), then
    /// applies [`with_env_overrides`](Self::with_env_overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if `GEOCODE_CONFIG` names an unreadable or invalid file.
    pub fn from_env() -> Result<Self> {
        let config = match std::env::var(ENV_CONFIG) {
            Ok(path) => {
                tracing::debug!(path = %path, "Loading geocode configuration");
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };

        Ok(config.with_env_overrides())
    }

    /// Let `GEOCODE_SERVICE` and `GEOCODE_API_KEY` override the `default`
    /// group and `GEOCODE_TIMEOUT_SECS` the timeout.
    pub fn with_env_overrides(mut self) -> Self {
        let service = std::env::var(ENV_SERVICE).ok();
        let api_key = std::env::var(ENV_API_KEY).ok();
        if service.is_some() || api_key.is_some() {
            let group = self.groups.entry(DEFAULT_GROUP.to_string()).or_default();
            if let Some(service) = service {
                group.service = service;
            }
            if let Some(api_key) = api_key {
                group.api_key = api_key;
            }
        }

        if let Some(secs) = std::env::var(ENV_TIMEOUT)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.timeout = Duration::from_secs(secs);
        }

        self
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Result<&ProviderConfig> {
        self.groups
            .get(name)
            .ok_or_else(|| GeocodeError::UnknownConfigGroup {
                name: name.to_string(),
            })
    }

    /// Add or replace a group.
    pub fn with_group(mut self, name: impl Into<String>, group: ProviderConfig) -> Self {
        self.groups.insert(name.into(), group);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Group names in sorted order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
