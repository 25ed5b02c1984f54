//! Resolve named configuration groups to providers.
//!
//! [`ProviderFactory`] owns a [`GeocodeConfig`] and builds providers from it:
//!
//! - [`ProviderFactory::factory`] builds a fresh provider on every call.
//! - [`ProviderFactory::instance`] builds one provider on the first call and
//!   hands out that same provider from then on, whatever group is asked for
//!   later.
//!
//! Applications that want a single process-wide factory configured from the
//! environment can use the free functions [`instance`] and [`factory`].

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::config::GeocodeConfig;
use crate::error::{GeocodeError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::google::GoogleProvider;
use crate::provider::{GeocodeProvider, ProviderSettings, Service};
use crate::yahoo::YahooProvider;

/// Builds providers from named configuration groups.
///
/// # Example
///
/// ```ignore
/// use geocode::{GeocodeConfig, ProviderConfig, ProviderFactory};
///
/// let config = GeocodeConfig::default()
///     .with_group("default", ProviderConfig::new("Google", "my-api-key"));
/// let factory = ProviderFactory::new(config);
///
/// let shared = factory.instance("default")?;
/// let result = shared.execute("Big Ben, London")?;
/// ```
pub struct ProviderFactory {
    config: GeocodeConfig,
    fetcher: Option<Arc<dyn Fetch>>,
    instance: Mutex<Option<Arc<dyn GeocodeProvider>>>,
}

impl ProviderFactory {
    pub fn new(config: GeocodeConfig) -> Self {
        Self {
            config,
            fetcher: None,
            instance: Mutex::new(None),
        }
    }

    /// A factory configured by [`GeocodeConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(GeocodeConfig::from_env()?))
    }

    /// Use `fetcher` for every provider this factory builds instead of an
    /// HTTP client with the configured timeout.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn config(&self) -> &GeocodeConfig {
        &self.config
    }

    /// Build a new provider for configuration group `name`.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::UnknownConfigGroup`] if there is no such group
    /// - [`GeocodeError::UnknownService`] if the group names no known service
    /// - [`GeocodeError::MissingApiKey`] if the group's key is empty
    pub fn factory(&self, name: &str) -> Result<Box<dyn GeocodeProvider>> {
        let group = self.config.group(name)?;
        let service = group.service()?;

        let fetcher = match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(HttpFetcher::with_timeout(self.config.timeout())?),
        };
        let settings = ProviderSettings::with_fetcher(group.api_key.as_str(), fetcher)?;

        tracing::debug!(group = name, service = %service, "Building geocode provider");

        Ok(match service {
            Service::Google => Box::new(GoogleProvider::from_settings(settings)),
            Service::Yahoo => Box::new(YahooProvider::from_settings(settings)),
        })
    }

    /// The shared provider of this factory.
    ///
    /// The first successful call builds the provider for group `name`; every
    /// later call returns that provider and ignores `name`. A failed first
    /// call leaves nothing behind, so the next call tries again.
    ///
    /// Concurrent first calls are serialized; exactly one provider is built.
    pub fn instance(&self, name: &str) -> Result<Arc<dyn GeocodeProvider>> {
        let mut slot = self
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(provider) = slot.as_ref() {
            return Ok(Arc::clone(provider));
        }

        let provider: Arc<dyn GeocodeProvider> = Arc::from(self.factory(name)?);
        tracing::info!(group = name, service = %provider.service(), "Shared geocode provider initialized");
        *slot = Some(Arc::clone(&provider));
        Ok(provider)
    }
}

static GLOBAL: OnceLock<std::result::Result<ProviderFactory, String>> = OnceLock::new();

fn global() -> Result<&'static ProviderFactory> {
    GLOBAL
        .get_or_init(|| ProviderFactory::from_env().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|reason| GeocodeError::Config {
            reason: reason.clone(),
        })
}

/// The process-wide shared provider. See [`ProviderFactory::instance`].
///
/// The underlying factory reads its configuration from the environment the
/// first time either this function or [`factory`] is called.
pub fn instance(name: &str) -> Result<Arc<dyn GeocodeProvider>> {
    global()?.instance(name)
}

/// A fresh provider from the process-wide configuration. See
/// [`ProviderFactory::factory`].
pub fn factory(name: &str) -> Result<Box<dyn GeocodeProvider>> {
    global()?.factory(name)
}
