pub mod config;
pub mod distance;
pub mod lookup;

use anyhow::{Context, Result};
use geocode::{GeocodeConfig, GeocodeProvider, ProviderConfig, ProviderFactory};

use crate::ProviderArgs;

/// Load the configuration and apply command-line overrides to the selected
/// group.
///
/// `--config` takes the place of `GEOCODE_CONFIG`; the other `GEOCODE_*`
/// variables apply either way, and flags win over both.
pub fn resolve_config(args: &ProviderArgs) -> Result<(GeocodeConfig, ProviderConfig)> {
    let config = match &args.config {
        Some(path) => GeocodeConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
            .with_env_overrides(),
        None => GeocodeConfig::from_env().context("Failed to load configuration")?,
    };

    let mut group = match config.group(&args.group) {
        Ok(group) => group.clone(),
        // A service given on the command line is enough to define a group.
        Err(_) if args.service.is_some() => ProviderConfig::default(),
        Err(e) => return Err(e.into()),
    };
    if let Some(service) = &args.service {
        group.service = service.clone();
    }
    if let Some(api_key) = &args.api_key {
        group.api_key = api_key.clone();
    }

    let config = config.with_group(args.group.as_str(), group.clone());
    Ok((config, group))
}

/// Build the provider for the selected group.
pub fn build_provider(args: &ProviderArgs) -> Result<Box<dyn GeocodeProvider>> {
    let (config, _) = resolve_config(args)?;

    let mut provider = ProviderFactory::new(config)
        .factory(&args.group)
        .with_context(|| format!("Failed to create provider for group '{}'", args.group))?;

    if let Some(radius) = args.radius {
        provider.set_earth_radius(radius)?;
    }

    tracing::debug!(group = %args.group, service = %provider.service(), "Provider ready");

    Ok(provider)
}

/// Mask all but the last four characters of a key.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
