use anyhow::{bail, Context, Result};
use geocode::{GeocodeProvider, GeocodeResult, GoogleStatus, Placemark, Service, YahooStatus};

use crate::ProviderArgs;

pub fn run(args: &ProviderArgs, address: &str, json: bool, geojson: bool) -> Result<()> {
    let provider = super::build_provider(args)?;

    let result = provider
        .execute(address)
        .with_context(|| format!("Failed to geocode '{}'", address))?;

    if result.is_transport_failure() {
        bail!("no response from the {} geocoder", provider.service());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if geojson {
        let collection = geocode::geojson::to_feature_collection(&result);
        println!("{}", serde_json::to_string_pretty(&collection)?);
    } else {
        print_table(provider.as_ref(), &result);
    }

    Ok(())
}

fn print_table(provider: &dyn GeocodeProvider, result: &GeocodeResult) {
    if let Some(status) = result.status() {
        println!("Status:  {} ({})", status, describe_status(provider.service(), status));
    }

    if result.placemarks.is_empty() {
        println!("No matches");
        return;
    }

    let best = &result.placemarks[0];
    for (i, placemark) in result.placemarks.iter().enumerate() {
        println!();
        println!("#{} ({:.6}, {:.6})", i + 1, placemark.latitude, placemark.longitude);
        if i > 0 {
            println!("  From #1:      {:.3}", distance_from(provider, best, placemark));
        }
        println!("  Accuracy:     {}", placemark.accuracy);
        println!("  Country:      {}", placemark.country);

        let components = [
            ("Region:", &placemark.administrative_area),
            ("County:", &placemark.sub_administrative_area),
            ("Locality:", &placemark.locality),
            ("Street:", &placemark.thoroughfare),
            ("Postal code:", &placemark.postal_code),
        ];
        for (label, value) in components {
            if let Some(value) = value {
                println!("  {:<13} {}", label, value);
            }
        }
    }
}

/// Distance between two matches in the unit of the provider's earth radius.
fn distance_from(provider: &dyn GeocodeProvider, from: &Placemark, to: &Placemark) -> f64 {
    provider.distance_between(from.latitude, from.longitude, to.latitude, to.longitude)
}

fn describe_status(service: Service, status: u16) -> &'static str {
    let description = match service {
        Service::Google => GoogleStatus::from_code(status).map(GoogleStatus::description),
        Service::Yahoo => YahooStatus::from_code(status).map(YahooStatus::description),
    };
    description.unwrap_or("unrecognized status")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl geocode::Fetch for Offline {
        fn fetch(&self, url: &str) -> geocode::Result<geocode::RawResponse> {
            Err(geocode::GeocodeError::Transport {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn at(latitude: f64, longitude: f64) -> Placemark {
        Placemark {
            accuracy: geocode::Accuracy::Level(1),
            country: "US".to_string(),
            administrative_area: None,
            sub_administrative_area: None,
            locality: None,
            thoroughfare: None,
            postal_code: None,
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_distance_from_uses_provider_radius() {
        let config = geocode::GeocodeConfig::default()
            .with_group("default", geocode::ProviderConfig::new("Google", "key"));
        let mut provider = geocode::ProviderFactory::new(config)
            .with_fetcher(std::sync::Arc::new(Offline))
            .factory("default")
            .unwrap();
        provider.set_earth_radius(1.0).unwrap();

        let d = distance_from(provider.as_ref(), &at(0.0, 0.0), &at(0.0, 180.0));
        assert!((d - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(Service::Yahoo, 200), "success");
        assert_eq!(
            describe_status(Service::Google, 620),
            GoogleStatus::TooManyQueries.description()
        );
        assert_eq!(describe_status(Service::Yahoo, 620), "unrecognized status");
    }
}
