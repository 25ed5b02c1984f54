use anyhow::{bail, Result};
use geocode::distance::{haversine, spherical_law_of_cosines, EARTH_RADIUS_KM, EARTH_RADIUS_MILES};

use crate::Formula;

/// Parse "LAT,LON" in decimal degrees.
pub fn parse_point(s: &str) -> std::result::Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{}'", s))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} out of range [-90, 90]", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("longitude {} out of range [-180, 180]", lon));
    }

    Ok((lat, lon))
}

pub fn run(
    radius: Option<f64>,
    from: (f64, f64),
    to: (f64, f64),
    formula: Formula,
    km: bool,
) -> Result<()> {
    let (radius, unit) = match (radius, km) {
        (Some(_), true) => bail!("--radius and --km cannot be used together"),
        (Some(radius), false) => {
            if !radius.is_finite() || radius <= 0.0 {
                bail!("Invalid earth radius: {}", radius);
            }
            (radius, "")
        }
        (None, true) => (EARTH_RADIUS_KM, " km"),
        (None, false) => (EARTH_RADIUS_MILES, " mi"),
    };

    let distance = compute(formula, from, to, radius);
    println!("{:.3}{}", distance, unit);

    Ok(())
}

fn compute(formula: Formula, from: (f64, f64), to: (f64, f64), radius: f64) -> f64 {
    match formula {
        Formula::Haversine => haversine(from.0, from.1, to.0, to.1, radius),
        Formula::Cosines => spherical_law_of_cosines(from.0, from.1, to.0, to.1, radius),
    }
}
