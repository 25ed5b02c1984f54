//! Basic example demonstrating geocode library usage.
//!
//! Run with: cargo run --example basic -- [API_KEY] [ADDRESS]
//!
//! Without a key only the distance part runs.

use geocode::distance::{haversine, spherical_law_of_cosines, EARTH_RADIUS_KM, EARTH_RADIUS_MILES};
use geocode::{GeocodeError, GeocodeProvider, GoogleProvider};
use std::env;

fn main() -> Result<(), GeocodeError> {
    let landmarks = [
        ("White House", 38.898, -77.037),
        ("Big Ben", 51.5007, -0.1246),
        ("Mount Fuji", 35.3606, 138.7274),
    ];

    println!("Great-circle distances:");
    println!("{:-<60}", "");

    for (i, (from, lat1, lon1)) in landmarks.iter().enumerate() {
        for (to, lat2, lon2) in &landmarks[i + 1..] {
            let miles = haversine(*lat1, *lon1, *lat2, *lon2, EARTH_RADIUS_MILES);
            let km = haversine(*lat1, *lon1, *lat2, *lon2, EARTH_RADIUS_KM);
            let cosines = spherical_law_of_cosines(*lat1, *lon1, *lat2, *lon2, EARTH_RADIUS_KM);
            println!(
                "{} -> {}: {:.1} mi, {:.1} km (cosines: {:.1} km)",
                from, to, miles, km, cosines
            );
        }
    }

    let Some(api_key) = env::args().nth(1) else {
        return Ok(());
    };
    let address = env::args()
        .nth(2)
        .unwrap_or_else(|| "1600 Pennsylvania Ave NW, Washington, DC".to_string());

    let mut google = GoogleProvider::new(api_key)?;
    google.set_earth_radius(EARTH_RADIUS_KM)?;

    println!();
    println!("Geocoding '{}':", address);
    println!("{:-<60}", "");

    let result = google.execute(&address)?;
    match result.first() {
        Some(best) => {
            println!("{}, {} ({})", best.latitude, best.longitude, best.country);
            let (_, lat, lon) = landmarks[1];
            println!(
                "{:.1} km from Big Ben",
                google.distance_between(best.latitude, best.longitude, lat, lon)
            );
        }
        None if result.is_transport_failure() => println!("server not reachable"),
        None => println!("no match (status {:?})", result.status()),
    }

    Ok(())
}
