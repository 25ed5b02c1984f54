//! Great-circle distance between two coordinates.
//!
//! Both formulas take latitude/longitude pairs in decimal degrees and a sphere
//! radius. The result is expressed in whatever unit the radius is in; nothing
//! here converts between units.
//!
//! - [`haversine`] is the default and stays accurate for tiny separations.
//! - [`spherical_law_of_cosines`] is kept as an alternative. Its `acos`
//!   argument approaches 1 for nearby points, where precision falls apart.

/// Mean radius of the Earth in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3963.1676;

/// Mean radius of the Earth in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance between two points using the haversine formula.
///
/// See "Virtues of the Haversine", Sky and Telescope, vol. 68 no. 2, 1984, p. 159.
///
/// # Arguments
///
/// * `lat1`, `lon1` - First coordinate in decimal degrees
/// * `lat2`, `lon2` - Second coordinate in decimal degrees
/// * `radius` - Sphere radius; the result uses the same unit
///
/// # Examples
///
/// ```
/// use geocode::distance::{haversine, EARTH_RADIUS_MILES};
///
/// // White House to Big Ben
/// let d = haversine(38.898, -77.037, 51.5007, -0.1246, EARTH_RADIUS_MILES);
/// assert!((d - 3659.0).abs() < 5.0);
/// ```
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlat = lat2 - lat1;
    let dlon = lon2.to_radians() - lon1.to_radians();

    let sin_lat = (dlat / 2.0).sin();
    let sin_lon = (dlon / 2.0).sin();

    let a = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    // Rounding can push sqrt(a) just past 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    radius * c
}

/// Distance between two points using the spherical law of cosines.
///
/// # Examples
///
/// ```
/// use geocode::distance::{spherical_law_of_cosines, EARTH_RADIUS_KM};
///
/// // One degree of latitude along a meridian
/// let d = spherical_law_of_cosines(10.0, 20.0, 11.0, 20.0, EARTH_RADIUS_KM);
/// assert!((d - 111.195).abs() < 0.01);
/// ```
pub fn spherical_law_of_cosines(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let dlon = lon2.to_radians() - lon1.to_radians();

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * dlon.cos();
    // Same overshoot as above, on both ends of the acos domain.
    radius * cos_angle.clamp(-1.0, 1.0).acos()
}
