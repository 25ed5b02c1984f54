//! Normalized result shapes shared by every provider.
//!
//! Serializing a [`GeocodeResult`] with serde yields the conceptual shapes:
//!
//! ```text
//! {}                                        transport failure
//! { "response": {...} }                     upstream error
//! { "response": {...}, "placemarks": [...]} success
//! ```

use serde::Serialize;

use crate::distance;

/// The outcome of a single geocoding request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeocodeResult {
    /// Status reported for the request, absent when no HTTP response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseInfo>,
    /// Candidate locations in upstream order, best match first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub placemarks: Vec<Placemark>,
}

impl GeocodeResult {
    /// The result returned when the server could not be reached at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A result carrying only a status, with no placemarks.
    pub fn with_response(status: u16, request: impl Into<String>) -> Self {
        Self {
            response: Some(ResponseInfo {
                status,
                request: request.into(),
            }),
            placemarks: Vec::new(),
        }
    }

    /// `true` if no HTTP response was received.
    pub fn is_transport_failure(&self) -> bool {
        self.response.is_none()
    }

    /// The status code, if any response was received.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    /// The best match, if any.
    pub fn first(&self) -> Option<&Placemark> {
        self.placemarks.first()
    }
}

/// Status information for a geocoding request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseInfo {
    /// Provider-specific status code (see `GoogleStatus` / `YahooStatus`).
    pub status: u16,
    /// Request type reported by the provider (e.g. "geocode").
    pub request: String,
}

/// Provider-specific precision indicator.
///
/// Google reports an integer accuracy level, Yahoo a named precision such as
/// `"address"` or `"zip"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Accuracy {
    /// Numeric accuracy level (Google).
    Level(i32),
    /// Named precision (Yahoo).
    Precision(String),
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accuracy::Level(level) => write!(f, "{}", level),
            Accuracy::Precision(precision) => f.write_str(precision),
        }
    }
}

/// One geocoded candidate location.
///
/// Optional fields are `None` when the upstream reply did not supply a value
/// for this result, never an empty string standing in for "not provided".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placemark {
    pub accuracy: Accuracy,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_administrative_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thoroughfare: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Placemark {
    /// Haversine distance to another placemark on a sphere of `radius`.
    pub fn distance_to(&self, other: &Placemark, radius: f64) -> f64 {
        distance::haversine(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
            radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::EARTH_RADIUS_MILES;

    fn placemark(lat: f64, lon: f64) -> Placemark {
        Placemark {
            accuracy: Accuracy::Level(8),
            country: "US".to_string(),
            administrative_area: Some("DC".to_string()),
            sub_administrative_area: None,
            locality: None,
            thoroughfare: None,
            postal_code: None,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_empty_result_serializes_to_empty_object() {
        let json = serde_json::to_string(&GeocodeResult::empty()).unwrap();
        assert_eq!(json, "{}");
        assert!(GeocodeResult::empty().is_transport_failure());
    }

    #[test]
    fn test_response_only_result() {
        let result = GeocodeResult::with_response(404, "geo");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["response"]["status"], 404);
        assert_eq!(json["response"]["request"], "geo");
        assert!(json.get("placemarks").is_none());
        assert_eq!(result.status(), Some(404));
        assert!(!result.is_transport_failure());
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let json = serde_json::to_value(placemark(38.898, -77.037)).unwrap();
        assert_eq!(json["accuracy"], 8);
        assert_eq!(json["administrative_area"], "DC");
        assert!(json.get("sub_administrative_area").is_none());
        assert!(json.get("postal_code").is_none());
    }

    #[test]
    fn test_accuracy_serialization() {
        let json = serde_json::to_value(Accuracy::Precision("zip".to_string())).unwrap();
        assert_eq!(json, "zip");
        assert_eq!(Accuracy::Level(6).to_string(), "6");
    }

    #[test]
    fn test_placemark_distance_to() {
        let white_house = placemark(38.898, -77.037);
        let big_ben = placemark(51.5007, -0.1246);
        let d = white_house.distance_to(&big_ben, EARTH_RADIUS_MILES);
        assert!((d - 3659.0).abs() < 5.0);
        assert_eq!(white_house.distance_to(&white_house, EARTH_RADIUS_MILES), 0.0);
    }
}
