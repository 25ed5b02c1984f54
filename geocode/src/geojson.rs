//! GeoJSON export of geocoding results.
//!
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use geocode::geojson::to_feature_collection;
//!
//! let result = provider.execute("Big Ben, London")?;
//! let collection = to_feature_collection(&result);
//! println!("{}", collection);
//! // {"type":"FeatureCollection","features":[{"type":"Feature","geometry":
//! //   {"type":"Point","coordinates":[-0.1246,51.5007]},"properties":{...}}]}
//! ```

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoJsonValue};

use crate::model::{Accuracy, GeocodeResult, Placemark};

/// Convert every placemark of `result` into a Point feature.
///
/// Coordinates are written in GeoJSON order, `[longitude, latitude]`. A result
/// without placemarks becomes an empty collection.
pub fn to_feature_collection(result: &GeocodeResult) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: result.placemarks.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

/// Convert one placemark into a Point feature carrying its address
/// components as properties.
pub fn to_feature(placemark: &Placemark) -> Feature {
    let geometry = Geometry::new(GeoJsonValue::Point(vec![
        placemark.longitude,
        placemark.latitude,
    ]));

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties(placemark)),
        foreign_members: None,
    }
}

fn properties(placemark: &Placemark) -> JsonObject {
    let mut props = JsonObject::new();

    let accuracy = match &placemark.accuracy {
        Accuracy::Level(level) => JsonValue::from(*level),
        Accuracy::Precision(precision) => JsonValue::from(precision.as_str()),
    };
    props.insert("accuracy".to_string(), accuracy);
    props.insert("country".to_string(), JsonValue::from(placemark.country.as_str()));

    let optional = [
        ("administrative_area", &placemark.administrative_area),
        ("sub_administrative_area", &placemark.sub_administrative_area),
        ("locality", &placemark.locality),
        ("thoroughfare", &placemark.thoroughfare),
        ("postal_code", &placemark.postal_code),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            props.insert(key.to_string(), JsonValue::from(value.as_str()));
        }
    }

    props
}
