//! Google Maps geocoding over the KML/xAL XML interface.
//!
//! # Response Format
//!
//! ```text
//! <kml xmlns="http://earth.google.com/kml/2.0">
//!   <Response>
//!     <Status><code>200</code><request>geocode</request></Status>
//!     <Placemark id="p1">
//!       <AddressDetails Accuracy="8" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
//!         <Country><CountryNameCode>US</CountryNameCode> ... </Country>
//!       </AddressDetails>
//!       <Point><coordinates>-122.08,37.42,0</coordinates></Point>
//!     </Placemark>
//!   </Response>
//! </kml>
//! ```
//!
//! Address components are read as flat, document-wide lists (every
//! `CountryNameCode`, every `LocalityName`, ...) and matched to placemarks by
//! position: the i-th placemark gets the i-th element of each list. When the
//! service leaves a component out for an early result, later results shift.
//! That is how the service pairs them, so it is reproduced as-is.

use std::sync::Arc;

use crate::error::Result;
use crate::fetch::Fetch;
use crate::model::{Accuracy, GeocodeResult, Placemark};
use crate::provider::{
    aligned, collect_placemarks, encode_query, execute_request, parse_required, GeocodeProvider,
    ProviderSettings, Service,
};
use crate::xml::Element;

/// Default Google geocoding endpoint.
pub const GOOGLE_ENDPOINT: &str = "http://maps.google.com/maps/geo";

const KML_NS: &str = "http://earth.google.com/kml/2.0";
const XAL_NS: &str = "urn:oasis:names:tc:ciq:xsdschema:xAL:2.0";

/// Request type recorded when the reply does not name one.
const REQUEST: &str = "geo";

/// Status codes reported by the Google geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum GoogleStatus {
    /// The address was parsed and its geocode returned.
    Success = 200,
    /// The request could not be parsed.
    BadRequest = 400,
    /// HTTP 404.
    NotFound = 404,
    /// The request failed for an unknown reason.
    ServerError = 500,
    /// The `q` parameter was missing or empty.
    MissingQuery = 601,
    /// No location matches the address.
    UnknownAddress = 602,
    /// The geocode cannot be returned for legal or contractual reasons.
    UnavailableAddress = 603,
    /// No route could be computed between the given points.
    UnknownDirections = 604,
    /// The key is invalid or does not match the requesting domain.
    BadKey = 610,
    /// The key exceeded its 24 hour request quota.
    TooManyQueries = 620,
}

impl GoogleStatus {
    /// Synonym for [`GoogleStatus::MissingQuery`].
    pub const MISSING_ADDRESS: GoogleStatus = GoogleStatus::MissingQuery;

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            200 => GoogleStatus::Success,
            400 => GoogleStatus::BadRequest,
            404 => GoogleStatus::NotFound,
            500 => GoogleStatus::ServerError,
            601 => GoogleStatus::MissingQuery,
            602 => GoogleStatus::UnknownAddress,
            603 => GoogleStatus::UnavailableAddress,
            604 => GoogleStatus::UnknownDirections,
            610 => GoogleStatus::BadKey,
            620 => GoogleStatus::TooManyQueries,
            _ => return None,
        })
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn description(self) -> &'static str {
        match self {
            GoogleStatus::Success => "success",
            GoogleStatus::BadRequest => "bad request",
            GoogleStatus::NotFound => "not found",
            GoogleStatus::ServerError => "server error",
            GoogleStatus::MissingQuery => "missing query or address",
            GoogleStatus::UnknownAddress => "unknown address",
            GoogleStatus::UnavailableAddress => "address unavailable",
            GoogleStatus::UnknownDirections => "unknown route",
            GoogleStatus::BadKey => "bad API key",
            GoogleStatus::TooManyQueries => "too many queries",
        }
    }
}

/// Geocoder for the Google Maps XML API.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    settings: ProviderSettings,
    endpoint: String,
}

impl GoogleProvider {
    /// Create a provider using the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingApiKey`](crate::GeocodeError::MissingApiKey)
    /// if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::from_settings(ProviderSettings::new(api_key)?))
    }

    pub fn from_settings(settings: ProviderSettings) -> Self {
        Self {
            settings,
            endpoint: GOOGLE_ENDPOINT.to_string(),
        }
    }

    /// Send requests to `endpoint` instead of [`GOOGLE_ENDPOINT`].
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.settings.set_fetcher(fetcher);
        self
    }

    /// Copy of this provider with a different earth radius.
    pub fn with_earth_radius(mut self, radius: f64) -> Result<Self> {
        self.settings.set_earth_radius(radius)?;
        Ok(self)
    }
}

impl GeocodeProvider for GoogleProvider {
    fn service(&self) -> Service {
        Service::Google
    }

    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ProviderSettings {
        &mut self.settings
    }

    fn request_url(&self, address: &str) -> String {
        format!(
            "{}?q={}&output=xml&oe=UTF-8&key={}",
            self.endpoint,
            encode_query(address),
            self.settings.api_key()
        )
    }

    fn execute(&self, address: &str) -> Result<GeocodeResult> {
        let url = self.request_url(address);
        execute_request(&self.settings, &url, REQUEST, parse_response)
    }
}

/// Fill `result` from a Google reply body.
///
/// The status inside the document replaces the HTTP status: Google answers
/// HTTP 200 even for "unknown address" and reports the real outcome here.
pub(crate) fn parse_response(body: &str, result: &mut GeocodeResult) -> Result<()> {
    let root = Element::parse(body)?;

    let status = root.child("Response").and_then(|r| r.child("Status"));
    if let (Some(status), Some(response)) = (status, result.response.as_mut()) {
        if let Some(code) = status.child("code").and_then(|c| c.text.trim().parse().ok()) {
            response.status = code;
        }
        if let Some(request) = status.child("request") {
            response.request = request.text.clone();
        }
    }

    if result.status() != Some(GoogleStatus::Success.code()) {
        return Ok(());
    }

    let placemarks = root.descendants(KML_NS, "Placemark");
    let countries = root.texts(XAL_NS, "CountryNameCode");
    let admin_areas = root.texts(XAL_NS, "AdministrativeAreaName");
    let sub_admin_areas = root.texts(XAL_NS, "SubAdministrativeAreaName");
    let localities = root.texts(XAL_NS, "LocalityName");
    let thoroughfares = root.texts(XAL_NS, "ThoroughfareName");
    let postal_codes = root.texts(XAL_NS, "PostalCodeNumber");

    result.placemarks = collect_placemarks(placemarks.len(), |i| {
        let placemark = placemarks[i];

        // "longitude,latitude[,altitude]"
        let coordinates = placemark
            .child("Point")
            .and_then(|p| p.child("coordinates"))
            .map(|c| c.text.as_str());
        let mut parts = coordinates.unwrap_or_default().split(',');
        let longitude = parse_required(parts.next().filter(|s| !s.is_empty()), i, "longitude")?;
        let latitude = parse_required(parts.next(), i, "latitude")?;

        // Accuracy 0 is Google's "unknown" level.
        let accuracy = placemark
            .child("AddressDetails")
            .and_then(|d| d.attribute("Accuracy"))
            .and_then(|a| a.trim().parse().ok())
            .unwrap_or(0);

        let country = parse_required::<String>(countries.get(i).copied(), i, "country")?;

        Ok(Placemark {
            accuracy: Accuracy::Level(accuracy),
            country,
            administrative_area: aligned(&admin_areas, i),
            sub_administrative_area: aligned(&sub_admin_areas, i),
            locality: aligned(&localities, i),
            thoroughfare: aligned(&thoroughfares, i),
            postal_code: aligned(&postal_codes, i),
            latitude,
            longitude,
        })
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeocodeError;
    use crate::fetch::RawResponse;
    use std::sync::Mutex;

    const TWO_PLACEMARKS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <name>Main St</name>
  <Status><code>200</code><request>geocode</request></Status>
  <Placemark id="p1">
    <address>1 Main St, Springfield, IL 62701, USA</address>
    <AddressDetails Accuracy="8" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
      <Country><CountryNameCode>US</CountryNameCode>
        <AdministrativeArea><AdministrativeAreaName>IL</AdministrativeAreaName>
          <SubAdministrativeArea><SubAdministrativeAreaName>Sangamon</SubAdministrativeAreaName>
            <Locality><LocalityName>Springfield</LocalityName>
              <Thoroughfare><ThoroughfareName>1 Main St</ThoroughfareName></Thoroughfare>
              <PostalCode><PostalCodeNumber>62701</PostalCodeNumber></PostalCode>
            </Locality>
          </SubAdministrativeArea>
        </AdministrativeArea>
      </Country>
    </AddressDetails>
    <Point><coordinates>-89.650148,39.801055,0</coordinates></Point>
  </Placemark>
  <Placemark id="p2">
    <address>Main St, USA</address>
    <AddressDetails Accuracy="6" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
      <Country><CountryNameCode>US</CountryNameCode>
        <Thoroughfare><ThoroughfareName>Main St</ThoroughfareName></Thoroughfare>
      </Country>
    </AddressDetails>
    <Point><coordinates>-98.5795,39.8283,0</coordinates></Point>
  </Placemark>
</Response></kml>"#;

    struct Recording {
        response: RawResponse,
        urls: Mutex<Vec<String>>,
    }

    impl Fetch for Recording {
        fn fetch(&self, url: &str) -> Result<RawResponse> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.response.clone())
        }
    }

    fn provider(status: u16, body: &str) -> (GoogleProvider, Arc<Recording>) {
        let fetcher = Arc::new(Recording {
            response: RawResponse::new(status, body),
            urls: Mutex::new(Vec::new()),
        });
        let settings = ProviderSettings::with_fetcher("KEY123", fetcher.clone()).unwrap();
        (GoogleProvider::from_settings(settings), fetcher)
    }

    #[test]
    fn test_request_url() {
        let (google, _) = provider(200, "");
        assert_eq!(
            google.request_url("1 Main St, Springfield"),
            "http://maps.google.com/maps/geo?q=1+Main+St%2C+Springfield&output=xml&oe=UTF-8&key=KEY123"
        );

        let google = google.with_endpoint("http://localhost:8080/geo");
        assert!(google
            .request_url("x")
            .starts_with("http://localhost:8080/geo?q=x&"));
    }

    #[test]
    fn test_execute_fetches_request_url() {
        let (google, fetcher) = provider(200, TWO_PLACEMARKS);
        google.execute("Main St").unwrap();
        assert_eq!(
            fetcher.urls.lock().unwrap().as_slice(),
            [google.request_url("Main St")]
        );
    }

    #[test]
    fn test_parse_two_placemarks_index_aligned() {
        let (google, _) = provider(200, TWO_PLACEMARKS);
        let result = google.execute("Main St").unwrap();

        let response = result.response.as_ref().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.request, "geocode");
        assert_eq!(result.placemarks.len(), 2);

        let first = &result.placemarks[0];
        assert_eq!(first.accuracy, Accuracy::Level(8));
        assert_eq!(first.country, "US");
        assert_eq!(first.administrative_area.as_deref(), Some("IL"));
        assert_eq!(first.sub_administrative_area.as_deref(), Some("Sangamon"));
        assert_eq!(first.locality.as_deref(), Some("Springfield"));
        assert_eq!(first.thoroughfare.as_deref(), Some("1 Main St"));
        assert_eq!(first.postal_code.as_deref(), Some("62701"));
        assert_eq!(first.latitude, 39.801055);
        assert_eq!(first.longitude, -89.650148);

        // Only one AdministrativeAreaName in the document: it belongs to #0.
        let second = &result.placemarks[1];
        assert_eq!(second.accuracy, Accuracy::Level(6));
        assert_eq!(second.administrative_area, None);
        assert_eq!(second.sub_administrative_area, None);
        assert_eq!(second.locality, None);
        assert_eq!(second.postal_code, None);
        // Two ThoroughfareName elements, so #1 gets the second one.
        assert_eq!(second.thoroughfare.as_deref(), Some("Main St"));
        assert_eq!(second.latitude, 39.8283);
        assert_eq!(second.longitude, -98.5795);
    }

    #[test]
    fn test_index_alignment_is_positional_not_structural() {
        // The second placemark has a LocalityName but the first does not:
        // the lone LocalityName is paired with placemark #0.
        let body = r#"<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <Status><code>200</code><request>geocode</request></Status>
  <Placemark><AddressDetails Accuracy="1" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>FR</CountryNameCode></Country></AddressDetails>
    <Point><coordinates>2.35,48.85,0</coordinates></Point></Placemark>
  <Placemark><AddressDetails Accuracy="4" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>FR</CountryNameCode>
      <Locality><LocalityName>Lyon</LocalityName></Locality></Country></AddressDetails>
    <Point><coordinates>4.83,45.76,0</coordinates></Point></Placemark>
</Response></kml>"#;
        let (google, _) = provider(200, body);
        let result = google.execute("France").unwrap();
        assert_eq!(result.placemarks[0].locality.as_deref(), Some("Lyon"));
        assert_eq!(result.placemarks[1].locality, None);
    }

    #[test]
    fn test_document_status_overrides_http_status() {
        let body = r#"<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <name>nowhere</name>
  <Status><code>602</code><request>geocode</request></Status>
</Response></kml>"#;
        let (google, _) = provider(200, body);
        let result = google.execute("nowhere").unwrap();
        assert_eq!(result.status(), Some(602));
        assert_eq!(
            GoogleStatus::from_code(602),
            Some(GoogleStatus::UnknownAddress)
        );
        assert!(result.placemarks.is_empty());
    }

    #[test]
    fn test_http_error_has_status_and_no_placemarks() {
        let (google, _) = provider(500, "<html>oops</html>");
        let result = google.execute("x").unwrap();
        assert_eq!(result.status(), Some(500));
        assert_eq!(result.response.unwrap().request, "geo");
        assert!(result.placemarks.is_empty());
    }

    #[test]
    fn test_placemark_without_coordinates_is_dropped() {
        let body = r#"<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <Status><code>200</code><request>geocode</request></Status>
  <Placemark><AddressDetails Accuracy="1" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>DE</CountryNameCode>
      <AdministrativeArea><AdministrativeAreaName>Bayern</AdministrativeAreaName></AdministrativeArea>
    </Country></AddressDetails></Placemark>
  <Placemark><AddressDetails Accuracy="2" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>AT</CountryNameCode></Country></AddressDetails>
    <Point><coordinates>16.37,48.21,0</coordinates></Point></Placemark>
</Response></kml>"#;
        let (google, _) = provider(200, body);
        let result = google.execute("x").unwrap();

        assert_eq!(result.placemarks.len(), 1);
        let kept = &result.placemarks[0];
        // Still paired with upstream index 1.
        assert_eq!(kept.country, "AT");
        assert_eq!(kept.administrative_area, None);
        assert_eq!(kept.latitude, 48.21);
    }

    #[test]
    fn test_empty_components_are_absent() {
        let body = r#"<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <Status><code>200</code><request>geocode</request></Status>
  <Placemark><AddressDetails Accuracy="4" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>NL</CountryNameCode>
      <Locality><LocalityName></LocalityName><PostalCode><PostalCodeNumber/></PostalCode></Locality>
    </Country></AddressDetails>
    <Point><coordinates>4.89,52.37,0</coordinates></Point></Placemark>
  <Placemark><AddressDetails Accuracy="4" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>NL</CountryNameCode>
      <Locality><LocalityName>Utrecht</LocalityName></Locality>
    </Country></AddressDetails>
    <Point><coordinates>5.12,52.09,0</coordinates></Point></Placemark>
</Response></kml>"#;
        let (google, _) = provider(200, body);
        let result = google.execute("x").unwrap();
        assert_eq!(result.placemarks[0].locality, None);
        assert_eq!(result.placemarks[0].postal_code, None);
        // The empty element still occupies index 0.
        assert_eq!(result.placemarks[1].locality.as_deref(), Some("Utrecht"));
    }

    #[test]
    fn test_placemark_with_empty_country_is_dropped() {
        let body = r#"<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <Status><code>200</code><request>geocode</request></Status>
  <Placemark><AddressDetails Accuracy="1" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode> </CountryNameCode></Country></AddressDetails>
    <Point><coordinates>0.1,0.2,0</coordinates></Point></Placemark>
  <Placemark><AddressDetails Accuracy="1" xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>BE</CountryNameCode></Country></AddressDetails>
    <Point><coordinates>4.35,50.85,0</coordinates></Point></Placemark>
</Response></kml>"#;
        let (google, _) = provider(200, body);
        let result = google.execute("x").unwrap();
        assert_eq!(result.placemarks.len(), 1);
        assert_eq!(result.placemarks[0].country, "BE");
    }

    #[test]
    fn test_missing_accuracy_defaults_to_unknown_level() {
        let body = r#"<kml xmlns="http://earth.google.com/kml/2.0"><Response>
  <Status><code>200</code><request>geocode</request></Status>
  <Placemark><AddressDetails xmlns="urn:oasis:names:tc:ciq:xsdschema:xAL:2.0">
    <Country><CountryNameCode>JP</CountryNameCode></Country></AddressDetails>
    <Point><coordinates>138.7274,35.3606</coordinates></Point></Placemark>
</Response></kml>"#;
        let (google, _) = provider(200, body);
        let result = google.execute("Fuji").unwrap();
        assert_eq!(result.placemarks[0].accuracy, Accuracy::Level(0));
        assert_eq!(result.placemarks[0].latitude, 35.3606);
    }

    #[test]
    fn test_unparsable_body_is_an_error() {
        let (google, _) = provider(200, "<kml><Response>");
        assert!(google.execute("x").is_err());
    }

    #[test]
    fn test_construction_requires_key() {
        assert!(matches!(
            GoogleProvider::new(""),
            Err(GeocodeError::MissingApiKey)
        ));
    }

    #[test]
    fn test_fluent_setters() {
        let (mut google, _) = provider(200, "");
        google
            .set_api_key("NEWKEY")
            .unwrap()
            .set_earth_radius(crate::distance::EARTH_RADIUS_KM)
            .unwrap();
        assert_eq!(google.api_key(), "NEWKEY");
        assert!(google.request_url("x").ends_with("&key=NEWKEY"));

        // Antipodal points along the equator: half the circumference.
        let d = google.distance_between(0.0, 0.0, 0.0, 180.0);
        assert!((d - crate::distance::EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GoogleStatus::Success.code(), 200);
        assert_eq!(GoogleStatus::MISSING_ADDRESS.code(), 601);
        assert_eq!(GoogleStatus::TooManyQueries.code(), 620);
        assert_eq!(GoogleStatus::from_code(610), Some(GoogleStatus::BadKey));
        assert_eq!(GoogleStatus::from_code(999), None);
        assert_eq!(GoogleStatus::BadKey.description(), "bad API key");
    }
}
