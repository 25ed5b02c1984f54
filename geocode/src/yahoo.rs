//! Yahoo Maps geocoding (MapsService V1).
//!
//! # Response Format
//!
//! ```text
//! <ResultSet xmlns="urn:yahoo:maps">
//!   <Result precision="address">
//!     <Latitude>37.416397</Latitude><Longitude>-122.025055</Longitude>
//!     <Address>701 First Ave</Address><City>Sunnyvale</City><State>CA</State>
//!     <Zip>94089-1019</Zip><Country>US</Country>
//!   </Result>
//! </ResultSet>
//! ```
//!
//! As with Google, the address components are paired with results by their
//! position in document-wide lists. Yahoo has no county level, so
//! `sub_administrative_area` is always `None`. Components that are present
//! but empty (`<Address></Address>` for a city-level match) are absent.

use std::sync::Arc;

use crate::error::Result;
use crate::fetch::Fetch;
use crate::model::{Accuracy, GeocodeResult, Placemark};
use crate::provider::{
    aligned, collect_placemarks, encode_query, execute_request, parse_required,
    GeocodeProvider, ProviderSettings, Service,
};
use crate::xml::Element;

/// Default Yahoo geocoding endpoint.
pub const YAHOO_ENDPOINT: &str = "http://api.local.yahoo.com/MapsService/V1/geocode";

const MAPS_NS: &str = "urn:yahoo:maps";

const REQUEST: &str = "geocode";

/// Status codes reported by the Yahoo geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum YahooStatus {
    Success = 200,
    /// The parameters did not match what the service expects.
    BadRequest = 400,
    /// No permission for the resource, or over the rate limit. The service
    /// does not say which.
    Forbidden = 403,
    NotFound = 404,
    /// An internal problem prevented the service from answering.
    ServerError = 503,
}

impl YahooStatus {
    /// Reported for a bad application id.
    pub const BAD_KEY: YahooStatus = YahooStatus::Forbidden;

    /// Reported when the rate limit is exceeded.
    pub const TOO_MANY_QUERIES: YahooStatus = YahooStatus::Forbidden;

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            200 => YahooStatus::Success,
            400 => YahooStatus::BadRequest,
            403 => YahooStatus::Forbidden,
            404 => YahooStatus::NotFound,
            503 => YahooStatus::ServerError,
            _ => return None,
        })
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn description(self) -> &'static str {
        match self {
            YahooStatus::Success => "success",
            YahooStatus::BadRequest => "bad request",
            YahooStatus::Forbidden => "forbidden (bad key or too many queries)",
            YahooStatus::NotFound => "not found",
            YahooStatus::ServerError => "service unavailable",
        }
    }
}

/// Geocoder for the Yahoo Maps web service.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    settings: ProviderSettings,
    endpoint: String,
}

impl YahooProvider {
    /// Create a provider using the default HTTP transport.
    ///
    /// `app_id` is the Yahoo application id.
    pub fn new(app_id: impl Into<String>) -> Result<Self> {
        Ok(Self::from_settings(ProviderSettings::new(app_id)?))
    }

    pub fn from_settings(settings: ProviderSettings) -> Self {
        Self {
            settings,
            endpoint: YAHOO_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.settings.set_fetcher(fetcher);
        self
    }

    pub fn with_earth_radius(mut self, radius: f64) -> Result<Self> {
        self.settings.set_earth_radius(radius)?;
        Ok(self)
    }
}

impl GeocodeProvider for YahooProvider {
    fn service(&self) -> Service {
        Service::Yahoo
    }

    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut ProviderSettings {
        &mut self.settings
    }

    fn request_url(&self, address: &str) -> String {
        format!(
            "{}?location={}&appid={}",
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

/// Fill `result` with the placemarks of a successful Yahoo reply.
pub(crate) fn parse_response(body: &str, result: &mut GeocodeResult) -> Result<()> {
    let root = Element::parse(body)?;

    let results = root.descendants(MAPS_NS, "Result");
    let countries = root.texts(MAPS_NS, "Country");
    let states = root.texts(MAPS_NS, "State");
    let cities = root.texts(MAPS_NS, "City");
    let addresses = root.texts(MAPS_NS, "Address");
    let zips = root.texts(MAPS_NS, "Zip");
    let latitudes = root.texts(MAPS_NS, "Latitude");
    let longitudes = root.texts(MAPS_NS, "Longitude");

    result.placemarks = collect_placemarks(results.len(), |i| {
        let precision = results[i].attribute("precision").unwrap_or_default();

        Ok(Placemark {
            accuracy: Accuracy::Precision(precision.to_string()),
            country: parse_required(countries.get(i).copied(), i, "country")?,
            administrative_area: aligned(&states, i),
            sub_administrative_area: None,
            locality: aligned(&cities, i),
            thoroughfare: aligned(&addresses, i),
            postal_code: aligned(&zips, i).and_then(strip_zip_extension),
            latitude: parse_required(latitudes.get(i).copied(), i, "latitude")?,
            longitude: parse_required(longitudes.get(i).copied(), i, "longitude")?,
        })
    });

    Ok(())
}

/// "94043-1351" -> "94043". Nothing is left of "-1351".
fn strip_zip_extension(zip: String) -> Option<String> {
    let base = match zip.split_once('-') {
        Some((base, _)) => base.to_string(),
        None => zip,
    };
    (!base.is_empty()).then_some(base)
}
