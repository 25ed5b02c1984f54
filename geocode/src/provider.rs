//! The provider contract shared by every geocoding web service.
//!
//! A provider turns a free-text address into a [`GeocodeResult`]:
//!
//! 1. build the service-specific request URL,
//! 2. fetch it through a [`Fetch`] implementation,
//! 3. parse the service's XML into the common result shape.
//!
//! Steps 2 and the status bookkeeping around them are identical for every
//! service and live in [`execute_request`]; each provider supplies the URL and
//! the parser.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::distance::{self, EARTH_RADIUS_MILES};
use crate::error::{GeocodeError, Result};
use crate::fetch::{Fetch, HttpFetcher};
use crate::model::{GeocodeResult, Placemark};

/// HTTP status every supported service uses for success.
pub(crate) const HTTP_OK: u16 = 200;

/// The geocoding web services this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Google,
    Yahoo,
}

impl FromStr for Service {
    type Err = GeocodeError;

    /// Service names are matched case-insensitively ("google", "Google", ...).
    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" => Ok(Service::Google),
            "yahoo" => Ok(Service::Yahoo),
            _ => Err(GeocodeError::UnknownService {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Google => f.write_str("Google"),
            Service::Yahoo => f.write_str("Yahoo"),
        }
    }
}

/// Configuration every provider holds: API key, earth radius and transport.
///
/// The setters take `&mut self` and do no synchronization of their own. Call
/// them while setting a provider up, not while other threads are running
/// requests through it.
#[derive(Clone)]
pub struct ProviderSettings {
    api_key: String,
    earth_radius: f64,
    fetcher: Arc<dyn Fetch>,
}

impl ProviderSettings {
    /// Settings with the default HTTP transport and an earth radius in miles.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingApiKey`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_fetcher(api_key, Arc::new(HttpFetcher::new()?))
    }

    /// Settings using the given transport.
    pub fn with_fetcher(api_key: impl Into<String>, fetcher: Arc<dyn Fetch>) -> Result<Self> {
        Ok(Self {
            api_key: validate_api_key(api_key.into())?,
            earth_radius: EARTH_RADIUS_MILES,
            fetcher,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sphere radius used by the distance methods, in the caller's unit.
    pub fn earth_radius(&self) -> f64 {
        self.earth_radius
    }

    pub fn fetcher(&self) -> &dyn Fetch {
        self.fetcher.as_ref()
    }

    /// Replace the API key.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingApiKey`] if `api_key` is empty; the
    /// previous key is kept.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<&mut Self> {
        self.api_key = validate_api_key(api_key.into())?;
        Ok(self)
    }

    /// Replace the earth radius, e.g. with [`distance::EARTH_RADIUS_KM`] to
    /// get distances in kilometers.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidRadius`] unless `radius` is finite and
    /// positive.
    pub fn set_earth_radius(&mut self, radius: f64) -> Result<&mut Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeocodeError::InvalidRadius { radius });
        }
        self.earth_radius = radius;
        Ok(self)
    }

    pub fn set_fetcher(&mut self, fetcher: Arc<dyn Fetch>) -> &mut Self {
        self.fetcher = fetcher;
        self
    }

    /// Copy of `url` with the API key masked, for logging.
    pub(crate) fn redact(&self, url: &str) -> String {
        url.replace(self.api_key.as_str(), "***")
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"***")
            .field("earth_radius", &self.earth_radius)
            .finish_non_exhaustive()
    }
}

fn validate_api_key(api_key: String) -> Result<String> {
    if api_key.trim().is_empty() {
        Err(GeocodeError::MissingApiKey)
    } else {
        Ok(api_key)
    }
}

/// A geocoding web service.
///
/// Implementations are [`Send`] + [`Sync`]: once configured, one provider can
/// serve `execute` calls from many threads at a time.
///
/// # Example
///
/// ```ignore
/// use geocode::{GeocodeProvider, GoogleProvider};
///
/// let mut google = GoogleProvider::new("my-api-key")?;
/// google.set_earth_radius(geocode::distance::EARTH_RADIUS_KM)?;
///
/// let result = google.execute("1600 Amphitheatre Parkway, Mountain View, CA")?;
/// match result.response {
///     None => println!("server not reachable"),
///     Some(ref response) if result.placemarks.is_empty() => {
///         println!("no match, status {}", response.status)
///     }
///     Some(_) => {
///         let best = &result.placemarks[0];
///         println!("{}, {}", best.latitude, best.longitude);
///     }
/// }
/// ```
pub trait GeocodeProvider: Send + Sync {
    /// Which web service this provider talks to.
    fn service(&self) -> Service;

    fn settings(&self) -> &ProviderSettings;

    fn settings_mut(&mut self) -> &mut ProviderSettings;

    /// The request URL for `address`. Only the address is URL-encoded.
    fn request_url(&self, address: &str) -> String;

    /// Geocode `address`.
    ///
    /// - Server unreachable: an empty result (no `response`, no placemarks).
    /// - Any HTTP reply: `response` is set; placemarks are filled only when
    ///   the service reported success.
    ///
    /// # Errors
    ///
    /// Returns an error only when a successful reply is not usable XML.
    fn execute(&self, address: &str) -> Result<GeocodeResult>;

    fn api_key(&self) -> &str {
        self.settings().api_key()
    }

    fn earth_radius(&self) -> f64 {
        self.settings().earth_radius()
    }

    /// Fluent form of [`ProviderSettings::set_api_key`].
    fn set_api_key(&mut self, api_key: &str) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.settings_mut().set_api_key(api_key)?;
        Ok(self)
    }

    /// Fluent form of [`ProviderSettings::set_earth_radius`].
    fn set_earth_radius(&mut self, radius: f64) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.settings_mut().set_earth_radius(radius)?;
        Ok(self)
    }

    /// Haversine distance between two coordinates, in the unit of
    /// [`earth_radius`](Self::earth_radius).
    fn haversine_distance(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        distance::haversine(lat1, lon1, lat2, lon2, self.earth_radius())
    }

    /// Spherical-law-of-cosines distance between two coordinates.
    fn spherical_law_of_cosines_distance(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        distance::spherical_law_of_cosines(lat1, lon1, lat2, lon2, self.earth_radius())
    }

    /// Distance between two coordinates; uses the haversine formula.
    fn distance_between(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        self.haversine_distance(lat1, lon1, lat2, lon2)
    }
}

/// Boxed providers, as built by [`ProviderFactory::factory`], are providers
/// too, so the fluent setters work on them.
///
/// [`ProviderFactory::factory`]: crate::ProviderFactory::factory
impl<P: GeocodeProvider + ?Sized> GeocodeProvider for Box<P> {
    fn service(&self) -> Service {
        (**self).service()
    }

    fn settings(&self) -> &ProviderSettings {
        (**self).settings()
    }

    fn settings_mut(&mut self) -> &mut ProviderSettings {
        (**self).settings_mut()
    }

    fn request_url(&self, address: &str) -> String {
        (**self).request_url(address)
    }

    fn execute(&self, address: &str) -> Result<GeocodeResult> {
        (**self).execute(address)
    }
}

/// Fetch `url` and run `parse` on the body of a successful reply.
///
/// `request` is the request type recorded when the body does not override
/// it. `parse` receives the body and a result whose `response` already holds
/// the HTTP status.
pub(crate) fn execute_request<F>(
    settings: &ProviderSettings,
    url: &str,
    request: &str,
    parse: F,
) -> Result<GeocodeResult>
where
    F: FnOnce(&str, &mut GeocodeResult) -> Result<()>,
{
    tracing::debug!(url = %settings.redact(url), "Geocode request");

    let raw = match settings.fetcher().fetch(url) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %settings.redact(&e.to_string()), "Geocode server not reachable");
            return Ok(GeocodeResult::empty());
        }
    };

    tracing::debug!(status = raw.status, bytes = raw.body.len(), "Geocode response");

    let mut result = GeocodeResult::with_response(raw.status, request);
    if raw.status == HTTP_OK {
        parse(&raw.body, &mut result)?;
    }

    Ok(result)
}

/// Build one placemark per upstream result, dropping the ones that fail.
///
/// `build` receives the upstream index so index-aligned lookups stay correct
/// after a placemark has been dropped.
pub(crate) fn collect_placemarks<F>(count: usize, mut build: F) -> Vec<Placemark>
where
    F: FnMut(usize) -> Result<Placemark>,
{
    (0..count)
        .filter_map(|index| match build(index) {
            Ok(placemark) => Some(placemark),
            Err(e) => {
                tracing::warn!(index, error = %e, "Dropping malformed placemark");
                None
            }
        })
        .collect()
}

/// The value at `index` of an index-aligned sequence. Missing and empty
/// values are both absent.
pub(crate) fn aligned(values: &[&str], index: usize) -> Option<String> {
    values
        .get(index)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Parse a required field of placemark `index`. Blank counts as missing.
pub(crate) fn parse_required<T: FromStr>(value: Option<&str>, index: usize, field: &str) -> Result<T> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| GeocodeError::MalformedPlacemark {
        index,
        reason: format!("missing {}", field),
    })?;

    value
        .trim()
        .parse()
        .map_err(|_| GeocodeError::MalformedPlacemark {
            index,
            reason: format!("invalid {}: {:?}", field, value),
        })
}

/// Encode `address` for use as a query parameter value.
pub(crate) fn encode_query(address: &str) -> String {
    url::form_urlencoded::byte_serialize(address.as_bytes()).collect()
}
