//! Error types for the geocode library.

use thiserror::Error;

/// Errors that can occur while configuring a provider or parsing its replies.
///
/// Transport failures are only ever seen by code that talks to a
/// [`Fetch`](crate::fetch::Fetch) directly: [`GeocodeProvider::execute`]
/// turns them into an empty [`GeocodeResult`](crate::GeocodeResult).
///
/// [`GeocodeProvider::execute`]: crate::GeocodeProvider::execute
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// A provider was constructed or re-keyed without an API key.
    #[error("Missing API key: a non-empty key is required to build a provider")]
    MissingApiKey,

    /// The configured service name does not match any provider.
    #[error("Unknown geocoding service: {name} (expected Google or Yahoo)")]
    UnknownService { name: String },

    /// The requested configuration group does not exist.
    #[error("Unknown configuration group: {name}")]
    UnknownConfigGroup { name: String },

    /// The configuration source could not be understood.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// The earth radius must be a positive, finite number.
    #[error("Invalid earth radius: {radius}")]
    InvalidRadius { radius: f64 },

    /// IO error when reading configuration files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The server could not be reached or the body could not be read.
    #[error("Transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The response body was not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The response body parsed, but is not a usable document.
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// A single placemark lacked a field it cannot exist without.
    #[error("Malformed placemark #{index}: {reason}")]
    MalformedPlacemark { index: usize, reason: String },
}

impl From<quick_xml::events::attributes::AttrError> for GeocodeError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        GeocodeError::Xml(err.into())
    }
}

impl From<toml::de::Error> for GeocodeError {
    fn from(err: toml::de::Error) -> Self {
        GeocodeError::Config {
            reason: err.to_string(),
        }
    }
}

/// Result type alias using [`GeocodeError`].
pub type Result<T> = std::result::Result<T, GeocodeError>;
