//! # geocode - Address Geocoding over Web Services
//!
//! Turns free-text addresses into coordinates and address components by
//! calling a geocoding web service, and computes great-circle distances
//! between the results.
//!
//! ## Features
//!
//! - **Pluggable services**: Google and Yahoo behind one [`GeocodeProvider`] trait
//! - **Uniform results**: every service yields the same [`GeocodeResult`] shape
//! - **Named configuration**: pick a service and key by group name
//! - **Distances**: haversine and spherical law of cosines, in any unit
//!
//! ## Quick Start
//!
//! ```ignore
//! use geocode::{GeocodeProvider, GoogleProvider};
//!
//! let google = GoogleProvider::new("my-api-key")?;
//! let result = google.execute("1600 Amphitheatre Parkway, Mountain View, CA")?;
//!
//! if let Some(best) = result.first() {
//!     println!("{}, {} ({})", best.latitude, best.longitude, best.country);
//! }
//! ```
//!
//! ## Reading a Result
//!
//! | Outcome | `response` | `placemarks` |
//! |---------|------------|--------------|
//! | Server unreachable | `None` | empty |
//! | Service reported an error | `Some(status)` | empty |
//! | Success | `Some(status)` | one per match, best first |
//!
//! ## Configuration
//!
//! Providers can also be built by group name through a [`ProviderFactory`],
//! or through the process-wide [`instance`] and [`factory`] functions, which
//! read their configuration from the environment (see [`config`]).

pub mod config;
pub mod distance;
pub mod error;
pub mod factory;
pub mod fetch;
pub mod google;
pub mod model;
pub mod provider;
pub mod yahoo;

mod xml;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use config::{GeocodeConfig, ProviderConfig, DEFAULT_GROUP};
pub use error::{GeocodeError, Result};
pub use factory::{factory, instance, ProviderFactory};
pub use fetch::{Fetch, HttpFetcher, RawResponse};
pub use google::{GoogleProvider, GoogleStatus};
pub use model::{Accuracy, GeocodeResult, Placemark, ResponseInfo};
pub use provider::{GeocodeProvider, ProviderSettings, Service};
pub use yahoo::{YahooProvider, YahooStatus};
