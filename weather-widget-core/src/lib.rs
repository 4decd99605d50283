//! Core library for the weather widget.
//!
//! This crate defines:
//! - Upstream request URLs, with optional proxy / CORS relay rewriting
//! - Transformation of OpenWeatherMap payloads into display-ready readings
//! - Condition classification into emoji or image icons
//! - A single error taxonomy for HTTP and geolocation failures
//!
//! It is used by `weather-widget-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod icon;
pub mod model;
pub mod request;
pub mod transform;

pub use client::WeatherClient;
pub use config::WeatherConfig;
pub use error::{GeolocationCause, TransportFailure, WeatherError};
pub use geolocation::{FixedLocator, Geolocator, IpLocator};
pub use icon::{Condition, IconPreference};
pub use model::{Coordinates, DailyForecast, Location, UnknownUnits, Units, WeatherQuery, WeatherReading};
