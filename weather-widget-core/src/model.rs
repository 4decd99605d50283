use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown units '{0}'. Supported units: metric, imperial.")]
pub struct UnknownUnits(pub String);

impl FromStr for Units {
    type Err = UnknownUnits;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" | "c" => Ok(Units::Metric),
            "imperial" | "f" => Ok(Units::Imperial),
            _ => Err(UnknownUnits(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates(Coordinates),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub location: Location,
    pub units: Units,
}

impl WeatherQuery {
    pub fn city(city: impl Into<String>, units: Units) -> Self {
        Self {
            location: Location::City(city.into()),
            units,
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64, units: Units) -> Self {
        Self {
            location: Location::Coordinates(Coordinates {
                latitude,
                longitude,
            }),
            units,
        }
    }

    /// Location part of the upstream query string, in request order.
    pub fn location_params(&self) -> Vec<(&'static str, String)> {
        match &self.location {
            Location::City(city) => vec![("q", city.clone())],
            Location::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        }
    }
}

/// Current conditions in display-ready form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    pub location: String,
    pub temperature: i64,
    pub condition: String,
    pub description: String,
    pub humidity: u32,
    pub wind_speed: i64,
    pub icon: String,
    pub feels_like: i64,
    pub pressure: u32,
    pub visibility: u32,
    pub sunrise: i64,
    pub sunset: i64,
    pub units: Units,
}

/// One calendar day summarised from 3-hour forecast samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_max: i64,
    pub temp_min: i64,
    pub condition: String,
    pub icon: String,
    pub humidity: u32,
}
