use reqwest::Client;
use std::sync::Arc;

use crate::{
    config::WeatherConfig,
    error::{GeolocationCause, TransportFailure, WeatherError, normalize},
    geolocation::Geolocator,
    icon::IconPreference,
    model::{Coordinates, DailyForecast, Units, WeatherQuery, WeatherReading},
    request::build_url,
    transform::{parse_current, parse_forecast, transform_current, transform_forecast},
};

const CURRENT_ENDPOINT: &str = "/weather";
const FORECAST_ENDPOINT: &str = "/forecast";

/// Fetches OpenWeatherMap data and hands back display-ready values.
///
/// Every failure comes back as a [`WeatherError`]; nothing is retried here.
/// Re-invoking the same call is the retry.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    config: WeatherConfig,
    icons: IconPreference,
    http: Client,
    locator: Option<Arc<dyn Geolocator>>,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            config,
            icons: IconPreference::default(),
            http: Client::new(),
            locator: None,
        }
    }

    /// Use a preconfigured HTTP client, e.g. one with a request timeout.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_locator(mut self, locator: Arc<dyn Geolocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    pub fn icon_preference(&self) -> &IconPreference {
        &self.icons
    }

    pub fn set_icon_preference(&mut self, icons: IconPreference) {
        self.icons = icons;
    }

    pub async fn reading_by_city(
        &self,
        city: &str,
        units: Units,
    ) -> Result<WeatherReading, WeatherError> {
        self.reading(&WeatherQuery::city(city, units)).await
    }

    pub async fn reading_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        units: Units,
    ) -> Result<WeatherReading, WeatherError> {
        self.reading(&WeatherQuery::coordinates(latitude, longitude, units))
            .await
    }

    pub async fn reading(&self, query: &WeatherQuery) -> Result<WeatherReading, WeatherError> {
        let body = self.fetch(CURRENT_ENDPOINT, query).await?;
        let raw = parse_current(&body)?;
        let reading = transform_current(&raw, query.units, &self.icons)?;

        tracing::info!(
            location = %reading.location,
            temperature = reading.temperature,
            units = %query.units,
            "Current weather fetched"
        );
        Ok(reading)
    }

    pub async fn forecast(
        &self,
        city: &str,
        units: Units,
    ) -> Result<Vec<DailyForecast>, WeatherError> {
        let query = WeatherQuery::city(city, units);
        let body = self.fetch(FORECAST_ENDPOINT, &query).await?;
        let entries = parse_forecast(&body)?;
        let days = transform_forecast(&entries, &self.icons)?;

        tracing::info!(city = %city, days = days.len(), "Forecast fetched");
        Ok(days)
    }

    /// Ask the configured locator for the current position.
    pub async fn current_position(&self) -> Result<Coordinates, WeatherError> {
        let locator = self
            .locator
            .as_ref()
            .ok_or(WeatherError::Geolocation(GeolocationCause::Unsupported))?;

        locator.locate().await.map_err(|cause| {
            tracing::warn!(%cause, "Position lookup failed");
            WeatherError::from(cause)
        })
    }

    async fn fetch(&self, endpoint: &str, query: &WeatherQuery) -> Result<String, WeatherError> {
        if !self.config.is_api_key_configured() {
            return Err(WeatherError::not_configured());
        }

        let mut params = query.location_params();
        params.push(("units", query.units.as_str().to_string()));
        params.push(("appid", self.config.api_key().to_string()));

        let url = build_url(endpoint, params, &self.config);
        tracing::debug!(url = %redact(&url, self.config.api_key()), "Requesting weather data");

        self.get_text(&url).await.map_err(|failure| {
            let err = normalize(failure);
            tracing::warn!(status = ?err.status(), error = %err, "Weather API error");
            err
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, TransportFailure> {
        let res = self.http.get(url).send().await.map_err(|err| {
            if err.is_builder() {
                TransportFailure::InvalidUrl {
                    url: redact(url, self.config.api_key()),
                }
            } else {
                TransportFailure::from(err)
            }
        })?;

        let status = res.status();
        tracing::debug!(status = %status, "Received API response");

        let body = res.text().await?;

        if !status.is_success() {
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

fn redact(url: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        url.to_string()
    } else {
        url.replace(api_key, "***")
    }
}
