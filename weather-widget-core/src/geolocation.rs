//! Position lookup capability used by "weather at my location".

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{error::GeolocationCause, model::Coordinates};

const IP_API_URL: &str = "http://ip-api.com/json/";
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Single-shot "where am I" lookup.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationCause>;
}

/// Always answers with the coordinates it was built with.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

impl FixedLocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(Coordinates {
            latitude,
            longitude,
        })
    }
}

#[async_trait]
impl Geolocator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationCause> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address (ip-api.com).
#[derive(Debug, Clone)]
pub struct IpLocator {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Geolocator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationCause> {
        tracing::debug!(endpoint = %self.endpoint, "Looking up position by IP");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("fields", "status,message,lat,lon")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(lookup_failure)?;

        if !res.status().is_success() {
            tracing::warn!(status = %res.status(), "IP geolocation request failed");
            return Err(GeolocationCause::PositionUnavailable);
        }

        let body: IpApiResponse = res.json().await.map_err(lookup_failure)?;

        match body {
            IpApiResponse {
                status,
                lat: Some(latitude),
                lon: Some(longitude),
                ..
            } if status == "success" => Ok(Coordinates {
                latitude,
                longitude,
            }),
            IpApiResponse { status, message, .. } => {
                tracing::warn!(%status, message = ?message, "IP geolocation returned no position");
                Err(GeolocationCause::PositionUnavailable)
            }
        }
    }
}

fn lookup_failure(err: reqwest::Error) -> GeolocationCause {
    if err.is_timeout() {
        GeolocationCause::Timeout
    } else {
        tracing::warn!(error = %err, "IP geolocation transport error");
        GeolocationCause::PositionUnavailable
    }
}
