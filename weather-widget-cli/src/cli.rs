use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Confirm, Password, Text};
use weather_widget_core::{
    FixedLocator, Geolocator, IconPreference, IpLocator, Units, WeatherClient, WeatherConfig, WeatherError,
    config::DEFAULT_BASE_URL,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    #[command(flatten)]
    pub display: DisplayArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Measurement system for temperatures and wind speed (metric or imperial).
    #[arg(long, global = true, default_value = "imperial")]
    pub units: Units,

    /// Render condition icons as emoji or as image asset paths.
    #[arg(long, global = true, value_enum, default_value_t = IconsArg::Emoji)]
    pub icons: IconsArg,

    /// Base path for image icons, e.g. "assets/weather-icons".
    #[arg(long, global = true, default_value = "assets/weather-icons/")]
    pub icon_base: String,

    /// Print the transformed data as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IconsArg {
    Emoji,
    Image,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store the API key and endpoint settings.
    Configure,

    /// Show current conditions for a city or coordinates.
    Current {
        /// City name, e.g. "The Hague".
        city: Option<String>,

        #[arg(long, requires = "lon", conflicts_with = "city", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", conflicts_with = "city", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Show the daily forecast for a city.
    Forecast {
        /// City name.
        city: String,
    },

    /// Show current conditions at your position (IP lookup unless --lat/--lon given).
    Locate {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
}

impl DisplayArgs {
    fn icon_preference(&self) -> IconPreference {
        match self.icons {
            IconsArg::Emoji => IconPreference::Emoji,
            IconsArg::Image => IconPreference::image(self.icon_base.as_str()),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli { display, command } = self;
        let units = display.units;

        match command {
            Command::Configure => configure()?,
            Command::Current { city, lat, lon } => {
                let client = build_client(&display)?;
                let reading = match (city, lat, lon) {
                    (_, Some(lat), Some(lon)) => client
                        .reading_by_coordinates(lat, lon, units)
                        .await
                        .map_err(|e| report(e, None))?,
                    (Some(city), _, _) => {
                        let city = require_city(&city)?;
                        client
                            .reading_by_city(city, units)
                            .await
                            .map_err(|e| report(e, Some(city)))?
                    }
                    _ => bail!("Please enter a city name"),
                };

                if display.json {
                    println!("{}", serde_json::to_string_pretty(&reading)?);
                } else {
                    print!("{}", render::reading(&reading));
                }
            }
            Command::Forecast { city } => {
                let client = build_client(&display)?;
                let city = require_city(&city)?;
                let days = client
                    .forecast(city, units)
                    .await
                    .map_err(|e| report(e, Some(city)))?;

                if display.json {
                    println!("{}", serde_json::to_string_pretty(&days)?);
                } else {
                    print!("{}", render::forecast(city, &days, units));
                }
            }
            Command::Locate { lat, lon } => {
                let locator: Arc<dyn Geolocator> = match (lat, lon) {
                    (Some(lat), Some(lon)) => Arc::new(FixedLocator::new(lat, lon)),
                    _ => Arc::new(IpLocator::new()),
                };
                let client = build_client(&display)?.with_locator(locator);

                let coords = client.current_position().await.map_err(|e| report(e, None))?;
                let reading = client
                    .reading_by_coordinates(coords.latitude, coords.longitude, units)
                    .await
                    .map_err(|e| report(e, None))?;

                if display.json {
                    println!("{}", serde_json::to_string_pretty(&reading)?);
                } else {
                    print!("{}", render::reading(&reading));
                }
            }
        }

        Ok(())
    }
}

/// Load config (file, then `WEATHER_*` env) and apply display preferences.
fn build_client(display: &DisplayArgs) -> anyhow::Result<WeatherClient> {
    let mut client = WeatherClient::new(WeatherConfig::load()?.with_env_overrides()?);
    client.set_icon_preference(display.icon_preference());

    let config = client.config();
    tracing::debug!(
        base_url = %config.base_url,
        use_proxy = config.use_proxy,
        relay = ?config.relay(),
        icons = ?client.icon_preference(),
        "Loaded configuration"
    );
    Ok(client)
}

fn require_city(city: &str) -> anyhow::Result<&str> {
    let city = city.trim();
    if city.is_empty() {
        bail!("Please enter a city name");
    }
    Ok(city)
}

/// Turn a core error into the message shown to the user.
fn report(err: WeatherError, city: Option<&str>) -> anyhow::Error {
    let mut message = err.user_message(city);
    if err.is_retryable() {
        message.push_str("\nRun the same command again to retry.");
    }
    anyhow::anyhow!(message)
}

fn configure() -> anyhow::Result<()> {
    let path = WeatherConfig::config_file_path()?;
    let current = WeatherConfig::load()?;

    println!("Configuring weather-widget ({})", path.display());

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_help_message("Get a free key at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;

    let base_url = Text::new("API base URL:")
        .with_default(if current.base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            &current.base_url
        })
        .prompt()
        .context("Failed to read base URL")?;

    let use_proxy = Confirm::new("Route requests through the same-origin proxy (/api/data/2.5)?")
        .with_default(current.use_proxy)
        .prompt()
        .context("Failed to read proxy choice")?;

    let cors_proxy = Text::new("CORS relay (blank for none):")
        .with_default(current.cors_proxy.as_deref().unwrap_or(""))
        .with_help_message("Prefix such as https://api.allorigins.win/raw?url= or a template with {url}")
        .prompt()
        .context("Failed to read CORS relay")?;

    let config = WeatherConfig {
        api_key,
        base_url,
        use_proxy,
        cors_proxy: Some(cors_proxy).filter(|relay| !relay.trim().is_empty()),
    };

    if !config.is_api_key_configured() {
        bail!("The API key must not be empty or the placeholder value");
    }

    config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
