//! Vendor payload parsing and transformation into display shapes.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::{
    error::WeatherError,
    icon::{Condition, IconPreference},
    model::{DailyForecast, Units, WeatherReading},
};

pub const INVALID_CURRENT: &str = "Invalid API response structure";
pub const INVALID_FORECAST: &str = "Invalid forecast API response structure";

/// Days kept from a forecast payload.
pub const MAX_FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct RawCondition {
    pub id: u32,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    /// e.g. `"01d"`; the trailing letter marks day or night.
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMain {
    pub temp: f64,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWind {
    pub speed: f64,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSys {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCoord {
    pub lat: f64,
    pub lon: f64,
}

/// `GET /weather` body. Blocks are optional here so that missing ones can be
/// reported as a validation failure rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCurrentConditions {
    pub name: Option<String>,
    pub coord: Option<RawCoord>,
    pub main: Option<RawMain>,
    pub weather: Option<Vec<RawCondition>>,
    pub wind: Option<RawWind>,
    pub sys: Option<RawSys>,
    pub visibility: Option<f64>,
    pub dt: Option<i64>,
    pub timezone: Option<i64>,
}

/// One 3-hour sample from `GET /forecast`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawForecastEntry {
    pub dt: i64,
    pub main: RawMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

pub fn parse_current(body: &str) -> Result<RawCurrentConditions, WeatherError> {
    serde_json::from_str(body)
        .map_err(|e| WeatherError::validation(format!("{INVALID_CURRENT}: {e}")))
}

/// Extract the `list` of samples; anything but an array is rejected.
pub fn parse_forecast(body: &str) -> Result<Vec<RawForecastEntry>, WeatherError> {
    let payload: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| WeatherError::validation(format!("{INVALID_FORECAST}: {e}")))?;

    let Some(list) = payload.get("list").filter(|list| list.is_array()) else {
        return Err(WeatherError::validation(INVALID_FORECAST));
    };

    Vec::<RawForecastEntry>::deserialize(list)
        .map_err(|e| WeatherError::validation(format!("{INVALID_FORECAST}: {e}")))
}

pub fn transform_current(
    raw: &RawCurrentConditions,
    units: Units,
    icons: &IconPreference,
) -> Result<WeatherReading, WeatherError> {
    let (Some(main), Some(primary), Some(wind), Some(sys)) = (
        raw.main.as_ref(),
        raw.weather.as_ref().and_then(|w| w.first()),
        raw.wind.as_ref(),
        raw.sys.as_ref(),
    ) else {
        return Err(WeatherError::validation(INVALID_CURRENT));
    };

    let condition = Condition::from_vendor(primary.id, &primary.icon);

    Ok(WeatherReading {
        location: location_label(raw.name.as_deref(), sys.country.as_deref()),
        temperature: round(main.temp),
        condition: primary.main.clone(),
        description: primary.description.clone(),
        humidity: whole(main.humidity),
        wind_speed: round(wind.speed),
        icon: icons.render(condition),
        feels_like: round(main.feels_like.unwrap_or(main.temp)),
        pressure: whole(main.pressure),
        visibility: raw.visibility.map_or(0, whole),
        sunrise: sys.sunrise.unwrap_or(0),
        sunset: sys.sunset.unwrap_or(0),
        units,
    })
}

/// Summarise 3-hour samples into at most [`MAX_FORECAST_DAYS`] UTC calendar days.
///
/// Days keep the order in which they first appear. Condition, icon and
/// humidity come from the middle sample of each day.
pub fn transform_forecast(
    entries: &[RawForecastEntry],
    icons: &IconPreference,
) -> Result<Vec<DailyForecast>, WeatherError> {
    let mut days: Vec<(NaiveDate, Vec<&RawForecastEntry>)> = Vec::new();

    for entry in entries {
        let date = DateTime::from_timestamp(entry.dt, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| {
                WeatherError::validation(format!("{INVALID_FORECAST}: bad timestamp {}", entry.dt))
            })?;

        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, samples)) => samples.push(entry),
            None => days.push((date, vec![entry])),
        }
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, samples)| summarise_day(date, &samples, icons))
        .collect()
}

fn summarise_day(
    date: NaiveDate,
    samples: &[&RawForecastEntry],
    icons: &IconPreference,
) -> Result<DailyForecast, WeatherError> {
    let temps = samples.iter().map(|s| s.main.temp);
    let max = temps.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = temps.fold(f64::INFINITY, f64::min);

    let middle = samples[samples.len() / 2];
    let primary = middle
        .weather
        .first()
        .ok_or_else(|| WeatherError::validation(format!("{INVALID_FORECAST}: no conditions for {date}")))?;

    Ok(DailyForecast {
        date,
        temp_max: round(max),
        temp_min: round(min),
        condition: primary.main.clone(),
        icon: icons.render(Condition::from_vendor(primary.id, &primary.icon)),
        humidity: whole(middle.main.humidity),
    })
}

fn location_label(name: Option<&str>, country: Option<&str>) -> String {
    let name = name.filter(|n| !n.is_empty()).unwrap_or("Unknown");
    match country.filter(|c| !c.is_empty()) {
        Some(country) => format!("{name}, {country}"),
        None => name.to_string(),
    }
}

/// Round half away from zero.
fn round(value: f64) -> i64 {
    value.round() as i64
}

/// Counts and readings that are integral in the vendor schema; some relays
/// send them as floats (`1013.0`). Negative values saturate to 0.
fn whole(value: f64) -> u32 {
    value.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn london() -> serde_json::Value {
        json!({
            "coord": { "lon": -0.1257, "lat": 51.5085 },
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
            "base": "stations",
            "main": {
                "temp": 20.7, "feels_like": 19.2, "temp_min": 18.0, "temp_max": 22.0,
                "pressure": 1013, "humidity": 50
            },
            "visibility": 10000,
            "wind": { "speed": 5.5, "deg": 270 },
            "clouds": { "all": 0 },
            "dt": 1609459200,
            "sys": { "country": "GB", "sunrise": 1609400000, "sunset": 1609435000 },
            "timezone": 0,
            "id": 2643743,
            "name": "London",
            "cod": 200
        })
    }

    fn current(value: serde_json::Value) -> Result<WeatherReading, WeatherError> {
        let raw = parse_current(&value.to_string())?;
        transform_current(&raw, Units::Metric, &IconPreference::Emoji)
    }

    fn sample(dt: i64, temp: f64, humidity: u32, id: u32, icon: &str) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": { "temp": temp, "humidity": humidity },
            "weather": [{ "id": id, "main": "Clouds", "description": "", "icon": icon }]
        })
    }

    fn forecast(list: Vec<serde_json::Value>) -> Result<Vec<DailyForecast>, WeatherError> {
        let entries = parse_forecast(&json!({ "list": list }).to_string())?;
        transform_forecast(&entries, &IconPreference::Emoji)
    }

    const DAY: i64 = 86_400;
    const JAN_1_2021: i64 = 1_609_459_200;

    #[test]
    fn current_reading_is_rounded_and_labelled() {
        let reading = current(london()).unwrap();

        assert_eq!(reading.location, "London, GB");
        assert_eq!(reading.temperature, 21);
        assert_eq!(reading.wind_speed, 6);
        assert_eq!(reading.feels_like, 19);
        assert_eq!(reading.condition, "Clear");
        assert_eq!(reading.description, "clear sky");
        assert_eq!(reading.humidity, 50);
        assert_eq!(reading.pressure, 1013);
        assert_eq!(reading.visibility, 10000);
        assert_eq!(reading.sunrise, 1609400000);
        assert_eq!(reading.icon, "☀️");
        assert_eq!(reading.units, Units::Metric);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round(2.5), 3);
        assert_eq!(round(-2.5), -3);
        assert_eq!(round(-0.4), 0);
    }

    #[test]
    fn location_falls_back_without_name_or_country() {
        let mut payload = london();
        payload.as_object_mut().unwrap().remove("name");
        assert_eq!(current(payload).unwrap().location, "Unknown, GB");

        let mut payload = london();
        payload["sys"].as_object_mut().unwrap().remove("country");
        payload.as_object_mut().unwrap().remove("name");
        assert_eq!(current(payload).unwrap().location, "Unknown");

        let mut payload = london();
        payload["sys"]["country"] = json!("");
        assert_eq!(current(payload).unwrap().location, "London");
    }

    #[test]
    fn missing_required_blocks_are_rejected() {
        for block in ["main", "weather", "wind", "sys"] {
            let mut payload = london();
            payload.as_object_mut().unwrap().remove(block);
            let err = current(payload).unwrap_err();
            assert_eq!(err, WeatherError::Validation(INVALID_CURRENT.into()), "block {block}");
        }
    }

    #[test]
    fn empty_condition_list_is_rejected() {
        let mut payload = london();
        payload["weather"] = json!([]);
        assert!(matches!(current(payload), Err(WeatherError::Validation(_))));
    }

    #[test]
    fn garbled_body_is_a_validation_error() {
        let err = parse_current("<html>bad gateway</html>").unwrap_err();
        assert!(err.to_string().starts_with(INVALID_CURRENT));
    }

    #[test]
    fn float_encoded_integers_pass_through() {
        let mut payload = london();
        payload["main"]["pressure"] = json!(1013.0);
        payload["main"]["humidity"] = json!(50.0);
        payload["visibility"] = json!(9999.0);

        let reading = current(payload).unwrap();
        assert_eq!(reading.pressure, 1013);
        assert_eq!(reading.humidity, 50);
        assert_eq!(reading.visibility, 9999);
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let mut payload = london();
        payload.as_object_mut().unwrap().remove("visibility");
        payload["sys"] = json!({ "country": "GB" });

        let reading = current(payload).unwrap();
        assert_eq!(reading.visibility, 0);
        assert_eq!(reading.sunrise, 0);
        assert_eq!(reading.sunset, 0);
    }

    #[test]
    fn night_icon_and_image_preference() {
        let mut payload = london();
        payload["weather"][0]["icon"] = json!("01n");
        let raw = parse_current(&payload.to_string()).unwrap();

        let emoji = transform_current(&raw, Units::Metric, &IconPreference::Emoji).unwrap();
        assert_eq!(emoji.icon, "🌙");

        let image = transform_current(&raw, Units::Metric, &IconPreference::image("assets")).unwrap();
        assert_eq!(image.icon, "assets/clear-night.svg");
    }

    #[test]
    fn same_day_samples_collapse_to_one_day() {
        let days = forecast(vec![
            sample(JAN_1_2021, 20.0, 50, 800, "01d"),
            sample(JAN_1_2021 + 3 * 3600, 22.0, 45, 801, "02d"),
        ])
        .unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(days[0].temp_max, 22);
        assert_eq!(days[0].temp_min, 20);
        // floor(2 / 2) = 1 -> second sample
        assert_eq!(days[0].humidity, 45);
        assert_eq!(days[0].icon, "⛅");
    }

    #[test]
    fn at_most_five_days_in_first_seen_order() {
        let list = (0..7)
            .flat_map(|d| {
                (0..8).map(move |h| sample(JAN_1_2021 + d * DAY + h * 3 * 3600, 10.0 + d as f64, 60, 500, "10d"))
            })
            .collect();

        let days = forecast(list).unwrap();
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.date, NaiveDate::from_ymd_opt(2021, 1, 1 + i as u32).unwrap());
            assert_eq!(day.temp_max, 10 + i as i64);
            assert_eq!(day.icon, "🌧️");
        }
    }

    #[test]
    fn middle_sample_drives_condition() {
        let days = forecast(vec![
            sample(JAN_1_2021, 1.0, 10, 200, "11d"),
            sample(JAN_1_2021 + 3600, 2.0, 20, 600, "13d"),
            sample(JAN_1_2021 + 7200, 3.0, 30, 804, "04d"),
        ])
        .unwrap();

        assert_eq!(days[0].icon, "❄️");
        assert_eq!(days[0].humidity, 20);
    }

    #[test]
    fn non_list_forecast_is_rejected() {
        let err = parse_forecast(&json!({ "invalid": "data" }).to_string()).unwrap_err();
        assert_eq!(err, WeatherError::Validation(INVALID_FORECAST.into()));

        let err = parse_forecast(&json!({ "list": { "dt": 1 } }).to_string()).unwrap_err();
        assert_eq!(err, WeatherError::Validation(INVALID_FORECAST.into()));
    }

    #[test]
    fn empty_forecast_list_yields_no_days() {
        assert!(forecast(vec![]).unwrap().is_empty());
    }

    #[test]
    fn sample_without_conditions_is_rejected() {
        let list = vec![json!({ "dt": JAN_1_2021, "main": { "temp": 1.0, "humidity": 1 } })];
        assert!(matches!(forecast(list), Err(WeatherError::Validation(_))));
    }
}
