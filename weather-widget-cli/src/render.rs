//! Plain-text rendering of transformed readings.

use chrono::DateTime;
use weather_widget_core::{DailyForecast, Units, WeatherReading};

pub fn reading(r: &WeatherReading) -> String {
    let temp = r.units.temperature_symbol();
    let wind = r.units.wind_speed_unit();

    let mut lines = vec![
        r.location.clone(),
        format!("{}  {}{temp}  {}", r.icon, r.temperature, r.condition),
        format!("  {}", r.description),
        format!("  Feels like  {}{temp}", r.feels_like),
        format!("  Humidity    {}%", r.humidity),
        format!("  Wind speed  {} {wind}", r.wind_speed),
        format!("  Pressure    {} hPa", r.pressure),
        format!("  Visibility  {} m", r.visibility),
    ];
    if let (Some(rise), Some(set)) = (clock(r.sunrise), clock(r.sunset)) {
        lines.push(format!("  Sun         {rise} / {set} UTC"));
    }

    lines.iter().map(|line| format!("{line}\n")).collect()
}

pub fn forecast(city: &str, days: &[DailyForecast], units: Units) -> String {
    let temp = units.temperature_symbol();

    let rows: String = days
        .iter()
        .map(|day| {
            format!(
                "  {}  {}  {:>4}{temp} / {:>4}{temp}  {:>3}%  {}\n",
                day.date.format("%a %Y-%m-%d"),
                day.icon,
                day.temp_max,
                day.temp_min,
                day.humidity,
                day.condition,
            )
        })
        .collect();

    format!("{city}: {}-day forecast\n{rows}", days.len())
}

/// `HH:MM` for a non-zero epoch; zero means the vendor omitted it.
fn clock(epoch: i64) -> Option<String> {
    if epoch == 0 {
        return None;
    }
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.format("%H:%M").to_string())
}
