//! Condition classification and icon rendering.
//!
//! OpenWeatherMap condition codes: <https://openweathermap.org/weather-conditions>

use serde::{Deserialize, Serialize};

const THUNDERSTORM: std::ops::Range<u32> = 200..300;
const DRIZZLE: std::ops::Range<u32> = 300..400;
const RAIN: std::ops::Range<u32> = 500..600;
const SNOW: std::ops::Range<u32> = 600..700;
const ATMOSPHERE: std::ops::Range<u32> = 700..800;
const CLEAR_SKY: u32 = 800;
const FEW_CLOUDS: u32 = 801;

/// Classified weather condition, split by day/night where the icon differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    ClearDay,
    ClearNight,
    FewCloudsDay,
    FewCloudsNight,
    Clouds,
}

impl Condition {
    pub const fn all() -> &'static [Condition] {
        &[
            Condition::Thunderstorm,
            Condition::Drizzle,
            Condition::Rain,
            Condition::Snow,
            Condition::Atmosphere,
            Condition::ClearDay,
            Condition::ClearNight,
            Condition::FewCloudsDay,
            Condition::FewCloudsNight,
            Condition::Clouds,
        ]
    }

    /// Classify a vendor condition code.
    ///
    /// Codes outside every known range (e.g. `< 200` or the unused 4xx block)
    /// fall back to [`Condition::FewCloudsDay`].
    pub fn classify(code: u32, is_night: bool) -> Self {
        match code {
            c if THUNDERSTORM.contains(&c) => Self::Thunderstorm,
            c if DRIZZLE.contains(&c) => Self::Drizzle,
            c if RAIN.contains(&c) => Self::Rain,
            c if SNOW.contains(&c) => Self::Snow,
            c if ATMOSPHERE.contains(&c) => Self::Atmosphere,
            CLEAR_SKY if is_night => Self::ClearNight,
            CLEAR_SKY => Self::ClearDay,
            FEW_CLOUDS if is_night => Self::FewCloudsNight,
            FEW_CLOUDS => Self::FewCloudsDay,
            c if c > FEW_CLOUDS => Self::Clouds,
            _ => Self::FewCloudsDay,
        }
    }

    /// Classify using the vendor icon code (`"01d"`, `"01n"`, ...) for day/night.
    pub fn from_vendor(code: u32, icon_code: &str) -> Self {
        Self::classify(code, is_night_icon(icon_code))
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "⛈️",
            Self::Drizzle => "🌦️",
            Self::Rain => "🌧️",
            Self::Snow => "❄️",
            Self::Atmosphere => "🌫️",
            Self::ClearDay => "☀️",
            Self::ClearNight => "🌙",
            Self::FewCloudsDay => "⛅",
            Self::FewCloudsNight | Self::Clouds => "☁️",
        }
    }

    /// Stable lowercase identifier, used as the image asset file stem.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Atmosphere => "atmosphere",
            Self::ClearDay => "clear-day",
            Self::ClearNight => "clear-night",
            Self::FewCloudsDay => "few-clouds-day",
            Self::FewCloudsNight => "few-clouds-night",
            Self::Clouds => "clouds",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.slug() == slug)
    }

    /// Condition family, ignoring the day/night split.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Drizzle => "drizzle",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Atmosphere => "atmosphere",
            Self::ClearDay | Self::ClearNight => "clear",
            Self::FewCloudsDay | Self::FewCloudsNight => "few-clouds",
            Self::Clouds => "clouds",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Vendor icon codes end in `n` for night-time observations.
pub fn is_night_icon(icon_code: &str) -> bool {
    icon_code.ends_with('n')
}

/// How condition icons are rendered into transformed readings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IconPreference {
    #[default]
    Emoji,
    Image { base_path: String },
}

impl IconPreference {
    /// Image icons under `base_path`; a trailing `/` is added when missing.
    pub fn image(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self::Image { base_path }
    }

    pub fn render(&self, condition: Condition) -> String {
        match self {
            Self::Emoji => condition.emoji().to_string(),
            Self::Image { base_path } => format!("{base_path}{}.svg", condition.slug()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thunderstorm_range_ignores_day_night() {
        for code in 200..300 {
            assert_eq!(Condition::classify(code, false), Condition::Thunderstorm);
            assert_eq!(Condition::classify(code, true), Condition::Thunderstorm);
        }
    }

    #[test]
    fn rain_and_snow_ranges() {
        for code in 500..600 {
            assert_eq!(Condition::classify(code, false), Condition::Rain);
        }
        for code in 600..700 {
            assert_eq!(Condition::classify(code, true), Condition::Snow);
        }
    }

    #[test]
    fn range_boundaries_are_half_open() {
        assert_eq!(Condition::classify(299, false), Condition::Thunderstorm);
        assert_eq!(Condition::classify(300, false), Condition::Drizzle);
        assert_eq!(Condition::classify(399, false), Condition::Drizzle);
        assert_eq!(Condition::classify(700, false), Condition::Atmosphere);
        assert_eq!(Condition::classify(799, true), Condition::Atmosphere);
    }

    #[test]
    fn clear_and_few_clouds_split_on_night() {
        assert_eq!(Condition::classify(800, true), Condition::ClearNight);
        assert_eq!(Condition::classify(800, false), Condition::ClearDay);
        assert_eq!(Condition::classify(801, true), Condition::FewCloudsNight);
        assert_eq!(Condition::classify(801, false), Condition::FewCloudsDay);
        assert_ne!(Condition::FewCloudsNight.emoji(), Condition::FewCloudsDay.emoji());
    }

    #[test]
    fn overcast_and_fallback() {
        assert_eq!(Condition::classify(803, false), Condition::Clouds);
        assert_eq!(Condition::classify(804, true), Condition::Clouds);
        assert_eq!(Condition::classify(100, true), Condition::FewCloudsDay);
        assert_eq!(Condition::classify(450, false), Condition::FewCloudsDay);
    }

    #[test]
    fn vendor_icon_code_decides_night() {
        assert_eq!(Condition::from_vendor(800, "01n"), Condition::ClearNight);
        assert_eq!(Condition::from_vendor(800, "01d"), Condition::ClearDay);
        assert_eq!(Condition::from_vendor(800, ""), Condition::ClearDay);
    }

    #[test]
    fn slug_roundtrip_is_stable() {
        for code in [200, 310, 520, 601, 741, 800, 801, 804, 42] {
            for night in [false, true] {
                let first = Condition::classify(code, night);
                let back = Condition::from_slug(first.slug()).expect("known slug");
                assert_eq!(back, first);
                assert_eq!(back.family(), Condition::classify(code, night).family());
            }
        }
    }

    #[test]
    fn unknown_slug_is_none() {
        assert_eq!(Condition::from_slug("hail"), None);
    }

    #[test]
    fn image_preference_normalizes_base_path() {
        let pref = IconPreference::image("assets");
        assert_eq!(pref, IconPreference::Image { base_path: "assets/".into() });

        let icon = pref.render(Condition::ClearDay);
        assert!(icon.starts_with("assets/"));
        assert!(icon.ends_with(".svg"));
        assert_eq!(icon, "assets/clear-day.svg");

        let already = IconPreference::image("assets/icons/");
        assert_eq!(already.render(Condition::Snow), "assets/icons/snow.svg");
    }

    #[test]
    fn emoji_preference_is_default() {
        let pref = IconPreference::default();
        assert_eq!(pref, IconPreference::Emoji);
        assert_eq!(pref.render(Condition::Thunderstorm), "⛈️");
        assert_eq!(pref.render(Condition::ClearNight), "🌙");
    }
}
