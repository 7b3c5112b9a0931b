//! External signals - weather, energy price, carbon intensity, calendar
//!
//! Every signal is optional. A provider that cannot reach one source simply
//! leaves that field empty.

use serde::{Deserialize, Serialize};

/// Named external source of a context trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Weather forecast
    Weather,

    /// Energy tariff
    EnergyPrice,

    /// Grid carbon intensity
    CarbonIntensity,

    /// Calendar events
    Calendar,
}

impl SignalSource {
    /// Get the source name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Weather => "weather",
            SignalSource::EnergyPrice => "energy_price",
            SignalSource::CarbonIntensity => "carbon_intensity",
            SignalSource::Calendar => "calendar",
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named external conditions used as context triggers
pub mod conditions {
    /// Forecast low at or below the frost threshold
    pub const FROST_FORECAST: &str = "frost_forecast";
    /// Forecast high at or above the heat threshold
    pub const HEAT_FORECAST: &str = "heat_forecast";
    /// Rain, snow or storm
    pub const PRECIPITATION: &str = "precipitation";
    /// Anything darker than clear sky
    pub const OVERCAST: &str = "overcast";
    /// Energy tariff classified low
    pub const LOW_PRICE_WINDOW: &str = "low_price_window";
    /// Grid carbon intensity classified low
    pub const LOW_CARBON_WINDOW: &str = "low_carbon_window";
    /// Away or vacation calendar event
    pub const AWAY: &str = "away";
}

/// Coarse weather condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Clear sky
    Sunny,
    /// Overcast
    Cloudy,
    /// Rain or showers
    Rainy,
    /// Snow or sleet
    Snowy,
    /// Thunderstorm
    Stormy,
    /// Fog
    Foggy,
}

impl WeatherCondition {
    /// Whether the condition involves precipitation
    pub fn is_precipitation(&self) -> bool {
        matches!(self, WeatherCondition::Rainy | WeatherCondition::Snowy | WeatherCondition::Stormy)
    }

    /// Whether the condition darkens the home during the day
    pub fn is_low_light(&self) -> bool {
        !matches!(self, WeatherCondition::Sunny)
    }
}

/// Current weather and forecast extremes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSignal {
    /// Current condition
    pub condition: WeatherCondition,

    /// Current outdoor temperature (°C)
    pub temperature_c: f64,

    /// Forecast high (°C)
    #[serde(default)]
    pub forecast_high_c: Option<f64>,

    /// Forecast low (°C)
    #[serde(default)]
    pub forecast_low_c: Option<f64>,
}

/// Three-level classification used by tariff and carbon feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLevel {
    /// Below typical
    Low,
    /// Typical
    Normal,
    /// Above typical
    High,
}

/// Current energy tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySignal {
    /// Price per kWh in the local currency
    pub price_per_kwh: f64,

    /// Price classification
    pub level: SignalLevel,
}

/// Current grid carbon intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonSignal {
    /// Grams CO2 per kWh
    pub intensity_g_per_kwh: f64,

    /// Intensity classification
    pub level: SignalLevel,
}

/// Calendar event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    /// Occupants away for the day
    Away,
    /// Occupants away for several days
    Vacation,
    /// Meeting or appointment
    Meeting,
    /// Anything else
    Other,
}

/// A calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event summary
    pub summary: String,

    /// Category
    pub kind: CalendarKind,
}

impl CalendarEvent {
    /// Whether the event means the home will be empty
    pub fn is_absence(&self) -> bool {
        matches!(self.kind, CalendarKind::Away | CalendarKind::Vacation)
    }
}

/// Meteorological season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// Spring
    Spring,
    /// Summer
    Summer,
    /// Autumn
    Autumn,
    /// Winter
    Winter,
}

/// All external signals for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSignals {
    /// Weather, if the forecast source is reachable
    #[serde(default)]
    pub weather: Option<WeatherSignal>,

    /// Energy tariff, if available
    #[serde(default)]
    pub energy: Option<EnergySignal>,

    /// Carbon intensity, if available
    #[serde(default)]
    pub carbon: Option<CarbonSignal>,

    /// Calendar events, if the calendar is reachable
    #[serde(default)]
    pub calendar: Option<Vec<CalendarEvent>>,

    /// Local hour of day (0-23)
    #[serde(default)]
    pub local_hour: Option<u8>,

    /// Current season
    #[serde(default)]
    pub season: Option<Season>,
}

impl ExternalSignals {
    /// Whether a given source is available
    pub fn has(&self, source: SignalSource) -> bool {
        match source {
            SignalSource::Weather => self.weather.is_some(),
            SignalSource::EnergyPrice => self.energy.is_some(),
            SignalSource::CarbonIntensity => self.carbon.is_some(),
            SignalSource::Calendar => self.calendar.is_some(),
        }
    }

    /// Sources that are available, in a fixed order
    pub fn available_sources(&self) -> Vec<SignalSource> {
        [
            SignalSource::Weather,
            SignalSource::EnergyPrice,
            SignalSource::CarbonIntensity,
            SignalSource::Calendar,
        ]
        .into_iter()
        .filter(|s| self.has(*s))
        .collect()
    }

    /// Whether no source at all is available
    pub fn is_empty(&self) -> bool {
        self.available_sources().is_empty()
    }

    /// Lowest known temperature (forecast low, else current)
    pub fn coldest_c(&self) -> Option<f64> {
        self.weather
            .as_ref()
            .map(|w| w.forecast_low_c.map_or(w.temperature_c, |low| low.min(w.temperature_c)))
    }

    /// Highest known temperature (forecast high, else current)
    pub fn warmest_c(&self) -> Option<f64> {
        self.weather
            .as_ref()
            .map(|w| w.forecast_high_c.map_or(w.temperature_c, |high| high.max(w.temperature_c)))
    }

    /// Whether any calendar event means the home will be empty
    pub fn has_absence(&self) -> bool {
        self.calendar
            .as_ref()
            .map(|events| events.iter().any(CalendarEvent::is_absence))
            .unwrap_or(false)
    }
}
