//! Weather and allergen API client

use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::application::errors::{BotError, FormatError};
use crate::application::formatting::{CityInfo, PollenDay, WeatherReading};

/// Weather API endpoint
const API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// Extended allergen forecast endpoint; the zip code is appended
const POLLEN_BASE: &str = "https://www.pollen.com/api/forecast/extended";

const INTEGRATION: &str = "weather";

/// Weather client (imperial units, free-text or coordinate locations)
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    pollen_base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
            pollen_base_url: POLLEN_BASE.to_string(),
        }
    }

    /// Point the client at different servers, for local testing
    pub fn with_base_urls(
        mut self,
        base_url: impl Into<String>,
        pollen_base_url: impl Into<String>,
    ) -> Self {
        self.base_url = base_url.into();
        self.pollen_base_url = pollen_base_url.into();
        self
    }

    /// Current conditions for a location
    pub async fn current(&self, location: &str) -> Result<(CityInfo, WeatherReading), BotError> {
        let response = self
            .client
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", location),
                ("units", "imperial"),
                ("appid", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        if !response.status().is_success() {
            return Err(BotError::upstream(
                INTEGRATION,
                format!("HTTP {}", response.status()),
            ));
        }

        let data: CurrentResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        let city = CityInfo::from_parts(
            data.name,
            data.sys.as_ref().and_then(|s| s.country.clone()),
            data.sys.as_ref().and_then(|s| s.sunrise).map(clock_stamp),
            data.sys.as_ref().and_then(|s| s.sunset).map(clock_stamp),
            data.timezone,
        )?;
        let reading = into_reading(data.dt, data.main, data.weather, data.wind)?;
        Ok((city, reading))
    }

    /// Forecast readings for a location, oldest first
    pub async fn forecast(
        &self,
        location: &str,
        steps: u32,
    ) -> Result<(CityInfo, Vec<WeatherReading>), BotError> {
        let response = self
            .client
            .get(format!("{}/forecast", self.base_url))
            .query(&[
                ("q", location),
                ("units", "imperial"),
                ("cnt", &steps.to_string()),
                ("appid", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        if !response.status().is_success() {
            return Err(BotError::upstream(
                INTEGRATION,
                format!("HTTP {}", response.status()),
            ));
        }

        let data: ForecastResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        let city = CityInfo::from_parts(
            data.city.name,
            data.city.country,
            data.city.sunrise.map(clock_stamp),
            data.city.sunset.map(clock_stamp),
            data.city.timezone,
        )?;
        let readings = data
            .list
            .into_iter()
            .map(|entry| into_reading(entry.dt, entry.main, entry.weather, entry.wind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((city, readings))
    }

    /// 3-day regional allergen index for a postal code
    pub async fn pollen(&self, postal_code: &str) -> Result<Vec<PollenDay>, BotError> {
        let url = format!("{}/{}", self.pollen_base_url, postal_code);
        let response = self
            .client
            .get(&url)
            // The allergen service rejects requests without a matching referer
            .header("Referer", &url)
            .send()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        if !response.status().is_success() {
            return Err(BotError::upstream(
                INTEGRATION,
                format!("HTTP {}", response.status()),
            ));
        }

        let data: PollenResponse = response
            .json()
            .await
            .map_err(|e| BotError::upstream(INTEGRATION, e))?;

        Ok(data
            .location
            .periods
            .into_iter()
            .map(|p| PollenDay {
                label: p.kind.unwrap_or_else(|| "Unknown".to_string()),
                index: p.index,
                predominant: p
                    .triggers
                    .unwrap_or_default()
                    .into_iter()
                    .next()
                    .and_then(|t| t.name),
            })
            .collect())
    }
}

fn clock_stamp(epoch: i64) -> String {
    match Utc.timestamp_opt(epoch, 0).single() {
        Some(dt) => dt.format("%m-%d-%Y %I:%M %p").to_string(),
        None => epoch.to_string(),
    }
}

fn reading_stamp(epoch: i64) -> String {
    match Utc.timestamp_opt(epoch, 0).single() {
        Some(dt) => dt.format("%m-%d-%Y %H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

fn into_reading(
    dt: i64,
    main: MainBlock,
    weather: Vec<WeatherBlock>,
    wind: Wind,
) -> Result<WeatherReading, BotError> {
    let condition = weather
        .into_iter()
        .next()
        .ok_or(FormatError::MalformedRecord("weather"))?;
    Ok(WeatherReading {
        at: reading_stamp(dt),
        temp: main.temp,
        feels_like: main.feels_like,
        temp_min: main.temp_min,
        temp_max: main.temp_max,
        humidity: main.humidity,
        condition: condition.main,
        description: condition.description,
        wind: wind.speed,
    })
}

/// API wire types
#[derive(Debug, Clone, Deserialize)]
struct CurrentResponse {
    name: Option<String>,
    sys: Option<Sys>,
    timezone: Option<i64>,
    dt: i64,
    main: MainBlock,
    weather: Vec<WeatherBlock>,
    wind: Wind,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    city: CityBlock,
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct CityBlock {
    name: Option<String>,
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    timezone: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: MainBlock,
    weather: Vec<WeatherBlock>,
    wind: Wind,
}

#[derive(Debug, Clone, Deserialize)]
struct Sys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct MainBlock {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct WeatherBlock {
    main: String,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PollenResponse {
    #[serde(rename = "Location")]
    location: PollenLocation,
}

#[derive(Debug, Clone, Deserialize)]
struct PollenLocation {
    periods: Vec<PollenPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
struct PollenPeriod {
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "Index")]
    index: f64,
    #[serde(rename = "Triggers")]
    triggers: Option<Vec<PollenTrigger>>,
}

#[derive(Debug, Clone, Deserialize)]
struct PollenTrigger {
    #[serde(rename = "Name")]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_forecast_entries() {
        let data: ForecastResponse = serde_json::from_value(serde_json::json!({
            "city": {
                "name": "Portland",
                "country": "US",
                "sunrise": 1539180000,
                "sunset": 1539220000,
                "timezone": -25200
            },
            "list": [{
                "dt": 1539202764,
                "main": {
                    "temp": 61.2, "feels_like": 59.8,
                    "temp_min": 54.0, "temp_max": 63.5, "humidity": 71
                },
                "weather": [{ "main": "Rain", "description": "light rain" }],
                "wind": { "speed": 7.4 }
            }]
        }))
        .unwrap();

        let reading = into_reading(
            data.list[0].dt,
            data.list[0].main.clone(),
            data.list[0].weather.clone(),
            data.list[0].wind.clone(),
        )
        .unwrap();
        assert_eq!(reading.condition, "Rain");
        assert_eq!(reading.humidity, 71);
        assert_eq!(reading.at, "10-10-2018 20:19:24");
    }

    #[test]
    fn reading_without_condition_is_malformed() {
        let main = MainBlock {
            temp: 0.0,
            feels_like: 0.0,
            temp_min: 0.0,
            temp_max: 0.0,
            humidity: 0,
        };
        let err = into_reading(0, main, vec![], Wind { speed: 0.0 }).unwrap_err();
        assert!(matches!(
            err,
            BotError::Format(FormatError::MalformedRecord("weather"))
        ));
    }

    #[test]
    fn decodes_pollen_periods() {
        let data: PollenResponse = serde_json::from_value(serde_json::json!({
            "Location": {
                "periods": [
                    { "Type": "Today", "Index": 8.2,
                      "Triggers": [{ "Name": "Ragweed" }] },
                    { "Type": "Tomorrow", "Index": 6.1, "Triggers": [] }
                ]
            }
        }))
        .unwrap();
        assert_eq!(data.location.periods.len(), 2);
        assert_eq!(data.location.periods[0].kind.as_deref(), Some("Today"));
    }
}
