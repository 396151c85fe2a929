//! Route weather from the Open-Meteo forecast API.

use chrono::{NaiveDate, NaiveTime};
use futures::future::join_all;
use reqwest::Client;
use saferoute_core::weather::{describe_weather_code, select_hourly_index};
use saferoute_core::{GeoPoint, RouteWeather, WaypointWeather, WeatherPoint};
use serde::Deserialize;
use std::time::Duration;

use crate::error::FetchError;
use crate::places::CityFinder;

const WEATHER_FIELDS: &str = "temperature_2m,weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentWeather>,
    current_weather: Option<CurrentWeatherAlt>,
    hourly: Option<HourlyWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: Option<f64>,
    weather_code: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherAlt {
    temperature: Option<f64>,
    weathercode: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyWeather {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<f64>>,
}

/// Forecast date and local time of day to look up instead of current weather.
pub type ForecastSlot = (NaiveDate, NaiveTime);

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl WeatherClient {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Weather at `point`, either now or at the hour of `slot`.
    pub async fn fetch(
        &self,
        point: GeoPoint,
        slot: Option<ForecastSlot>,
    ) -> Result<WeatherPoint, FetchError> {
        let mut params = vec![
            ("latitude", point.lat.to_string()),
            ("longitude", point.lng.to_string()),
            ("timezone", "auto".to_string()),
        ];
        match slot {
            Some((date, _)) => {
                let day = date.format("%Y-%m-%d").to_string();
                params.push(("hourly", WEATHER_FIELDS.to_string()));
                params.push(("start_date", day.clone()));
                params.push(("end_date", day));
            }
            None => params.push(("current", WEATHER_FIELDS.to_string())),
        }

        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(&self.url, &err))?;

        if !response.status().is_success() {
            return Err(FetchError::from_status(&self.url, response.status()));
        }

        let payload: ForecastResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Parse(err.to_string()))?;

        match slot {
            Some((_, time)) => hourly_weather(payload, time),
            None => current_weather(payload),
        }
    }

    /// Like [`fetch`](Self::fetch) but degrades to the sentinel.
    pub async fn fetch_or_sentinel(&self, point: GeoPoint, slot: Option<ForecastSlot>) -> WeatherPoint {
        match self.fetch(point, slot).await {
            Ok(weather) => weather,
            Err(err) => {
                tracing::warn!(
                    "weather lookup for {:.4},{:.4} failed: {}",
                    point.lat,
                    point.lng,
                    err
                );
                WeatherPoint::unavailable()
            }
        }
    }
}

fn weather_point(temperature: f64, code: f64) -> Result<WeatherPoint, FetchError> {
    if !temperature.is_finite() || !code.is_finite() {
        return Err(FetchError::Parse("non-finite weather values".to_string()));
    }
    let wmo_code = code.round() as i32;
    Ok(WeatherPoint {
        temperature_celsius: temperature,
        wmo_code,
        description: describe_weather_code(wmo_code).to_string(),
    })
}

fn current_weather(payload: ForecastResponse) -> Result<WeatherPoint, FetchError> {
    if let Some(current) = payload.current {
        if let (Some(temperature), Some(code)) = (current.temperature_2m, current.weather_code) {
            return weather_point(temperature, code);
        }
    }
    if let Some(alt) = payload.current_weather {
        if let (Some(temperature), Some(code)) = (alt.temperature, alt.weathercode) {
            return weather_point(temperature, code);
        }
    }
    Err(FetchError::Parse(
        "weather response missing current data".to_string(),
    ))
}

fn hourly_weather(payload: ForecastResponse, time: NaiveTime) -> Result<WeatherPoint, FetchError> {
    let hourly = payload
        .hourly
        .ok_or_else(|| FetchError::Parse("weather response missing hourly data".to_string()))?;
    let idx = select_hourly_index(&hourly.time, time)
        .ok_or_else(|| FetchError::Parse("hourly forecast is empty".to_string()))?;
    let temperature = hourly.temperature_2m.get(idx).copied().flatten();
    let code = hourly.weather_code.get(idx).copied().flatten();
    match (temperature, code) {
        (Some(temperature), Some(code)) => weather_point(temperature, code),
        _ => Err(FetchError::Parse(format!(
            "hourly forecast entry {idx} incomplete"
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    weather: WeatherClient,
    cities: CityFinder,
}

impl WeatherAggregator {
    pub fn new(weather: WeatherClient, cities: CityFinder) -> Self {
        Self { weather, cities }
    }

    /// Weather for origin, destination and every city along `path`.
    ///
    /// All lookups run concurrently and each failure degrades to that
    /// point's sentinel, so this always returns a complete `RouteWeather`.
    /// Hourly forecasts are used only when both `date` and `time` are given.
    pub async fn aggregate(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        path: Option<&[GeoPoint]>,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> RouteWeather {
        let cities = match path {
            Some(path) => self.cities.find(path).await,
            None => Vec::new(),
        };
        let slot = date.zip(time);

        let mut points = vec![origin, destination];
        points.extend(cities.iter().map(|city| city.point()));
        let lookups = points
            .iter()
            .map(|point| self.weather.fetch_or_sentinel(*point, slot));
        let mut results = join_all(lookups).await.into_iter();

        let (Some(origin_weather), Some(destination_weather)) = (results.next(), results.next())
        else {
            return RouteWeather::unavailable();
        };
        let waypoints = cities
            .into_iter()
            .zip(results)
            .map(|(city, weather)| WaypointWeather {
                name: city.name,
                weather,
            })
            .collect();

        RouteWeather {
            origin: origin_weather,
            destination: destination_weather,
            waypoints,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ForecastResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn current_block_is_preferred() {
        let payload = parse(r#"{"current":{"temperature_2m":18.5,"weather_code":2}}"#);
        let weather = current_weather(payload).unwrap();
        assert_eq!(weather.temperature_celsius, 18.5);
        assert_eq!(weather.wmo_code, 2);
        assert_eq!(weather.description, "Partly cloudy");
    }

    #[test]
    fn legacy_current_weather_block_is_accepted() {
        let payload = parse(r#"{"current_weather":{"temperature":4.0,"weathercode":71}}"#);
        let weather = current_weather(payload).unwrap();
        assert_eq!(weather.description, "Slight snow fall");
    }

    #[test]
    fn missing_current_data_is_a_parse_error() {
        let payload = parse(r#"{"current":{"temperature_2m":18.5}}"#);
        assert!(matches!(current_weather(payload), Err(FetchError::Parse(_))));
    }

    #[test]
    fn hourly_entry_matches_requested_hour() {
        let payload = parse(
            r#"{"hourly":{
                "time":["2024-05-01T00:00","2024-05-01T21:00"],
                "temperature_2m":[9.0,14.5],
                "weather_code":[0,61]
            }}"#,
        );
        let time = NaiveTime::from_hms_opt(21, 15, 0).unwrap();
        let weather = hourly_weather(payload, time).unwrap();
        assert_eq!(weather.temperature_celsius, 14.5);
        assert_eq!(weather.description, "Slight rain");
    }

    #[test]
    fn unmapped_code_is_unknown() {
        let weather = weather_point(20.0, 42.0).unwrap();
        assert_eq!(weather.description, "Unknown");
    }
}
