//! WMO weather code descriptions and hourly forecast selection.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

pub const UNKNOWN_WEATHER_DESCRIPTION: &str = "Unknown";

/// Human description of a WMO weather interpretation code.
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_WEATHER_DESCRIPTION,
    }
}

/// Index of the hourly entry matching `time`'s hour, else the first entry.
///
/// `times` are forecast timestamps such as `"2024-05-01T14:00"`; entries
/// that fail to parse never match. Returns `None` only for an empty list.
pub fn select_hourly_index(times: &[String], time: NaiveTime) -> Option<usize> {
    if times.is_empty() {
        return None;
    }
    let hour = time.hour();
    let matched = times.iter().position(|stamp| {
        parse_forecast_hour(stamp).is_some_and(|forecast_hour| forecast_hour == hour)
    });
    Some(matched.unwrap_or(0))
}

fn parse_forecast_hour(stamp: &str) -> Option<u32> {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|dt| dt.hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(stamps: &[&str]) -> Vec<String> {
        stamps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_codes_have_descriptions() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(63), "Moderate rain");
        assert_eq!(describe_weather_code(95), "Thunderstorm");
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        assert_eq!(describe_weather_code(4), "Unknown");
        assert_eq!(describe_weather_code(-1), "Unknown");
        assert_eq!(describe_weather_code(1000), "Unknown");
    }

    #[test]
    fn hourly_selection_matches_hour() {
        let times = hours(&["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T14:00"]);
        let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(select_hourly_index(&times, time), Some(2));
    }

    #[test]
    fn hourly_selection_falls_back_to_first_entry() {
        let times = hours(&["2024-05-01T05:00", "not-a-time"]);
        let time = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
        assert_eq!(select_hourly_index(&times, time), Some(0));
        assert_eq!(select_hourly_index(&[], time), None);
    }
}
