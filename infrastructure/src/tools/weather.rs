//! Mock weather tool

use chrono::NaiveDate;
use lab_domain::Tool;
use tracing::{error, info};

use super::clock::{DATE_FORMAT, today};

pub const GET_WEATHER: &str = "get_weather";

pub const SUNNY: &str = "Sunny, 72°F";
pub const RAINY: &str = "Rainy, 55°F";
pub const INVALID_DATE: &str =
    "Error retrieving weather: invalid date format (expected YYYY-MM-DD).";

pub fn weather_tool() -> Tool {
    Tool::new(
        GET_WEATHER,
        "Returns mock weather for a date string formatted 'YYYY-MM-DD'.",
        |input: &str| weather_for(input, &today()),
    )
}

/// Sunny for `today`, rainy for any other valid date
pub fn weather_for(date: &str, today: &str) -> String {
    info!(tool = GET_WEATHER, date, "get_weather tool called");
    if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
        error!(tool = GET_WEATHER, date, "get_weather error: invalid date format");
        return INVALID_DATE.to_string();
    }
    let result = if date == today { SUNNY } else { RAINY };
    info!(tool = GET_WEATHER, result, "get_weather result");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_is_sunny() {
        assert_eq!(weather_for("2024-06-01", "2024-06-01"), SUNNY);
    }

    #[test]
    fn test_other_dates_are_rainy() {
        assert_eq!(weather_for("2023-04-05", "2024-06-01"), RAINY);
    }

    #[test]
    fn test_malformed_dates() {
        assert_eq!(weather_for("04/05/2023", "2024-06-01"), INVALID_DATE);
        assert_eq!(weather_for("2023-02-30", "2024-06-01"), INVALID_DATE);
        assert_eq!(weather_for("", "2024-06-01"), INVALID_DATE);
    }

    #[test]
    fn test_tool_uses_local_today() {
        let tool = weather_tool();
        assert_eq!(tool.call(&today()), SUNNY);
        assert_eq!(tool.call("1999-12-31"), RAINY);
    }
}
