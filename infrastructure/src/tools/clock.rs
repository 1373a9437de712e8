//! Clock tools: get_current_time, get_current_date

use chrono::{DateTime, Local, TimeZone};
use lab_domain::Tool;
use tracing::info;

pub const GET_CURRENT_TIME: &str = "get_current_time";
pub const GET_CURRENT_DATE: &str = "get_current_date";

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn current_time_tool() -> Tool {
    Tool::new(
        GET_CURRENT_TIME,
        "Returns current date and time as 'YYYY-MM-DD HH:MM:SS'.",
        |_: &str| {
            let now = format_time(&Local::now());
            info!(tool = GET_CURRENT_TIME, %now, "get_current_time tool called");
            now
        },
    )
}

pub fn current_date_tool() -> Tool {
    Tool::new(
        GET_CURRENT_DATE,
        "Returns today's date as 'YYYY-MM-DD'.",
        |_: &str| {
            let today = today();
            info!(tool = GET_CURRENT_DATE, %today, "get_current_date tool called");
            today
        },
    )
}

/// Local date in `YYYY-MM-DD`
pub fn today() -> String {
    format_date(&Local::now())
}

pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIME_FORMAT).to_string()
}

pub fn format_date<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_formats() {
        let at = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(7, 5, 3)
                .unwrap(),
        );
        assert_eq!(format_time(&at), "2024-03-09 07:05:03");
        assert_eq!(format_date(&at), "2024-03-09");
    }

    #[test]
    fn test_tools_ignore_input() {
        let date = current_date_tool().call("whatever");
        assert_eq!(date.len(), 10);
        assert!(NaiveDate::parse_from_str(&date, DATE_FORMAT).is_ok());

        let time = current_time_tool().call("");
        assert_eq!(time.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&time, TIME_FORMAT).is_ok());
    }
}
