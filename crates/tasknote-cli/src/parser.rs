use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use chrono_english::{parse_date_string, Dialect};
use tasknote_core::dates::parse_date;
use tasknote_core::models::Weekday;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ArgParseError {
    #[error("Failed to parse date '{0}': {1}")]
    Date(String, String),
    #[error("Invalid time format: '{0}'. Use '14:30', '2:30 PM', '9am', 'noon' or 'midnight'")]
    Time(String),
    #[error("Invalid day(s): {0}. Use 'mon,wed,fri', 'weekdays' or 'weekends'")]
    Days(String),
}

/// Parses `YYYY-MM-DD`, falling back to natural language relative to now.
pub fn parse_date_arg(input: &str) -> Result<NaiveDate, ArgParseError> {
    parse_date_relative(input, Local::now())
}

pub fn parse_date_relative<Tz: TimeZone>(
    input: &str,
    now: DateTime<Tz>,
) -> Result<NaiveDate, ArgParseError>
where
    Tz::Offset: Copy,
{
    let input = input.trim();
    if let Ok(date) = parse_date(input) {
        return Ok(date);
    }
    parse_date_string(input, now, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| ArgParseError::Date(input.to_string(), e.to_string()))
}

/// Normalizes a time of day to the stored `HH:MM` form.
pub fn parse_time_arg(input: &str) -> Result<String, ArgParseError> {
    let mut normalized = input.trim().to_lowercase().replace(' ', "");
    // "9am" and "14" carry no minutes
    if !normalized.contains(':') {
        let split = normalized
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(normalized.len());
        normalized.insert_str(split, ":00");
    }
    let time = match input.trim().to_lowercase().as_str() {
        "noon" => NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => NaiveTime::from_hms_opt(0, 0, 0),
        _ => ["%H:%M", "%I:%M%p"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(&normalized, format).ok()),
    };
    time.map(|t| t.format("%H:%M").to_string())
        .ok_or_else(|| ArgParseError::Time(input.to_string()))
}

/// Parses `mon,wed,fri` style lists plus the `weekdays` / `weekends` groups.
pub fn parse_weekdays(input: &str) -> Result<Vec<Weekday>, ArgParseError> {
    use Weekday::*;

    match input.trim().to_lowercase().as_str() {
        "weekdays" | "workdays" => return Ok(vec![Monday, Tuesday, Wednesday, Thursday, Friday]),
        "weekends" => return Ok(vec![Saturday, Sunday]),
        _ => {}
    }

    let mut days = Vec::new();
    let mut invalid = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<Weekday>() {
            Ok(day) if !days.contains(&day) => days.push(day),
            Ok(_) => {}
            Err(_) => invalid.push(part.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(ArgParseError::Days(invalid.join(", ")));
    }
    if days.is_empty() {
        return Err(ArgParseError::Days(input.to_string()));
    }
    Ok(days)
}
