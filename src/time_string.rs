use crate::Error;
use regex::Regex;
use std::sync::OnceLock;

const MILLIS_PER_SECOND: u64 = 1000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

fn start_time_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2})$").unwrap())
}

/// Renders a duration in milliseconds as `HH:MM:SS.mmm`.
///
/// Hours are a minimum width, so durations of 100 hours or more keep every digit.
pub fn format_duration(duration: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        duration / MILLIS_PER_HOUR,
        (duration % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
        (duration % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
        duration % MILLIS_PER_SECOND
    )
}

/// Parses an `HH:MM:SS` duration into milliseconds.
///
/// The groups are read as plain quantities: `"00:90:00"` is ninety minutes.
pub fn parse_start_time(input: &str) -> Result<u64, Error> {
    let invalid = || Error::InvalidFormat { input: input.to_string() };
    let captures = start_time_regex().captures(input).ok_or_else(invalid)?;
    let group = |index: usize| captures[index].parse::<u64>().map_err(|_| invalid());
    let (hours, minutes, seconds) = (group(1)?, group(2)?, group(3)?);
    Ok(hours * MILLIS_PER_HOUR + minutes * MILLIS_PER_MINUTE + seconds * MILLIS_PER_SECOND)
}
