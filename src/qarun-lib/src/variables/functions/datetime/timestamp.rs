use super::super::traits::PlaceholderFunction;
use chrono::Utc;

/// Unix time in seconds, or milliseconds with `datetime.timestamp("ms")`.
pub struct DateTimeTimestamp;

impl PlaceholderFunction for DateTimeTimestamp {
    fn namespace(&self) -> &str {
        "datetime"
    }

    fn name(&self) -> &str {
        "timestamp"
    }

    fn validate_args(&self, args: &[String]) -> Result<(), String> {
        match args {
            [] => Ok(()),
            [unit] if unit == "s" || unit == "ms" => Ok(()),
            _ => Err("datetime.timestamp takes an optional unit: \"s\" or \"ms\"".to_string()),
        }
    }

    fn execute(&self, args: &[String]) -> Result<String, String> {
        let now = Utc::now();
        match args.first().map(String::as_str) {
            Some("ms") => Ok(now.timestamp_millis().to_string()),
            _ => Ok(now.timestamp().to_string()),
        }
    }
}
