use super::super::traits::PlaceholderFunction;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;

pub struct DateTimeNow;

impl DateTimeNow {
    /// Accepts `yyyy-MM-dd HH:mm:ss` style tokens as well as raw strftime.
    fn to_strftime(format: &str) -> String {
        format
            .replace("yyyy", "%Y")
            .replace("MM", "%m")
            .replace("dd", "%d")
            .replace("HH", "%H")
            .replace("mm", "%M")
            .replace("ss", "%S")
    }
}

impl PlaceholderFunction for DateTimeNow {
    fn namespace(&self) -> &str {
        "datetime"
    }

    fn name(&self) -> &str {
        "now"
    }

    fn validate_args(&self, args: &[String]) -> Result<(), String> {
        if args.len() > 1 {
            return Err("datetime.now takes at most one argument (format)".to_string());
        }
        Ok(())
    }

    fn execute(&self, args: &[String]) -> Result<String, String> {
        let now = Local::now();
        match args.first() {
            None => Ok(now.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()),
            Some(format) => {
                let format = Self::to_strftime(format);
                let items: Vec<Item> = StrftimeItems::new(&format).collect();
                if items.iter().any(|item| matches!(item, Item::Error)) {
                    return Err(format!("invalid datetime format '{format}'"));
                }
                Ok(now.format_with_items(items.into_iter()).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_tokens_are_translated() {
        assert_eq!(
            DateTimeNow::to_strftime("yyyy-MM-dd HH:mm:ss"),
            "%Y-%m-%d %H:%M:%S"
        );
    }

    #[test]
    fn test_now_with_format() {
        let value = DateTimeNow.execute(&["yyyy".to_string()]).unwrap();
        assert_eq!(value.len(), 4);
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_now_rejects_bad_format() {
        assert!(DateTimeNow.execute(&["%Q".to_string()]).is_err());
    }
}
